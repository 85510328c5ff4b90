//! Regex-level HTML helpers. Good enough for picking values out of product
//! pages; not a parser, so nested elements of the same tag name end early.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static OPEN_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<([a-z][a-z0-9]*)\b([^>]*)>").expect("valid regex"));
static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid regex"));
static ANCHOR_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b[^>]*>").expect("valid regex"));
static IMG_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("valid regex"));
static ANY_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static SCRIPT_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script>|<style\b.*?</style>|<!--.*?-->").expect("valid regex")
});
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").expect("valid regex")
});
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

const VOID_TAGS: &[&str] = &["meta", "link", "img", "br", "hr", "input", "source"];

/// Value of `attr` inside a single tag's markup, entity-decoded.
pub(crate) fn extract_attr(tag: &str, attr: &str) -> Option<String> {
    let pattern = format!(r#"(?is)(?:^|\s){}\s*=\s*(?:"([^"]*)"|'([^']*)')"#, regex::escape(attr));
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(tag)?;
    let raw = caps.get(1).or_else(|| caps.get(2))?.as_str();
    let value = decode_entities(raw.trim());
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// `content` of the first `<meta>` whose `key_attr` equals `key_value`.
pub(crate) fn meta_content(html: &str, key_attr: &str, key_value: &str) -> Option<String> {
    META_TAG_RE.find_iter(html).find_map(|m| {
        let tag = m.as_str();
        let key = extract_attr(tag, key_attr)?;
        if key.eq_ignore_ascii_case(key_value) {
            extract_attr(tag, "content")
        } else {
            None
        }
    })
}

/// An element located by its opening tag.
pub(crate) struct Element<'a> {
    pub(crate) attrs: &'a str,
    pub(crate) inner: Option<&'a str>,
}

impl Element<'_> {
    pub(crate) fn attr(&self, name: &str) -> Option<String> {
        extract_attr(self.attrs, name)
    }

    /// Inner markup reduced to clean text.
    pub(crate) fn text(&self) -> Option<String> {
        let text = to_text(self.inner?);
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Every element whose opening tag satisfies `matches(tag_name, attrs)`, in
/// document order.
pub(crate) fn elements_where<'a, F>(html: &'a str, matches: F) -> impl Iterator<Item = Element<'a>>
where
    F: Fn(&str, &str) -> bool + 'a,
{
    OPEN_TAG_RE.captures_iter(html).filter_map(move |caps| {
        let name = caps.get(1)?.as_str();
        let attrs = caps.get(2)?.as_str();
        if !matches(name, attrs) {
            return None;
        }
        let open_end = caps.get(0)?.end();
        Some(Element {
            attrs,
            inner: inner_markup(html, name, open_end),
        })
    })
}

fn inner_markup<'a>(html: &'a str, name: &str, open_end: usize) -> Option<&'a str> {
    if VOID_TAGS.iter().any(|v| v.eq_ignore_ascii_case(name)) {
        return None;
    }
    let rest = &html[open_end..];
    let close = format!("</{}", name.to_ascii_lowercase());
    let end = rest.to_ascii_lowercase().find(&close)?;
    Some(&rest[..end])
}

/// True when the `class` attribute has a class containing `needle`.
pub(crate) fn class_contains(attrs: &str, needle: &str) -> bool {
    extract_attr(attrs, "class").is_some_and(|classes| {
        classes
            .split_whitespace()
            .any(|class| class.to_ascii_lowercase().contains(needle))
    })
}

/// `href`s of every anchor, in document order.
pub(crate) fn anchor_hrefs(html: &str) -> impl Iterator<Item = String> + '_ {
    ANCHOR_TAG_RE
        .find_iter(html)
        .filter_map(|m| extract_attr(m.as_str(), "href"))
}

/// `src`s of every image, in document order.
pub(crate) fn img_srcs(html: &str) -> impl Iterator<Item = String> + '_ {
    IMG_TAG_RE
        .find_iter(html)
        .filter_map(|m| extract_attr(m.as_str(), "src"))
}

/// Strips markup, decodes entities, and collapses whitespace.
pub(crate) fn to_text(markup: &str) -> String {
    let without_scripts = SCRIPT_STYLE_RE.replace_all(markup, " ");
    let without_tags = ANY_TAG_RE.replace_all(&without_scripts, " ");
    collapse_whitespace(&decode_entities(&without_tags))
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Decodes numeric entities and the named ones that show up in Norwegian
/// product copy. Unknown entities are left as written.
pub(crate) fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let body = &caps[1];
            decode_entity(body).map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn decode_entity(body: &str) -> Option<char> {
    if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(dec) = body.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32);
    }
    let c = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "aring" => 'å',
        "Aring" => 'Å',
        "oslash" => 'ø',
        "Oslash" => 'Ø',
        "aelig" => 'æ',
        "AElig" => 'Æ',
        "eacute" => 'é',
        "laquo" => '«',
        "raquo" => '»',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        "rsquo" => '\u{2019}',
        "lsquo" => '\u{2018}',
        "rdquo" => '\u{201d}',
        "ldquo" => '\u{201c}',
        _ => return None,
    };
    Some(c)
}

/// Resolves `candidate` against `base_url`.
pub(crate) fn absolutize_url(base_url: &str, candidate: &str) -> Option<String> {
    let base = reqwest::Url::parse(base_url).ok()?;
    base.join(candidate).ok().map(|u| u.to_string())
}
