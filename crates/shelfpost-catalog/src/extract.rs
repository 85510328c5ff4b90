//! Field extraction from catalog pages.
//!
//! Each field has a ranked list of [`Strategy`] values. The first strategy
//! that yields a value passing the field's check wins; the rest are skipped.

use std::sync::LazyLock;

use regex::Regex;
use shelfpost_core::{DetailRecord, IdentifierPattern};

use crate::html;

static PUBLISHED_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(20\d{2}|19\d{2})\b").expect("valid year regex"));
static RECENT_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(202\d|201\d)\b").expect("valid year regex"));

/// Minimum length, in chars, for description and review text to count.
const MIN_PROSE_CHARS: usize = 50;
const DEFAULT_LANGUAGE: &str = "Norwegian";
const PRODUCT_IMAGE_PATH: &str = "/media/catalog/product/";

/// One way of locating a value in a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `<meta property="…" content="…">`
    MetaProperty(&'static str),
    /// `<meta name="…" content="…">`
    MetaName(&'static str),
    /// `itemprop="…"`: the `content` attribute, else the element text.
    ItemProp(&'static str),
    /// Text of the first element with this tag name.
    FirstElement(&'static str),
    /// Text of the first anchor whose `href` contains the fragment.
    AnchorHref(&'static str),
    /// Text of the first element with a class containing the fragment.
    ClassText(&'static str),
    /// Text of the element with this `id`.
    ElementId(&'static str),
    /// `src` of the first image whose `src` contains the fragment.
    ImageSrc(&'static str),
}

pub const TITLE_STRATEGIES: &[Strategy] = &[
    Strategy::MetaProperty("og:title"),
    Strategy::FirstElement("h1"),
    Strategy::FirstElement("title"),
];

pub const AUTHOR_STRATEGIES: &[Strategy] = &[
    Strategy::MetaName("author"),
    Strategy::ItemProp("author"),
    Strategy::AnchorHref("/forfatter/"),
    Strategy::ClassText("author"),
];

pub const YEAR_STRATEGIES: &[Strategy] = &[
    Strategy::ItemProp("datePublished"),
    Strategy::ClassText("publication-year"),
];

pub const LANGUAGE_STRATEGIES: &[Strategy] = &[
    Strategy::ItemProp("inLanguage"),
    Strategy::ClassText("language"),
];

pub const DESCRIPTION_STRATEGIES: &[Strategy] = &[
    Strategy::MetaProperty("og:description"),
    Strategy::MetaName("description"),
    Strategy::ItemProp("description"),
    Strategy::ClassText("description"),
];

pub const REVIEW_STRATEGIES: &[Strategy] = &[
    Strategy::ClassText("reviews"),
    Strategy::ClassText("anmeldelse"),
    Strategy::ElementId("reviews"),
];

pub const IMAGE_STRATEGIES: &[Strategy] = &[
    Strategy::MetaProperty("og:image"),
    Strategy::ImageSrc(PRODUCT_IMAGE_PATH),
];

impl Strategy {
    /// Raw value this strategy finds in `page`, if any.
    #[must_use]
    pub fn apply(self, page: &str) -> Option<String> {
        match self {
            Self::MetaProperty(key) => html::meta_content(page, "property", key),
            Self::MetaName(key) => html::meta_content(page, "name", key),
            Self::ItemProp(key) => html::elements_where(page, move |_, attrs| {
                html::extract_attr(attrs, "itemprop").is_some_and(|v| v.eq_ignore_ascii_case(key))
            })
            .find_map(|el| el.attr("content").or_else(|| el.text())),
            Self::FirstElement(tag) => {
                html::elements_where(page, move |name, _| name.eq_ignore_ascii_case(tag))
                    .find_map(|el| el.text())
            }
            Self::AnchorHref(fragment) => html::elements_where(page, move |name, attrs| {
                name.eq_ignore_ascii_case("a")
                    && html::extract_attr(attrs, "href").is_some_and(|href| href.contains(fragment))
            })
            .find_map(|el| el.text()),
            Self::ClassText(fragment) => {
                html::elements_where(page, move |_, attrs| html::class_contains(attrs, fragment))
                    .find_map(|el| el.text())
            }
            Self::ElementId(id) => html::elements_where(page, move |_, attrs| {
                html::extract_attr(attrs, "id").as_deref() == Some(id)
            })
            .find_map(|el| el.text()),
            Self::ImageSrc(fragment) => html::img_srcs(page).find(|src| src.contains(fragment)),
        }
    }
}

/// Runs `strategies` in order and returns the first value `accept` keeps.
pub fn first_match<F>(
    page: &str,
    strategies: &[Strategy],
    field: &'static str,
    accept: F,
) -> Option<String>
where
    F: Fn(String) -> Option<String>,
{
    strategies.iter().find_map(|strategy| {
        let value = strategy
            .apply(page)
            .map(|raw| html::collapse_whitespace(&raw))
            .filter(|v| !v.is_empty())
            .and_then(&accept)?;
        tracing::debug!(field, ?strategy, "field extracted");
        Some(value)
    })
}

/// Absolute product references on a listing page, deduplicated in
/// first-seen order.
#[must_use]
pub fn listing_references(listing_url: &str, page: &str) -> Vec<String> {
    let mut references: Vec<String> = Vec::new();
    for href in html::anchor_hrefs(page) {
        if !(href.contains("/boker/") && href.contains("-978")) {
            continue;
        }
        let Some(absolute) = html::absolutize_url(listing_url, &href) else {
            continue;
        };
        if !references.contains(&absolute) {
            references.push(absolute);
        }
    }
    references
}

/// Builds a [`DetailRecord`] from a product page. Missing fields stay empty;
/// the caller decides whether the record is usable.
#[must_use]
pub fn detail_record(reference: &str, page: &str, pattern: &IdentifierPattern) -> DetailRecord {
    let identifier = pattern.extract(reference);
    if identifier.is_none() {
        tracing::warn!(reference, "could not extract identifier from reference");
    }

    let title = first_match(page, TITLE_STRATEGIES, "title", Some).unwrap_or_default();
    let author = first_match(page, AUTHOR_STRATEGIES, "author", Some).unwrap_or_default();
    let year = first_match(page, YEAR_STRATEGIES, "year", |v| {
        let caps = PUBLISHED_YEAR_RE.captures(&v)?;
        Some(caps[1].to_string())
    })
    .or_else(|| {
        let text = html::to_text(page);
        let caps = RECENT_YEAR_RE.captures(&text)?;
        Some(caps[1].to_string())
    })
    .unwrap_or_default();
    let language = first_match(page, LANGUAGE_STRATEGIES, "language", Some)
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    let description =
        first_match(page, DESCRIPTION_STRATEGIES, "description", substantial).unwrap_or_default();
    let supplementary_text =
        first_match(page, REVIEW_STRATEGIES, "reviews", substantial).unwrap_or_default();
    let image_url = first_match(page, IMAGE_STRATEGIES, "image", |v| {
        html::absolutize_url(reference, &v)
    });

    DetailRecord {
        identifier,
        title,
        author,
        year,
        language,
        description,
        supplementary_text,
        source_url: reference.to_string(),
        image_url,
    }
}

fn substantial(text: String) -> Option<String> {
    (text.chars().count() > MIN_PROSE_CHARS).then_some(text)
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
