//! Splitting generated prose into a bounded, link-terminated thread.
//!
//! All lengths are counted in `char`s. Byte offsets only appear at the
//! slicing boundary, via [`char_prefix`].

use crate::app_config::ThreadConfig;

/// An ordered, immutable sequence of messages ready to publish.
///
/// The first message is the thread root; the last carries the reference link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadPlan {
    messages: Vec<String>,
}

impl ThreadPlan {
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.messages.iter()
    }

    #[must_use]
    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

impl<'a> IntoIterator for &'a ThreadPlan {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

/// Splits `text` into at most `config.max_messages` messages of at most
/// `config.max_message_length` chars each, the last of which ends with `link`.
///
/// Body text that cannot fit in the final message is dropped. When `link`
/// alone reaches the length limit, the closer is the link's first
/// `max_message_length` chars and carries no body text. The plan is empty
/// only when both `text` and `link` are blank.
#[must_use]
pub fn segment(text: &str, link: &str, config: &ThreadConfig) -> ThreadPlan {
    let max = config.max_message_length.max(1);
    let body_slots = config.max_messages.max(1) - 1;

    let chunks: Vec<String> = pack(split_sentences(text), max)
        .into_iter()
        .flat_map(|chunk| enforce_limit(&chunk, max))
        .collect();

    let mut messages = Vec::with_capacity(body_slots + 1);
    match chunks.len() {
        0 => messages.push(closer("", link, max)),
        1 => {
            let mut rest = chunks[0].as_str();
            let mut body = Vec::new();
            while body.len() < body_slots && !rest.is_empty() {
                let (head, tail) = take_boundary(rest, max);
                if !head.is_empty() {
                    body.push(head.to_string());
                }
                rest = tail;
            }
            messages.extend(body);
            messages.push(closer(rest, link, max));
        }
        _ => {
            let mut overflow: Vec<String> = Vec::new();
            let mut remaining = chunks.iter();
            for chunk in remaining.by_ref().take(body_slots) {
                let (head, tail) = take_boundary(chunk, max);
                messages.push(head.to_string());
                if !tail.is_empty() {
                    overflow.push(tail.to_string());
                }
            }
            overflow.extend(remaining.cloned());
            messages.push(closer(&overflow.join(" "), link, max));
        }
    }

    messages.retain(|m| !m.is_empty());
    ThreadPlan { messages }
}

fn split_sentences(text: &str) -> Vec<String> {
    text.split(". ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.ends_with(['.', '!', '?']) {
                s.to_string()
            } else {
                format!("{s}.")
            }
        })
        .collect()
}

/// Greedily joins sentences with single spaces while they fit in `max`.
fn pack(sentences: Vec<String>, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in sentences {
        let joined_len = if current.is_empty() {
            char_len(&sentence)
        } else {
            char_len(&current) + 1 + char_len(&sentence)
        };
        if joined_len <= max {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&sentence);
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }

        let mut rest = sentence.as_str();
        while char_len(rest) > max {
            let cut = last_space_within(rest, max).unwrap_or(max);
            let (head, tail) = split_at_char(rest, cut);
            let head = head.trim_end();
            if !head.is_empty() {
                chunks.push(head.to_string());
            }
            rest = tail.trim_start();
        }
        current = rest.to_string();
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Re-cuts a chunk until every piece fits in `max`.
fn enforce_limit(chunk: &str, max: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut rest = chunk;
    while !rest.is_empty() {
        let (head, tail) = take_boundary(rest, max);
        if !head.is_empty() {
            pieces.push(head.to_string());
        }
        rest = tail;
    }
    pieces
}

/// Final message: as much of `text` as fits in front of `link`.
fn closer(text: &str, link: &str, max: usize) -> String {
    let link_len = char_len(link);
    if link_len >= max {
        return char_prefix(link, max).to_string();
    }
    if link.is_empty() {
        return take_boundary(text, max).0.to_string();
    }
    let available = max - link_len - 1;
    let (head, _dropped) = take_boundary(text, available);
    if head.is_empty() {
        link.to_string()
    } else {
        format!("{head} {link}")
    }
}

/// Splits off the longest head of `text` that fits in `limit` chars,
/// preferring a sentence end, then a word break, then a hard cut.
/// Both halves come back trimmed at the cut.
fn take_boundary(text: &str, limit: usize) -> (&str, &str) {
    let cut = boundary_cut(text, limit);
    let (head, tail) = split_at_char(text, cut);
    (head.trim_end(), tail.trim_start())
}

fn boundary_cut(text: &str, limit: usize) -> usize {
    if char_len(text) <= limit {
        return char_len(text);
    }
    // A ". " whose period sits inside the limit may have its space just past it.
    let window = char_prefix(text, limit + 1);
    let cut = window
        .rfind(". ")
        .map(|byte| char_len(&window[..byte]) + 1)
        .or_else(|| last_space_within(text, limit))
        .unwrap_or(limit);
    if cut == 0 {
        limit
    } else {
        cut
    }
}

/// Char index of the last space at or before `limit`, if it is not the first char.
fn last_space_within(text: &str, limit: usize) -> Option<usize> {
    let window = char_prefix(text, limit + 1);
    window
        .rfind(' ')
        .map(|byte| char_len(&window[..byte]))
        .filter(|&idx| idx > 0)
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn char_prefix(text: &str, chars: usize) -> &str {
    split_at_char(text, chars).0
}

fn split_at_char(text: &str, chars: usize) -> (&str, &str) {
    let byte = text
        .char_indices()
        .nth(chars)
        .map_or(text.len(), |(idx, _)| idx);
    text.split_at(byte)
}

#[cfg(test)]
#[path = "segment_test.rs"]
mod tests;
