use std::fmt::Write as _;
use std::io::Read as _;
use std::path::Path;

use anyhow::Context;
use shelfpost_core::{segment, AppConfig, ThreadPlan};

/// Text to segment: the file when given, else the positional words, else stdin.
pub(crate) fn read_input(file: Option<&Path>, words: &[String]) -> anyhow::Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    if !words.is_empty() {
        return Ok(words.join(" "));
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("failed to read text from stdin")?;
    Ok(text)
}

pub(crate) fn preview_plan(config: &AppConfig, text: &str, url: &str) -> ThreadPlan {
    segment(text, &config.reference_link(url), &config.thread)
}

/// One block per message, headed by its position and character count.
#[must_use]
pub(crate) fn render_plan(plan: &ThreadPlan, max_message_length: usize) -> String {
    let mut out = String::new();
    for (i, message) in plan.iter().enumerate() {
        let _ = writeln!(
            out,
            "[{}/{}] {}/{} chars",
            i + 1,
            plan.len(),
            message.chars().count(),
            max_message_length
        );
        let _ = writeln!(out, "{message}");
        if i + 1 < plan.len() {
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use shelfpost_core::ThreadConfig;

    use super::*;

    #[test]
    fn render_numbers_messages_with_char_counts() {
        let plan = segment(
            "Kort tekst uten punktum",
            "http://x/1",
            &ThreadConfig::default(),
        );
        let rendered = render_plan(&plan, 290);
        assert_eq!(
            rendered,
            "[1/2] 24/290 chars\nKort tekst uten punktum.\n\n[2/2] 10/290 chars\nhttp://x/1\n"
        );
    }

    #[test]
    fn counts_chars_not_bytes() {
        let plan = segment("Blåbær på øya", "🔗", &ThreadConfig::default());
        let rendered = render_plan(&plan, 290);
        assert!(rendered.starts_with("[1/2] 14/290 chars\n"));
        assert!(rendered.contains("[2/2] 1/290 chars\n"));
    }

    #[test]
    fn blank_text_still_yields_link_message() {
        let plan = segment("   ", "http://x/1", &ThreadConfig::default());
        assert_eq!(render_plan(&plan, 290), "[1/1] 10/290 chars\nhttp://x/1\n");
    }

    #[test]
    fn positional_words_are_joined() {
        let words = vec!["En".to_string(), "to".to_string(), "tre.".to_string()];
        assert_eq!(read_input(None, &words).unwrap(), "En to tre.");
    }

    #[test]
    fn file_input_wins_over_words() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("review.txt");
        std::fs::write(&path, "Fra fil.").unwrap();
        let words = vec!["ignorert".to_string()];
        assert_eq!(read_input(Some(&path), &words).unwrap(), "Fra fil.");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = read_input(Some(&dir.path().join("nope.txt")), &[]).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
