use std::fmt::Write as _;

use shelfpost_core::DetailRecord;

/// Upper bound on review length the model is asked to respect, in characters.
pub const REVIEW_MAX_CHARS: usize = 800;

/// Builds the instruction sent to the model for `record`.
///
/// The metadata is context only; the model is told not to repeat title,
/// author, or year so the review reads as prose rather than a listing.
#[must_use]
pub fn build_prompt(record: &DetailRecord) -> String {
    let mut prompt = format!(
        "Write a flirty, playful and funny book review in Norwegian, in the voice of a \
         charming \"book daddy\". Maximum {REVIEW_MAX_CHARS} characters.\n\
         \n\
         RULES:\n\
         - Write ONLY the review text, with no headings, metadata or hashtags\n\
         - DO NOT mention the book title, the author's name or the year\n\
         - Focus on the content, themes and the experience of reading it\n\
         - Make it witty and irresistible\n\
         \n\
         Book context (DO NOT repeat these in the review):\n"
    );

    let _ = writeln!(prompt, "Title: '{}'", record.title);
    let _ = writeln!(prompt, "Author: '{}'", record.author);
    let _ = writeln!(prompt, "Year: '{}'", record.year);
    let _ = writeln!(prompt, "Language: '{}'", record.language);
    if !record.description.is_empty() {
        let _ = writeln!(prompt, "Description: {}", record.description);
    }
    if !record.supplementary_text.is_empty() {
        let _ = writeln!(prompt, "Customer reviews: {}", record.supplementary_text);
    }

    prompt.push_str(
        "\nWrite 2-3 engaging paragraphs that flow naturally. Focus on why this book \
         is irresistible based on the description and themes.",
    );
    prompt
}
