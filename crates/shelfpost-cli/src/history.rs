use std::fmt::Write as _;

use shelfpost_state::PipelineState;

/// How many entries `shelfpost state` lists by default.
pub(crate) const DEFAULT_RECENT: usize = 5;

/// Human-readable summary of the persisted state.
#[must_use]
pub(crate) fn render_state(state: &PipelineState, recent: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "processed: {}", state.processed_entries.len());
    let _ = writeln!(out, "generated: {}", state.stats.total_generated);
    let _ = writeln!(out, "published: {}", state.stats.total_published);

    if state.processed_entries.is_empty() || recent == 0 {
        return out;
    }

    let _ = writeln!(out, "\nmost recent:");
    for entry in state.recent(recent) {
        let identifier = entry
            .identifier
            .as_ref()
            .map_or("-", shelfpost_core::CatalogIdentifier::as_str);
        let author = if entry.author.is_empty() {
            String::new()
        } else {
            format!(" by {}", entry.author)
        };
        let _ = writeln!(
            out,
            "  {}  {}  {}{}",
            entry.processed_at.format("%Y-%m-%d %H:%M"),
            identifier,
            entry.title,
            author
        );
        if !entry.published_reference.is_empty() {
            let _ = writeln!(out, "      {}", entry.published_reference);
        }
    }
    out
}
