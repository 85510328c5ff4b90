//! One end-to-end run: fetch, select, generate, segment, publish, record.
//!
//! Collaborators sit behind small traits so runs can be exercised without
//! the network. Every failure is logged where it happens and folded into a
//! [`RunOutcome`]; nothing is returned as an error.

use chrono::Utc;
use shelfpost_core::{segment, AppConfig, CandidateSelector, DetailRecord, ThreadPlan};
use shelfpost_state::{ProcessedEntry, StateStore};

/// Exit status for a run with nothing left to process (`EX_CONFIG`).
pub(crate) const EXIT_NO_CANDIDATES: u8 = 78;

pub(crate) trait CandidateSource {
    /// References currently offered by the catalog.
    async fn fetch_candidates(&self) -> anyhow::Result<Vec<String>>;

    async fn fetch_detail(&self, reference: &str) -> anyhow::Result<DetailRecord>;
}

pub(crate) trait TextGenerator {
    async fn generate(&self, record: &DetailRecord) -> anyhow::Result<String>;
}

pub(crate) trait ThreadPublisher {
    /// Posts `plan` as a thread and returns the public URL of its root.
    async fn publish(&self, plan: &ThreadPlan, record: &DetailRecord) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RunOutcome {
    Published { url: String },
    Previewed { plan: ThreadPlan },
    NoCandidates,
    CatalogFailed,
    IncompleteDetail,
    GenerationFailed,
    PublishFailed,
}

impl RunOutcome {
    /// Process exit status: `0` on success, `78` when there is nothing to
    /// do, `1` for any failure.
    #[must_use]
    pub(crate) fn exit_status(&self) -> u8 {
        match self {
            Self::Published { .. } | Self::Previewed { .. } => 0,
            Self::NoCandidates => EXIT_NO_CANDIDATES,
            Self::CatalogFailed
            | Self::IncompleteDetail
            | Self::GenerationFailed
            | Self::PublishFailed => 1,
        }
    }
}

pub(crate) struct Pipeline<'a, S, G, P> {
    pub config: &'a AppConfig,
    pub store: &'a StateStore,
    pub source: S,
    pub generator: G,
    pub publisher: P,
}

impl<S, G, P> Pipeline<'_, S, G, P>
where
    S: CandidateSource,
    G: TextGenerator,
    P: ThreadPublisher,
{
    /// Runs the pipeline once. With `dry_run`, stops after segmentation and
    /// leaves the state file alone.
    pub(crate) async fn run(&self, dry_run: bool) -> RunOutcome {
        let state = self.store.load();
        tracing::info!(
            processed = state.processed_entries.len(),
            path = %self.store.path().display(),
            "loaded state"
        );

        let references = match self.source.fetch_candidates().await {
            Ok(references) => references,
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "failed to fetch candidates");
                return RunOutcome::CatalogFailed;
            }
        };
        if references.is_empty() {
            tracing::info!("catalog listing has no candidates");
            return RunOutcome::NoCandidates;
        }

        let selector = CandidateSelector::new(self.config.identifier_pattern.clone());
        let Some(candidate) = selector.select(&references, &state.identifiers()) else {
            tracing::info!(
                candidates = references.len(),
                "every candidate has already been processed"
            );
            return RunOutcome::NoCandidates;
        };
        tracing::info!(reference = %candidate.reference, "selected candidate");

        let record = match self.source.fetch_detail(&candidate.reference).await {
            Ok(record) if record.is_complete() => record,
            Ok(_) => {
                tracing::error!(reference = %candidate.reference, "detail record has no title");
                return RunOutcome::IncompleteDetail;
            }
            Err(e) => {
                tracing::error!(
                    reference = %candidate.reference,
                    error = %format!("{e:#}"),
                    "failed to fetch detail record"
                );
                return RunOutcome::IncompleteDetail;
            }
        };
        let identifier = record
            .identifier
            .clone()
            .or_else(|| candidate.identifier.clone());
        if identifier.is_none() {
            tracing::warn!(
                reference = %candidate.reference,
                "no identifier in reference; this item will not be deduplicated"
            );
        }

        let text = match self.generator.generate(&record).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                tracing::error!(title = %record.title, "generator returned blank text");
                return RunOutcome::GenerationFailed;
            }
            Err(e) => {
                tracing::error!(title = %record.title, error = %format!("{e:#}"), "generation failed");
                return RunOutcome::GenerationFailed;
            }
        };

        let link = self.config.reference_link(&candidate.reference);
        let plan = segment(&text, &link, &self.config.thread);
        tracing::info!(
            messages = plan.len(),
            chars = ?plan.iter().map(|m| m.chars().count()).collect::<Vec<_>>(),
            "segmented thread"
        );

        if dry_run {
            tracing::info!("dry run; nothing published");
            return RunOutcome::Previewed { plan };
        }

        let url = match self.publisher.publish(&plan, &record).await {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(title = %record.title, error = %format!("{e:#}"), "publish failed");
                return RunOutcome::PublishFailed;
            }
        };

        let source_url = if record.source_url.is_empty() {
            candidate.reference.clone()
        } else {
            record.source_url.clone()
        };
        let next = state.record(ProcessedEntry {
            identifier,
            title: record.title.clone(),
            author: record.author.clone(),
            source_url,
            published_reference: url.clone(),
            processed_at: Utc::now(),
        });
        match self.store.persist(&next) {
            Ok(()) => tracing::info!(
                processed = next.processed_entries.len(),
                total_published = next.stats.total_published,
                "state saved"
            ),
            // Publish stands.
            Err(e) => tracing::error!(error = %e, "failed to save state after publishing"),
        }

        tracing::info!(%url, title = %record.title, "published");
        RunOutcome::Published { url }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
