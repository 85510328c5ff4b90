use std::collections::HashSet;

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::identifier::{CatalogIdentifier, IdentifierPattern};

/// A reference picked for this run, with its identifier when one was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub reference: String,
    pub identifier: Option<CatalogIdentifier>,
}

/// Filters catalog references against already-processed identifiers and
/// picks one of the rest uniformly at random.
#[derive(Debug, Clone, Default)]
pub struct CandidateSelector {
    pattern: IdentifierPattern,
}

impl CandidateSelector {
    #[must_use]
    pub fn new(pattern: IdentifierPattern) -> Self {
        Self { pattern }
    }

    /// Distinct references not yet processed, in first-seen order.
    ///
    /// A reference without an extractable identifier is always eligible.
    #[must_use]
    pub fn eligible(
        &self,
        references: &[String],
        known: &HashSet<CatalogIdentifier>,
    ) -> Vec<Candidate> {
        let mut seen = HashSet::new();
        references
            .iter()
            .filter(|reference| seen.insert(*reference))
            .map(|reference| Candidate {
                reference: reference.clone(),
                identifier: self.pattern.extract(reference),
            })
            .filter(|candidate| {
                candidate
                    .identifier
                    .as_ref()
                    .is_none_or(|id| !known.contains(id))
            })
            .collect()
    }

    /// Picks one eligible reference using the thread-local RNG.
    #[must_use]
    pub fn select(
        &self,
        references: &[String],
        known: &HashSet<CatalogIdentifier>,
    ) -> Option<Candidate> {
        self.select_with_rng(references, known, &mut rand::rng())
    }

    /// Picks one eligible reference using `rng`. `None` means nothing is left.
    pub fn select_with_rng<R: Rng + ?Sized>(
        &self,
        references: &[String],
        known: &HashSet<CatalogIdentifier>,
        rng: &mut R,
    ) -> Option<Candidate> {
        let eligible = self.eligible(references, known);
        let chosen = eligible.choose(rng).cloned();
        if let Some(candidate) = &chosen {
            tracing::debug!(
                eligible = eligible.len(),
                reference = %candidate.reference,
                "selected candidate"
            );
        }
        chosen
    }
}
