//! Catalog identifiers and the pattern used to pull them out of references.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A 13-digit code with the `978` prefix, directly after a hyphen and followed
/// by either a query string or the end of the reference.
pub const DEFAULT_IDENTIFIER_PATTERN: &str = r"-(978\d{10})(?:\?|$)";

static DEFAULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_IDENTIFIER_PATTERN).expect("valid identifier regex"));

/// Stable external key for a catalog item. Used as the dedup key across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogIdentifier(String);

impl CatalogIdentifier {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Legacy state files store a blank identifier when extraction failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for CatalogIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compiled pattern for extracting a [`CatalogIdentifier`] from a reference.
///
/// The first capture group is the identifier. Patterns without a group use
/// the whole match.
#[derive(Debug, Clone)]
pub struct IdentifierPattern {
    regex: Regex,
}

impl IdentifierPattern {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] if `pattern` is not a valid regular expression.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// Extracts the identifier embedded in `reference`, if any.
    #[must_use]
    pub fn extract(&self, reference: &str) -> Option<CatalogIdentifier> {
        let caps = self.regex.captures(reference)?;
        let value = caps.get(1).or_else(|| caps.get(0))?.as_str().trim();
        if value.is_empty() {
            None
        } else {
            Some(CatalogIdentifier::new(value))
        }
    }

    /// True when the pattern accepts an empty string, so it would match
    /// every reference without locating an identifier.
    #[must_use]
    pub fn matches_empty(&self) -> bool {
        self.regex.is_match("")
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Default for IdentifierPattern {
    fn default() -> Self {
        Self {
            regex: DEFAULT_RE.clone(),
        }
    }
}
