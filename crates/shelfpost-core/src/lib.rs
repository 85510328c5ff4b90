//! Core domain for shelfpost: configuration, catalog identifiers, candidate
//! selection, and bounded thread segmentation.
//!
//! Everything in this crate is synchronous and free of I/O apart from reading
//! environment variables in [`load_app_config`].

pub mod app_config;
pub mod config;
pub mod detail;
pub mod identifier;
pub mod segment;
pub mod select;

use thiserror::Error;

pub use app_config::{AppConfig, ThreadConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use detail::DetailRecord;
pub use identifier::{CatalogIdentifier, IdentifierPattern, DEFAULT_IDENTIFIER_PATTERN};
pub use segment::{segment, ThreadPlan};
pub use select::{Candidate, CandidateSelector};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
