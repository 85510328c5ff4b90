//! Persistent record of processed catalog items.
//!
//! The on-disk JSON keeps the field names of earlier releases so existing
//! state files keep deduplicating after an upgrade.

pub mod error;
pub mod state;
pub mod store;

pub use error::StateError;
pub use state::{PipelineState, ProcessedEntry, RunStats};
pub use store::StateStore;
