//! Review text generation through an OpenAI-compatible chat-completions API.

pub mod client;
pub mod error;
pub mod prompt;
pub mod types;

pub use client::{ChatClient, GeneratorSettings};
pub use error::GeneratorError;
pub use prompt::build_prompt;
