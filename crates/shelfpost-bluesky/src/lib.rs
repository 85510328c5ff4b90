//! Thread publishing on Bluesky over AT Protocol XRPC.

pub mod client;
pub mod error;
pub mod types;

pub use client::{post_url, BlueskyClient, CoverImage, Credentials, PublishedThread};
pub use error::BlueskyError;
