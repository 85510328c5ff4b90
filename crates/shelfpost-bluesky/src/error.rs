use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlueskyError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} returned HTTP {status}: {body}")]
    Status {
        method: &'static str,
        status: u16,
        body: String,
    },

    #[error("unexpected {method} response: {source}")]
    Deserialize {
        method: &'static str,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid service URL '{url}': {reason}")]
    InvalidServiceUrl { url: String, reason: String },

    #[error("image download from {url} failed with HTTP {status}")]
    ImageStatus { url: String, status: u16 },

    #[error("image at {url} is {size} bytes, over the {limit} byte limit")]
    ImageTooLarge { url: String, size: usize, limit: usize },

    #[error("thread has no messages")]
    EmptyThread,
}
