use thiserror::Error;

/// Errors returned by [`crate::ChatClient`]. Variants that come from a
/// response carry the raw body for logging.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generator returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("generator response is not valid JSON: {source}")]
    Deserialize {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("generator response has no choices[0].message.content")]
    MissingContent { body: String },

    #[error("generator returned empty text")]
    EmptyContent,

    #[error("invalid generator endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

impl GeneratorError {
    /// Raw response body, when the error came from a response.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. }
            | Self::Deserialize { body, .. }
            | Self::MissingContent { body } => Some(body),
            Self::Http(_) | Self::EmptyContent | Self::InvalidEndpoint { .. } => None,
        }
    }
}
