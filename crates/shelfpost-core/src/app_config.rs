use std::path::PathBuf;

use crate::identifier::IdentifierPattern;
use crate::ConfigError;

pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 290;
pub const DEFAULT_MAX_MESSAGES: usize = 3;

/// Bounds for a published thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadConfig {
    /// Hard per-message budget, in characters.
    pub max_message_length: usize,
    /// Thread length ceiling, closer included.
    pub max_messages: usize,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub state_path: PathBuf,
    pub catalog_url: String,
    pub link_prefix: String,
    pub thread: ThreadConfig,
    pub identifier_pattern: IdentifierPattern,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub generator_api_key: Option<String>,
    pub generator_url: String,
    pub generator_model: String,
    pub generator_max_tokens: u32,
    pub generator_temperature: f32,
    pub generator_timeout_secs: u64,
    pub bluesky_handle: Option<String>,
    pub bluesky_password: Option<String>,
    pub bluesky_service: String,
    pub reply_delay_ms: u64,
}

impl AppConfig {
    /// The closing line appended to every thread, pointing back at the item.
    #[must_use]
    pub fn reference_link(&self, source_url: &str) -> String {
        format!("{}{source_url}", self.link_prefix)
    }

    /// Bluesky handle and app password, both required to publish.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] naming the first absent variable.
    pub fn bluesky_credentials(&self) -> Result<(&str, &str), ConfigError> {
        let handle = self
            .bluesky_handle
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("BSKY_HANDLE".to_string()))?;
        let password = self
            .bluesky_password
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("BSKY_PASSWORD".to_string()))?;
        Ok((handle, password))
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when no generator key is set.
    pub fn require_generator_api_key(&self) -> Result<&str, ConfigError> {
        self.generator_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("SHELFPOST_GENERATOR_API_KEY".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("state_path", &self.state_path)
            .field("catalog_url", &self.catalog_url)
            .field("link_prefix", &self.link_prefix)
            .field("thread", &self.thread)
            .field("identifier_pattern", &self.identifier_pattern.as_str())
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field(
                "generator_api_key",
                &self.generator_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("generator_url", &self.generator_url)
            .field("generator_model", &self.generator_model)
            .field("generator_max_tokens", &self.generator_max_tokens)
            .field("generator_temperature", &self.generator_temperature)
            .field("generator_timeout_secs", &self.generator_timeout_secs)
            .field("bluesky_handle", &self.bluesky_handle)
            .field(
                "bluesky_password",
                &self.bluesky_password.as_ref().map(|_| "[redacted]"),
            )
            .field("bluesky_service", &self.bluesky_service)
            .field("reply_delay_ms", &self.reply_delay_ms)
            .finish()
    }
}
