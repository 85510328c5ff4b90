use std::path::PathBuf;

use crate::app_config::{AppConfig, ThreadConfig, DEFAULT_MAX_MESSAGES, DEFAULT_MAX_MESSAGE_LENGTH};
use crate::identifier::IdentifierPattern;
use crate::ConfigError;

pub const DEFAULT_CATALOG_URL: &str =
    "https://www.norli.no/boker/aktuelt-og-anbefalt/manedens-nyheter";
pub const DEFAULT_LINK_PREFIX: &str = "📚 Les mer: ";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
pub const DEFAULT_GENERATOR_URL: &str = "https://models.inference.ai.azure.com/chat/completions";
pub const DEFAULT_BLUESKY_SERVICE: &str = "https://bsky.social";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Parsing and validation, decoupled from the process environment so tests
/// can drive it with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    // Blank values are treated as unset.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive = |var: &str, default: usize| -> Result<usize, ConfigError> {
        let value = or_default(var, &default.to_string())
            .trim()
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be at least 1".to_string()));
        }
        Ok(value)
    };

    let log_level = or_default("SHELFPOST_LOG_LEVEL", "info");
    let state_path = PathBuf::from(or_default("SHELFPOST_STATE_PATH", "book_state.json"));
    let catalog_url = or_default("SHELFPOST_CATALOG_URL", DEFAULT_CATALOG_URL);
    let link_prefix = or_default("SHELFPOST_LINK_PREFIX", DEFAULT_LINK_PREFIX);

    let thread = ThreadConfig {
        max_message_length: parse_positive(
            "SHELFPOST_MAX_MESSAGE_LENGTH",
            DEFAULT_MAX_MESSAGE_LENGTH,
        )?,
        max_messages: parse_positive("SHELFPOST_MAX_MESSAGES", DEFAULT_MAX_MESSAGES)?,
    };

    let identifier_pattern = match optional("SHELFPOST_IDENTIFIER_PATTERN") {
        Some(raw) => {
            let pattern = IdentifierPattern::new(&raw)
                .map_err(|e| invalid("SHELFPOST_IDENTIFIER_PATTERN", e.to_string()))?;
            if pattern.matches_empty() {
                return Err(invalid(
                    "SHELFPOST_IDENTIFIER_PATTERN",
                    "pattern must not match the empty string".to_string(),
                ));
            }
            pattern
        }
        None => IdentifierPattern::default(),
    };

    let http_timeout_secs = parse_u64("SHELFPOST_HTTP_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("SHELFPOST_USER_AGENT", DEFAULT_USER_AGENT);
    let max_retries = parse_u32("SHELFPOST_MAX_RETRIES", "3")?;
    let retry_backoff_base_secs = parse_u64("SHELFPOST_RETRY_BACKOFF_BASE_SECS", "5")?;

    let generator_api_key = optional("SHELFPOST_GENERATOR_API_KEY");
    let generator_url = or_default("SHELFPOST_GENERATOR_URL", DEFAULT_GENERATOR_URL);
    let generator_model = or_default("SHELFPOST_GENERATOR_MODEL", "gpt-4o");
    let generator_max_tokens = parse_u32("SHELFPOST_GENERATOR_MAX_TOKENS", "300")?;
    let generator_temperature = or_default("SHELFPOST_GENERATOR_TEMPERATURE", "0.9")
        .trim()
        .parse::<f32>()
        .map_err(|e| invalid("SHELFPOST_GENERATOR_TEMPERATURE", e.to_string()))?;
    let generator_timeout_secs = parse_u64("SHELFPOST_GENERATOR_TIMEOUT_SECS", "60")?;

    let bluesky_handle = optional("BSKY_HANDLE");
    let bluesky_password = optional("BSKY_PASSWORD");
    let bluesky_service = or_default("SHELFPOST_BLUESKY_SERVICE", DEFAULT_BLUESKY_SERVICE);
    let reply_delay_ms = parse_u64("SHELFPOST_REPLY_DELAY_MS", "1000")?;

    Ok(AppConfig {
        log_level,
        state_path,
        catalog_url,
        link_prefix,
        thread,
        identifier_pattern,
        http_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        generator_api_key,
        generator_url,
        generator_model,
        generator_max_tokens,
        generator_temperature,
        generator_timeout_secs,
        bluesky_handle,
        bluesky_password,
        bluesky_service,
        reply_delay_ms,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
