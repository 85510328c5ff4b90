use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// A map carrying the secrets a real `run` needs.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("SHELFPOST_GENERATOR_API_KEY", "test-token");
    m.insert("BSKY_HANDLE", "bokbot.bsky.social");
    m.insert("BSKY_PASSWORD", "app-password");
    m
}

#[test]
fn build_app_config_succeeds_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.state_path, PathBuf::from("book_state.json"));
    assert_eq!(cfg.catalog_url, DEFAULT_CATALOG_URL);
    assert_eq!(cfg.link_prefix, DEFAULT_LINK_PREFIX);
    assert_eq!(cfg.thread, ThreadConfig::default());
    assert_eq!(cfg.thread.max_message_length, 290);
    assert_eq!(cfg.thread.max_messages, 3);
    assert_eq!(cfg.identifier_pattern.as_str(), r"-(978\d{10})(?:\?|$)");
    assert_eq!(cfg.http_timeout_secs, 30);
    assert_eq!(cfg.max_retries, 3);
    assert_eq!(cfg.retry_backoff_base_secs, 5);
    assert!(cfg.generator_api_key.is_none());
    assert_eq!(cfg.generator_url, DEFAULT_GENERATOR_URL);
    assert_eq!(cfg.generator_model, "gpt-4o");
    assert_eq!(cfg.generator_max_tokens, 300);
    assert!((cfg.generator_temperature - 0.9).abs() < f32::EPSILON);
    assert_eq!(cfg.generator_timeout_secs, 60);
    assert!(cfg.bluesky_handle.is_none());
    assert!(cfg.bluesky_password.is_none());
    assert_eq!(cfg.bluesky_service, DEFAULT_BLUESKY_SERVICE);
    assert_eq!(cfg.reply_delay_ms, 1000);
}

#[test]
fn secrets_are_read_when_present() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.require_generator_api_key().unwrap(), "test-token");
    assert_eq!(
        cfg.bluesky_credentials().unwrap(),
        ("bokbot.bsky.social", "app-password")
    );
}

#[test]
fn blank_secret_counts_as_missing() {
    let mut map = full_env();
    map.insert("BSKY_PASSWORD", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let err = cfg.bluesky_credentials().unwrap_err();
    assert!(
        matches!(err, ConfigError::MissingEnvVar(ref v) if v == "BSKY_PASSWORD"),
        "expected MissingEnvVar(BSKY_PASSWORD), got: {err:?}"
    );
}

#[test]
fn missing_generator_key_is_reported_by_name() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let err = cfg.require_generator_api_key().unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "SHELFPOST_GENERATOR_API_KEY"));
}

#[test]
fn debug_output_redacts_secrets() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("test-token"));
    assert!(!rendered.contains("app-password"));
    assert!(rendered.contains("[redacted]"));
    assert!(rendered.contains("bokbot.bsky.social"));
}

#[test]
fn thread_bounds_override() {
    let mut map = full_env();
    map.insert("SHELFPOST_MAX_MESSAGE_LENGTH", "300");
    map.insert("SHELFPOST_MAX_MESSAGES", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.thread.max_message_length, 300);
    assert_eq!(cfg.thread.max_messages, 5);
}

#[test]
fn zero_max_messages_is_invalid() {
    let mut map = full_env();
    map.insert("SHELFPOST_MAX_MESSAGES", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHELFPOST_MAX_MESSAGES"),
        "expected InvalidEnvVar(SHELFPOST_MAX_MESSAGES), got: {result:?}"
    );
}

#[test]
fn non_numeric_message_length_is_invalid() {
    let mut map = full_env();
    map.insert("SHELFPOST_MAX_MESSAGE_LENGTH", "lots");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHELFPOST_MAX_MESSAGE_LENGTH"),
        "expected InvalidEnvVar(SHELFPOST_MAX_MESSAGE_LENGTH), got: {result:?}"
    );
}

#[test]
fn identifier_pattern_override() {
    let mut map = full_env();
    map.insert("SHELFPOST_IDENTIFIER_PATTERN", r"/isbn/(\d+)");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let id = cfg.identifier_pattern.extract("https://x/isbn/123").unwrap();
    assert_eq!(id.as_str(), "123");
}

#[test]
fn uncompilable_identifier_pattern_is_invalid() {
    let mut map = full_env();
    map.insert("SHELFPOST_IDENTIFIER_PATTERN", "(978");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHELFPOST_IDENTIFIER_PATTERN"),
        "expected InvalidEnvVar(SHELFPOST_IDENTIFIER_PATTERN), got: {result:?}"
    );
}

#[test]
fn invalid_temperature_is_rejected() {
    let mut map = full_env();
    map.insert("SHELFPOST_GENERATOR_TEMPERATURE", "warm");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHELFPOST_GENERATOR_TEMPERATURE"
    ));
}

#[test]
fn retry_settings_override() {
    let mut map = full_env();
    map.insert("SHELFPOST_MAX_RETRIES", "0");
    map.insert("SHELFPOST_RETRY_BACKOFF_BASE_SECS", "1");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_retries, 0);
    assert_eq!(cfg.retry_backoff_base_secs, 1);
}

#[test]
fn invalid_reply_delay_is_rejected() {
    let mut map = full_env();
    map.insert("SHELFPOST_REPLY_DELAY_MS", "-5");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHELFPOST_REPLY_DELAY_MS"
    ));
}

#[test]
fn reference_link_prepends_prefix() {
    let mut map = full_env();
    map.insert("SHELFPOST_LINK_PREFIX", "Mer: ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.reference_link("https://x/1"), "Mer: https://x/1");
}

#[test]
fn blank_values_fall_back_to_defaults() {
    let mut map = full_env();
    map.insert("SHELFPOST_STATE_PATH", "");
    map.insert("SHELFPOST_IDENTIFIER_PATTERN", "  ");
    map.insert("SHELFPOST_MAX_MESSAGES", " ");
    map.insert("SHELFPOST_CATALOG_URL", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.state_path, PathBuf::from("book_state.json"));
    assert_eq!(cfg.thread.max_messages, 3);
    assert_eq!(cfg.catalog_url, DEFAULT_CATALOG_URL);

    let known = cfg
        .identifier_pattern
        .extract("https://www.norli.no/boker/x-9788202806453")
        .unwrap();
    assert_eq!(known.as_str(), "9788202806453");
}

#[test]
fn identifier_pattern_matching_empty_string_is_invalid() {
    let mut map = full_env();
    map.insert("SHELFPOST_IDENTIFIER_PATTERN", r"(\d*)");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHELFPOST_IDENTIFIER_PATTERN"),
        "expected InvalidEnvVar(SHELFPOST_IDENTIFIER_PATTERN), got: {result:?}"
    );
}
