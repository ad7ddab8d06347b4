// ABOUTME: Tests for Mastodon configuration loading from the process environment
// ABOUTME: Verifies defaults, required access token, and timeline validation

use serial_test::serial;
use tootbot::config::{
    ConfigError, MastodonConfig, Timeline, ACCESS_TOKEN_VAR, BASE_URL_VAR, TIMELINE_VAR,
    VISIBILITY_VAR,
};

/// Helper to clear all config-related env vars
fn clear_config_env_vars() {
    std::env::remove_var(ACCESS_TOKEN_VAR);
    std::env::remove_var(BASE_URL_VAR);
    std::env::remove_var(TIMELINE_VAR);
    std::env::remove_var(VISIBILITY_VAR);
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_config_env_vars();
    std::env::set_var(ACCESS_TOKEN_VAR, "token-123");

    let config = MastodonConfig::from_env().unwrap();
    assert_eq!(config.access_token, "token-123");
    assert_eq!(config.base_url, "https://mastodon.social");
    assert_eq!(config.timeline, Timeline::Local);
    assert_eq!(config.visibility, "unlisted");

    clear_config_env_vars();
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_config_env_vars();
    std::env::set_var(ACCESS_TOKEN_VAR, "token-123");
    std::env::set_var(BASE_URL_VAR, "https://fosstodon.org");
    std::env::set_var(TIMELINE_VAR, "public");
    std::env::set_var(VISIBILITY_VAR, "private");

    let config = MastodonConfig::from_env().unwrap();
    assert_eq!(config.base_url, "https://fosstodon.org");
    assert_eq!(config.timeline, Timeline::Public);
    assert_eq!(config.visibility, "private");

    clear_config_env_vars();
}

#[test]
#[serial]
fn test_from_env_missing_token_fails() {
    clear_config_env_vars();
    std::env::set_var(TIMELINE_VAR, "home");

    let err = MastodonConfig::from_env().unwrap_err();
    assert_eq!(err, ConfigError::MissingAccessToken);

    clear_config_env_vars();
}

#[test]
#[serial]
fn test_from_env_invalid_timeline_fails() {
    clear_config_env_vars();
    std::env::set_var(ACCESS_TOKEN_VAR, "token-123");
    std::env::set_var(TIMELINE_VAR, "bubble");

    let err = MastodonConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("bubble"));

    clear_config_env_vars();
}
