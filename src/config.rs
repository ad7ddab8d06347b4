// ABOUTME: Mastodon adapter configuration resolved from environment variables
// ABOUTME: Validates the access token and timeline kind, applies defaults for the rest

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const ACCESS_TOKEN_VAR: &str = "TOOTBOT_MASTODON_ACCESS_TOKEN";
pub const BASE_URL_VAR: &str = "TOOTBOT_MASTODON_BASE_URL";
pub const TIMELINE_VAR: &str = "TOOTBOT_MASTODON_TIMELINE";
pub const VISIBILITY_VAR: &str = "TOOTBOT_MASTODON_VISIBILITY";

pub const DEFAULT_BASE_URL: &str = "https://mastodon.social";
pub const DEFAULT_VISIBILITY: &str = "unlisted";

/// Visibility values Mastodon documents for a status
pub const KNOWN_VISIBILITIES: [&str; 4] = ["direct", "private", "unlisted", "public"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("'{}' is required", ACCESS_TOKEN_VAR)]
    MissingAccessToken,

    #[error("invalid streaming type: {0}")]
    InvalidTimeline(String),
}

/// Timeline the adapter streams from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Timeline {
    /// Posts by followed accounts
    Home,
    /// Posts from the same server
    #[default]
    Local,
    /// Posts from the wider federated network
    Public,
}

impl Timeline {
    /// Streaming endpoint path for this timeline
    pub fn streaming_path(&self) -> &'static str {
        match self {
            Timeline::Home => "/api/v1/streaming/user",
            Timeline::Local => "/api/v1/streaming/public/local",
            Timeline::Public => "/api/v1/streaming/public",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeline::Home => "home",
            Timeline::Local => "local",
            Timeline::Public => "public",
        }
    }
}

impl FromStr for Timeline {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Timeline::Home),
            "local" => Ok(Timeline::Local),
            "public" => Ok(Timeline::Public),
            other => Err(ConfigError::InvalidTimeline(other.to_string())),
        }
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct MastodonConfig {
    pub base_url: String,
    pub access_token: String,
    pub timeline: Timeline,
    /// Passed verbatim as the visibility of every outgoing status
    pub visibility: String,
}

// Custom Debug impl to redact access_token
impl fmt::Debug for MastodonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MastodonConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &"[REDACTED]")
            .field("timeline", &self.timeline)
            .field("visibility", &self.visibility)
            .finish()
    }
}

impl MastodonConfig {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: access_token.into(),
            timeline: Timeline::default(),
            visibility: DEFAULT_VISIBILITY.to_string(),
        }
    }

    /// Resolve configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let access_token = get(ACCESS_TOKEN_VAR).ok_or(ConfigError::MissingAccessToken)?;
        let base_url = get(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeline = match get(TIMELINE_VAR) {
            Some(value) => value.parse()?,
            None => Timeline::default(),
        };
        let visibility = get(VISIBILITY_VAR).unwrap_or_else(|| DEFAULT_VISIBILITY.to_string());

        Ok(Self {
            base_url,
            access_token,
            timeline,
            visibility,
        })
    }

    /// Whether the visibility is one Mastodon documents
    pub fn has_known_visibility(&self) -> bool {
        KNOWN_VISIBILITIES.contains(&self.visibility.as_str())
    }
}
