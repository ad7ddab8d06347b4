// ABOUTME: Minimal Mastodon REST and streaming client used by the adapter
// ABOUTME: Defines the MastodonApi seam, the entities it exchanges, and stream events

pub mod client;
pub mod streaming;

pub use client::{ApiError, MastodonClient};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;

// =============================================================================
// Entities
// =============================================================================

/// A Mastodon account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    /// Webfinger handle, `user` for local accounts and `user@domain` for remote ones
    #[serde(default)]
    pub acct: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub bot: bool,
}

/// A status (post).
///
/// `raw` holds the JSON the status was decoded from when it came through
/// [`Status::from_json`]; it is never serialized back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub id: String,
    /// HTML body
    #[serde(default)]
    pub content: String,
    pub account: Account,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    #[serde(skip)]
    pub raw: serde_json::Value,
}

impl Status {
    /// Decode a status and keep its original JSON in `raw`
    pub fn from_json(raw: serde_json::Value) -> serde_json::Result<Self> {
        let mut status: Status = serde_json::from_value(raw.clone())?;
        status.raw = raw;
        Ok(status)
    }
}

/// Body of `POST /api/v1/statuses`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStatus {
    pub status: String,
    pub visibility: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to_id: Option<String>,
}

impl PostStatus {
    pub fn new(status: impl Into<String>, visibility: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            visibility: visibility.into(),
            in_reply_to_id: None,
        }
    }

    pub fn in_reply_to(mut self, id: impl Into<String>) -> Self {
        self.in_reply_to_id = Some(id.into());
        self
    }
}

// =============================================================================
// Streaming
// =============================================================================

/// Event delivered by a streaming subscription
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A new status appeared on the timeline
    Update(Box<Status>),
    /// The subscription reported a problem
    Error(String),
}

/// Boxed stream of subscription events
pub type StatusStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

// =============================================================================
// Client seam
// =============================================================================

/// Operations the adapter needs from a Mastodon server
#[async_trait]
pub trait MastodonApi: Send + Sync {
    /// `GET /api/v1/accounts/verify_credentials`
    async fn verify_credentials(&self) -> Result<Account>;

    /// `POST /api/v1/statuses`
    async fn post_status(&self, post: &PostStatus) -> Result<Status>;

    /// Open a streaming subscription on `path`
    async fn stream(&self, path: &str) -> Result<StatusStream>;
}
