// ABOUTME: reqwest-backed implementation of the MastodonApi seam
// ABOUTME: Sends bearer-authenticated REST calls and pumps the SSE streaming body into a channel

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use url::Url;

use super::streaming::{parse_frame, SseBuffer};
use super::{Account, MastodonApi, PostStatus, Status, StatusStream, StreamEvent};

/// Capacity of the channel between the streaming body reader and the consumer
const STREAM_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid base url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mastodon API returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Mastodon client bound to one instance and one access token
#[derive(Clone)]
pub struct MastodonClient {
    http: reqwest::Client,
    base_url: Url,
    access_token: String,
}

impl std::fmt::Debug for MastodonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MastodonClient")
            .field("base_url", &self.base_url.as_str())
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl MastodonClient {
    pub fn new(base_url: &str, access_token: impl Into<String>) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|source| ApiError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            access_token: access_token.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|source| ApiError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
                source,
            })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Turn non-2xx responses into `ApiError::Status`
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl MastodonApi for MastodonClient {
    async fn verify_credentials(&self) -> Result<Account> {
        let url = self.endpoint("/api/v1/accounts/verify_credentials")?;
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.bearer())
            .send()
            .await
            .map_err(ApiError::from)?;
        let account = Self::check(response)
            .await?
            .json::<Account>()
            .await
            .context("Failed to decode account")?;
        Ok(account)
    }

    async fn post_status(&self, post: &PostStatus) -> Result<Status> {
        let url = self.endpoint("/api/v1/statuses")?;
        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.bearer())
            .json(post)
            .send()
            .await
            .map_err(ApiError::from)?;
        let raw = Self::check(response)
            .await?
            .json::<serde_json::Value>()
            .await
            .context("Failed to decode posted status")?;
        let status = Status::from_json(raw).context("Failed to decode posted status")?;
        Ok(status)
    }

    async fn stream(&self, path: &str) -> Result<StatusStream> {
        let url = self.endpoint(path)?;
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.bearer())
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(ApiError::from)?;
        let response = Self::check(response).await?;

        tracing::info!(platform = "mastodon", path = %path, "Streaming subscription opened");

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        let path = path.to_string();

        tokio::spawn(async move {
            let mut body = response.bytes_stream();
            let mut buffer = SseBuffer::new();

            loop {
                // heartbeats never reach the channel, so watch for the consumer going away
                let chunk = tokio::select! {
                    _ = tx.closed() => {
                        tracing::debug!(platform = "mastodon", path = %path, "Stream receiver dropped");
                        return;
                    }
                    chunk = body.next() => chunk,
                };
                let chunk = match chunk {
                    Some(Ok(bytes)) => bytes,
                    Some(Err(e)) => {
                        let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                        return;
                    }
                    None => break,
                };

                for frame in buffer.push(&chunk) {
                    let Some(event) = parse_frame(&frame) else {
                        continue;
                    };
                    if tx.send(event).await.is_err() {
                        tracing::warn!(platform = "mastodon", "Stream receiver dropped");
                        return;
                    }
                }
            }

            tracing::debug!(platform = "mastodon", path = %path, "Streaming body ended");
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}
