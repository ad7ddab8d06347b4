// ABOUTME: Mastodon adapter connecting the robot to one Mastodon account
// ABOUTME: Verifies credentials, streams a timeline into the robot, and posts send/reply output

pub mod inbound;
pub mod outbound;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, OnceLock};
use thiserror::Error;
use tokio_stream::StreamExt;
use tootbot_core::{Adapter, AdapterEvent, Envelope, Robot};

use crate::config::MastodonConfig;
use crate::mastodon::{Account, MastodonApi, MastodonClient, Status, StreamEvent};

/// Room every Mastodon message is filed under
pub const ROOM: &str = "mastodon";

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("cannot get own information")]
    OwnInformation,

    #[error("adapter already started")]
    AlreadyStarted,

    #[error("adapter has not finished startup")]
    NotStarted,

    #[error("reply envelope is missing its target {0}")]
    MissingReplyTarget(&'static str),
}

/// Lifecycle of a [`MastodonAdapter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Uninitialized,
    Verifying,
    Streaming,
    Failed,
}

// =============================================================================
// MastodonAdapter - Implements Adapter
// =============================================================================

/// Adapter bridging a [`Robot`] and a Mastodon account
pub struct MastodonAdapter<A: MastodonApi = MastodonClient> {
    robot: Arc<Robot>,
    config: MastodonConfig,
    api: A,
    /// Own account, resolved at startup
    me: OnceLock<Account>,
    state: Mutex<AdapterState>,
}

impl MastodonAdapter<MastodonClient> {
    /// Create an adapter talking to the instance named in `config`
    pub fn connect(robot: Arc<Robot>, config: MastodonConfig) -> Result<Self> {
        let api = MastodonClient::new(&config.base_url, config.access_token.clone())?;
        Ok(Self::new(robot, config, api))
    }
}

impl<A: MastodonApi> MastodonAdapter<A> {
    pub fn new(robot: Arc<Robot>, config: MastodonConfig, api: A) -> Self {
        Self {
            robot,
            config,
            api,
            me: OnceLock::new(),
            state: Mutex::new(AdapterState::Uninitialized),
        }
    }

    pub fn state(&self) -> AdapterState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(AdapterState::Failed)
    }

    fn set_state(&self, state: AdapterState) {
        if let Ok(mut current) = self.state.lock() {
            *current = state;
        }
    }

    /// Own account, once startup has verified it
    pub fn me(&self) -> Option<&Account> {
        self.me.get()
    }

    pub fn config(&self) -> &MastodonConfig {
        &self.config
    }

    /// Move from `Uninitialized` to `Verifying`, refusing a second start
    fn begin_startup(&self) -> Result<(), AdapterError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| AdapterError::AlreadyStarted)?;
        if *state != AdapterState::Uninitialized {
            return Err(AdapterError::AlreadyStarted);
        }
        *state = AdapterState::Verifying;
        Ok(())
    }

    fn ensure_started(&self) -> Result<(), AdapterError> {
        match self.state() {
            AdapterState::Streaming => Ok(()),
            _ => Err(AdapterError::NotStarted),
        }
    }

    /// Resolve own account; any failure collapses into `OwnInformation`
    async fn verify(&self) -> Result<Account, AdapterError> {
        match self.api.verify_credentials().await {
            Ok(account) if !account.acct.is_empty() => Ok(account),
            Ok(_) => {
                tracing::debug!(platform = "mastodon", "verify_credentials returned no acct");
                Err(AdapterError::OwnInformation)
            }
            Err(e) => {
                tracing::debug!(platform = "mastodon", error = %e, "verify_credentials failed");
                Err(AdapterError::OwnInformation)
            }
        }
    }

    /// Translate one status and hand it to the robot
    async fn chat(&self, status: &Status) {
        let message = inbound::status_to_message(status, &self.robot.name());
        tracing::info!(
            platform = "mastodon",
            acct = %status.account.acct,
            text = %message.text,
            is_mention = message.is_mention,
            "onChat"
        );
        self.robot.receive(message).await;
    }
}

#[async_trait]
impl<A: MastodonApi> Adapter for MastodonAdapter<A> {
    async fn run(&self) -> Result<()> {
        self.begin_startup()?;

        if !self.config.has_known_visibility() {
            tracing::warn!(
                platform = "mastodon",
                visibility = %self.config.visibility,
                "Unrecognized post visibility, passing it through unchanged"
            );
        }

        let me = match self.verify().await {
            Ok(me) => me,
            Err(e) => {
                self.set_state(AdapterState::Failed);
                return Err(e.into());
            }
        };
        self.robot.set_name(format!("@{}", me.acct));
        tracing::info!(platform = "mastodon", robot_name = %self.robot.name(), "Robot name set");
        let _ = self.me.set(me);

        let path = self.config.timeline.streaming_path();
        let mut stream = match self.api.stream(path).await {
            Ok(stream) => stream,
            Err(e) => {
                self.set_state(AdapterState::Failed);
                return Err(e.context(format!("Failed to open streaming subscription {}", path)));
            }
        };

        self.set_state(AdapterState::Streaming);
        tracing::info!(
            platform = "mastodon",
            timeline = %self.config.timeline,
            base_url = %self.config.base_url,
            "Connected"
        );
        self.robot.emit(AdapterEvent::Connected);

        while let Some(event) = stream.next().await {
            match event {
                StreamEvent::Update(status) => self.chat(&status).await,
                StreamEvent::Error(err) => {
                    tracing::error!(platform = "mastodon", error = %err, "Stream error");
                }
            }
        }

        tracing::warn!(platform = "mastodon", "Streaming subscription ended");
        Ok(())
    }

    async fn send(&self, _envelope: &Envelope, messages: &[Vec<String>]) -> Result<()> {
        self.ensure_started()?;

        for post in outbound::send_posts(messages, &self.config.visibility) {
            tracing::info!(platform = "mastodon", status = %post.status, "onSend");
            self.api.post_status(&post).await?;
        }
        Ok(())
    }

    async fn reply(&self, envelope: &Envelope, messages: &[Vec<String>]) -> Result<()> {
        self.ensure_started()?;

        for post in outbound::reply_posts(envelope, messages, &self.config.visibility)? {
            tracing::info!(platform = "mastodon", status = %post.status, "onReply");
            self.api.post_status(&post).await?;
        }
        Ok(())
    }

    fn adapter_id(&self) -> &'static str {
        "mastodon"
    }
}

// =============================================================================
// Tests
// =============================================================================
