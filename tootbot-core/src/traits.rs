// ABOUTME: Core adapter contract shared by the robot and every chat network adapter
// ABOUTME: Defines the Adapter trait, the generic TextMessage, Envelope, and lifecycle events

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// =============================================================================
// User Identity
// =============================================================================

/// Identity of a chat user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatUser {
    /// Unique identifier on the network (e.g., an account id or handle)
    pub id: String,
    /// Display name
    pub display_name: Option<String>,
}

impl ChatUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
        }
    }

    pub fn with_name(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: Some(name.into()),
        }
    }
}

// =============================================================================
// Generic Message
// =============================================================================

/// Text message handed from an adapter to the robot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMessage {
    /// The user who wrote the message
    pub user: ChatUser,
    /// Plain-text body
    pub text: String,
    /// Network-specific message id
    pub id: String,
    /// Room the message belongs to
    pub room: String,
    /// Author's human-readable name
    pub display_name: Option<String>,
    /// Author's handle, used when addressing a reply
    pub screen_name: Option<String>,
    /// Original payload as received from the network
    pub raw: serde_json::Value,
    /// Whether the message mentions the robot
    pub is_mention: bool,
}

impl TextMessage {
    pub fn new(
        user: ChatUser,
        text: impl Into<String>,
        id: impl Into<String>,
        room: impl Into<String>,
    ) -> Self {
        Self {
            user,
            text: text.into(),
            id: id.into(),
            room: room.into(),
            display_name: None,
            screen_name: None,
            raw: serde_json::Value::Null,
            is_mention: false,
        }
    }
}

// =============================================================================
// Envelope
// =============================================================================

/// Destination of an outgoing message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    /// Room to post into
    pub room: String,
    /// Id of the message being answered, if any
    pub id: Option<String>,
    /// Handle of the author being answered, if any
    pub screen_name: Option<String>,
}

impl Envelope {
    pub fn room(room: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            ..Self::default()
        }
    }

    /// Envelope that answers `message`, carrying its id and author handle
    pub fn reply_to(message: &TextMessage) -> Self {
        Self {
            room: message.room.clone(),
            id: Some(message.id.clone()),
            screen_name: message.screen_name.clone(),
        }
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Lifecycle signals an adapter broadcasts to whatever embeds it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterEvent {
    /// Adapter finished startup and is receiving events
    Connected,
}

/// Contract every chat network adapter implements.
///
/// `run` performs startup and then processes inbound events until the
/// network connection ends. `send` and `reply` may be called concurrently
/// with `run` from other tasks.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Start the adapter and process inbound events
    async fn run(&self) -> Result<()>;

    /// Post each message to the envelope's destination, in order
    async fn send(&self, envelope: &Envelope, messages: &[Vec<String>]) -> Result<()>;

    /// Post each message as an answer to the envelope's message, in order
    async fn reply(&self, envelope: &Envelope, messages: &[Vec<String>]) -> Result<()>;

    /// Adapter identifier (e.g., "mastodon")
    fn adapter_id(&self) -> &'static str;
}

/// Flatten grouped payloads into one ordered list, keeping duplicates
pub fn flatten_messages(messages: &[Vec<String>]) -> Vec<&str> {
    messages
        .iter()
        .flat_map(|group| group.iter().map(String::as_str))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
