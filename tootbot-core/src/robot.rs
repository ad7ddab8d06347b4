// ABOUTME: Robot handle shared between the host and its adapter
// ABOUTME: Holds the bot name, the inbound message channel, and the lifecycle broadcast

use std::sync::RwLock;
use tokio::sync::{broadcast, mpsc};

use crate::traits::{AdapterEvent, TextMessage};

/// Capacity of the inbound message channel
pub const INBOX_CAPACITY: usize = 256;

/// Capacity of the lifecycle broadcast channel
const EVENT_CAPACITY: usize = 16;

/// The host side of an adapter.
///
/// Adapters push translated messages through [`Robot::receive`] and announce
/// lifecycle changes through [`Robot::emit`]. The bot name is writable so an
/// adapter can replace the configured name with the identity it resolves at
/// startup.
pub struct Robot {
    name: RwLock<String>,
    inbox: mpsc::Sender<TextMessage>,
    events: broadcast::Sender<AdapterEvent>,
}

impl Robot {
    /// Create a robot and the receiving half of its inbox
    pub fn new(name: impl Into<String>) -> (Self, mpsc::Receiver<TextMessage>) {
        let (inbox, rx) = mpsc::channel(INBOX_CAPACITY);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let robot = Self {
            name: RwLock::new(name.into()),
            inbox,
            events,
        };
        (robot, rx)
    }

    /// Current bot name
    pub fn name(&self) -> String {
        self.name
            .read()
            .map(|name| name.clone())
            .unwrap_or_default()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        if let Ok(mut current) = self.name.write() {
            *current = name.into();
        }
    }

    /// Hand an inbound message to the host
    pub async fn receive(&self, message: TextMessage) {
        if self.inbox.send(message).await.is_err() {
            tracing::warn!("Robot inbox receiver dropped, discarding message");
        }
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<AdapterEvent> {
        self.events.subscribe()
    }

    /// Broadcast a lifecycle event to every subscriber
    pub fn emit(&self, event: AdapterEvent) {
        tracing::debug!(event = ?event, "Adapter lifecycle event");
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for Robot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Robot").field("name", &self.name()).finish()
    }
}
