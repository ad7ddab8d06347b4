// ABOUTME: Root library module exposing the Mastodon adapter and its client
// ABOUTME: Provides access to config, the Mastodon API client, and platform adapters

pub mod config;
pub mod logging;
pub mod mastodon;
pub mod platform;

// Re-export the adapter contract from tootbot-core
pub use tootbot_core::{Adapter, AdapterEvent, ChatUser, Envelope, Robot, TextMessage};
