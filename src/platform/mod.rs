// ABOUTME: Chat network adapters for tootbot
// ABOUTME: Re-exports the Mastodon adapter implementation

pub mod mastodon;

pub use mastodon::{AdapterError, AdapterState, MastodonAdapter};
