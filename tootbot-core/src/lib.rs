// ABOUTME: Platform-agnostic chatbot adapter contract
// ABOUTME: Provides the Adapter trait, Robot handle, and generic message types

pub mod robot;
pub mod traits;

pub use robot::Robot;

// Re-export core traits for convenient access
pub use traits::{flatten_messages, Adapter, AdapterEvent, ChatUser, Envelope, TextMessage};
