// ABOUTME: Translation of robot send/reply payloads into Mastodon status posts
// ABOUTME: Flattens grouped payloads and addresses replies to the envelope's author

use tootbot_core::{flatten_messages, Envelope};

use super::AdapterError;
use crate::mastodon::PostStatus;

/// One post per message, in order, with no reply linkage
pub fn send_posts(messages: &[Vec<String>], visibility: &str) -> Vec<PostStatus> {
    flatten_messages(messages)
        .into_iter()
        .map(|text| PostStatus::new(text, visibility))
        .collect()
}

/// One reply per message, in order, addressed to the envelope's author and post
pub fn reply_posts(
    envelope: &Envelope,
    messages: &[Vec<String>],
    visibility: &str,
) -> Result<Vec<PostStatus>, AdapterError> {
    let screen_name = envelope
        .screen_name
        .as_deref()
        .ok_or(AdapterError::MissingReplyTarget("screen_name"))?;
    let id = envelope
        .id
        .as_deref()
        .ok_or(AdapterError::MissingReplyTarget("id"))?;

    Ok(flatten_messages(messages)
        .into_iter()
        .map(|text| PostStatus::new(format!("@{} {}", screen_name, text), visibility).in_reply_to(id))
        .collect())
}
