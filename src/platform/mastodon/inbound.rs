// ABOUTME: Translation of streamed Mastodon statuses into robot TextMessages
// ABOUTME: Strips HTML, detects mentions of the bot, and drops leading @handle prefixes

use once_cell::sync::Lazy;
use regex::Regex;
use tootbot_core::{ChatUser, TextMessage};

use super::ROOM;
use crate::mastodon::Status;

static LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("line break pattern is valid"));

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

static LEADING_MENTIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(@\S+\s)+").expect("mention pattern is valid"));

/// Remove every markup tag, leaving text and entities as-is
pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, "").into_owned()
}

/// Plain text of a status body: `<br>` becomes a newline, other tags vanish
pub fn html_to_text(html: &str) -> String {
    let with_breaks = LINE_BREAK.replace_all(html, "\n");
    strip_tags(&with_breaks).trim().to_string()
}

/// Drop a run of `@handle ` tokens at the very start of `text`
pub fn strip_leading_mentions(text: &str) -> &str {
    match LEADING_MENTIONS.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

/// Whether `text` mentions the bot (plain substring match on its name)
pub fn is_mention(text: &str, bot_name: &str) -> bool {
    text.contains(bot_name)
}

/// Build the robot message for `status` as seen by a bot named `bot_name`
pub fn status_to_message(status: &Status, bot_name: &str) -> TextMessage {
    let text = html_to_text(&status.content);
    let mentioned = is_mention(&text, bot_name);
    let body = strip_leading_mentions(&text);
    let account = &status.account;

    let mut message = TextMessage::new(
        ChatUser::with_name(account.id.clone(), account.display_name.clone()),
        body,
        status.id.clone(),
        ROOM,
    );
    message.display_name = Some(account.display_name.clone());
    message.screen_name = Some(account.acct.clone());
    message.raw = status.raw.clone();
    message.is_mention = mentioned;
    message
}
