// ABOUTME: Server-sent events decoding for the Mastodon streaming API
// ABOUTME: Splits the byte stream into frames and turns `update` frames into stream events

use super::{Status, StreamEvent};

/// Largest incomplete frame kept while waiting for its blank-line terminator
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Accumulates body bytes and yields complete SSE frames
#[derive(Debug)]
pub struct SseBuffer {
    buffer: Vec<u8>,
    /// Offset up to which `buffer` is known to hold no separator
    scanned: usize,
    limit: usize,
    /// Set after an oversized frame was dropped, until its terminator arrives
    discarding: bool,
}

impl Default for SseBuffer {
    fn default() -> Self {
        Self::with_limit(MAX_FRAME_BYTES)
    }
}

impl SseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            limit,
            discarding: false,
        }
    }

    /// Append a chunk and drain every frame it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        // CR is dropped so CRLF and LF framing look the same
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut frames = Vec::new();
        while let Some(pos) = self.find_frame_end() {
            let frame: Vec<u8> = self.buffer.drain(..pos + 2).collect();
            self.scanned = 0;
            if self.discarding {
                self.discarding = false;
                continue;
            }
            frames.push(String::from_utf8_lossy(&frame[..pos]).into_owned());
        }
        // a separator may straddle the next chunk boundary
        self.scanned = self.buffer.len().saturating_sub(1);

        if self.buffer.len() > self.limit {
            tracing::warn!(
                platform = "mastodon",
                limit = self.limit,
                "Discarding oversized stream frame"
            );
            self.buffer.clear();
            self.scanned = 0;
            self.discarding = true;
        }
        frames
    }

    fn find_frame_end(&self) -> Option<usize> {
        self.buffer[self.scanned..]
            .windows(2)
            .position(|w| w == b"\n\n")
            .map(|pos| pos + self.scanned)
    }
}

/// Decode one SSE frame.
///
/// Returns `None` for heartbeats and for events other than `update`.
pub fn parse_frame(frame: &str) -> Option<StreamEvent> {
    let mut event = None;
    let mut data: Vec<&str> = Vec::new();

    for line in frame.lines() {
        if line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event = Some(value),
            "data" => data.push(value),
            _ => {}
        }
    }

    if event != Some("update") {
        if let Some(name) = event {
            tracing::trace!(platform = "mastodon", event = %name, "Ignoring stream event");
        }
        return None;
    }

    let payload = data.join("\n");
    match serde_json::from_str(&payload).and_then(Status::from_json) {
        Ok(status) => Some(StreamEvent::Update(Box::new(status))),
        Err(e) => Some(StreamEvent::Error(format!(
            "failed to decode update payload: {}",
            e
        ))),
    }
}
