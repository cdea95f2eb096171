//! Message assembly, chunking and sequential delivery

use crate::core::{AlertError, AlertResult};

use super::AlertSink;

/// Default maximum characters per chunk (Telegram caps messages at 4096)
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 3900;

/// Split `message` into chunks of at most `max_chars` characters.
///
/// Each cut falls on the last newline at or before the limit, and that
/// newline is dropped. Without a usable newline the text is hard-cut at the
/// limit. Greedy, so the chunk count is minimal for this rule.
pub fn chunk_message(message: &str, max_chars: usize) -> Vec<String> {
    let max = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest = message;

    while !rest.is_empty() {
        // Byte offset of the first character past the limit
        let Some((cut, next)) = rest.char_indices().nth(max) else {
            chunks.push(rest.to_string());
            break;
        };

        let window = &rest[..cut + next.len_utf8()];
        match window.rfind('\n') {
            Some(newline) if newline > 0 => {
                chunks.push(rest[..newline].to_string());
                rest = &rest[newline + 1..];
            }
            _ => {
                chunks.push(rest[..cut].to_string());
                rest = &rest[cut..];
            }
        }
    }

    chunks
}

/// Outcome of a completed dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Chunks the message was split into
    pub total_chunks: usize,
    /// Chunks accepted by the sink
    pub delivered: usize,
    /// Characters in the assembled message
    pub message_chars: usize,
}

impl DispatchReport {
    /// True when there was nothing to send
    pub fn is_empty(&self) -> bool {
        self.total_chunks == 0
    }
}

/// Joins alert lines and delivers them chunk by chunk
pub struct Dispatcher {
    sink: Box<dyn AlertSink>,
    channel: String,
    max_chunk_chars: usize,
}

impl Dispatcher {
    pub fn new(sink: Box<dyn AlertSink>, channel: impl Into<String>) -> Self {
        Self {
            sink,
            channel: channel.into(),
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
        }
    }

    pub fn with_max_chunk_chars(mut self, max_chunk_chars: usize) -> Self {
        self.max_chunk_chars = max_chunk_chars;
        self
    }

    /// Send `lines` as one logical message.
    ///
    /// Empty input sends nothing. Chunks go out in order, one at a time; the
    /// first failure stops delivery without retry and is returned with the
    /// count of chunks already delivered.
    pub fn dispatch(&self, lines: &[String]) -> AlertResult<DispatchReport> {
        let message = lines.join("\n");
        let chunks = chunk_message(&message, self.max_chunk_chars);
        let total = chunks.len();

        let mut report = DispatchReport {
            total_chunks: total,
            delivered: 0,
            message_chars: message.chars().count(),
        };

        if total == 0 {
            tracing::debug!("No alert lines, nothing dispatched");
            return Ok(report);
        }

        for (i, chunk) in chunks.iter().enumerate() {
            if let Err(e) = self.sink.send(&self.channel, chunk) {
                tracing::error!("Alert chunk {}/{} failed: {}", i + 1, total, e);
                return Err(AlertError::Dispatch {
                    delivered: report.delivered,
                    total,
                    reason: e.to_string(),
                });
            }
            report.delivered += 1;
            tracing::debug!("Alert chunk {}/{} sent", i + 1, total);
        }

        tracing::info!("Alert sent ({} chunk(s), {} chars)", total, report.message_chars);
        Ok(report)
    }
}
