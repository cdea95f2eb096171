//! Alert delivery
//!
//! Message chunking, sequential dispatch and the Telegram sink.

pub mod dispatcher;
pub mod telegram;

pub use dispatcher::*;
pub use telegram::*;

use crate::core::AlertResult;

/// Destination for alert text
pub trait AlertSink {
    /// Deliver one chunk to `channel`
    fn send(&self, channel: &str, text: &str) -> AlertResult<()>;
}
