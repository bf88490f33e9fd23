//! Progress reporting
//!
//! Progress is an append-only stream of human-readable stage strings. The
//! sender half is cheap to clone and safe to use from concurrent fetch tasks;
//! messages are queued in order of emission.

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Sender half of a progress stream
#[derive(Debug, Clone, Default)]
pub struct Progress {
    tx: Option<UnboundedSender<String>>,
}

impl Progress {
    /// Creates a progress stream and the receiver that drains it
    pub fn channel() -> (Self, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that discards every message
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Emits one message
    ///
    /// A consumer that went away is not an error; the message is dropped.
    pub fn emit(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("progress: {}", message);
        if let Some(tx) = &self.tx {
            let _ = tx.send(message);
        }
    }
}
