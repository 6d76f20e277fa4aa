//! # Channel Sender
//!
//! Hands signed content to an in-process consumer over an unbounded tokio
//! channel. `send` never blocks, so the sender is usable from both the
//! calling thread and rayon workers.

use crate::domain::entities::SignedContent;
use crate::ports::outbound::{Sender, TransmissionError};
use tokio::sync::mpsc;

/// Sender backed by a tokio unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSender {
    tx: mpsc::UnboundedSender<SignedContent>,
}

impl ChannelSender {
    /// Create a sender and the receiver that consumes what it sends.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SignedContent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Wrap an existing channel half.
    pub fn from_sender(tx: mpsc::UnboundedSender<SignedContent>) -> Self {
        Self { tx }
    }
}

impl Sender for ChannelSender {
    fn try_send(&self, content: SignedContent) -> Result<(), TransmissionError> {
        self.tx
            .send(content)
            .map_err(|_| TransmissionError::ChannelClosed)
    }
}
