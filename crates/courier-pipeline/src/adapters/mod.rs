//! # Adapters Module
//!
//! Concrete implementations of the outbound ports.

pub mod channel_sender;
pub mod clock;
pub mod ed25519;
pub mod json_recognizer;

pub use channel_sender::ChannelSender;
pub use clock::{FixedClock, SystemClock};
pub use ed25519::{Ed25519Cryptographer, EnvelopeError, SignedEnvelope};
pub use json_recognizer::JsonRecognizer;
