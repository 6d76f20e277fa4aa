//! # Outbound Ports (Driven Ports / SPI)
//!
//! Capabilities the orchestrator is constructed with. Each trait has a
//! single operation; any error it returns skips the current file only.

use crate::domain::entities::{Certificate, Document, File, SignedContent};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Error from a recognizer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecognitionError {
    /// The content is not in any recognized layout
    #[error("Content not recognized: {0}")]
    Unrecognized(String),

    /// The content is not valid text
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
}

/// Error from a cryptographer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SigningError {
    /// The certificate cannot be used for signing
    #[error("Invalid certificate: {0}")]
    InvalidCertificate(String),

    /// The signed payload could not be encoded
    #[error("Encoding failed: {0}")]
    Encoding(String),
}

/// Error from a sender.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransmissionError {
    /// The receiving side has gone away
    #[error("Channel closed")]
    ChannelClosed,

    /// The transport rejected the payload
    #[error("Transmission rejected: {reason}")]
    Rejected { reason: String },
}

/// Turns a raw file into a structured document.
pub trait Recognizer: Send + Sync {
    /// Recognize `file`, or explain why it could not be.
    fn try_recognize(&self, file: &File) -> Result<Document, RecognitionError>;
}

/// Signs validated content under a certificate.
///
/// The certificate is shared across concurrent calls and must only be read.
pub trait Cryptographer: Send + Sync {
    /// Sign `content` under `certificate`.
    fn sign(
        &self,
        content: &[u8],
        certificate: &Certificate,
    ) -> Result<SignedContent, SigningError>;
}

/// Transmits signed content.
pub trait Sender: Send + Sync {
    /// Send `content`, consuming it.
    fn try_send(&self, content: SignedContent) -> Result<(), TransmissionError>;
}

/// Source of "now" for freshness checks.
///
/// Abstracted to allow testing with deterministic time.
pub trait Clock: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;
}
