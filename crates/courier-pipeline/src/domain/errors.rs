//! # Pipeline Errors
//!
//! Per-file stage failures. None of these escape a batch; each one turns
//! the owning file into a skipped file.

use super::entities::PipelineStage;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Reasons a single file is skipped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// The recognizer could not produce a document
    #[error("Recognition failed: {0}")]
    RecognitionFailed(String),

    /// The declared format version is not accepted
    #[error("Unsupported format version: {version:?}")]
    UnsupportedFormat { version: String },

    /// The document is older than the freshness window
    #[error("Stale document created at {created_at}")]
    Stale { created_at: DateTime<Utc> },

    /// The cryptographer could not sign the content
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// The sender reported a failed transmission
    #[error("Transmission failed: {0}")]
    TransmissionFailed(String),
}

impl PipelineError {
    /// The stage that produced this error.
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::RecognitionFailed(_) => PipelineStage::Recognition,
            Self::UnsupportedFormat { .. } => PipelineStage::Format,
            Self::Stale { .. } => PipelineStage::Freshness,
            Self::SigningFailed(_) => PipelineStage::Signing,
            Self::TransmissionFailed(_) => PipelineStage::Transmission,
        }
    }
}
