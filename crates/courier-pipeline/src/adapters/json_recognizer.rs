//! # JSON Recognizer
//!
//! Recognizes files holding a JSON document envelope:
//!
//! ```json
//! {
//!   "format_version": "4.0",
//!   "created_at": "2024-03-15T12:00:00Z",
//!   "content": "..."
//! }
//! ```
//!
//! Unknown fields are ignored. The version string is taken as-is; deciding
//! whether it is acceptable is the format validator's job.

use crate::domain::entities::{Document, File};
use crate::ports::outbound::{RecognitionError, Recognizer};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct DocumentEnvelope {
    format_version: String,
    created_at: DateTime<Utc>,
    content: String,
}

/// Recognizer for JSON document envelopes.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRecognizer;

impl Recognizer for JsonRecognizer {
    fn try_recognize(&self, file: &File) -> Result<Document, RecognitionError> {
        let text = std::str::from_utf8(file.content())
            .map_err(|e| RecognitionError::InvalidEncoding(e.to_string()))?;

        let envelope: DocumentEnvelope = serde_json::from_str(text)
            .map_err(|e| RecognitionError::Unrecognized(e.to_string()))?;

        Ok(Document {
            name: file.name().to_string(),
            content: envelope.content.into_bytes(),
            created_at: envelope.created_at,
            format_version: envelope.format_version,
        })
    }
}
