//! # Domain Entities
//!
//! Core data structures flowing through the dispatch pipeline.

use chrono::{DateTime, Utc};
use std::fmt;
use zeroize::Zeroizing;

// =============================================================================
// Inputs
// =============================================================================

/// A named, opaque file handed to the pipeline.
///
/// Immutable once constructed; the pipeline only ever borrows it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct File {
    name: String,
    content: Vec<u8>,
}

impl File {
    /// Create a file from a name and its raw content.
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// The file's identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw bytes as supplied by the caller.
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

/// Signing credential shared read-only by every file in a batch.
///
/// The key material is opaque to the pipeline; only the cryptographer
/// interprets it. It is wiped from memory on drop and never printed.
#[derive(Clone)]
pub struct Certificate {
    subject: String,
    key_material: Zeroizing<Vec<u8>>,
}

impl Certificate {
    /// Create a certificate for `subject` carrying `key_material`.
    pub fn new(subject: impl Into<String>, key_material: impl Into<Vec<u8>>) -> Self {
        Self {
            subject: subject.into(),
            key_material: Zeroizing::new(key_material.into()),
        }
    }

    /// Who the certificate was issued to.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Raw key material.
    pub fn key_material(&self) -> &[u8] {
        &self.key_material
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject)
            .field("key_material", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Transient pipeline values
// =============================================================================

/// Structured content recognized from a [`File`].
///
/// Lives only for the duration of one file's trip through the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    /// Name of the file this document came from
    pub name: String,
    /// Content to be signed
    pub content: Vec<u8>,
    /// When the document was created
    pub created_at: DateTime<Utc>,
    /// Declared format version, e.g. `"4.0"`
    pub format_version: String,
}

/// Opaque signed payload produced by a cryptographer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedContent(Vec<u8>);

impl SignedContent {
    /// Wrap signed bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Borrow the signed bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Take ownership of the signed bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Pipeline stage at which a file can be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Recognition,
    Format,
    Freshness,
    Signing,
    Transmission,
}

impl PipelineStage {
    /// Stable lowercase label, used for log fields and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recognition => "recognition",
            Self::Format => "format",
            Self::Freshness => "freshness",
            Self::Signing => "signing",
            Self::Transmission => "transmission",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Output
// =============================================================================

/// Outcome of one batch.
///
/// Holds the input files that were not sent, in input order. A file is
/// absent iff it was recognized, validated, signed and sent. Per-file
/// reasons are logged, not returned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SendResult {
    /// Files that failed at least one stage
    pub skipped_files: Vec<File>,
}

impl SendResult {
    /// Whether every file in the batch was sent.
    pub fn all_sent(&self) -> bool {
        self.skipped_files.is_empty()
    }

    /// Names of the skipped files, in input order.
    pub fn skipped_names(&self) -> Vec<&str> {
        self.skipped_files.iter().map(File::name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_certificate_debug_redacts_key() {
        let cert = Certificate::new("ops@example.org", vec![0x42; 32]);
        let rendered = format!("{:?}", cert);

        assert!(rendered.contains("ops@example.org"));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("66"));
    }

    #[test]
    fn test_send_result_names_keep_order() {
        let result = SendResult {
            skipped_files: vec![File::new("b.json", "x"), File::new("a.json", "y")],
        };

        assert!(!result.all_sent());
        assert_eq!(result.skipped_names(), vec!["b.json", "a.json"]);
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(PipelineStage::Recognition.to_string(), "recognition");
        assert_eq!(PipelineStage::Transmission.as_str(), "transmission");
    }
}
