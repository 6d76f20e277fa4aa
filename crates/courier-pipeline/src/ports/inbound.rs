//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::{Certificate, File, SendResult};

/// Primary dispatch API.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait FileDispatchApi: Send + Sync {
    /// Recognize, validate, sign and send every file in `files`.
    ///
    /// Returns the files that failed any stage, in input order. Per-file
    /// failures never abort the batch and are never returned as errors.
    fn send_files(&self, files: &[File], certificate: &Certificate) -> SendResult;
}
