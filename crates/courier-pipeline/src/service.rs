//! # Dispatch Service
//!
//! Application service implementing [`FileDispatchApi`].
//!
//! ## Per-file state machine
//!
//! ```text
//! Start → Recognized → FormatOK → Fresh → Signed → Sent
//!   └──────────┴──────────┴─────────┴───────┴──────→ Skipped
//! ```
//!
//! The first failing stage is terminal; later stages never run for that
//! file. Every stage failure is resolved here into a skipped file, so
//! `send_files` itself cannot fail.
//!
//! ## Scheduling
//!
//! Files share nothing but the read-only certificate, so in
//! [`ExecutionMode::Parallel`] they are spread over a dedicated rayon pool.
//! Outcomes are collected positionally, which keeps the skipped list in
//! input order whatever order the workers finish in.

use crate::adapters::clock::SystemClock;
use crate::config::{ConfigError, ExecutionMode, PipelineConfig};
use crate::domain::entities::{Certificate, File, SendResult};
use crate::domain::errors::PipelineError;
use crate::domain::validation::Validators;
use crate::ports::inbound::FileDispatchApi;
use crate::ports::outbound::{Clock, Cryptographer, Recognizer, Sender};
use chrono::{DateTime, Utc};
use courier_telemetry::{
    HistogramTimer, BATCHES_PROCESSED, BATCH_DURATION, FILES_SENT, FILES_SKIPPED,
};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, warn};

/// Orchestrator driving files through the injected ports.
///
/// Holds no per-batch state; a single service can run any number of
/// batches, including concurrently.
pub struct DispatchService<R, C, S, K = SystemClock>
where
    R: Recognizer,
    C: Cryptographer,
    S: Sender,
    K: Clock,
{
    recognizer: R,
    cryptographer: C,
    sender: S,
    clock: K,
    validators: Validators,
    pool: Option<ThreadPool>,
}

impl<R, C, S> DispatchService<R, C, S, SystemClock>
where
    R: Recognizer,
    C: Cryptographer,
    S: Sender,
{
    /// Create a sequential service using wall-clock time.
    pub fn new(recognizer: R, cryptographer: C, sender: S) -> Self {
        Self::with_clock(recognizer, cryptographer, sender, SystemClock)
    }
}

impl<R, C, S, K> DispatchService<R, C, S, K>
where
    R: Recognizer,
    C: Cryptographer,
    S: Sender,
    K: Clock,
{
    /// Create a sequential service with an explicit clock.
    pub fn with_clock(recognizer: R, cryptographer: C, sender: S, clock: K) -> Self {
        Self {
            recognizer,
            cryptographer,
            sender,
            clock,
            validators: Validators::default(),
            pool: None,
        }
    }

    /// Apply `config`, building a worker pool when it asks for parallel execution.
    pub fn with_config(mut self, config: &PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        self.validators = config.validators();
        self.pool = match config.execution {
            ExecutionMode::Sequential => None,
            ExecutionMode::Parallel => Some(
                ThreadPoolBuilder::new()
                    .num_threads(config.max_workers)
                    .thread_name(|i| format!("courier-worker-{i}"))
                    .build()
                    .map_err(|e| ConfigError::WorkerPool(e.to_string()))?,
            ),
        };

        Ok(self)
    }

    /// Whether batches run on a worker pool.
    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Run one file through every stage, stopping at the first failure.
    ///
    /// This is what `send_files` does for each file; it is public so callers
    /// holding a skipped file can find out why it was skipped.
    pub fn process_file(
        &self,
        file: &File,
        certificate: &Certificate,
        now: DateTime<Utc>,
    ) -> Result<(), PipelineError> {
        let document = self
            .recognizer
            .try_recognize(file)
            .map_err(|e| PipelineError::RecognitionFailed(e.to_string()))?;
        debug!(file = %file.name(), version = %document.format_version, "Recognized");

        self.validators.check_format(&document)?;
        self.validators.check_freshness(&document, now)?;

        let signed = self
            .cryptographer
            .sign(&document.content, certificate)
            .map_err(|e| PipelineError::SigningFailed(e.to_string()))?;
        debug!(file = %file.name(), bytes = signed.len(), "Signed");

        self.sender
            .try_send(signed)
            .map_err(|e| PipelineError::TransmissionFailed(e.to_string()))?;

        Ok(())
    }

    fn run_all(
        &self,
        files: &[File],
        certificate: &Certificate,
        now: DateTime<Utc>,
    ) -> Vec<Result<(), PipelineError>> {
        match &self.pool {
            Some(pool) => pool.install(|| {
                files
                    .par_iter()
                    .map(|file| self.process_file(file, certificate, now))
                    .collect()
            }),
            None => files
                .iter()
                .map(|file| self.process_file(file, certificate, now))
                .collect(),
        }
    }
}

impl<R, C, S, K> FileDispatchApi for DispatchService<R, C, S, K>
where
    R: Recognizer,
    C: Cryptographer,
    S: Sender,
    K: Clock,
{
    fn send_files(&self, files: &[File], certificate: &Certificate) -> SendResult {
        let _timer = HistogramTimer::new(&BATCH_DURATION);

        // One instant for the whole batch keeps freshness consistent across files
        let now = self.clock.now();
        let outcomes = self.run_all(files, certificate, now);

        let mut skipped_files = Vec::new();
        for (file, outcome) in files.iter().zip(outcomes) {
            match outcome {
                Ok(()) => {
                    FILES_SENT.inc();
                    debug!(file = %file.name(), "Sent");
                }
                Err(error) => {
                    let stage = error.stage();
                    FILES_SKIPPED.with_label_values(&[stage.as_str()]).inc();
                    warn!(file = %file.name(), stage = %stage, reason = %error, "Skipping file");
                    skipped_files.push(file.clone());
                }
            }
        }

        BATCHES_PROCESSED.inc();
        info!(
            total = files.len(),
            sent = files.len() - skipped_files.len(),
            skipped = skipped_files.len(),
            parallel = self.is_parallel(),
            "Batch processed"
        );

        SendResult { skipped_files }
    }
}

// =============================================================================
// TESTS
// =============================================================================
