//! # Courier Dispatch Pipeline
//!
//! Drives each file of a batch through recognition, format validation,
//! freshness validation, signing and transmission, and reports the files
//! that did not make it all the way through.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Entities, stage errors and the pure validators
//! - **Ports Layer** (`ports/`): The inbound dispatch API and the outbound
//!   recognizer, cryptographer, sender and clock traits
//! - **Service Layer** (`service.rs`): The orchestrator wiring domain logic to ports
//! - **Adapters Layer** (`adapters/`): JSON recognizer, Ed25519 cryptographer,
//!   channel sender and clocks
//!
//! ## Failure Isolation
//!
//! Every per-file failure is resolved into "this file is skipped". Nothing
//! escapes `send_files` for a single bad file, and one file's outcome never
//! depends on another's.
//!
//! ```text
//! File ─→ Recognizer ─→ format ─→ freshness ─→ Cryptographer ─→ Sender ─→ sent
//!             │            │          │              │             │
//!             └────────────┴──────────┴──────────────┴─────────────┴─→ skipped
//! ```

pub mod adapters;
pub mod cache;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::{
    ChannelSender, Ed25519Cryptographer, EnvelopeError, FixedClock, JsonRecognizer,
    SignedEnvelope, SystemClock,
};
pub use cache::{BackingStore, CacheError, ReadThroughCache};
pub use config::{ConfigError, ExecutionMode, PipelineConfig};
pub use domain::entities::{Certificate, Document, File, PipelineStage, SendResult, SignedContent};
pub use domain::errors::PipelineError;
pub use domain::validation::{is_acceptable_format, is_fresh, Validators, ACCEPTED_FORMATS};
pub use ports::inbound::FileDispatchApi;
pub use ports::outbound::{
    Clock, Cryptographer, RecognitionError, Recognizer, Sender, SigningError, TransmissionError,
};
pub use service::DispatchService;
