//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API that external callers use
//! - **Outbound (Driven)**: Capabilities injected into the orchestrator

pub mod inbound;
pub mod outbound;
