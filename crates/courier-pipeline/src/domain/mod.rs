//! # Domain Layer
//!
//! Entities, stage errors and the pure validation rules.
//! Nothing in here performs I/O.

pub mod entities;
pub mod errors;
pub mod validation;
