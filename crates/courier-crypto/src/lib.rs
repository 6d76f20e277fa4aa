//! # Courier Crypto
//!
//! Signing primitives behind Courier's concrete cryptographer.
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `signatures` | Ed25519 | Signing accepted document content |
//! | `hashing` | BLAKE3 | Content digests carried in signed envelopes |
//!
//! Ed25519 nonces are deterministic, so signing the same content under the
//! same key always yields the same bytes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{blake3_hash_fields, Blake3Hasher, Digest};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature, SEED_LEN};

