//! # Ed25519 Signatures
//!
//! Signing keys are derived from the 32-byte seed carried in a certificate.
//! Nonces are deterministic (RFC 8032), and `ed25519-dalek` wipes the signing
//! key when it is dropped.

use crate::CryptoError;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use zeroize::Zeroizing;

/// Length of an Ed25519 secret seed in bytes.
pub const SEED_LEN: usize = 32;

/// Verifying half of an Ed25519 key pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ed25519PublicKey(VerifyingKey);

impl Ed25519PublicKey {
    /// Parse a compressed Edwards point.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        VerifyingKey::from_bytes(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidPublicKey)
    }

    /// Compressed point bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Strict verification: rejects small-order keys and malleable signatures.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), CryptoError> {
        self.0
            .verify_strict(message, &signature.0)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// Detached Ed25519 signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ed25519Signature(Signature);

impl Ed25519Signature {
    /// Wrap the 64 wire bytes. Range checks happen during verification.
    pub fn from_bytes(bytes: &[u8; 64]) -> Self {
        Self(Signature::from_bytes(bytes))
    }

    /// Wire bytes `R || s`.
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes()
    }
}

/// Signing key for one certificate.
pub struct Ed25519KeyPair(SigningKey);

impl Ed25519KeyPair {
    /// Derive the key pair from a secret seed.
    pub fn from_seed(seed: [u8; SEED_LEN]) -> Self {
        let seed = Zeroizing::new(seed);
        Self(SigningKey::from_bytes(&seed))
    }

    /// Derive the key pair from untyped key material, which must be exactly
    /// [`SEED_LEN`] bytes.
    pub fn from_seed_slice(seed: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; SEED_LEN] = seed.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: SEED_LEN,
            actual: seed.len(),
        })?;
        Ok(Self::from_seed(bytes))
    }

    /// The matching verifying key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.0.verifying_key())
    }

    /// Sign `message`.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.0.sign(message))
    }
}
