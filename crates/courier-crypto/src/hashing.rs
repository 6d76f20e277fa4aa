//! # BLAKE3 Hashing
//!
//! Content digests for signed envelopes.

use blake3::Hasher;

/// BLAKE3 hash output (256-bit).
pub type Digest = [u8; 32];

/// Stateful BLAKE3 hasher.
pub struct Blake3Hasher {
    inner: Hasher,
}

impl Blake3Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Hasher::new(),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(&self) -> Digest {
        *self.inner.finalize().as_bytes()
    }
}

impl Default for Blake3Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a sequence of length-prefixed fields.
///
/// Each field is prefixed with its little-endian `u64` length so that
/// `["ab", "c"]` and `["a", "bc"]` produce different digests.
pub fn blake3_hash_fields(fields: &[&[u8]]) -> Digest {
    let mut hasher = Blake3Hasher::new();
    for field in fields {
        hasher.update(&(field.len() as u64).to_le_bytes());
        hasher.update(field);
    }
    hasher.finalize()
}
