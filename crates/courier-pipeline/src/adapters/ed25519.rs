//! # Ed25519 Cryptographer
//!
//! Signs document content with an Ed25519 key taken from the certificate.
//!
//! The certificate's key material must be a 32-byte Ed25519 seed. The signed
//! payload is a bincode-encoded [`SignedEnvelope`]; the signature covers the
//! BLAKE3 digest of the certificate subject and the content, so a payload
//! cannot be re-attributed to another subject.

use crate::domain::entities::{Certificate, SignedContent};
use crate::ports::outbound::{Cryptographer, SigningError};
use courier_crypto::{
    blake3_hash_fields, CryptoError, Digest, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature,
};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use thiserror::Error;

/// Errors decoding or verifying a signed envelope.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The bytes are not a bincode-encoded envelope
    #[error("Envelope decode failed: {0}")]
    Decode(String),

    /// Digest or signature check failed
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Wire form of signed content.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEnvelope {
    /// Certificate subject the content was signed for
    pub subject: String,
    /// BLAKE3 digest over subject and payload
    pub digest: Digest,
    /// Ed25519 public key of the signer
    pub public_key: [u8; 32],
    /// Ed25519 signature over `digest`
    #[serde_as(as = "Bytes")]
    pub signature: [u8; 64],
    /// The signed document content
    pub payload: Vec<u8>,
}

impl SignedEnvelope {
    /// Decode an envelope produced by [`Ed25519Cryptographer`].
    pub fn decode(content: &SignedContent) -> Result<Self, EnvelopeError> {
        bincode::deserialize(content.as_bytes()).map_err(|e| EnvelopeError::Decode(e.to_string()))
    }

    /// Check the digest against the payload and the signature against the key.
    pub fn verify(&self) -> Result<(), EnvelopeError> {
        if envelope_digest(&self.subject, &self.payload) != self.digest {
            return Err(CryptoError::DigestMismatch.into());
        }

        let public_key = Ed25519PublicKey::from_bytes(&self.public_key)?;
        public_key.verify(&self.digest, &Ed25519Signature::from_bytes(&self.signature))?;

        Ok(())
    }
}

fn envelope_digest(subject: &str, payload: &[u8]) -> Digest {
    blake3_hash_fields(&[subject.as_bytes(), payload])
}

/// Cryptographer producing Ed25519 [`SignedEnvelope`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Cryptographer;

impl Cryptographer for Ed25519Cryptographer {
    fn sign(
        &self,
        content: &[u8],
        certificate: &Certificate,
    ) -> Result<SignedContent, SigningError> {
        let keypair = Ed25519KeyPair::from_seed_slice(certificate.key_material())
            .map_err(|e| SigningError::InvalidCertificate(e.to_string()))?;

        let digest = envelope_digest(certificate.subject(), content);
        let signature = keypair.sign(&digest);

        let envelope = SignedEnvelope {
            subject: certificate.subject().to_string(),
            digest,
            public_key: *keypair.public_key().as_bytes(),
            signature: signature.to_bytes(),
            payload: content.to_vec(),
        };

        bincode::serialize(&envelope)
            .map(SignedContent::new)
            .map_err(|e| SigningError::Encoding(e.to_string()))
    }
}
