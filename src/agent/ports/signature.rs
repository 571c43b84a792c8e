//! Manifest signature verification port.

use crate::agent::domain::ManifestSignature;
use thiserror::Error;

/// Checks a detached signature over canonical manifest bytes.
pub trait SignatureVerifier: Send + Sync {
    /// Verifies `signature` over `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError`] when the key or signature is malformed or
    /// does not match the payload.
    fn verify(&self, payload: &[u8], signature: &ManifestSignature) -> Result<(), SignatureError>;
}

/// Errors returned by signature verifiers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The public key is not valid base64 or has the wrong length.
    #[error("malformed public key: {0}")]
    MalformedPublicKey(String),

    /// The signature is not valid base64 or has the wrong length.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// The signature does not match the payload.
    #[error("signature does not match manifest")]
    Mismatch,
}
