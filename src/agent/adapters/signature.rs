//! Ed25519 manifest signature verification.

use crate::agent::{
    domain::ManifestSignature,
    ports::{SignatureError, SignatureVerifier},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

/// Verifies base64-encoded Ed25519 signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl Ed25519Verifier {
    /// Creates a verifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, payload: &[u8], signature: &ManifestSignature) -> Result<(), SignatureError> {
        let key_bytes = STANDARD
            .decode(signature.public_key.trim())
            .map_err(|err| SignatureError::MalformedPublicKey(err.to_string()))?;
        let key_array: [u8; 32] = key_bytes.as_slice().try_into().map_err(|_| {
            SignatureError::MalformedPublicKey(format!("expected 32 bytes, got {}", key_bytes.len()))
        })?;
        let key = VerifyingKey::from_bytes(&key_array)
            .map_err(|err| SignatureError::MalformedPublicKey(err.to_string()))?;

        let signature_bytes = STANDARD
            .decode(signature.signature.trim())
            .map_err(|err| SignatureError::MalformedSignature(err.to_string()))?;
        let signature_array: [u8; 64] = signature_bytes.as_slice().try_into().map_err(|_| {
            SignatureError::MalformedSignature(format!(
                "expected 64 bytes, got {}",
                signature_bytes.len()
            ))
        })?;

        key.verify(payload, &Signature::from_bytes(&signature_array))
            .map_err(|_| SignatureError::Mismatch)
    }
}
