//! Error types for the cipher layer.
//!
//! Validation of untrusted cookies never produces these: a forged, expired or
//! malformed cookie is routine input and is reported as a rejection, not an
//! error. These errors cover misconfiguration and corruption only.

use thiserror::Error;

/// Errors produced by cipher implementations and their constructors.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The AES key is not 16, 24 or 32 bytes long.
    #[error("invalid AES key length: got {0} bytes, expected 16, 24 or 32")]
    InvalidKeyLength(usize),

    /// The randomness source failed while generating an IV or nonce.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// The ciphertext could not be turned back into plaintext.
    #[error("decryption failed: {0}")]
    Decryption(#[from] DecryptionError),

    /// An in-place transform produced bytes that are not valid UTF-8.
    #[error("transformed value is not valid UTF-8 text")]
    NotText,
}

/// Reasons a ciphertext was refused.
#[derive(Debug, Error)]
pub enum DecryptionError {
    /// The input is shorter than the IV or nonce that must prefix it.
    #[error("encrypted value should be at least {expected} bytes, but is only {actual} bytes")]
    TooShort { expected: usize, actual: usize },

    /// The base64 framing around the ciphertext is invalid.
    #[error("failed to base64 decode value: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The AEAD tag did not verify (wrong key or tampered data).
    #[error("authentication failed")]
    Authentication,
}

impl From<base64::DecodeError> for CipherError {
    fn from(err: base64::DecodeError) -> Self {
        CipherError::Decryption(DecryptionError::Base64(err))
    }
}
