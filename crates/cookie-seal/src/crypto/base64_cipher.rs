//! Base64 decorator that makes any cipher's output text-safe.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use common::CipherError;

use super::Cipher;

/// Wraps another [`Cipher`] and standard-base64-encodes (padded) its output.
#[derive(Debug, Clone)]
pub struct Base64Cipher<C> {
    inner: C,
}

impl<C: Cipher> Base64Cipher<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// Build the wrapped cipher with `init` and wrap it.
    ///
    /// ```
    /// use cookie_seal::{Base64Cipher, CfbCipher, Cipher};
    ///
    /// let cipher = Base64Cipher::with_init(CfbCipher::new, b"0123456789abcdef").unwrap();
    /// let encoded = cipher.encrypt(b"hello").unwrap();
    /// assert_eq!(cipher.decrypt(&encoded).unwrap(), b"hello");
    /// ```
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `init`.
    pub fn with_init<F>(init: F, secret: &[u8]) -> Result<Self, CipherError>
    where
        F: FnOnce(&[u8]) -> Result<C, CipherError>,
    {
        init(secret).map(Self::new)
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: Cipher> Cipher for Base64Cipher<C> {
    fn encrypt(&self, value: &[u8]) -> Result<Vec<u8>, CipherError> {
        let encrypted = self.inner.encrypt(value)?;
        Ok(STANDARD.encode(encrypted).into_bytes())
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let encrypted = STANDARD.decode(ciphertext)?;
        self.inner.decrypt(&encrypted)
    }
}
