//! The value-cipher contract and its implementations.
//!
//! Every cipher owns a copy of its key material, is immutable after
//! construction and is safe to share between threads.
//!
//! | variant          | output                          | authenticated |
//! |------------------|---------------------------------|---------------|
//! | [`NoopCipher`]   | input unchanged                 | no            |
//! | [`CfbCipher`]    | `iv(16) ‖ ciphertext`           | no            |
//! | [`GcmCipher`]    | `nonce(12) ‖ ciphertext ‖ tag`  | yes           |
//! | [`Base64Cipher`] | standard base64 of the inner    | as inner      |

pub mod base64_cipher;
pub mod cfb;
pub mod gcm;
pub mod noop;

use std::sync::Arc;

use rand::{rngs::OsRng, RngCore};
use serde::Deserialize;

use common::CipherError;

pub use base64_cipher::Base64Cipher;
pub use cfb::CfbCipher;
pub use gcm::GcmCipher;
pub use noop::NoopCipher;

/// Encrypts and decrypts opaque byte payloads.
#[cfg_attr(test, mockall::automock)]
pub trait Cipher: Send + Sync {
    /// Encrypt `value`.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Encryption`] if the randomness source fails.
    fn encrypt(&self, value: &[u8]) -> Result<Vec<u8>, CipherError>;

    /// Decrypt `ciphertext`.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Decryption`] for truncated input, bad base64
    /// framing or a failed authentication check.
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError>;
}

impl<C: Cipher + ?Sized> Cipher for Box<C> {
    fn encrypt(&self, value: &[u8]) -> Result<Vec<u8>, CipherError> {
        (**self).encrypt(value)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        (**self).decrypt(ciphertext)
    }
}

impl<C: Cipher + ?Sized> Cipher for Arc<C> {
    fn encrypt(&self, value: &[u8]) -> Result<Vec<u8>, CipherError> {
        (**self).encrypt(value)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        (**self).decrypt(ciphertext)
    }
}

/// In-place helpers available on every [`Cipher`].
pub trait CipherExt: Cipher {
    /// Encrypt the string's content and store the result back into it.
    ///
    /// Absent and empty strings are left untouched.
    ///
    /// # Errors
    ///
    /// Propagates [`Cipher::encrypt`] errors, and returns
    /// [`CipherError::NotText`] (leaving `value` unchanged) when the
    /// ciphertext is not valid UTF-8. Wrap raw ciphers in [`Base64Cipher`]
    /// to encrypt text fields.
    fn encrypt_into(&self, value: Option<&mut String>) -> Result<(), CipherError> {
        transform_in_place(value, |bytes| self.encrypt(bytes))
    }

    /// Decrypt the string's content and store the result back into it.
    ///
    /// Absent and empty strings are left untouched.
    ///
    /// # Errors
    ///
    /// Propagates [`Cipher::decrypt`] errors, and returns
    /// [`CipherError::NotText`] when the plaintext is not valid UTF-8.
    fn decrypt_into(&self, value: Option<&mut String>) -> Result<(), CipherError> {
        transform_in_place(value, |bytes| self.decrypt(bytes))
    }
}

impl<C: Cipher + ?Sized> CipherExt for C {}

fn transform_in_place<F>(value: Option<&mut String>, transform: F) -> Result<(), CipherError>
where
    F: FnOnce(&[u8]) -> Result<Vec<u8>, CipherError>,
{
    let Some(value) = value else {
        return Ok(());
    };
    if value.is_empty() {
        return Ok(());
    }

    let transformed = transform(value.as_bytes())?;
    *value = String::from_utf8(transformed).map_err(|_| CipherError::NotText)?;
    Ok(())
}

/// Fill `buf` from the OS CSPRNG.
pub(crate) fn fill_random(buf: &mut [u8], what: &str) -> Result<(), CipherError> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CipherError::Encryption(format!("failed to create {what}: {e}")))
}

/// Cipher variants selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CipherKind {
    /// No encryption; the envelope still provides integrity.
    None,
    /// AES in CFB mode.
    Cfb,
    /// AES in GCM mode.
    #[default]
    Gcm,
}

impl CipherKind {
    /// Whether this variant needs a 16, 24 or 32 byte key.
    pub fn needs_aes_key(self) -> bool {
        !matches!(self, CipherKind::None)
    }
}

/// Build the configured cipher, optionally wrapped in [`Base64Cipher`].
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if an AES variant is requested
/// with a secret that is not 16, 24 or 32 bytes.
pub fn build_cipher(
    kind: CipherKind,
    base64: bool,
    secret: &[u8],
) -> Result<Box<dyn Cipher>, CipherError> {
    let cipher: Box<dyn Cipher> = match kind {
        CipherKind::None => Box::new(NoopCipher),
        CipherKind::Cfb => Box::new(CfbCipher::new(secret)?),
        CipherKind::Gcm => Box::new(GcmCipher::new(secret)?),
    };

    if base64 {
        Ok(Box::new(Base64Cipher::new(cipher)))
    } else {
        Ok(cipher)
    }
}
