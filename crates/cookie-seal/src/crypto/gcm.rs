//! AES in GCM mode.
//!
//! Output layout: `nonce(12) ‖ ciphertext ‖ tag(16)`. A fresh random nonce is
//! drawn for every call; no associated data is bound.

use std::fmt;

use aes::Aes192;
use aes_gcm::{
    aead::{consts::U12, Aead, KeyInit},
    Aes128Gcm, Aes256Gcm, AesGcm, Nonce,
};

use common::{CipherError, DecryptionError};

use super::{fill_random, Cipher};

/// Byte length of a GCM nonce (96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag.
pub const TAG_LEN: usize = 16;

type Aes192Gcm = AesGcm<Aes192, U12>;

#[derive(Clone)]
enum Inner {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

/// AES-GCM cipher keyed with a 16, 24 or 32 byte secret.
#[derive(Clone)]
pub struct GcmCipher {
    inner: Inner,
}

impl GcmCipher {
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] unless `secret` is 16, 24 or
    /// 32 bytes.
    pub fn new(secret: &[u8]) -> Result<Self, CipherError> {
        let inner = match secret.len() {
            16 => Aes128Gcm::new_from_slice(secret).map(Inner::Aes128),
            24 => Aes192Gcm::new_from_slice(secret).map(Inner::Aes192),
            32 => Aes256Gcm::new_from_slice(secret).map(Inner::Aes256),
            other => return Err(CipherError::InvalidKeyLength(other)),
        }
        .map_err(|_| CipherError::InvalidKeyLength(secret.len()))?;
        Ok(Self { inner })
    }

    fn key_bits(&self) -> usize {
        match self.inner {
            Inner::Aes128(_) => 128,
            Inner::Aes192(_) => 192,
            Inner::Aes256(_) => 256,
        }
    }
}

impl Cipher for GcmCipher {
    fn encrypt(&self, value: &[u8]) -> Result<Vec<u8>, CipherError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        fill_random(&mut nonce_bytes, "nonce")?;
        let nonce = Nonce::<U12>::from_slice(&nonce_bytes);

        let sealed = match &self.inner {
            Inner::Aes128(c) => c.encrypt(nonce, value),
            Inner::Aes192(c) => c.encrypt(nonce, value),
            Inner::Aes256(c) => c.encrypt(nonce, value),
        }
        .map_err(|_| CipherError::Encryption("aead seal failed".into()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        if ciphertext.len() < NONCE_LEN {
            return Err(DecryptionError::TooShort {
                expected: NONCE_LEN,
                actual: ciphertext.len(),
            }
            .into());
        }

        let (nonce, sealed) = ciphertext.split_at(NONCE_LEN);
        let nonce = Nonce::<U12>::from_slice(nonce);
        let plaintext = match &self.inner {
            Inner::Aes128(c) => c.decrypt(nonce, sealed),
            Inner::Aes192(c) => c.decrypt(nonce, sealed),
            Inner::Aes256(c) => c.decrypt(nonce, sealed),
        }
        .map_err(|_| DecryptionError::Authentication)?;
        Ok(plaintext)
    }
}

impl fmt::Debug for GcmCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcmCipher")
            .field("key_bits", &self.key_bits())
            .finish_non_exhaustive()
    }
}
