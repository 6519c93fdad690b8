//! AES in CFB mode (full-block feedback).
//!
//! Output layout: `iv(16) ‖ ciphertext`, where the ciphertext has the same
//! length as the plaintext. There is no authentication; when used for cookies
//! the signed envelope provides integrity.

use std::fmt;

use aes::{Aes128, Aes192, Aes256};
use cfb_mode::cipher::{AsyncStreamCipher, BlockCipher, BlockEncryptMut, KeyInit, KeyIvInit};
use zeroize::Zeroizing;

use common::{CipherError, DecryptionError};

use super::{fill_random, Cipher};
use crate::secret::AES_KEY_LENGTHS;

/// AES block size, which is also the IV length.
pub const BLOCK_SIZE: usize = 16;

/// AES-CFB cipher keyed with a 16, 24 or 32 byte secret.
#[derive(Clone)]
pub struct CfbCipher {
    key: Zeroizing<Vec<u8>>,
}

impl CfbCipher {
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] unless `secret` is 16, 24 or
    /// 32 bytes.
    pub fn new(secret: &[u8]) -> Result<Self, CipherError> {
        if !AES_KEY_LENGTHS.contains(&secret.len()) {
            return Err(CipherError::InvalidKeyLength(secret.len()));
        }
        Ok(Self {
            key: Zeroizing::new(secret.to_vec()),
        })
    }

    fn encrypt_in_place(&self, iv: &[u8], buf: &mut [u8]) -> Result<(), CipherError> {
        match self.key.len() {
            16 => stream_encrypt::<Aes128>(&self.key, iv, buf),
            24 => stream_encrypt::<Aes192>(&self.key, iv, buf),
            _ => stream_encrypt::<Aes256>(&self.key, iv, buf),
        }
    }

    fn decrypt_in_place(&self, iv: &[u8], buf: &mut [u8]) -> Result<(), CipherError> {
        match self.key.len() {
            16 => stream_decrypt::<Aes128>(&self.key, iv, buf),
            24 => stream_decrypt::<Aes192>(&self.key, iv, buf),
            _ => stream_decrypt::<Aes256>(&self.key, iv, buf),
        }
    }
}

fn stream_encrypt<C>(key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<(), CipherError>
where
    C: BlockEncryptMut + BlockCipher + KeyInit,
{
    cfb_mode::Encryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| CipherError::InvalidKeyLength(key.len()))?
        .encrypt(buf);
    Ok(())
}

fn stream_decrypt<C>(key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<(), CipherError>
where
    C: BlockEncryptMut + BlockCipher + KeyInit,
{
    cfb_mode::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| CipherError::InvalidKeyLength(key.len()))?
        .decrypt(buf);
    Ok(())
}

impl Cipher for CfbCipher {
    fn encrypt(&self, value: &[u8]) -> Result<Vec<u8>, CipherError> {
        let mut out = vec![0u8; BLOCK_SIZE + value.len()];
        let (iv, body) = out.split_at_mut(BLOCK_SIZE);
        fill_random(iv, "initialization vector")?;
        body.copy_from_slice(value);
        self.encrypt_in_place(iv, body)?;
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        if ciphertext.len() < BLOCK_SIZE {
            return Err(DecryptionError::TooShort {
                expected: BLOCK_SIZE,
                actual: ciphertext.len(),
            }
            .into());
        }

        let (iv, body) = ciphertext.split_at(BLOCK_SIZE);
        let mut plaintext = body.to_vec();
        self.decrypt_in_place(iv, &mut plaintext)?;
        Ok(plaintext)
    }
}

impl fmt::Debug for CfbCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CfbCipher")
            .field("key_bits", &(self.key.len() * 8))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(len: usize) -> Vec<u8> {
        (0..len as u8).collect()
    }

    #[test]
    fn round_trip_all_key_sizes() {
        for len in AES_KEY_LENGTHS {
            let cipher = CfbCipher::new(&key(len)).unwrap();
            for plaintext in [
                &b""[..],
                &b"a"[..],
                &b"exactly 16 bytes"[..],
                &b"longer than one block of AES"[..],
            ] {
                let ciphertext = cipher.encrypt(plaintext).unwrap();
                assert_eq!(ciphertext.len(), BLOCK_SIZE + plaintext.len());
                assert_eq!(cipher.decrypt(&ciphertext).unwrap(), plaintext);
            }
        }
    }

    #[test]
    fn ciphertext_differs_per_call() {
        let cipher = CfbCipher::new(&key(32)).unwrap();
        let a = cipher.encrypt(b"same plaintext").unwrap();
        let b = cipher.encrypt(b"same plaintext").unwrap();
        assert_ne!(a, b);
        assert_ne!(&a[BLOCK_SIZE..], b"same plaintext");
    }

    #[test]
    fn rejects_invalid_key_length() {
        for len in [0, 15, 17, 31, 33] {
            assert!(matches!(
                CfbCipher::new(&key(len)),
                Err(CipherError::InvalidKeyLength(l)) if l == len
            ));
        }
    }

    #[test]
    fn rejects_short_ciphertext() {
        let cipher = CfbCipher::new(&key(16)).unwrap();
        let err = cipher.decrypt(&[0u8; BLOCK_SIZE - 1]).unwrap_err();
        assert!(matches!(
            err,
            CipherError::Decryption(DecryptionError::TooShort {
                expected: 16,
                actual: 15
            })
        ));
    }

    #[test]
    fn bare_iv_decrypts_to_empty() {
        let cipher = CfbCipher::new(&key(24)).unwrap();
        assert!(cipher.decrypt(&[0u8; BLOCK_SIZE]).unwrap().is_empty());
    }

    #[test]
    fn wrong_key_yields_garbage_not_error() {
        let a = CfbCipher::new(&key(16)).unwrap();
        let b = CfbCipher::new(&[9u8; 16]).unwrap();
        let ciphertext = a.encrypt(b"confidential").unwrap();
        assert_ne!(b.decrypt(&ciphertext).unwrap(), b"confidential");
    }

    #[test]
    fn debug_hides_key() {
        let cipher = CfbCipher::new(&[0x41u8; 16]).unwrap();
        let printed = format!("{cipher:?}");
        assert!(printed.contains("128"));
        assert!(!printed.contains("65"));
    }
}
