//! Identity cipher.

use common::CipherError;

use super::Cipher;

/// Returns its input unchanged.
///
/// Used when cookies only need integrity, not confidentiality.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCipher;

impl Cipher for NoopCipher {
    fn encrypt(&self, value: &[u8]) -> Result<Vec<u8>, CipherError> {
        Ok(value.to_vec())
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        Ok(ciphertext.to_vec())
    }
}
