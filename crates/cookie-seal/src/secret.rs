//! Key material derived from operator-supplied strings.

use std::fmt;

use base64::Engine as _;
use zeroize::Zeroizing;

use crate::encoding::URL_SAFE_NO_PAD_LENIENT;

/// Key lengths (bytes) accepted by AES-128, AES-192 and AES-256.
pub const AES_KEY_LENGTHS: [usize; 3] = [16, 24, 32];

/// Secret bytes used as an HMAC or AES key.
///
/// The buffer is zeroed on drop and never printed by `Debug`.
#[derive(Clone)]
pub struct Secret(Zeroizing<Vec<u8>>);

impl Secret {
    /// Derive a secret from a configuration string.
    ///
    /// If `secret` (trailing `=` trimmed) is valid unpadded URL-safe base64
    /// and decodes to a valid AES key length, the decoded bytes are used.
    /// Otherwise the raw string bytes are. This never fails.
    pub fn derive(secret: &str) -> Self {
        if let Ok(decoded) = URL_SAFE_NO_PAD_LENIENT.decode(secret.trim_end_matches('=')) {
            // Any other length means the raw string was the intended secret.
            if AES_KEY_LENGTHS.contains(&decoded.len()) {
                return Self(Zeroizing::new(decoded));
            }
        }
        Self::from_bytes(secret.as_bytes())
    }

    /// Wrap raw bytes as-is.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(bytes.into()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this secret can key an AES cipher.
    pub fn is_aes_key(&self) -> bool {
        AES_KEY_LENGTHS.contains(&self.len())
    }
}

impl AsRef<[u8]> for Secret {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret([REDACTED; {} bytes])", self.len())
    }
}
