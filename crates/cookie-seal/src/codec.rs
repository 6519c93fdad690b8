//! Encrypt-then-sign composition of a [`Cipher`] and the envelope codec.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use common::CipherError;

use crate::{crypto::Cipher, secret::Secret, signing};

/// A cookie value that passed validation and decryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opened {
    pub plaintext: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// Seals plaintext into a signed cookie value and opens it again.
///
/// Cheap to clone; clones share the cipher.
#[derive(Clone)]
pub struct CookieCodec {
    name: String,
    seed: Secret,
    expiration: Duration,
    cipher: Arc<dyn Cipher>,
}

impl CookieCodec {
    pub fn new(
        name: impl Into<String>,
        seed: Secret,
        expiration: Duration,
        cipher: impl Cipher + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            seed,
            expiration,
            cipher: Arc::new(cipher),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    /// Encrypt `plaintext` and sign the result as of `now`.
    ///
    /// # Errors
    ///
    /// Propagates [`Cipher::encrypt`] errors.
    pub fn seal(&self, plaintext: &[u8], now: DateTime<Utc>) -> Result<String, CipherError> {
        let ciphertext = self.cipher.encrypt(plaintext)?;
        Ok(signing::sign(
            self.seed.as_bytes(),
            &self.name,
            &ciphertext,
            now,
        ))
    }

    /// Validate and decrypt a cookie value.
    ///
    /// Returns `Ok(None)` for anything an attacker could send: malformed,
    /// forged or expired values.
    ///
    /// # Errors
    ///
    /// Returns the cipher error when a correctly signed value fails to
    /// decrypt, which means the cipher key does not match the signing seed's
    /// issuer or the data was corrupted server-side.
    pub fn open(&self, cookie: &str, now: DateTime<Utc>) -> Result<Option<Opened>, CipherError> {
        let Some(validated) =
            signing::validate(cookie, self.seed.as_bytes(), &self.name, self.expiration, now)
        else {
            return Ok(None);
        };

        let plaintext = self.cipher.decrypt(&validated.value).map_err(|err| {
            warn!(cookie = %self.name, error = %err, "signed cookie failed to decrypt");
            err
        })?;

        Ok(Some(Opened {
            plaintext,
            created_at: validated.created_at,
        }))
    }
}

impl fmt::Debug for CookieCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieCodec")
            .field("name", &self.name)
            .field("seed", &self.seed)
            .field("expiration", &self.expiration)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Base64Cipher, CfbCipher, GcmCipher, NoopCipher};

    const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn codec(cipher: impl Cipher + 'static) -> CookieCodec {
        CookieCodec::new(
            "_session",
            Secret::from_bytes(b"seed".to_vec()),
            Duration::hours(1),
            cipher,
        )
    }

    #[test]
    fn seal_open_round_trip_for_each_cipher() {
        let codecs = [
            codec(NoopCipher),
            codec(CfbCipher::new(KEY).unwrap()),
            codec(GcmCipher::new(KEY).unwrap()),
            codec(Base64Cipher::new(GcmCipher::new(KEY).unwrap())),
        ];
        for codec in codecs {
            let cookie = codec.seal(b"user=42", t0()).unwrap();
            let opened = codec.open(&cookie, t0()).unwrap().unwrap();
            assert_eq!(opened.plaintext, b"user=42");
            assert_eq!(opened.created_at, t0());
        }
    }

    #[test]
    fn payload_is_opaque() {
        let encrypted = codec(GcmCipher::new(KEY).unwrap()).seal(b"user=42", t0()).unwrap();
        let plain = codec(NoopCipher).seal(b"user=42", t0()).unwrap();
        assert_ne!(encrypted.split('|').next(), plain.split('|').next());
    }

    #[test]
    fn expired_cookie_is_none_not_error() {
        let codec = codec(GcmCipher::new(KEY).unwrap());
        let cookie = codec.seal(b"x", t0()).unwrap();
        let later = t0() + Duration::hours(1) + Duration::seconds(1);
        assert!(codec.open(&cookie, later).unwrap().is_none());
    }

    #[test]
    fn forged_cookie_is_none_not_error() {
        let codec = codec(GcmCipher::new(KEY).unwrap());
        assert!(codec.open("bogus", t0()).unwrap().is_none());
        assert!(codec.open("a|b|c", t0()).unwrap().is_none());
    }

    #[test]
    fn key_mismatch_is_an_error() {
        let writer = codec(GcmCipher::new(KEY).unwrap());
        let reader = codec(GcmCipher::new(&[7u8; 32]).unwrap());
        let cookie = writer.seal(b"x", t0()).unwrap();
        assert!(matches!(
            reader.open(&cookie, t0()),
            Err(CipherError::Decryption(_))
        ));
    }

    #[test]
    fn debug_redacts_seed() {
        let printed = format!("{:?}", codec(NoopCipher));
        assert!(printed.contains("_session"));
        assert!(printed.contains("REDACTED"));
    }

    #[test]
    fn shared_across_threads() {
        let codec = codec(CfbCipher::new(KEY).unwrap());
        let handles: Vec<_> = (0..4u8)
            .map(|i| {
                let codec = codec.clone();
                std::thread::spawn(move || {
                    let cookie = codec.seal(&[i; 8], t0()).unwrap();
                    codec.open(&cookie, t0()).unwrap().unwrap().plaintext
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), vec![i as u8; 8]);
        }
    }
}
