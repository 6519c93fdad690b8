//! Configuration loading and validation.
//!
//! Values are read from environment variables. This layer is optional: every
//! primitive it builds can also be constructed directly.
//!
//! | variable             | default    |
//! |----------------------|------------|
//! | `COOKIE_SECRET`      | required   |
//! | `COOKIE_SEED`        | the secret |
//! | `COOKIE_NAME`        | `_session` |
//! | `COOKIE_CIPHER`      | `gcm`      |
//! | `COOKIE_BASE64`      | `false`    |
//! | `COOKIE_EXPIRE_SECS` | `604800`   |
//! | `LOG_LEVEL`          | `info`     |

use std::fmt;

use anyhow::{Context, Result};
use chrono::Duration;
use serde::Deserialize;
use tracing::debug;

use crate::{
    codec::CookieCodec,
    crypto::{build_cipher, Cipher, CipherKind},
    secret::Secret,
};

/// Validated cookie configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Cipher key, raw or base64url-encoded. **Required.**
    pub cookie_secret: String,

    /// HMAC key for envelope signatures. Falls back to the secret string.
    #[serde(default)]
    pub cookie_seed: Option<String>,

    /// Cookie name bound into every signature.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Which cipher encrypts cookie payloads.
    #[serde(default)]
    pub cookie_cipher: CipherKind,

    /// Wrap the cipher output in standard base64.
    #[serde(default)]
    pub cookie_base64: bool,

    /// How long (seconds) a signed cookie stays valid.
    #[serde(default = "default_cookie_expire_secs")]
    pub cookie_expire_secs: u64,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_cookie_name() -> String {
    "_session".into()
}
fn default_cookie_expire_secs() -> u64 {
    7 * 24 * 60 * 60
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::default())
    }

    /// Load and validate configuration from an arbitrary source.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or fails validation.
    pub fn load<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let cfg = config::Config::builder()
            .add_source(source)
            .build()
            .context("failed to build configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.cookie_secret, "COOKIE_SECRET")?;
        ensure_non_empty(&self.cookie_name, "COOKIE_NAME")?;
        if let Some(seed) = &self.cookie_seed {
            ensure_non_empty(seed, "COOKIE_SEED")?;
        }

        if self.cookie_expire_secs == 0 {
            anyhow::bail!("COOKIE_EXPIRE_SECS must be > 0");
        }
        self.expiration()?;

        let secret = self.secret();
        if self.cookie_cipher.needs_aes_key() && !secret.is_aes_key() {
            anyhow::bail!(
                "COOKIE_SECRET must be 16, 24 or 32 bytes (raw or base64url-encoded) \
                 for the {:?} cipher, got {} bytes",
                self.cookie_cipher,
                secret.len()
            );
        }
        Ok(())
    }

    /// The cipher key derived from `cookie_secret`.
    pub fn secret(&self) -> Secret {
        Secret::derive(&self.cookie_secret)
    }

    /// The signing seed, taken as raw bytes.
    pub fn seed(&self) -> Secret {
        match &self.cookie_seed {
            Some(seed) => Secret::from_bytes(seed.as_bytes()),
            None => {
                debug!("COOKIE_SEED not set; signing with the cookie secret");
                Secret::from_bytes(self.cookie_secret.as_bytes())
            }
        }
    }

    /// Cookie lifetime as a signed duration.
    ///
    /// # Errors
    ///
    /// Returns an error if `cookie_expire_secs` does not fit in a duration.
    pub fn expiration(&self) -> Result<Duration> {
        i64::try_from(self.cookie_expire_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .context("COOKIE_EXPIRE_SECS is out of range")
    }

    /// Build the configured cipher.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is unusable for the chosen cipher.
    pub fn cipher(&self) -> Result<Box<dyn Cipher>> {
        build_cipher(
            self.cookie_cipher,
            self.cookie_base64,
            self.secret().as_bytes(),
        )
        .context("failed to build cookie cipher")
    }

    /// Build a [`CookieCodec`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the cipher cannot be built.
    pub fn codec(&self) -> Result<CookieCodec> {
        Ok(CookieCodec::new(
            self.cookie_name.clone(),
            self.seed(),
            self.expiration()?,
            self.cipher()?,
        ))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("cookie_secret", &"[REDACTED]")
            .field("cookie_seed", &self.cookie_seed.as_ref().map(|_| "[REDACTED]"))
            .field("cookie_name", &self.cookie_name)
            .field("cookie_cipher", &self.cookie_cipher)
            .field("cookie_base64", &self.cookie_base64)
            .field("cookie_expire_secs", &self.cookie_expire_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    const SECRET: &str = "0123456789abcdef";

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::default().source(Some(map))
    }

    fn base() -> Config {
        Config {
            cookie_secret: SECRET.into(),
            cookie_seed: None,
            cookie_name: default_cookie_name(),
            cookie_cipher: CipherKind::default(),
            cookie_base64: false,
            cookie_expire_secs: default_cookie_expire_secs(),
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_cookie_name(), "_session");
        assert_eq!(default_cookie_expire_secs(), 604_800);
        assert_eq!(default_log_level(), "info");
        assert_eq!(CipherKind::default(), CipherKind::Gcm);
    }

    #[test]
    fn load_applies_defaults() {
        let cfg = Config::load(env(&[("COOKIE_SECRET", SECRET)])).unwrap();
        assert_eq!(cfg.cookie_name, "_session");
        assert_eq!(cfg.cookie_cipher, CipherKind::Gcm);
        assert!(!cfg.cookie_base64);
        assert_eq!(cfg.cookie_expire_secs, 604_800);
        assert!(cfg.cookie_seed.is_none());
    }

    #[test]
    fn load_reads_all_variables() {
        let cfg = Config::load(env(&[
            ("COOKIE_SECRET", SECRET),
            ("COOKIE_SEED", "seed"),
            ("COOKIE_NAME", "my.sid"),
            ("COOKIE_CIPHER", "cfb"),
            ("COOKIE_BASE64", "true"),
            ("COOKIE_EXPIRE_SECS", "3600"),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();
        assert_eq!(cfg.cookie_seed.as_deref(), Some("seed"));
        assert_eq!(cfg.cookie_name, "my.sid");
        assert_eq!(cfg.cookie_cipher, CipherKind::Cfb);
        assert!(cfg.cookie_base64);
        assert_eq!(cfg.cookie_expire_secs, 3600);
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn load_requires_secret() {
        assert!(Config::load(env(&[("COOKIE_NAME", "x")])).is_err());
    }

    #[test]
    fn validate_rejects_empty_secret() {
        let cfg = Config {
            cookie_secret: "  ".into(),
            ..base()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_seed() {
        let cfg = Config {
            cookie_seed: Some(String::new()),
            ..base()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_expiry() {
        let cfg = Config {
            cookie_expire_secs: 0,
            ..base()
        };
        assert!(cfg.validate().is_err());

        let cfg = Config {
            cookie_expire_secs: u64::MAX,
            ..base()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_checks_aes_key_length() {
        let cfg = Config {
            cookie_secret: "too short".into(),
            ..base()
        };
        assert!(cfg.validate().is_err());

        let cfg = Config {
            cookie_secret: "too short".into(),
            cookie_cipher: CipherKind::None,
            ..base()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn seed_falls_back_to_secret() {
        assert_eq!(base().seed().as_bytes(), SECRET.as_bytes());
        let cfg = Config {
            cookie_seed: Some("other".into()),
            ..base()
        };
        assert_eq!(cfg.seed().as_bytes(), b"other");
    }

    #[test]
    fn codec_round_trips() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        for cipher in [CipherKind::None, CipherKind::Cfb, CipherKind::Gcm] {
            let cfg = Config {
                cookie_cipher: cipher,
                cookie_base64: true,
                ..base()
            };
            let codec = cfg.codec().unwrap();
            assert_eq!(codec.name(), "_session");
            let cookie = codec.seal(b"payload", now).unwrap();
            let opened = codec.open(&cookie, now).unwrap().unwrap();
            assert_eq!(opened.plaintext, b"payload");
        }
    }

    #[test]
    fn debug_redacts_secrets() {
        let printed = format!("{:?}", base());
        assert!(!printed.contains(SECRET));
        assert!(printed.contains("_session"));
    }
}
