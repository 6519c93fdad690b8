//! Signed, optionally encrypted cookie values.
//!
//! Two independent pieces, composed by callers (or by [`CookieCodec`]):
//!
//! - [`signing`] wraps bytes in a `value|timestamp|signature` envelope and
//!   validates it on the way back, enforcing integrity, cookie-name binding
//!   and an expiry window.
//! - [`crypto`] provides the [`Cipher`] contract and its variants (no-op,
//!   AES-CFB, AES-GCM and a base64 decorator) to make the payload opaque.
//!
//! # Security invariants
//!
//! - Untrusted input never panics or errors on the validation path: a forged,
//!   expired or malformed cookie is reported as `None`.
//! - Key material, cookie values and MACs never appear in log fields.

pub mod codec;
pub mod config;
pub mod crypto;
mod encoding;
pub mod secret;
pub mod signing;
pub mod telemetry;

pub use common::{CipherError, DecryptionError, Envelope};

pub use crate::codec::{CookieCodec, Opened};
pub use crate::config::Config;
pub use crate::crypto::{
    build_cipher, Base64Cipher, CfbCipher, Cipher, CipherExt, CipherKind, GcmCipher, NoopCipher,
};
pub use crate::secret::Secret;
pub use crate::signing::{sign, sign_with, validate, SignatureAlgorithm, Validated};
