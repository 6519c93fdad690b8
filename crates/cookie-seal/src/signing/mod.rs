//! Signed cookie envelopes.
//!
//! A cookie value is stored as `value|timestamp|signature` where `value` is
//! the payload in padded base64url, `timestamp` is the creation time in Unix
//! seconds and `signature` is the padded base64url HMAC of
//! `name ‖ value ‖ timestamp` keyed by a seed.
//!
//! The browser does not send a cookie's expiry back to the server, so expiry
//! is enforced by checking that the embedded creation time lies within
//! `[now - expiration, now + CLOCK_SKEW_SECS]`.

pub mod algorithm;

use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use common::protocol::{Envelope, CLOCK_SKEW_SECS};

use crate::encoding::URL_SAFE_LENIENT;

pub use algorithm::{SignatureAlgorithm, VERIFICATION_ORDER};

/// Contents of an envelope that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    /// The decoded payload (normally ciphertext).
    pub value: Vec<u8>,
    /// When the envelope was signed, at one-second resolution.
    pub created_at: DateTime<Utc>,
}

/// Sign `value` for the cookie called `name` with HMAC-SHA256.
pub fn sign(seed: &[u8], name: &str, value: &[u8], now: DateTime<Utc>) -> String {
    sign_with(SignatureAlgorithm::Sha256, seed, name, value, now)
}

/// Sign `value` with an explicit algorithm.
///
/// New cookies should use [`sign`]; this exists for migration tooling and for
/// producing legacy signatures.
pub fn sign_with(
    algorithm: SignatureAlgorithm,
    seed: &[u8],
    name: &str,
    value: &[u8],
    now: DateTime<Utc>,
) -> String {
    let encoded_value = URL_SAFE_LENIENT.encode(value);
    let timestamp = now.timestamp().to_string();
    let mac = algorithm.mac(
        seed,
        &[
            name.as_bytes(),
            encoded_value.as_bytes(),
            timestamp.as_bytes(),
        ],
    );
    let signature = URL_SAFE_LENIENT.encode(mac);

    Envelope {
        value: &encoded_value,
        timestamp: &timestamp,
        signature: &signature,
    }
    .to_string()
}

/// Validate a cookie value produced by [`sign`] (or a legacy SHA-1 signer).
///
/// Returns `None` when the cookie is malformed, carries a bad signature, has
/// an unparseable or out-of-window timestamp, or its value is not valid
/// base64. Untrusted input never causes an error or a panic.
pub fn validate(
    cookie: &str,
    seed: &[u8],
    name: &str,
    expiration: Duration,
    now: DateTime<Utc>,
) -> Option<Validated> {
    let Some(envelope) = Envelope::parse(cookie) else {
        debug!(cookie = name, "rejected cookie: expected three fields");
        return None;
    };

    if !check_signature(&envelope, seed, name) {
        debug!(cookie = name, "rejected cookie: signature mismatch");
        return None;
    }

    let Some(created_at) = envelope
        .timestamp
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
    else {
        debug!(cookie = name, "rejected cookie: invalid timestamp");
        return None;
    };

    if !within_window(created_at, expiration, now) {
        debug!(
            cookie = name,
            created_at = %created_at,
            "rejected cookie: outside validity window"
        );
        return None;
    }

    match URL_SAFE_LENIENT.decode(envelope.value) {
        Ok(value) => Some(Validated { value, created_at }),
        Err(_) => {
            debug!(cookie = name, "rejected cookie: value is not base64");
            None
        }
    }
}

/// Try each algorithm in [`VERIFICATION_ORDER`]; accept on the first match.
fn check_signature(envelope: &Envelope<'_>, seed: &[u8], name: &str) -> bool {
    // A signature that is not valid base64 cannot equal any MAC.
    let Ok(supplied) = URL_SAFE_LENIENT.decode(envelope.signature) else {
        return false;
    };

    let parts = [
        name.as_bytes(),
        envelope.value.as_bytes(),
        envelope.timestamp.as_bytes(),
    ];
    VERIFICATION_ORDER
        .iter()
        .any(|algorithm| algorithm::macs_equal(&supplied, &algorithm.mac(seed, &parts)))
}

fn within_window(created_at: DateTime<Utc>, expiration: Duration, now: DateTime<Utc>) -> bool {
    let not_expired = now
        .checked_sub_signed(expiration)
        .map_or(true, |oldest| created_at >= oldest);
    let not_future = now
        .checked_add_signed(Duration::seconds(CLOCK_SKEW_SECS))
        .map_or(true, |newest| created_at <= newest);
    not_expired && not_future
}
