//! MAC algorithms accepted when verifying cookie signatures.

use hmac::{digest::KeyInit, Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Hash functions used to compute the HMAC over an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// HMAC-SHA256. Used for every new signature.
    Sha256,
    /// HMAC-SHA1. Accepted on read only, for cookies issued before the
    /// switch to SHA-256.
    Sha1,
}

/// Algorithms tried, in order, when verifying a signature.
///
/// Drop [`SignatureAlgorithm::Sha1`] once no cookie signed with it can still
/// be inside its expiry window.
pub const VERIFICATION_ORDER: &[SignatureAlgorithm] =
    &[SignatureAlgorithm::Sha256, SignatureAlgorithm::Sha1];

impl SignatureAlgorithm {
    /// HMAC of the concatenation of `parts`, keyed with `key`.
    pub fn mac(self, key: &[u8], parts: &[&[u8]]) -> Vec<u8> {
        match self {
            SignatureAlgorithm::Sha256 => compute::<Hmac<Sha256>>(key, parts),
            SignatureAlgorithm::Sha1 => compute::<Hmac<Sha1>>(key, parts),
        }
    }
}

fn compute<M: Mac + KeyInit>(key: &[u8], parts: &[&[u8]]) -> Vec<u8> {
    let mut mac = <M as Mac>::new_from_slice(key).expect("HMAC accepts keys of any length");
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().to_vec()
}

/// Constant-time comparison of two MACs.
pub(crate) fn macs_equal(supplied: &[u8], expected: &[u8]) -> bool {
    supplied.ct_eq(expected).into()
}
