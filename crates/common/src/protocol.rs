//! The signed cookie envelope as it travels over the wire.
//!
//! ```text
//! <base64url(value)>|<unix-seconds>|<base64url(hmac)>
//! ```
//!
//! This module only deals with the shape of the string. Signing and
//! verification live in `cookie_seal::signing`.

use std::fmt;

/// Separator between the three envelope fields.
pub const SEPARATOR: char = '|';

/// How far in the future (seconds) a cookie timestamp may lie and still be
/// accepted. Tolerates clock skew between cooperating servers.
pub const CLOCK_SKEW_SECS: i64 = 5 * 60;

/// A parsed envelope. Fields borrow from the cookie string and are not
/// validated beyond the three-field shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope<'a> {
    /// Base64url-encoded (padded) payload.
    pub value: &'a str,
    /// Creation time as decimal Unix seconds.
    pub timestamp: &'a str,
    /// Base64url-encoded (padded) MAC.
    pub signature: &'a str,
}

impl<'a> Envelope<'a> {
    /// Split a cookie value into its three fields.
    ///
    /// Returns `None` unless the input contains exactly three
    /// `|`-separated fields; nothing is partially parsed.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let mut parts = raw.split(SEPARATOR);
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(value), Some(timestamp), Some(signature), None) => Some(Self {
                value,
                timestamp,
                signature,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Envelope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.value, self.timestamp, self.signature
        )
    }
}
