//! Wire-format definitions and errors shared across `cookie-seal` crates.

pub mod error;
pub mod protocol;

pub use error::{CipherError, DecryptionError};
pub use protocol::Envelope;
