//! Structured logging setup.
//!
//! # Telemetry invariants
//!
//! - **No key material, cookie values or MACs** may appear in any span
//!   attribute or log field. Rejections log the cookie name and a reason only.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`) and
//!   overridden by `RUST_LOG` when set.

pub mod init;

pub use init::init_tracing;
