//! # agent-infra-shared
//!
//! Shared error envelope and redaction types for the agent-infra workspace.
//!
//! This crate provides foundational types that are used across all other crates:
//!
//! - `ErrorEnvelope` and its code/kind/class taxonomy
//! - Secret detection and redaction (`SecretString`, `is_secret_key`)
//!
//! It has no workspace dependencies.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod errors;
pub mod redaction;

pub use errors::{ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata};
pub use redaction::{REDACTED, SecretString, is_secret_key, redact_if_secret};

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
