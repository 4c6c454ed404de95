//! # agent-infra-domain
//!
//! Domain primitives for deploy-time parameter resolution.
//!
//! - **Environment** - `EnvironmentName`, the closed set of deployment targets
//! - **Primitives** - `AccountId`, `CidrBlock`
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

// Re-export shared types for convenience
pub use agent_infra_shared::shared_crate_version;

pub mod environment;
pub mod primitives;

pub use environment::{EnvironmentError, EnvironmentName};
pub use primitives::{AccountId, CidrBlock, PrimitiveError};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
