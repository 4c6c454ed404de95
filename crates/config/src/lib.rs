//! # agent-infra-config
//!
//! Deployment input validation and parameter resolution.
//! This crate depends on `domain` and `shared` only.

/// Dotenv schema and batch validation.
pub mod env;
/// Loading helpers (dotenv file + process env + resolution).
pub mod load;
/// Per-environment override table.
pub mod overrides;
/// Resolved deployment parameters.
pub mod params;
/// JSON Schema export.
pub mod schema;

pub use env::{
    ConfigValidationError, ENV_AGENT_MODEL_ID, ENV_ALLOWED_IPV4_CIDRS, ENV_ALLOWED_ORIGIN,
    ENV_API_KEY, ENV_AWS_ACCOUNT_ID, ENV_ENABLE_WAF, ENV_LOG_RETENTION_DAYS, EnvIssue,
    LOG_RETENTION_DAYS_ALLOWED, RECOGNIZED_KEYS, REQUIRED_KEYS, ValidatedEnv, snapshot_std_env,
};
pub use load::{
    DotenvFileError, ResolveError, merge_env_sources, read_dotenv_file, resolve_from_sources,
    resolve_std_env, to_pretty_json, to_pretty_toml,
};
pub use overrides::{EnvOverrides, OverrideTable, overrides_for};
pub use params::{
    GlobalConstants, ResolvedParameters, TAG_ENVIRONMENT, TAG_OWNER, TAG_PROJECT,
    resolve_parameters, resolve_parameters_with,
};
pub use schema::resolved_parameters_schema;

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
