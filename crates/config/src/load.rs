//! Loading helpers (dotenv file + process env + resolution).
//!
//! The loader is responsible for deterministic merge order and surfacing
//! user-facing errors as typed `ErrorEnvelope`s.

use crate::env::{ConfigValidationError, ValidatedEnv, snapshot_std_env};
use crate::overrides::overrides_for;
use crate::params::{ResolvedParameters, resolve_parameters};
use agent_infra_domain::{EnvironmentError, EnvironmentName};
use agent_infra_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Failures while reading a `.env` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DotenvFileError {
    /// The file does not exist.
    NotFound {
        /// Path as supplied.
        path: PathBuf,
    },
    /// The file exists but could not be read.
    Unreadable {
        /// Path as supplied.
        path: PathBuf,
        /// Underlying I/O message.
        message: String,
    },
    /// A line could not be parsed.
    Invalid {
        /// Path as supplied.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}

impl DotenvFileError {
    /// Path of the offending file.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path }
            | Self::Unreadable { path, .. }
            | Self::Invalid { path, .. } => path,
        }
    }

    fn from_dotenvy(path: &Path, error: &dotenvy::Error) -> Self {
        let path = path.to_path_buf();
        match error {
            _ if error.not_found() => Self::NotFound { path },
            dotenvy::Error::Io(io) => Self::Unreadable {
                path,
                message: io.to_string(),
            },
            other => Self::Invalid {
                path,
                message: other.to_string(),
            },
        }
    }
}

impl fmt::Display for DotenvFileError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => {
                write!(formatter, "dotenv file not found: {}", path.display())
            },
            Self::Unreadable { path, message } => write!(
                formatter,
                "failed to read dotenv file {}: {message}",
                path.display()
            ),
            Self::Invalid { path, message } => {
                write!(formatter, "invalid dotenv file {}: {message}", path.display())
            },
        }
    }
}

impl std::error::Error for DotenvFileError {}

impl From<DotenvFileError> for ErrorEnvelope {
    fn from(error: DotenvFileError) -> Self {
        let message = error.to_string();
        let path = error.path().to_string_lossy().to_string();
        let envelope = match error {
            DotenvFileError::NotFound { .. } => {
                Self::expected(ErrorCode::new("config", "dotenv_not_found"), message)
            },
            DotenvFileError::Unreadable { .. } => Self::unexpected(
                ErrorCode::new("config", "dotenv_io"),
                message,
                ErrorClass::NonRetriable,
            ),
            DotenvFileError::Invalid { .. } => {
                Self::expected(ErrorCode::new("config", "dotenv_invalid"), message)
            },
        };
        envelope.with_metadata("path", path)
    }
}

/// Any failure on the way from raw inputs to [`ResolvedParameters`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The environment name is outside the closed set.
    InvalidEnvironment(EnvironmentError),
    /// One or more env vars failed validation.
    Validation(ConfigValidationError),
    /// The `.env` file could not be loaded.
    Dotenv(DotenvFileError),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnvironment(error) => write!(formatter, "{error}"),
            Self::Validation(error) => write!(formatter, "{error}"),
            Self::Dotenv(error) => write!(formatter, "{error}"),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidEnvironment(error) => Some(error),
            Self::Validation(error) => Some(error),
            Self::Dotenv(error) => Some(error),
        }
    }
}

impl From<EnvironmentError> for ResolveError {
    fn from(error: EnvironmentError) -> Self {
        Self::InvalidEnvironment(error)
    }
}

impl From<ConfigValidationError> for ResolveError {
    fn from(error: ConfigValidationError) -> Self {
        Self::Validation(error)
    }
}

impl From<DotenvFileError> for ResolveError {
    fn from(error: DotenvFileError) -> Self {
        Self::Dotenv(error)
    }
}

impl From<ResolveError> for ErrorEnvelope {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::InvalidEnvironment(error) => error.into(),
            ResolveError::Validation(error) => error.into(),
            ResolveError::Dotenv(error) => error.into(),
        }
    }
}

/// Read a `.env` file into a key/value map.
///
/// Later assignments of the same key win, matching shell semantics.
pub fn read_dotenv_file(path: &Path) -> Result<BTreeMap<String, String>, DotenvFileError> {
    let entries =
        dotenvy::from_path_iter(path).map_err(|error| DotenvFileError::from_dotenvy(path, &error))?;

    let mut map = BTreeMap::new();
    for entry in entries {
        let (key, value) = entry.map_err(|error| DotenvFileError::from_dotenvy(path, &error))?;
        map.insert(key, value);
    }

    debug!(path = %path.display(), keys = map.len(), "loaded dotenv file");
    Ok(map)
}

/// Merge a `.env` file map with process variables; process values win.
#[must_use]
pub fn merge_env_sources(
    file: BTreeMap<String, String>,
    process: BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = file;
    merged.extend(process);
    merged
}

/// Resolve parameters from an injected environment map.
///
/// The environment name is checked first; an unknown name fails before any
/// variable is validated.
pub fn resolve_from_sources(
    env_input: &str,
    env: &BTreeMap<String, String>,
) -> Result<ResolvedParameters, ResolveError> {
    let name = EnvironmentName::parse(env_input)?;
    resolve_named(name, env)
}

/// Resolve parameters from the process environment and an optional `.env` file.
pub fn resolve_std_env(
    env_input: &str,
    dotenv_path: Option<&Path>,
) -> Result<ResolvedParameters, ResolveError> {
    // Reject unknown environments before touching the filesystem.
    let name = EnvironmentName::parse(env_input)?;

    let file = match dotenv_path {
        Some(path) => read_dotenv_file(path)?,
        None => BTreeMap::new(),
    };
    let merged = merge_env_sources(file, snapshot_std_env());
    resolve_named(name, &merged)
}

fn resolve_named(
    name: EnvironmentName,
    env: &BTreeMap<String, String>,
) -> Result<ResolvedParameters, ResolveError> {
    let dotenv = ValidatedEnv::from_map(env)?;
    let params = resolve_parameters(name, &dotenv, overrides_for);
    info!(
        env = %name,
        prefix = params.prefix(),
        overrides = params.diff_env().entries().len(),
        "resolved deployment parameters"
    );
    Ok(params)
}

/// Serialize a value as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(value).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize parameters: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize a value as deterministic pretty TOML (with trailing newline).
pub fn to_pretty_toml<T: Serialize + ?Sized>(value: &T) -> Result<String, ErrorEnvelope> {
    let mut output = toml::to_string_pretty(value).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_toml"),
            format!("failed to serialize parameters TOML: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}
