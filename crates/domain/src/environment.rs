//! Deployment environment identifiers.
//!
//! `EnvironmentName` is a closed set: anything outside it is rejected at
//! parse time, before any configuration is read.

use agent_infra_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A deployment target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentName {
    /// Development.
    Dev,
    /// Staging.
    Stg,
    /// Production.
    Prd,
}

impl EnvironmentName {
    /// Every environment in the closed set, in promotion order.
    pub const ALL: [Self; 3] = [Self::Dev, Self::Stg, Self::Prd];

    /// Parse an environment tag.
    ///
    /// Surrounding whitespace is ignored; the tag itself must match exactly.
    ///
    /// ```
    /// use agent_infra_domain::EnvironmentName;
    ///
    /// assert_eq!(EnvironmentName::parse(" stg "), Ok(EnvironmentName::Stg));
    /// assert!(EnvironmentName::parse("staging").is_err());
    /// ```
    pub fn parse(input: impl AsRef<str>) -> Result<Self, EnvironmentError> {
        let raw = input.as_ref();
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == raw.trim())
            .ok_or_else(|| EnvironmentError::InvalidEnvironmentName {
                input: raw.to_owned(),
            })
    }

    /// Returns the canonical tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Stg => "stg",
            Self::Prd => "prd",
        }
    }

    /// Returns true for the production environment.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Prd)
    }

    /// Comma-separated list of the accepted tags.
    #[must_use]
    pub fn allowed_tags() -> String {
        Self::ALL.map(Self::as_str).join(", ")
    }
}

impl fmt::Display for EnvironmentName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for EnvironmentName {
    type Err = EnvironmentError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

/// Failures while selecting a deployment environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    /// Input does not name an environment in the closed set.
    InvalidEnvironmentName {
        /// Raw input as supplied by the operator.
        input: String,
    },
}

impl fmt::Display for EnvironmentError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnvironmentName { input } => write!(
                formatter,
                "invalid environment name {input:?}; expected one of: {}",
                EnvironmentName::allowed_tags()
            ),
        }
    }
}

impl std::error::Error for EnvironmentError {}

impl From<EnvironmentError> for ErrorEnvelope {
    fn from(error: EnvironmentError) -> Self {
        let message = error.to_string();
        match error {
            EnvironmentError::InvalidEnvironmentName { input } => Self::expected(
                ErrorCode::new("domain", "invalid_environment_name"),
                message,
            )
            .with_metadata("input", input)
            .with_metadata("allowed", EnvironmentName::allowed_tags()),
        }
    }
}
