//! Deployment environment variable validation.
//!
//! This module keeps env parsing:
//! - strict (blank or malformed values are rejected, never defaulted)
//! - batched (every offending key is reported in one error)
//! - deterministic (CSV lists normalize to sorted/deduped values)
//! - safe (secret values never appear in error metadata or output)

use agent_infra_domain::{AccountId, CidrBlock};
use agent_infra_shared::{ErrorCode, ErrorEnvelope, SecretString, redact_if_secret};
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};
use url::Url;

/// Env var: API key presented by the web frontend to the agent API (secret, required).
pub const ENV_API_KEY: &str = "API_KEY";
/// Env var: AWS account that owns every stack (required).
pub const ENV_AWS_ACCOUNT_ID: &str = "AWS_ACCOUNT_ID";
/// Env var: Bedrock model identifier used by the agent runtime.
pub const ENV_AGENT_MODEL_ID: &str = "AGENT_MODEL_ID";
/// Env var: browser origin allowed to call the agent API.
pub const ENV_ALLOWED_ORIGIN: &str = "ALLOWED_ORIGIN";
/// Env var: IPv4 CIDR allow list for the CloudFront distribution, as CSV.
pub const ENV_ALLOWED_IPV4_CIDRS: &str = "ALLOWED_IPV4_CIDRS";
/// Env var: attach a WAF web ACL to the distribution.
pub const ENV_ENABLE_WAF: &str = "ENABLE_WAF";
/// Env var: CloudWatch log retention in days.
pub const ENV_LOG_RETENTION_DAYS: &str = "LOG_RETENTION_DAYS";

/// Every key the validator reads, in report order.
pub const RECOGNIZED_KEYS: [&str; 7] = [
    ENV_API_KEY,
    ENV_AWS_ACCOUNT_ID,
    ENV_AGENT_MODEL_ID,
    ENV_ALLOWED_ORIGIN,
    ENV_ALLOWED_IPV4_CIDRS,
    ENV_ENABLE_WAF,
    ENV_LOG_RETENTION_DAYS,
];

/// Keys that must be present.
pub const REQUIRED_KEYS: [&str; 2] = [ENV_API_KEY, ENV_AWS_ACCOUNT_ID];

/// Retention periods CloudWatch Logs accepts.
pub const LOG_RETENTION_DAYS_ALLOWED: [u32; 22] = [
    1, 3, 5, 7, 14, 30, 60, 90, 120, 150, 180, 365, 400, 545, 731, 1096, 1827, 2192, 2557, 2922,
    3288, 3653,
];

const MAX_CSV_ITEMS: usize = 1_000;

/// Schema-checked deployment inputs.
///
/// A value of this type always satisfies the schema; consumers never
/// re-validate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedEnv {
    #[schemars(with = "String")]
    api_key: SecretString,
    #[schemars(with = "String")]
    aws_account_id: AccountId,
    #[serde(skip_serializing_if = "Option::is_none")]
    agent_model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_origin: Option<String>,
    #[schemars(with = "Vec<String>")]
    allowed_ipv4_cidrs: Vec<CidrBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enable_waf: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_retention_days: Option<u32>,
}

impl ValidatedEnv {
    /// Validate a key/value map (the injected environment).
    ///
    /// Unrecognized keys are ignored. Every recognized key is checked before
    /// returning, so the error lists all problems at once.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, ConfigValidationError> {
        debug!(
            recognized = RECOGNIZED_KEYS
                .iter()
                .filter(|key| map.contains_key(**key))
                .count(),
            "validating deployment environment"
        );

        let mut issues = IssueCollector::default();

        let api_key = issues.check(
            parse_optional_secret(map, ENV_API_KEY).and_then(|value| require(ENV_API_KEY, value)),
        );
        let aws_account_id = issues.check(
            parse_optional_account_id(map, ENV_AWS_ACCOUNT_ID)
                .and_then(|value| require(ENV_AWS_ACCOUNT_ID, value)),
        );
        let agent_model_id = issues
            .check(parse_optional_trimmed_string(map, ENV_AGENT_MODEL_ID))
            .flatten();
        let allowed_origin = issues
            .check(parse_optional_url_string(map, ENV_ALLOWED_ORIGIN))
            .flatten();
        let allowed_ipv4_cidrs = issues
            .check(parse_optional_csv_cidrs(map, ENV_ALLOWED_IPV4_CIDRS))
            .flatten()
            .unwrap_or_default();
        let enable_waf = issues
            .check(parse_optional_bool(map, ENV_ENABLE_WAF))
            .flatten();
        let log_retention_days = issues
            .check(parse_optional_retention_days(map, ENV_LOG_RETENTION_DAYS))
            .flatten();

        match (api_key, aws_account_id) {
            (Some(api_key), Some(aws_account_id)) if issues.is_empty() => Ok(Self {
                api_key,
                aws_account_id,
                agent_model_id,
                allowed_origin,
                allowed_ipv4_cidrs,
                enable_waf,
                log_retention_days,
            }),
            _ => {
                let error = issues.into_error();
                warn!(
                    keys = %error.keys().join(","),
                    "deployment environment failed validation"
                );
                Err(error)
            },
        }
    }

    /// Validate the recognized keys of the current process environment.
    ///
    /// Reads afresh on every call; nothing is cached between invocations.
    pub fn from_std_env() -> Result<Self, ConfigValidationError> {
        Self::from_map(&snapshot_std_env())
    }

    /// Serialize back into env-var form.
    ///
    /// The output exposes the raw secret; it exists for fixtures and for
    /// handing values to child processes, never for display.
    #[must_use]
    pub fn to_env_vars(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert(ENV_API_KEY.to_owned(), self.api_key.expose().to_owned());
        map.insert(
            ENV_AWS_ACCOUNT_ID.to_owned(),
            self.aws_account_id.to_string(),
        );
        if let Some(model) = &self.agent_model_id {
            map.insert(ENV_AGENT_MODEL_ID.to_owned(), model.clone());
        }
        if let Some(origin) = &self.allowed_origin {
            map.insert(ENV_ALLOWED_ORIGIN.to_owned(), origin.clone());
        }
        if !self.allowed_ipv4_cidrs.is_empty() {
            let joined = self
                .allowed_ipv4_cidrs
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            map.insert(ENV_ALLOWED_IPV4_CIDRS.to_owned(), joined);
        }
        if let Some(enabled) = self.enable_waf {
            map.insert(ENV_ENABLE_WAF.to_owned(), enabled.to_string());
        }
        if let Some(days) = self.log_retention_days {
            map.insert(ENV_LOG_RETENTION_DAYS.to_owned(), days.to_string());
        }
        map
    }

    /// API key for the agent API.
    #[must_use]
    pub const fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    /// Target AWS account.
    #[must_use]
    pub const fn aws_account_id(&self) -> &AccountId {
        &self.aws_account_id
    }

    /// Bedrock model identifier, when pinned.
    #[must_use]
    pub fn agent_model_id(&self) -> Option<&str> {
        self.agent_model_id.as_deref()
    }

    /// Normalized allowed origin URL.
    #[must_use]
    pub fn allowed_origin(&self) -> Option<&str> {
        self.allowed_origin.as_deref()
    }

    /// Sorted, deduplicated ingress allow list (empty means unrestricted).
    #[must_use]
    pub fn allowed_ipv4_cidrs(&self) -> &[CidrBlock] {
        &self.allowed_ipv4_cidrs
    }

    /// WAF toggle, when set.
    #[must_use]
    pub const fn enable_waf(&self) -> Option<bool> {
        self.enable_waf
    }

    /// Log retention in days, when set.
    #[must_use]
    pub const fn log_retention_days(&self) -> Option<u32> {
        self.log_retention_days
    }
}

/// Copy the recognized keys out of the process environment.
///
/// Variables that are unset or not valid unicode are treated as absent.
#[must_use]
pub fn snapshot_std_env() -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for name in RECOGNIZED_KEYS {
        if let Ok(value) = std::env::var(name) {
            map.insert(name.to_owned(), value);
        }
    }
    map
}

/// A single problem with a single env var.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvIssue {
    /// Required variable is absent.
    Missing {
        /// Env var name.
        var: &'static str,
    },
    /// Value is empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Secret value is empty after trimming.
    EmptySecret {
        /// Env var name.
        var: &'static str,
    },
    /// Value is not a boolean.
    InvalidBool {
        /// Env var name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
    /// Value is not an unsigned integer.
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
    /// Value is not an http(s) URL.
    InvalidUrl {
        /// Env var name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
    /// Value is not a 12-digit account id.
    InvalidAccountId {
        /// Env var name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
    /// Integer is outside the accepted set.
    UnsupportedValue {
        /// Env var name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
    /// CSV list exceeds a safety limit.
    CsvTooLarge {
        /// Env var name.
        var: &'static str,
        /// Number of parsed items.
        len: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// CSV contained an invalid CIDR entry.
    InvalidCidrEntry {
        /// Env var name.
        var: &'static str,
        /// Invalid entry.
        entry: String,
    },
}

impl EnvIssue {
    /// Env var the issue refers to.
    #[must_use]
    pub const fn var(&self) -> &'static str {
        match self {
            Self::Missing { var }
            | Self::EmptyValue { var }
            | Self::EmptySecret { var }
            | Self::InvalidBool { var, .. }
            | Self::InvalidInt { var, .. }
            | Self::InvalidUrl { var, .. }
            | Self::InvalidAccountId { var, .. }
            | Self::UnsupportedValue { var, .. }
            | Self::CsvTooLarge { var, .. }
            | Self::InvalidCidrEntry { var, .. } => var,
        }
    }

    /// Stable short code for the issue.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "missing_env_var",
            Self::EmptyValue { .. } | Self::EmptySecret { .. } => "empty_env_var",
            Self::InvalidBool { .. } => "invalid_env_bool",
            Self::InvalidInt { .. } => "invalid_env_int",
            Self::InvalidUrl { .. } => "invalid_env_url",
            Self::InvalidAccountId { .. } => "invalid_env_account_id",
            Self::UnsupportedValue { .. } => "unsupported_env_value",
            Self::CsvTooLarge { .. } | Self::InvalidCidrEntry { .. } => "invalid_env_csv",
        }
    }

    fn value(&self) -> Option<&str> {
        match self {
            Self::InvalidBool { value, .. }
            | Self::InvalidInt { value, .. }
            | Self::InvalidUrl { value, .. }
            | Self::InvalidAccountId { value, .. }
            | Self::UnsupportedValue { value, .. } => Some(value.as_str()),
            Self::InvalidCidrEntry { entry, .. } => Some(entry.as_str()),
            Self::Missing { .. }
            | Self::EmptyValue { .. }
            | Self::EmptySecret { .. }
            | Self::CsvTooLarge { .. } => None,
        }
    }
}

impl fmt::Display for EnvIssue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { var } => write!(formatter, "{var} is required"),
            Self::EmptyValue { var } | Self::EmptySecret { var } => {
                write!(formatter, "{var} must be non-empty")
            },
            Self::InvalidBool { var, .. } => write!(formatter, "{var} must be a boolean"),
            Self::InvalidInt { var, .. } => write!(formatter, "{var} must be an integer"),
            Self::InvalidUrl { var, .. } => write!(formatter, "{var} must be an http(s) URL"),
            Self::InvalidAccountId { var, .. } => {
                write!(formatter, "{var} must be a 12-digit AWS account id")
            },
            Self::UnsupportedValue { var, .. } => {
                write!(formatter, "{var} has an unsupported value")
            },
            Self::CsvTooLarge { var, len, max } => {
                write!(formatter, "{var} is too large ({len} items, max {max})")
            },
            Self::InvalidCidrEntry { var, entry } => {
                write!(formatter, "{var} contains invalid CIDR entry: {entry}")
            },
        }
    }
}

/// Aggregate validation failure: one entry per offending key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    issues: Vec<EnvIssue>,
}

impl ConfigValidationError {
    /// Every issue, in schema order.
    #[must_use]
    pub fn issues(&self) -> &[EnvIssue] {
        &self.issues
    }

    /// Names of the offending keys, in schema order.
    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        self.issues.iter().map(EnvIssue::var).collect()
    }

    /// Names of the required keys that are absent.
    #[must_use]
    pub fn missing_keys(&self) -> Vec<&'static str> {
        self.issues
            .iter()
            .filter(|issue| matches!(issue, EnvIssue::Missing { .. }))
            .map(EnvIssue::var)
            .collect()
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "deployment environment is invalid ({} issue{}): ",
            self.issues.len(),
            if self.issues.len() == 1 { "" } else { "s" }
        )?;
        for (index, issue) in self.issues.iter().enumerate() {
            if index > 0 {
                formatter.write_str("; ")?;
            }
            write!(formatter, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigValidationError {}

impl From<ConfigValidationError> for ErrorEnvelope {
    fn from(error: ConfigValidationError) -> Self {
        let mut envelope = Self::expected(
            ErrorCode::new("config", "validation_failed"),
            error.to_string(),
        )
        .with_metadata("keys", error.keys().join(","))
        .with_metadata("count", error.issues.len().to_string());

        for issue in &error.issues {
            let var = issue.var();
            envelope = envelope.with_metadata(format!("issue.{var}"), issue.code());
            if let Some(value) = issue.value() {
                let shown = redact_if_secret(var, value);
                envelope = envelope.with_metadata(format!("value.{var}"), shown);
            }
        }

        envelope
    }
}

#[derive(Default)]
struct IssueCollector {
    issues: Vec<EnvIssue>,
}

impl IssueCollector {
    fn check<T>(&mut self, result: Result<T, EnvIssue>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(issue) => {
                self.issues.push(issue);
                None
            },
        }
    }

    const fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    fn into_error(self) -> ConfigValidationError {
        ConfigValidationError {
            issues: self.issues,
        }
    }
}

fn require<T>(var: &'static str, value: Option<T>) -> Result<T, EnvIssue> {
    value.ok_or(EnvIssue::Missing { var })
}

fn non_empty<'a>(
    map: &'a BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<&'a str>, EnvIssue> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvIssue::EmptyValue { var });
    }
    Ok(Some(trimmed))
}

fn parse_optional_trimmed_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<String>, EnvIssue> {
    Ok(non_empty(map, var)?.map(ToOwned::to_owned))
}

fn parse_optional_secret(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<SecretString>, EnvIssue> {
    match non_empty(map, var) {
        Ok(value) => Ok(value.map(SecretString::new)),
        Err(EnvIssue::EmptyValue { var }) => Err(EnvIssue::EmptySecret { var }),
        Err(issue) => Err(issue),
    }
}

fn parse_optional_account_id(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<AccountId>, EnvIssue> {
    let Some(trimmed) = non_empty(map, var)? else {
        return Ok(None);
    };
    AccountId::parse(trimmed)
        .map(Some)
        .map_err(|_| EnvIssue::InvalidAccountId {
            var,
            value: trimmed.to_owned(),
        })
}

fn parse_optional_bool(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<bool>, EnvIssue> {
    let Some(trimmed) = non_empty(map, var)? else {
        return Ok(None);
    };
    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(EnvIssue::InvalidBool {
            var,
            value: trimmed.to_owned(),
        }),
    }
}

fn parse_optional_retention_days(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u32>, EnvIssue> {
    let Some(trimmed) = non_empty(map, var)? else {
        return Ok(None);
    };
    let days = trimmed.parse::<u32>().map_err(|_| EnvIssue::InvalidInt {
        var,
        value: trimmed.to_owned(),
    })?;
    if !LOG_RETENTION_DAYS_ALLOWED.contains(&days) {
        return Err(EnvIssue::UnsupportedValue {
            var,
            value: trimmed.to_owned(),
        });
    }
    Ok(Some(days))
}

fn parse_optional_url_string(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<String>, EnvIssue> {
    let Some(trimmed) = non_empty(map, var)? else {
        return Ok(None);
    };
    let invalid = || EnvIssue::InvalidUrl {
        var,
        value: trimmed.to_owned(),
    };

    let parsed = Url::parse(trimmed).map_err(|_| invalid())?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(invalid());
    }

    Ok(Some(parsed.to_string()))
}

fn parse_optional_csv_cidrs(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Vec<CidrBlock>>, EnvIssue> {
    let Some(raw) = non_empty(map, var)? else {
        return Ok(None);
    };
    let items = parse_csv(raw);
    if items.is_empty() {
        return Err(EnvIssue::EmptyValue { var });
    }
    if items.len() > MAX_CSV_ITEMS {
        return Err(EnvIssue::CsvTooLarge {
            var,
            len: items.len(),
            max: MAX_CSV_ITEMS,
        });
    }

    let mut blocks = Vec::with_capacity(items.len());
    for item in items {
        let block = CidrBlock::parse(item).map_err(|_| EnvIssue::InvalidCidrEntry {
            var,
            entry: item.to_owned(),
        })?;
        blocks.push(block);
    }

    blocks.sort_unstable();
    blocks.dedup();
    Ok(Some(blocks))
}

fn parse_csv(input: &str) -> Vec<&str> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}
