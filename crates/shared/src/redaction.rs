//! Secret detection and redaction utilities.
//!
//! Deployment inputs carry API keys next to harmless identifiers; these
//! helpers keep the former out of error metadata, logs, and printed
//! parameter dumps.

use serde::{Serialize, Serializer};

/// The redacted placeholder string.
pub const REDACTED: &str = "[REDACTED]";

/// Checks if a key/variable name likely refers to a secret.
///
/// Uses case-insensitive pattern matching to detect common secret-related
/// naming conventions.
///
/// # Examples
///
/// ```
/// use agent_infra_shared::is_secret_key;
///
/// assert!(is_secret_key("API_KEY"));
/// assert!(is_secret_key("db_password"));
/// assert!(!is_secret_key("AWS_ACCOUNT_ID"));
/// ```
pub fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_uppercase();
    ["KEY", "TOKEN", "SECRET", "PASSWORD", "CREDENTIAL"]
        .iter()
        .any(|marker| key.contains(marker))
}

/// Redacts a value if the key is likely a secret.
///
/// ```
/// use agent_infra_shared::{REDACTED, redact_if_secret};
///
/// assert_eq!(redact_if_secret("API_KEY", "sk-123"), REDACTED);
/// assert_eq!(redact_if_secret("ENABLE_WAF", "true"), "true");
/// ```
pub fn redact_if_secret(key: &str, value: &str) -> String {
    if is_secret_key(key) {
        REDACTED.to_owned()
    } else {
        value.to_owned()
    }
}

/// A secret string wrapper that redacts on Display/Debug/Serialize.
///
/// Use [`SecretString::expose`] at the single point where the raw value is
/// actually needed.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SecretString(Box<str>);

impl SecretString {
    /// Wrap a secret value.
    pub fn new(value: impl Into<Box<str>>) -> Self {
        Self(value.into())
    }

    /// Borrow the underlying secret.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(REDACTED)
    }
}

impl std::fmt::Display for SecretString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(REDACTED)
    }
}

impl Serialize for SecretString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value.into_boxed_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_common_secret_patterns() {
        assert!(is_secret_key("API_KEY"));
        assert!(is_secret_key("api_key"));
        assert!(is_secret_key("ACCESS_TOKEN"));
        assert!(is_secret_key("CLIENT_SECRET"));
        assert!(is_secret_key("DB_PASSWORD"));
        assert!(is_secret_key("AWS_CREDENTIAL"));
    }

    #[test]
    fn rejects_non_secret_patterns() {
        assert!(!is_secret_key("AWS_ACCOUNT_ID"));
        assert!(!is_secret_key("AGENT_MODEL_ID"));
        assert!(!is_secret_key("ENABLE_WAF"));
        assert!(!is_secret_key("LOG_RETENTION_DAYS"));
        assert!(!is_secret_key("ALLOWED_ORIGIN"));
    }

    #[test]
    fn secret_string_redacts_display_and_debug() {
        let secret = SecretString::new("shh");
        assert_eq!(secret.to_string(), REDACTED);
        assert_eq!(format!("{secret:?}"), REDACTED);
        assert_eq!(secret.expose(), "shh");
    }

    #[test]
    fn secret_string_serializes_redacted() -> Result<(), serde_json::Error> {
        let secret = SecretString::from("sk-live".to_owned());
        assert_eq!(serde_json::to_string(&secret)?, "\"[REDACTED]\"");
        Ok(())
    }
}
