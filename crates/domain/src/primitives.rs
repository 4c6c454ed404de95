//! Domain primitives with validated constructors.

use agent_infra_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

const ACCOUNT_ID_DIGITS: usize = 12;
const MAX_IPV4_PREFIX: u8 = 32;

/// Validation failures for domain primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// `AccountId` is not exactly twelve ASCII digits.
    InvalidAccountId {
        /// Trimmed input that failed validation.
        input: String,
    },
    /// `CidrBlock` is not `a.b.c.d/n` with `n <= 32`.
    InvalidCidrBlock {
        /// Trimmed input that failed validation.
        input: String,
    },
}

impl PrimitiveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidAccountId { .. } => ErrorCode::new("domain", "invalid_account_id"),
            Self::InvalidCidrBlock { .. } => ErrorCode::new("domain", "invalid_cidr_block"),
        }
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAccountId { .. } => {
                formatter.write_str("AccountId must be exactly 12 digits")
            },
            Self::InvalidCidrBlock { .. } => {
                formatter.write_str("CidrBlock must be an IPv4 CIDR like 10.0.0.0/16")
            },
        }
    }
}

impl std::error::Error for PrimitiveError {}

impl From<PrimitiveError> for ErrorEnvelope {
    fn from(error: PrimitiveError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            PrimitiveError::InvalidAccountId { input }
            | PrimitiveError::InvalidCidrBlock { input } => envelope.with_metadata("input", input),
        }
    }
}

/// AWS account identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Box<str>);

impl AccountId {
    /// Parse an account id; leading zeros are significant and preserved.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let trimmed = input.as_ref().trim();
        if trimmed.len() != ACCOUNT_ID_DIGITS || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PrimitiveError::InvalidAccountId {
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.into()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// IPv4 CIDR block used for ingress allow lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CidrBlock {
    address: Ipv4Addr,
    prefix: u8,
}

impl CidrBlock {
    /// Parse `a.b.c.d/n`.
    ///
    /// ```
    /// use agent_infra_domain::CidrBlock;
    ///
    /// let block = CidrBlock::parse("203.0.113.0/24")?;
    /// assert_eq!(block.prefix(), 24);
    /// assert!(CidrBlock::parse("203.0.113.0/33").is_err());
    /// # Ok::<(), agent_infra_domain::PrimitiveError>(())
    /// ```
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let trimmed = input.as_ref().trim();
        let invalid = || PrimitiveError::InvalidCidrBlock {
            input: trimmed.to_owned(),
        };

        let (address, prefix) = trimmed.split_once('/').ok_or_else(invalid)?;
        let address = address.parse::<Ipv4Addr>().map_err(|_| invalid())?;
        // `u8::from_str` accepts a leading '+', which is not valid CIDR notation.
        if !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let prefix = prefix.parse::<u8>().map_err(|_| invalid())?;
        if prefix > MAX_IPV4_PREFIX {
            return Err(invalid());
        }

        Ok(Self { address, prefix })
    }

    /// Network address as written.
    #[must_use]
    pub const fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// Prefix length in bits.
    #[must_use]
    pub const fn prefix(&self) -> u8 {
        self.prefix
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}/{}", self.address, self.prefix)
    }
}

impl Serialize for CidrBlock {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CidrBlock {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
