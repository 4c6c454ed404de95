use agent_infra_shared::{ErrorEnvelope, ErrorKind};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok = 0,
    InvalidInput = 2,
    Io = 3,
    Internal = 1,
}

impl ExitCode {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Operator mistakes exit 2, filesystem trouble 3, everything else 1.
    #[must_use]
    pub fn for_envelope(envelope: &ErrorEnvelope) -> Self {
        match envelope.kind {
            ErrorKind::Expected => Self::InvalidInput,
            ErrorKind::Unexpected
                if matches!(
                    envelope.code.code(),
                    "io" | "dotenv_io" | "not_found" | "permission_denied"
                ) =>
            {
                Self::Io
            },
            ErrorKind::Unexpected => Self::Internal,
        }
    }
}

#[derive(Debug)]
pub enum CliError {
    Serialization(serde_json::Error),
    Envelope(ErrorEnvelope),
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Serialization(_) => ExitCode::Internal,
            Self::Envelope(envelope) => ExitCode::for_envelope(envelope),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialization(error) => write!(formatter, "serialization error: {error}"),
            Self::Envelope(envelope) => write!(formatter, "{envelope}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        Self::Envelope(ErrorEnvelope::from(error))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error)
    }
}

impl From<ErrorEnvelope> for CliError {
    fn from(error: ErrorEnvelope) -> Self {
        Self::Envelope(error)
    }
}
