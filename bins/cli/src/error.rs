//! CLI failures and process exit codes.

use notifyconf_infra::{ErrorKind, InfraError};

/// Process exit status of `ncf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok = 0,
    Internal = 1,
    InvalidInput = 2,
    Io = 3,
}

impl ExitCode {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Caller mistakes (bad URL, missing document) are invalid input;
    /// filesystem and network failures are I/O.
    #[must_use]
    pub fn for_error(error: &InfraError) -> Self {
        match error.kind {
            ErrorKind::Expected => Self::InvalidInput,
            ErrorKind::Unexpected if error.code.is("core", "io") => Self::Io,
            ErrorKind::Unexpected | ErrorKind::Invariant => Self::Internal,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{} ({})", .0.message, .0.code)]
    Runtime(#[from] InfraError),
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode JSON output: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidInput(_) => ExitCode::InvalidInput,
            Self::Runtime(error) => ExitCode::for_error(error),
            Self::Io(_) => ExitCode::Io,
            Self::Serialization(_) => ExitCode::Internal,
        }
    }
}
