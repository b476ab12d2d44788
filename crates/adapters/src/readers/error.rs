//! Reader failures.

use notifyconf_shared::{ErrorClass, ErrorCode, ErrorEnvelope};

/// Why a document could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReaderError {
    /// Nothing exists at the location.
    #[error("configuration `{location}` was not found")]
    NotFound {
        /// Path, URL or document name.
        location: String,
    },
    /// The document exceeds the size cap.
    #[error("configuration `{location}` exceeds the maximum size of {limit} bytes")]
    TooLarge {
        /// Path, URL or document name.
        location: String,
        /// Cap in bytes.
        limit: usize,
    },
    /// The document is not valid text in the expected encoding.
    #[error("configuration `{location}` is not valid text in its encoding")]
    InvalidText {
        /// Path, URL or document name.
        location: String,
    },
    /// The requested encoding cannot be decoded.
    #[error("unsupported configuration encoding `{encoding}`")]
    UnsupportedEncoding {
        /// Encoding as requested.
        encoding: String,
    },
    /// The server answered with an error status.
    #[error("configuration server answered {status} for `{location}`")]
    HttpStatus {
        /// Masked URL.
        location: String,
        /// HTTP status code.
        status: u16,
    },
    /// Transport or filesystem failure.
    #[error("failed to read configuration `{location}`: {message}")]
    Io {
        /// Path or masked URL.
        location: String,
        /// Underlying error text.
        message: String,
        /// Whether retrying may help.
        retriable: bool,
    },
}

impl From<ReaderError> for ErrorEnvelope {
    fn from(error: ReaderError) -> Self {
        let message = error.to_string();
        match error {
            ReaderError::NotFound { location } => {
                Self::expected(ErrorCode::not_found(), message)
                    .with_metadata("location", location)
            },
            ReaderError::TooLarge { location, limit } => {
                Self::expected(ErrorCode::new("config", "fetch_failed"), message)
                    .with_metadata("location", location)
                    .with_metadata("limit", limit.to_string())
            },
            ReaderError::InvalidText { location } => {
                Self::expected(ErrorCode::new("config", "fetch_failed"), message)
                    .with_metadata("location", location)
            },
            ReaderError::UnsupportedEncoding { encoding } => {
                Self::expected(ErrorCode::invalid_input(), message)
                    .with_metadata("encoding", encoding)
            },
            ReaderError::HttpStatus { location, status } => {
                let class = if status == 429 || status >= 500 {
                    ErrorClass::Retriable
                } else {
                    ErrorClass::NonRetriable
                };
                Self::expected_with_class(ErrorCode::new("config", "fetch_failed"), message, class)
                    .with_metadata("location", location)
                    .with_metadata("status", status.to_string())
            },
            ReaderError::Io {
                location,
                retriable,
                ..
            } => {
                let class = if retriable {
                    ErrorClass::Retriable
                } else {
                    ErrorClass::NonRetriable
                };
                Self::unexpected(ErrorCode::io(), message, class)
                    .with_metadata("location", location)
            },
        }
    }
}
