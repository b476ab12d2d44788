//! Error envelope, codes and classification.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fmt, io};

/// Metadata attached to errors for diagnostics.
pub type ErrorMetadata = BTreeMap<String, String>;

/// Where a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Bad input or a policy refusal; the caller can fix it.
    Expected,
    /// A broken internal assumption.
    Invariant,
    /// The environment failed (filesystem, network).
    Unexpected,
}

impl ErrorKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Expected => "expected",
            Self::Invariant => "invariant",
            Self::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Whether repeating the failed operation may succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// A later attempt may succeed.
    Retriable,
    /// Repeating the operation fails the same way.
    NonRetriable,
}

impl ErrorClass {
    /// Returns true for [`ErrorClass::Retriable`].
    #[must_use]
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::Retriable)
    }

    const fn from_flag(retriable: bool) -> Self {
        if retriable { Self::Retriable } else { Self::NonRetriable }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(if self.is_retriable() {
            "retriable"
        } else {
            "non-retriable"
        })
    }
}

/// Stable `namespace:code` identifier.
///
/// Namespaces: `core`, `url`, `config`, `include` and `plugin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode {
    namespace: String,
    code: String,
}

impl ErrorCode {
    /// Build a code from its two halves.
    pub fn new(namespace: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            code: code.into(),
        }
    }

    fn core(code: &str) -> Self {
        Self::new("core", code)
    }

    /// `core:invalid_input`
    pub fn invalid_input() -> Self {
        Self::core("invalid_input")
    }

    /// `core:not_found`
    pub fn not_found() -> Self {
        Self::core("not_found")
    }

    /// `core:permission_denied`
    pub fn permission_denied() -> Self {
        Self::core("permission_denied")
    }

    /// `core:timeout`
    pub fn timeout() -> Self {
        Self::core("timeout")
    }

    /// `core:io`
    pub fn io() -> Self {
        Self::core("io")
    }

    /// `core:internal`
    pub fn internal() -> Self {
        Self::core("internal")
    }

    /// Identifier without its namespace.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// True when both halves match.
    #[must_use]
    pub fn is(&self, namespace: &str, code: &str) -> bool {
        self.namespace == namespace && self.code == code
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.namespace, self.code)
    }
}

/// Error value carried across every crate boundary.
///
/// Domain errors (`UrlError`, `ConfigError`, `PluginError`, reader errors)
/// convert into envelopes with `From`, so `?` works throughout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Origin category.
    pub kind: ErrorKind,
    /// Retry classification.
    pub class: ErrorClass,
    /// Stable code.
    pub code: ErrorCode,
    /// Human-readable message. Must not contain secrets.
    pub message: String,
    /// Diagnostic key/value pairs.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: ErrorMetadata,
}

impl ErrorEnvelope {
    fn build(kind: ErrorKind, class: ErrorClass, code: ErrorCode, message: String) -> Self {
        Self {
            kind,
            class,
            code,
            message,
            metadata: ErrorMetadata::new(),
        }
    }

    /// Non-retriable caller error.
    pub fn expected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::expected_with_class(code, message, ErrorClass::NonRetriable)
    }

    /// Caller error whose retry class depends on the remote side (HTTP 5xx).
    pub fn expected_with_class(
        code: ErrorCode,
        message: impl Into<String>,
        class: ErrorClass,
    ) -> Self {
        Self::build(ErrorKind::Expected, class, code, message.into())
    }

    /// Broken internal assumption; never retriable.
    pub fn invariant(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::build(ErrorKind::Invariant, ErrorClass::NonRetriable, code, message.into())
    }

    /// Environment failure.
    pub fn unexpected(code: ErrorCode, message: impl Into<String>, class: ErrorClass) -> Self {
        Self::build(ErrorKind::Unexpected, class, code, message.into())
    }

    /// Adds one metadata entry, replacing an existing value for `key`.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ErrorEnvelope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} {} {}: {}", self.kind, self.class, self.code, self.message)
    }
}

impl std::error::Error for ErrorEnvelope {}

impl From<io::Error> for ErrorEnvelope {
    fn from(error: io::Error) -> Self {
        let code = match error.kind() {
            io::ErrorKind::NotFound => ErrorCode::not_found(),
            io::ErrorKind::PermissionDenied => ErrorCode::permission_denied(),
            io::ErrorKind::TimedOut => ErrorCode::timeout(),
            _ => ErrorCode::io(),
        };
        let retriable = matches!(
            error.kind(),
            io::ErrorKind::WouldBlock
                | io::ErrorKind::TimedOut
                | io::ErrorKind::Interrupted
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::BrokenPipe
        );
        Self::unexpected(code, error.to_string(), ErrorClass::from_flag(retriable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_constructors() {
        let expected = ErrorEnvelope::expected(ErrorCode::new("url", "malformed"), "bad url");
        assert_eq!(expected.kind, ErrorKind::Expected);
        assert_eq!(expected.class, ErrorClass::NonRetriable);
        assert!(expected.code.is("url", "malformed"));

        let invariant = ErrorEnvelope::invariant(ErrorCode::internal(), "boom");
        assert_eq!(invariant.kind, ErrorKind::Invariant);

        let unexpected =
            ErrorEnvelope::unexpected(ErrorCode::timeout(), "timeout", ErrorClass::Retriable);
        assert_eq!(unexpected.kind, ErrorKind::Unexpected);
        assert!(unexpected.class.is_retriable());
    }

    #[test]
    fn io_errors_are_classified() {
        let envelope: ErrorEnvelope = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert_eq!(envelope.code, ErrorCode::not_found());
        assert_eq!(envelope.class, ErrorClass::NonRetriable);

        let envelope: ErrorEnvelope = io::Error::new(io::ErrorKind::TimedOut, "slow").into();
        assert_eq!(envelope.code, ErrorCode::timeout());
        assert!(envelope.class.is_retriable());
        assert_eq!(envelope.kind, ErrorKind::Unexpected);
    }

    #[test]
    fn display_includes_code_and_message() {
        let error = ErrorEnvelope::expected(ErrorCode::new("config", "undetectable"), "no format")
            .with_metadata("line", "3");
        assert_eq!(
            error.to_string(),
            "expected non-retriable config:undetectable: no format"
        );
        assert_eq!(error.metadata.get("line").map(String::as_str), Some("3"));
    }

    #[test]
    fn empty_metadata_is_omitted_from_json() -> Result<(), serde_json::Error> {
        let error = ErrorEnvelope::expected(ErrorCode::not_found(), "gone");
        let value = serde_json::to_value(&error)?;
        assert_eq!(value["kind"], "Expected");
        assert_eq!(value["code"]["namespace"], "core");
        assert!(value.get("metadata").is_none());

        let round: ErrorEnvelope = serde_json::from_value(value)?;
        assert_eq!(round, error);
        Ok(())
    }
}
