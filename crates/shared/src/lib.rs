//! # notifyconf-shared
//!
//! Shared result types, error envelopes, and redaction helpers for the
//! notifyconf workspace.
//!
//! ## Design Principles
//!
//! 1. **No workspace dependencies** - This crate only depends on external crates
//! 2. **Stable error codes** - Every failure carries a `namespace:code` pair
//! 3. **Serde-compatible** - Envelopes serialize for CLI JSON output

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

// =============================================================================
// RESULT + ERROR ENVELOPE
// =============================================================================

pub mod errors;
pub mod redaction;
pub mod result;

pub use errors::{ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata};
pub use redaction::{
    REDACTED, SENSITIVE_QUERY_KEYS, SecretString, is_secret_key, is_sensitive_query_key,
};
pub use result::{Result, ResultExt};

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::errors::{ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind};
    use super::result::Result;

    #[test]
    fn shared_error_types_are_available() {
        let error = ErrorEnvelope::expected(ErrorCode::invalid_input(), "invalid");
        assert_eq!(error.kind, ErrorKind::Expected);
        assert_eq!(error.class, ErrorClass::NonRetriable);
    }

    #[test]
    fn shared_result_type_defaults_to_envelope() {
        let value: Result<i32> = Err(ErrorEnvelope::expected(ErrorCode::not_found(), "gone"));
        assert!(matches!(value, Err(ref error) if error.code == ErrorCode::not_found()));
    }

    #[test]
    fn shared_crate_compiles() {
        assert!(!super::shared_crate_version().is_empty());
    }
}
