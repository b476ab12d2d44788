//! Result helpers for shared error handling.

use crate::errors::ErrorEnvelope;

/// Shared result type used across the workspace.
pub type Result<T, E = ErrorEnvelope> = std::result::Result<T, E>;

/// Extension helpers for results carrying an [`ErrorEnvelope`].
pub trait ResultExt<T> {
    /// Attach a metadata entry to the error, leaving successes untouched.
    fn with_metadata(self, key: &str, value: impl Into<String>) -> Result<T>;

    /// Turn the error into `None`, handing it to `on_error` first.
    fn or_report<F>(self, on_error: F) -> Option<T>
    where
        F: FnOnce(&ErrorEnvelope);
}

impl<T> ResultExt<T> for Result<T> {
    fn with_metadata(self, key: &str, value: impl Into<String>) -> Self {
        self.map_err(|error| error.with_metadata(key, value))
    }

    fn or_report<F>(self, on_error: F) -> Option<T>
    where
        F: FnOnce(&ErrorEnvelope),
    {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                on_error(&error);
                None
            },
        }
    }
}
