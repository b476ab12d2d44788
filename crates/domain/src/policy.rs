//! Include and caching policies for configuration sources.

use crate::parse::parse_bool;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Whether documents of one scheme may be included from another source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncludeMode {
    /// Never loadable through an include.
    Never,
    /// Loadable only from a source of the same scheme, or when insecure
    /// includes are enabled.
    Strict,
    /// Loadable from anywhere.
    Always,
}

impl IncludeMode {
    /// Decide whether a document served by a reader with this mode may be
    /// included from a source whose reader serves `parent_schemas`.
    #[must_use]
    pub fn allows(self, schema: &str, parent_schemas: &[&str], insecure_includes: bool) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Strict => {
                insecure_includes
                    || parent_schemas
                        .iter()
                        .any(|parent| parent.eq_ignore_ascii_case(schema))
            },
        }
    }

    /// Stable lower-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Strict => "strict",
            Self::Always => "always",
        }
    }
}

impl fmt::Display for IncludeMode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// How long a loaded source stays valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CachePolicy {
    /// Load once, reuse forever.
    #[default]
    Forever,
    /// Reload once older than this many seconds.
    Seconds(u64),
    /// Reload on every access.
    Disabled,
}

/// Error for a `cache` value that is neither a non-negative integer nor a
/// boolean word.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid cache value `{0}`")]
pub struct InvalidCache(pub String);

impl CachePolicy {
    /// Parse a `cache=` query value: seconds, or a boolean word.
    pub fn from_query(value: &str) -> Result<Self, InvalidCache> {
        let trimmed = value.trim();
        if let Ok(seconds) = trimmed.parse::<i64>() {
            return match u64::try_from(seconds) {
                Ok(0) => Ok(Self::Disabled),
                Ok(seconds) => Ok(Self::Seconds(seconds)),
                Err(_) => Err(InvalidCache(value.to_owned())),
            };
        }
        if parse_bool(trimmed, true) {
            Ok(Self::Forever)
        } else {
            Ok(Self::Disabled)
        }
    }

    /// Returns true when content loaded `age` ago must be fetched again.
    #[must_use]
    pub fn is_expired(self, age: Duration) -> bool {
        match self {
            Self::Forever => false,
            Self::Seconds(seconds) => age > Duration::from_secs(seconds),
            Self::Disabled => true,
        }
    }
}
