//! Document-level configuration errors.

use notifyconf_shared::{ErrorCode, ErrorEnvelope};

/// Failures that make a whole document contribute nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No line identifies the document as TEXT or YAML.
    #[error("unable to detect the configuration format (line {line})")]
    UndetectableFormat {
        /// 1-based line that matched neither grammar.
        line: usize,
    },
    /// A TEXT line does not follow the grammar.
    #[error("invalid TEXT configuration on line {line}")]
    GrammarViolation {
        /// 1-based offending line.
        line: usize,
    },
    /// The YAML could not be parsed.
    #[error("invalid YAML configuration: {message}")]
    InvalidYaml {
        /// Parser message.
        message: String,
    },
    /// The YAML root is not a mapping.
    #[error("YAML configuration root must be a mapping")]
    NotAMapping,
    /// The YAML `version` is not 1.
    #[error("unsupported YAML configuration version {version}")]
    UnsupportedVersion {
        /// Version as written.
        version: String,
    },
    /// A `cache=` option is neither a non-negative integer nor a boolean.
    #[error("invalid cache value `{value}`")]
    InvalidCache {
        /// Value as written.
        value: String,
    },
}

impl ConfigError {
    /// Stable error code.
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        let code = match self {
            Self::UndetectableFormat { .. } => "undetectable_format",
            Self::GrammarViolation { .. } => "grammar_violation",
            Self::InvalidYaml { .. } | Self::NotAMapping | Self::UnsupportedVersion { .. } => {
                "invalid_yaml"
            },
            Self::InvalidCache { .. } => "invalid_cache",
        };
        ErrorCode::new("config", code)
    }
}

impl From<ConfigError> for ErrorEnvelope {
    fn from(error: ConfigError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            ConfigError::UndetectableFormat { line } | ConfigError::GrammarViolation { line } => {
                envelope.with_metadata("line", line.to_string())
            },
            ConfigError::UnsupportedVersion { version } => envelope.with_metadata("version", version),
            ConfigError::InvalidCache { value } => envelope.with_metadata("value", value),
            ConfigError::InvalidYaml { .. } | ConfigError::NotAMapping => envelope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_errors_carry_line_metadata() {
        let envelope = ErrorEnvelope::from(ConfigError::GrammarViolation { line: 4 });
        assert!(envelope.code.is("config", "grammar_violation"));
        assert_eq!(envelope.metadata.get("line").map(String::as_str), Some("4"));
    }
}
