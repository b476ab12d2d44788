//! Plugin descriptors: which schemas a plugin serves and which arguments
//! it understands.

use crate::args::{ArgMap, ArgValue};
use crate::query::Sigil;
use notifyconf_shared::{ErrorCode, ErrorEnvelope};
use std::collections::BTreeMap;

/// Declared type of a token or argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenType {
    /// Free text.
    String,
    /// Integer.
    Int,
    /// Floating point number.
    Float,
    /// Flag.
    Bool,
    /// One of a fixed set of strings.
    Choice(Vec<String>),
    /// List of strings.
    List,
}

impl TokenType {
    /// Returns true for list tokens.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List)
    }

    /// Returns true for tokens whose values are coerced to text.
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String | Self::Choice(_))
    }

    /// Type name as shown in listings.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Choice(_) => "choice:string",
            Self::List => "list:string",
        }
    }
}

/// A named token or argument.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSpec {
    /// Name as written in configuration.
    pub name: String,
    /// Declared type.
    pub kind: TokenType,
    /// Construction fails without it.
    pub required: bool,
    /// Value is a secret.
    pub private: bool,
    /// Value used when an alias creates the target key.
    pub default: Option<ArgValue>,
    /// Another token this one is a synonym of.
    pub alias_of: Option<String>,
    /// Constructor argument the value lands in.
    pub map_to: Option<String>,
}

impl TokenSpec {
    /// A plain optional token.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TokenType) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            private: false,
            default: None,
            alias_of: None,
            map_to: None,
        }
    }

    /// Mark as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark as secret.
    #[must_use]
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<ArgValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Declare this token a synonym of `target`.
    #[must_use]
    pub fn alias_of(mut self, target: impl Into<String>) -> Self {
        self.alias_of = Some(target.into());
        self
    }

    /// Route the value into `target`.
    #[must_use]
    pub fn map_to(mut self, target: impl Into<String>) -> Self {
        self.map_to = Some(target.into());
        self
    }
}

/// A keyword group fed from one query-string partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KwargSpec {
    /// Argument the partition lands in.
    pub name: String,
    /// Partition sigil.
    pub prefix: Sigil,
}

/// Static description of a plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginDescriptor {
    service_name: String,
    schemas: Vec<String>,
    tokens: BTreeMap<String, TokenSpec>,
    args: BTreeMap<String, TokenSpec>,
    kwargs: Vec<KwargSpec>,
}

impl PluginDescriptor {
    /// Start a descriptor for `service_name` serving `schemas`.
    #[must_use]
    pub fn new<I, S>(service_name: impl Into<String>, schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            service_name: service_name.into(),
            schemas: schemas
                .into_iter()
                .map(|schema| schema.into().to_lowercase())
                .collect(),
            tokens: BTreeMap::new(),
            args: BTreeMap::new(),
            kwargs: Vec::new(),
        }
    }

    /// Declare a URL token.
    #[must_use]
    pub fn token(mut self, spec: TokenSpec) -> Self {
        self.tokens.insert(spec.name.clone(), spec);
        self
    }

    /// Declare a query-string argument.
    #[must_use]
    pub fn arg(mut self, spec: TokenSpec) -> Self {
        self.args.insert(spec.name.clone(), spec);
        self
    }

    /// Declare a keyword group.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, prefix: Sigil) -> Self {
        self.kwargs.push(KwargSpec {
            name: name.into(),
            prefix,
        });
        self
    }

    /// Human-readable service name.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Lower-cased schemas served.
    #[must_use]
    pub fn schemas(&self) -> &[String] {
        &self.schemas
    }

    /// Declared URL tokens.
    #[must_use]
    pub const fn tokens(&self) -> &BTreeMap<String, TokenSpec> {
        &self.tokens
    }

    /// Declared query arguments.
    #[must_use]
    pub const fn args(&self) -> &BTreeMap<String, TokenSpec> {
        &self.args
    }

    /// Declared keyword groups.
    #[must_use]
    pub fn kwargs(&self) -> &[KwargSpec] {
        &self.kwargs
    }

    /// Returns true when `key` is a token or an argument.
    #[must_use]
    pub fn declares(&self, key: &str) -> bool {
        self.tokens.contains_key(key) || self.args.contains_key(key)
    }

    /// Check required tokens and choice values against `args`.
    pub fn validate(&self, args: &ArgMap) -> Result<(), PluginError> {
        let schema = args.get_str("schema").unwrap_or_default().to_owned();
        for spec in self.tokens.values().chain(self.args.values()) {
            let value = args.get(&spec.name).filter(|value| !value.is_null());
            match (value, &spec.kind) {
                (None, _) if spec.required => {
                    return Err(PluginError::MissingToken {
                        schema,
                        token: spec.name.clone(),
                    });
                },
                (Some(value), TokenType::Choice(choices)) => {
                    let text = value.to_text();
                    if !choices.iter().any(|choice| choice.eq_ignore_ascii_case(&text)) {
                        return Err(PluginError::InvalidValue {
                            schema,
                            token: spec.name.clone(),
                            value: text,
                        });
                    }
                },
                (Some(value), TokenType::Int) => {
                    let valid = match value {
                        ArgValue::Int(_) => true,
                        other => other.to_text().trim().parse::<i64>().is_ok(),
                    };
                    if !valid {
                        return Err(PluginError::InvalidValue {
                            schema,
                            token: spec.name.clone(),
                            value: value.to_text(),
                        });
                    }
                },
                _ => {},
            }
        }
        Ok(())
    }
}

/// Plugin registration and construction failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginError {
    /// No plugin serves this schema.
    #[error("no plugin is registered for schema `{schema}`")]
    UnregisteredScheme {
        /// Requested schema.
        schema: String,
    },
    /// A plugin for this schema already exists.
    #[error("schema `{schema}` is already registered")]
    DuplicateSchema {
        /// Conflicting schema.
        schema: String,
    },
    /// A required token is missing.
    #[error("{schema}: missing required token `{token}`")]
    MissingToken {
        /// Plugin schema.
        schema: String,
        /// Missing token.
        token: String,
    },
    /// A token has an unacceptable value.
    #[error("{schema}: invalid value `{value}` for `{token}`")]
    InvalidValue {
        /// Plugin schema.
        schema: String,
        /// Offending token.
        token: String,
        /// Offending value.
        value: String,
    },
    /// The plugin rejected its arguments for another reason.
    #[error("{schema}: {message}")]
    Construction {
        /// Plugin schema.
        schema: String,
        /// Reason.
        message: String,
    },
    /// The destination cannot deliver messages.
    #[error("{schema}: delivery is not supported by this destination")]
    DeliveryUnsupported {
        /// Plugin schema.
        schema: String,
    },
}

impl PluginError {
    /// Stable error code.
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        let code = match self {
            Self::UnregisteredScheme { .. } => "unregistered_scheme",
            Self::DuplicateSchema { .. } => "duplicate_schema",
            Self::MissingToken { .. } | Self::InvalidValue { .. } | Self::Construction { .. } => {
                "construction_error"
            },
            Self::DeliveryUnsupported { .. } => "delivery_unsupported",
        };
        ErrorCode::new("plugin", code)
    }

    /// Schema the error refers to.
    #[must_use]
    pub fn schema(&self) -> &str {
        match self {
            Self::UnregisteredScheme { schema }
            | Self::DuplicateSchema { schema }
            | Self::MissingToken { schema, .. }
            | Self::InvalidValue { schema, .. }
            | Self::Construction { schema, .. }
            | Self::DeliveryUnsupported { schema } => schema,
        }
    }
}

impl From<PluginError> for ErrorEnvelope {
    fn from(error: PluginError) -> Self {
        let code = error.error_code();
        let schema = error.schema().to_owned();
        let envelope = Self::expected(code, error.to_string()).with_metadata("schema", schema);
        match error {
            PluginError::MissingToken { token, .. } | PluginError::InvalidValue { token, .. } => {
                envelope.with_metadata("token", token)
            },
            _ => envelope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new("Demo", ["DEMO", "demos"])
            .token(TokenSpec::new("host", TokenType::String).required())
            .token(TokenSpec::new("port", TokenType::Int))
            .arg(
                TokenSpec::new(
                    "method",
                    TokenType::Choice(vec!["GET".to_owned(), "POST".to_owned()]),
                )
                .with_default("POST"),
            )
            .kwarg("headers", Sigil::Plus)
    }

    #[test]
    fn schemas_are_lowercased() {
        assert_eq!(descriptor().schemas(), ["demo", "demos"]);
        assert!(descriptor().declares("method"));
        assert!(!descriptor().declares("headers"));
    }

    #[test]
    fn validate_reports_missing_and_invalid_tokens() {
        let descriptor = descriptor();
        let mut args = ArgMap::new();
        args.insert("schema", "demo");
        assert!(matches!(
            descriptor.validate(&args),
            Err(PluginError::MissingToken { token, .. }) if token == "host"
        ));

        args.insert("host", "localhost");
        args.insert("method", "put");
        assert!(matches!(
            descriptor.validate(&args),
            Err(PluginError::InvalidValue { token, .. }) if token == "method"
        ));

        args.insert("method", "get");
        args.insert("port", "80");
        assert_eq!(descriptor.validate(&args), Ok(()));
    }

    #[test]
    fn errors_convert_to_envelopes() {
        let envelope = ErrorEnvelope::from(PluginError::UnregisteredScheme {
            schema: "nope".to_owned(),
        });
        assert!(envelope.code.is("plugin", "unregistered_scheme"));
        assert_eq!(envelope.metadata.get("schema").map(String::as_str), Some("nope"));
    }
}
