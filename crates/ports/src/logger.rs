//! Structured logging boundary contract.

use notifyconf_shared::ErrorEnvelope;
use std::collections::BTreeMap;

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Debug.
    Debug,
    /// Info.
    Info,
    /// Warn.
    Warn,
    /// Error.
    Error,
}

impl LogLevel {
    /// Lower-case level name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Additional event fields.
pub type LogFields = BTreeMap<Box<str>, serde_json::Value>;

/// Build a [`LogFields`] map from key/value pairs.
pub fn log_fields<I, K, V>(pairs: I) -> LogFields
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<Box<str>>,
    V: Into<serde_json::Value>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// Structured log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Stable event name, e.g. `config.include.rejected`.
    pub event: Box<str>,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message. URLs inside it are already masked.
    pub message: Box<str>,
    /// Optional structured fields.
    pub fields: Option<LogFields>,
    /// Optional error payload.
    pub error: Option<serde_json::Value>,
}

impl LogEvent {
    /// Create an event without error payload.
    #[must_use]
    pub fn new(level: LogLevel, event: &str, message: &str, fields: Option<LogFields>) -> Self {
        Self {
            event: event.into(),
            level,
            message: message.into(),
            fields,
            error: None,
        }
    }

    /// Attach an error envelope as the error payload.
    #[must_use]
    pub fn with_error(mut self, error: &ErrorEnvelope) -> Self {
        self.error = Some(serde_json::json!({
            "code": error.code.to_string(),
            "message": error.message,
            "metadata": error.metadata,
        }));
        self
    }
}

/// Boundary contract for structured logging.
pub trait LoggerPort: Send + Sync {
    /// Emit a structured event.
    fn log(&self, event: LogEvent);

    /// Create a child logger with base fields applied to every event.
    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort>;

    /// Convenience: debug event.
    fn debug(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(LogLevel::Debug, event, message, fields));
    }

    /// Convenience: info event.
    fn info(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(LogLevel::Info, event, message, fields));
    }

    /// Convenience: warn event.
    fn warn(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(LogLevel::Warn, event, message, fields));
    }

    /// Convenience: error event.
    fn error(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(LogLevel::Error, event, message, fields));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notifyconf_shared::ErrorCode;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<LogEvent>>,
    }

    impl LoggerPort for Recorder {
        fn log(&self, event: LogEvent) {
            if let Ok(mut events) = self.events.lock() {
                events.push(event);
            }
        }

        fn child(&self, _fields: LogFields) -> Box<dyn LoggerPort> {
            Box::new(Self::default())
        }
    }

    #[test]
    fn convenience_methods_set_levels() -> Result<(), Box<dyn std::error::Error>> {
        let recorder = Recorder::default();
        recorder.debug("a", "one", None);
        recorder.warn("b", "two", Some(log_fields([("schema", "json")])));

        let events = recorder.events.lock().map_err(|error| error.to_string())?;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].level, LogLevel::Debug);
        assert_eq!(events[1].level.as_str(), "warn");
        assert_eq!(
            events[1]
                .fields
                .as_ref()
                .and_then(|fields| fields.get("schema"))
                .and_then(serde_json::Value::as_str),
            Some("json")
        );
        Ok(())
    }

    #[test]
    fn error_payload_carries_code() {
        let error = ErrorEnvelope::expected(ErrorCode::new("include", "policy_violation"), "no");
        let event = LogEvent::new(LogLevel::Warn, "x", "y", None).with_error(&error);
        let code = event
            .error
            .as_ref()
            .and_then(|payload| payload.get("code"))
            .and_then(serde_json::Value::as_str);
        assert_eq!(code, Some("include:policy_violation"));
    }
}
