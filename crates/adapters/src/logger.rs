//! Structured JSON logger adapter.

use crate::log_sink::LogSink;
use notifyconf_ports::{LogEvent, LogFields, LogLevel, LoggerPort};
use notifyconf_domain::mask_url;
use notifyconf_shared::{REDACTED, is_secret_key};
use serde_json::Value;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// JSON logger emitting one line per event.
#[derive(Clone)]
pub struct JsonLogger {
    sink: Arc<dyn LogSink>,
    base_fields: LogFields,
    min_level: LogLevel,
}

impl std::fmt::Debug for JsonLogger {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("JsonLogger")
            .field("base_fields", &self.base_fields)
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}

impl JsonLogger {
    /// Create a JSON logger backed by the provided sink.
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            base_fields: LogFields::new(),
            min_level: LogLevel::Info,
        }
    }

    /// Set base fields applied to every event.
    #[must_use]
    pub fn with_base_fields(mut self, fields: LogFields) -> Self {
        self.base_fields = fields;
        self
    }

    /// Set the minimum log level.
    #[must_use]
    pub const fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }
}

impl LoggerPort for JsonLogger {
    fn log(&self, event: LogEvent) {
        if event.level < self.min_level {
            return;
        }

        let mut fields = serde_json::Map::new();
        for (key, value) in self.base_fields.iter().chain(event.fields.iter().flatten()) {
            fields.insert(key.to_string(), scrub(key, value.clone()));
        }

        let mut payload = serde_json::Map::new();
        payload.insert("timestampMs".to_owned(), Value::from(now_epoch_ms()));
        payload.insert("level".to_owned(), Value::from(event.level.as_str()));
        payload.insert("event".to_owned(), Value::from(event.event.as_ref()));
        payload.insert("message".to_owned(), Value::from(event.message.as_ref()));
        if !fields.is_empty() {
            payload.insert("fields".to_owned(), Value::Object(fields));
        }
        if let Some(error) = event.error {
            payload.insert("error".to_owned(), scrub("error", error));
        }

        match serde_json::to_string(&Value::Object(payload)) {
            Ok(mut line) => {
                line.push('\n');
                self.sink.write_line(&line);
            },
            Err(_) => self.sink.write_line(SERIALIZE_FAILED),
        }
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        let mut merged = self.base_fields.clone();
        merged.extend(fields);
        Box::new(Self {
            sink: Arc::clone(&self.sink),
            base_fields: merged,
            min_level: self.min_level,
        })
    }
}

const SERIALIZE_FAILED: &str = "{\"timestampMs\":0,\"level\":\"error\",\"event\":\"logger.serialize_failed\",\"message\":\"log serialization failed\"}\n";

/// Secret-named keys lose their value; URL-named string values are masked.
fn scrub(key: &str, value: Value) -> Value {
    if is_secret_key(key) {
        return Value::from(REDACTED);
    }
    match value {
        Value::String(text) if is_url_key(key) => Value::from(mask_url(&text)),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(nested_key, nested)| {
                    let scrubbed = scrub(&nested_key, nested);
                    (nested_key, scrubbed)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(|item| scrub(key, item)).collect()),
        other => other,
    }
}

fn is_url_key(key: &str) -> bool {
    key.eq_ignore_ascii_case("url") || key.ends_with("Url") || key.ends_with("_url")
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|duration| u64::try_from(duration.as_millis()).ok())
        .unwrap_or_default()
}
