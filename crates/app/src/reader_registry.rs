//! Scheme → configuration reader registry.

use notifyconf_ports::ConfigReaderPort;
use notifyconf_shared::{ErrorCode, ErrorEnvelope, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Registered configuration readers keyed by scheme.
#[derive(Clone, Default)]
pub struct ReaderRegistry {
    readers: BTreeMap<String, Arc<dyn ConfigReaderPort>>,
}

impl fmt::Debug for ReaderRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ReaderRegistry")
            .field("schemas", &self.readers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ReaderRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `reader` under each scheme it serves.
    pub fn register(&mut self, reader: Arc<dyn ConfigReaderPort>) -> Result<()> {
        let schemas: Vec<String> = reader.schemas().iter().map(|schema| schema.to_lowercase()).collect();
        if let Some(schema) = schemas.iter().find(|schema| self.readers.contains_key(*schema)) {
            return Err(ErrorEnvelope::expected(
                ErrorCode::new("include", "duplicate_schema"),
                format!("a configuration reader for `{schema}` is already registered"),
            )
            .with_metadata("schema", schema.clone()));
        }
        for schema in schemas {
            self.readers.insert(schema, Arc::clone(&reader));
        }
        Ok(())
    }

    /// Reader serving `schema`.
    #[must_use]
    pub fn lookup(&self, schema: &str) -> Option<&Arc<dyn ConfigReaderPort>> {
        self.readers.get(&schema.trim().to_lowercase())
    }

    /// Registered schemes in sorted order.
    pub fn schemas(&self) -> impl Iterator<Item = &str> {
        self.readers.keys().map(String::as_str)
    }

    /// Readers with the schemes they serve, one row per scheme.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn ConfigReaderPort>)> {
        self.readers.iter().map(|(schema, reader)| (schema.as_str(), reader))
    }
}
