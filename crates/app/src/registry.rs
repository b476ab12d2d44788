//! Schema → plugin registry.
//!
//! The registry is populated once at start-up and shared read-only through
//! `Arc` afterwards. Lookups are case-insensitive.

use notifyconf_domain::{ArgMap, PluginDescriptor, PluginError, remap_special_tokens};
use notifyconf_ports::{BuildContext, Destination, NotifyPlugin};
use notifyconf_shared::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Registered notification plugins keyed by schema.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, Arc<dyn NotifyPlugin>>,
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PluginRegistry")
            .field("schemas", &self.plugins.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PluginRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `plugin` under every schema it declares.
    ///
    /// Nothing is registered when any of its schemas is already taken.
    pub fn register(&mut self, plugin: Arc<dyn NotifyPlugin>) -> std::result::Result<(), PluginError> {
        let schemas = plugin.descriptor().schemas().to_vec();
        if let Some(schema) = schemas.iter().find(|schema| self.plugins.contains_key(*schema)) {
            return Err(PluginError::DuplicateSchema {
                schema: schema.clone(),
            });
        }
        for schema in schemas {
            self.plugins.insert(schema, Arc::clone(&plugin));
        }
        Ok(())
    }

    /// Plugin serving `schema`.
    #[must_use]
    pub fn lookup(&self, schema: &str) -> Option<&Arc<dyn NotifyPlugin>> {
        self.plugins.get(&schema.trim().to_lowercase())
    }

    /// Returns true when a plugin serves `schema`.
    #[must_use]
    pub fn contains(&self, schema: &str) -> bool {
        self.lookup(schema).is_some()
    }

    /// Registered schemas in sorted order.
    pub fn schemas(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    /// One descriptor per registered plugin, ordered by first schema.
    #[must_use]
    pub fn descriptors(&self) -> Vec<&PluginDescriptor> {
        let mut seen: Vec<&PluginDescriptor> = Vec::new();
        for plugin in self.plugins.values() {
            let descriptor = plugin.descriptor();
            if !seen.iter().any(|known| std::ptr::eq(*known, descriptor)) {
                seen.push(descriptor);
            }
        }
        seen
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Build a destination for `schema` from `fields`.
    ///
    /// Fields are remapped through the plugin descriptor (prefix groups and
    /// aliases) and validated before the plugin sees them.
    pub fn instantiate(
        &self,
        schema: &str,
        fields: ArgMap,
        context: &BuildContext,
    ) -> Result<Arc<dyn Destination>> {
        let plugin = self
            .lookup(schema)
            .ok_or_else(|| PluginError::UnregisteredScheme {
                schema: schema.to_lowercase(),
            })?;
        let descriptor = plugin.descriptor();
        let fields = remap_special_tokens(descriptor, fields);
        descriptor.validate(&fields)?;
        plugin.build(&fields, context)
    }
}
