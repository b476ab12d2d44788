//! In-process documents addressed as `memory://<name>`.

use super::ReaderError;
use notifyconf_ports::{ConfigContent, ConfigFormat, ConfigReaderPort, IncludeMode, SourceLocation};
use notifyconf_shared::Result;
use std::collections::BTreeMap;
use std::sync::RwLock;

const SCHEMAS: &[&str] = &["memory"];

/// Serves named documents held in memory.
///
/// Memory documents can never be pulled in through an include.
#[derive(Debug, Default)]
pub struct MemoryConfigReader {
    documents: RwLock<BTreeMap<String, ConfigContent>>,
}

impl MemoryConfigReader {
    /// Create an empty reader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document while building the reader.
    #[must_use]
    pub fn with_document(self, name: &str, text: impl Into<String>) -> Self {
        self.insert(name, text, None);
        self
    }

    /// Add or replace a document, optionally with a format hint.
    pub fn insert(&self, name: &str, text: impl Into<String>, format: Option<ConfigFormat>) {
        if let Ok(mut documents) = self.documents.write() {
            documents.insert(
                normalize(name),
                ConfigContent::text(text).with_hint(format),
            );
        }
    }

    /// Remove a document.
    pub fn remove(&self, name: &str) -> bool {
        self.documents
            .write()
            .is_ok_and(|mut documents| documents.remove(&normalize(name)).is_some())
    }

    /// Names of the stored documents.
    pub fn names(&self) -> Vec<String> {
        self.documents
            .read()
            .map(|documents| documents.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl ConfigReaderPort for MemoryConfigReader {
    fn schemas(&self) -> &[&str] {
        SCHEMAS
    }

    fn include_mode(&self) -> IncludeMode {
        IncludeMode::Never
    }

    fn read(&self, location: &SourceLocation) -> Result<ConfigContent> {
        let name = normalize(&location.path());
        let found = self
            .documents
            .read()
            .ok()
            .and_then(|documents| documents.get(&name).cloned());
        found.ok_or_else(|| {
            ReaderError::NotFound {
                location: format!("memory://{name}"),
            }
            .into()
        })
    }
}

fn normalize(name: &str) -> String {
    name.trim().trim_matches('/').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notifyconf_domain::{ParseOptions, parse_url};

    fn location(url: &str) -> std::result::Result<SourceLocation, Box<dyn std::error::Error>> {
        Ok(SourceLocation::new(url, parse_url(url, &ParseOptions::lenient())?))
    }

    #[test]
    fn serves_named_documents() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let reader = MemoryConfigReader::new().with_document("shared", "json://localhost");
        reader.insert("team/alerts", "urls:\n  - json://host\n", Some(ConfigFormat::Yaml));

        let shared = reader.read(&location("memory://shared?cache=no")?)?;
        assert_eq!(shared.text, "json://localhost");

        let alerts = reader.read(&location("memory://team/alerts/")?)?;
        assert_eq!(alerts.format_hint, Some(ConfigFormat::Yaml));
        assert_eq!(reader.names(), ["shared", "team/alerts"]);
        Ok(())
    }

    #[test]
    fn unknown_names_are_not_found() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let reader = MemoryConfigReader::new().with_document("a", "json://host");
        assert!(reader.remove("a"));
        let error = reader
            .read(&location("memory://a")?)
            .err()
            .ok_or("expected an error")?;
        assert!(error.code.is("core", "not_found"));
        assert_eq!(reader.include_mode(), IncludeMode::Never);
        Ok(())
    }
}
