//! Configuration document readers.
//!
//! A reader serves one or more URL schemes (`file`, `http`, ...) and hands
//! back the raw document text. Parsing happens elsewhere.

use notifyconf_domain::{ConfigFormat, IncludeMode, ParsedUrl, url_path};
use notifyconf_shared::Result;
use std::path::PathBuf;

/// Where a configuration document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// URL as given, `schema://` included.
    pub url: String,
    /// Parsed form of `url` (host validation off).
    pub parsed: ParsedUrl,
}

impl SourceLocation {
    /// Pair a URL with its parsed form.
    #[must_use]
    pub fn new(url: impl Into<String>, parsed: ParsedUrl) -> Self {
        Self {
            url: url.into(),
            parsed,
        }
    }

    /// Lower-cased scheme.
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.parsed.schema
    }

    /// Decoded text between `schema://` and the query string.
    #[must_use]
    pub fn path(&self) -> String {
        url_path(&self.url).unwrap_or_default()
    }
}

/// Raw document returned by a reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigContent {
    /// Document text.
    pub text: String,
    /// Format suggested by the transport (e.g. an HTTP `Content-Type`).
    pub format_hint: Option<ConfigFormat>,
}

impl ConfigContent {
    /// Content without a format hint.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format_hint: None,
        }
    }

    /// Attach a format hint.
    #[must_use]
    pub const fn with_hint(mut self, format: Option<ConfigFormat>) -> Self {
        self.format_hint = format;
        self
    }
}

/// Boundary contract for fetching configuration documents.
pub trait ConfigReaderPort: Send + Sync {
    /// Lower-case schemes served by this reader.
    fn schemas(&self) -> &[&str];

    /// Whether documents of these schemes may be pulled in by an include.
    fn include_mode(&self) -> IncludeMode;

    /// Fetch the document at `location`.
    fn read(&self, location: &SourceLocation) -> Result<ConfigContent>;

    /// Directory that relative includes inside this document resolve
    /// against.
    fn base_dir(&self, _location: &SourceLocation) -> Option<PathBuf> {
        None
    }
}
