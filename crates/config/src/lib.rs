//! # notifyconf-config
//!
//! Configuration document detection and parsing. Parsers only describe
//! what a document contains; turning entries into destinations and
//! following includes happens in the app layer.
//! This crate depends on `domain` and `shared` only.

/// Format detection.
pub mod detect;
/// Parsed document model.
pub mod document;
/// Document-level errors.
pub mod error;
/// Per-source URL options.
pub mod source_options;
/// TEXT documents.
pub mod text;
/// YAML documents.
pub mod yaml;

pub use detect::{detect_format, split_lines};
pub use document::{EntryOrigin, ParseWarning, ParsedDocument, ServiceEntry};
pub use error::ConfigError;
pub use source_options::SourceOptions;
pub use text::parse_text;
pub use yaml::parse_yaml;

use notifyconf_domain::{AssetOptions, ConfigFormat};

/// Parse `content` as `format`.
pub fn parse_document(
    content: &str,
    format: ConfigFormat,
    base_asset: &AssetOptions,
) -> Result<ParsedDocument, ConfigError> {
    match format {
        ConfigFormat::Text => parse_text(content),
        ConfigFormat::Yaml => parse_yaml(content, base_asset),
    }
}

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
