//! Read-only inspection helpers: format detection and URL masking.

use crate::InfraResult;
use crate::runtime::Runtime;
use notifyconf_app::file_url;
use notifyconf_config::{SourceOptions, detect_format};
use notifyconf_domain::{
    ConfigFormat, MaskOptions, ParseOptions, mask_url, mask_word, parse_url, schema_of,
};
use notifyconf_ports::SourceLocation;
use notifyconf_shared::{ErrorCode, ErrorEnvelope};
use serde::Serialize;
use std::path::Path;

/// How a document's format was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatOrigin {
    /// `?format=` on the source URL.
    Query,
    /// The transport hinted it.
    Transport,
    /// Content sniffing.
    Content,
}

/// Result of [`detect_source`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    /// Masked source URL.
    pub url: String,
    /// Decided format.
    pub format: ConfigFormat,
    /// Where the decision came from.
    pub origin: FormatOrigin,
}

/// Fetch the document at `target` (URL or path) and report its format.
pub fn detect_source(runtime: &Runtime, target: &str) -> InfraResult<Detection> {
    let target = target.trim();
    let url = if schema_of(target).is_some() {
        target.to_owned()
    } else {
        file_url(Path::new(target))
    };
    let parsed = parse_url(&url, &ParseOptions::lenient())?;
    let reader = runtime.readers().lookup(&parsed.schema).ok_or_else(|| {
        ErrorEnvelope::expected(
            ErrorCode::new("include", "unregistered_scheme"),
            format!("no configuration reader serves `{}`", parsed.schema),
        )
        .with_metadata("schema", parsed.schema.clone())
    })?;
    let options = SourceOptions::from_parsed_url(&parsed)?;

    let location = SourceLocation::new(url, parsed);
    let masked = mask_url(&location.url);
    if let Some(format) = options.format {
        return Ok(Detection {
            url: masked,
            format,
            origin: FormatOrigin::Query,
        });
    }

    let content = reader.read(&location)?;
    let (format, origin) = match content.format_hint {
        Some(format) => (format, FormatOrigin::Transport),
        None => (detect_format(&content.text)?, FormatOrigin::Content),
    };
    Ok(Detection {
        url: masked,
        format,
        origin,
    })
}

/// Mask every secret in a URL, or mask a bare word when it looks like one.
#[must_use]
pub fn mask(url_or_word: &str) -> String {
    let trimmed = url_or_word.trim();
    if trimmed.contains("://") {
        mask_url(trimmed)
    } else {
        mask_word(trimmed, MaskOptions::default())
    }
}
