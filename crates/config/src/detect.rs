//! Configuration format detection.
//!
//! The first significant line decides: `identifier:` means YAML and
//! `[tags=]scheme://...` means TEXT. Comment and blank lines lean towards
//! TEXT. Any other line makes the document undetectable.

use crate::error::ConfigError;
use notifyconf_domain::ConfigFormat;
use notifyconf_domain::patterns::static_regex;
use regex::Regex;
use std::sync::LazyLock;

static DETECT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    static_regex(
        r"(?i)^\s*(?P<line>([;#]+(?P<comment>.*))|(?P<text>((?P<tag>[ \t,a-z0-9_-]+)=)?[a-z0-9]+://.*)|((?P<yaml>[a-z0-9]+):.*))?$",
    )
});

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| static_regex(r"\r*\n"));

/// Split a document into lines on `\n`, dropping the `\r`s before it.
pub fn split_lines(content: &str) -> impl Iterator<Item = &str> {
    LINE_BREAK.split(content)
}

/// Detect the format of `content`.
pub fn detect_format(content: &str) -> Result<ConfigFormat, ConfigError> {
    let mut format = ConfigFormat::Text;
    for (index, line) in split_lines(content).enumerate() {
        let captures = DETECT_LINE
            .captures(line)
            .ok_or(ConfigError::UndetectableFormat { line: index + 1 })?;

        if captures.name("yaml").is_some() {
            return Ok(ConfigFormat::Yaml);
        }
        if captures.name("text").is_some() {
            return Ok(ConfigFormat::Text);
        }
        format = ConfigFormat::Text;
    }
    Ok(format)
}
