//! Options carried in the query string of a configuration source URL.
//!
//! `?format=yaml`, `?encoding=latin-1` and `?cache=30` (seconds, or a
//! boolean word) tune how a single source is read.

use crate::document::ParseWarning;
use crate::error::ConfigError;
use notifyconf_domain::{CachePolicy, ConfigFormat, ParsedUrl, mask_url};

/// Warning event for an unknown `format=` value.
pub const EVENT_FORMAT_INVALID: &str = "config.format.invalid";

/// Per-source options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOptions {
    /// Forced document format.
    pub format: Option<ConfigFormat>,
    /// Declared text encoding.
    pub encoding: Option<String>,
    /// Cache policy override.
    pub cache: Option<CachePolicy>,
    /// Options that were ignored.
    pub warnings: Vec<ParseWarning>,
}

impl SourceOptions {
    /// Read the options of `parsed`.
    ///
    /// An unknown format is dropped with a warning; an invalid cache value
    /// is an error.
    pub fn from_parsed_url(parsed: &ParsedUrl) -> Result<Self, ConfigError> {
        let mut options = Self::default();

        if let Some(format) = parsed.params.get("format") {
            match format.parse::<ConfigFormat>() {
                Ok(format) => options.format = Some(format),
                Err(_) => options.warnings.push(ParseWarning::new(
                    EVENT_FORMAT_INVALID,
                    format!(
                        "An invalid config format ({format}) was specified for {}",
                        mask_url(&parsed.base_url())
                    ),
                )),
            }
        }

        options.encoding = parsed
            .params
            .get("encoding")
            .map(str::trim)
            .filter(|encoding| !encoding.is_empty())
            .map(str::to_owned);

        if let Some(cache) = parsed.params.get("cache") {
            let policy = CachePolicy::from_query(cache).map_err(|_| ConfigError::InvalidCache {
                value: cache.to_owned(),
            })?;
            options.cache = Some(policy);
        }

        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notifyconf_domain::{ParseOptions, parse_url};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn reads_format_encoding_and_cache() -> TestResult {
        let parsed = parse_url(
            "https://example.com/cfg?format=YAML&encoding=utf-8&cache=30",
            &ParseOptions::default(),
        )?;
        let options = SourceOptions::from_parsed_url(&parsed)?;
        assert_eq!(options.format, Some(ConfigFormat::Yaml));
        assert_eq!(options.encoding.as_deref(), Some("utf-8"));
        assert_eq!(options.cache, Some(CachePolicy::Seconds(30)));
        assert!(options.warnings.is_empty());
        Ok(())
    }

    #[test]
    fn unknown_format_is_dropped_with_warning() -> TestResult {
        let parsed = parse_url("file:///etc/x.cfg?format=json&cache=no", &ParseOptions::lenient())?;
        let options = SourceOptions::from_parsed_url(&parsed)?;
        assert_eq!(options.format, None);
        assert_eq!(options.cache, Some(CachePolicy::Disabled));
        assert_eq!(options.warnings.len(), 1);
        assert_eq!(options.warnings[0].event, EVENT_FORMAT_INVALID);
        Ok(())
    }

    #[test]
    fn negative_cache_is_rejected() -> TestResult {
        let parsed = parse_url("file:///etc/x.cfg?cache=-5", &ParseOptions::lenient())?;
        assert_eq!(
            SourceOptions::from_parsed_url(&parsed),
            Err(ConfigError::InvalidCache {
                value: "-5".to_owned()
            })
        );
        Ok(())
    }
}
