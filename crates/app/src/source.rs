//! Configuration sources and recursive include resolution.
//!
//! A [`ConfigSource`] owns one document reference and its cache. Loading
//! moves it from unloaded to loaded; an expired cache sends it through
//! loading again. Nothing here returns an error once the source exists:
//! fetch, detection and parse failures all load as zero destinations.

use crate::load::{LoadContext, load_document, loggable_url};
use crate::reader_registry::ReaderRegistry;
use crate::registry::PluginRegistry;
use notifyconf_config::{ParsedDocument, SourceOptions, detect_format, parse_document};
use notifyconf_domain::encoding::quote;
use notifyconf_domain::{
    AssetOptions, CachePolicy, ConfigFormat, ParseOptions, mask_url, parse_url, schema_of,
};
use notifyconf_ports::{
    ClockPort, ConfigReaderPort, Destination, LogEvent, LogLevel, LoggerPort, SourceLocation,
    log_fields,
};
use notifyconf_shared::{ErrorCode, ErrorEnvelope, Result, ResultExt};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

// =============================================================================
// EVENTS
// =============================================================================

/// Content could not be fetched.
pub const EVENT_FETCH_FAILED: &str = "config.fetch.failed";
/// Content format could not be determined.
pub const EVENT_FORMAT_UNDETECTED: &str = "config.format.undetected";
/// Content did not parse.
pub const EVENT_PARSE_FAILED: &str = "config.parse.failed";
/// A source finished loading.
pub const EVENT_SOURCE_LOADED: &str = "config.source.loaded";
/// A source loaded nothing.
pub const EVENT_SOURCE_EMPTY: &str = "config.source.empty";
/// An include was refused by the cross-include policy.
pub const EVENT_INCLUDE_REJECTED: &str = "config.include.rejected";
/// An include names a scheme no reader serves.
pub const EVENT_INCLUDE_UNSUPPORTED: &str = "config.include.unsupported";
/// An include could not be opened.
pub const EVENT_INCLUDE_FAILED: &str = "config.include.failed";
/// An include was ignored because the recursion budget is spent.
pub const EVENT_INCLUDE_DEPTH: &str = "config.include.depth";

/// Scheme assumed for includes and sources without one.
pub const DEFAULT_SOURCE_SCHEMA: &str = "file";

// =============================================================================
// OPTIONS & DEPENDENCIES
// =============================================================================

/// Caller-supplied resolution options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Remaining include depth; 0 disables includes.
    pub recursion: u32,
    /// Treat strict readers as always includable.
    pub insecure_includes: bool,
    /// Cache policy; a `?cache=` query value takes precedence.
    pub cache: CachePolicy,
    /// Forced document format; wins over `?format=` and detection.
    pub config_format: Option<ConfigFormat>,
}

/// Collaborators needed to resolve sources.
#[derive(Clone)]
pub struct ResolverDeps {
    /// Notification plugins.
    pub plugins: Arc<PluginRegistry>,
    /// Configuration readers.
    pub readers: Arc<ReaderRegistry>,
    /// Time source for cache expiry.
    pub clock: Arc<dyn ClockPort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

impl fmt::Debug for ResolverDeps {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ResolverDeps")
            .field("plugins", &self.plugins)
            .field("readers", &self.readers)
            .field("logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// CONFIG SOURCE
// =============================================================================

/// One configuration document reference with its cache.
pub struct ConfigSource {
    location: SourceLocation,
    reader: Arc<dyn ConfigReaderPort>,
    recursion: u32,
    insecure_includes: bool,
    cache: CachePolicy,
    config_format: Option<ConfigFormat>,
    encoding: Option<String>,
    asset: Arc<AssetOptions>,
    deps: ResolverDeps,
    cached_destinations: Option<Vec<Arc<dyn Destination>>>,
    cached_time: Option<Instant>,
}

impl fmt::Debug for ConfigSource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ConfigSource")
            .field("url", &self.url(true))
            .field("recursion", &self.recursion)
            .field("cache", &self.cache)
            .field("loaded", &self.cached_destinations.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}

impl ConfigSource {
    /// Open a source for `url`.
    ///
    /// A URL without a scheme is a `file` path. Fails when the URL does not
    /// parse, no reader serves the scheme, or `?cache=` is invalid.
    pub fn new(url: &str, options: ResolveOptions, deps: ResolverDeps) -> Result<Self> {
        let url = url.trim();
        let url = if schema_of(url).is_some() {
            url.to_owned()
        } else {
            file_url(Path::new(url))
        };

        let parsed = parse_url(&url, &ParseOptions::lenient())?;
        let reader = deps
            .readers
            .lookup(&parsed.schema)
            .cloned()
            .ok_or_else(|| unsupported_schema(&parsed.schema))?;
        let source_options = SourceOptions::from_parsed_url(&parsed)?;
        if let Some(logger) = deps.logger.as_ref() {
            for warning in &source_options.warnings {
                logger.warn(warning.event, &warning.message, None);
            }
        }

        Ok(Self {
            reader,
            recursion: options.recursion,
            insecure_includes: options.insecure_includes,
            cache: source_options.cache.unwrap_or(options.cache),
            config_format: options.config_format.or(source_options.format),
            encoding: source_options.encoding,
            asset: Arc::new(AssetOptions::default()),
            location: SourceLocation::new(url, parsed),
            deps,
            cached_destinations: None,
            cached_time: None,
        })
    }

    /// Use `asset` for entries of this source and its includes.
    #[must_use]
    pub fn with_asset(mut self, asset: Arc<AssetOptions>) -> Self {
        self.asset = asset;
        self
    }

    /// Source URL; secrets are masked when `privacy` is set.
    #[must_use]
    pub fn url(&self, privacy: bool) -> String {
        if privacy {
            mask_url(&self.location.url)
        } else {
            self.location.url.clone()
        }
    }

    /// Lower-cased scheme.
    #[must_use]
    pub fn schema(&self) -> &str {
        self.location.schema()
    }

    /// Remaining include depth.
    #[must_use]
    pub const fn recursion(&self) -> u32 {
        self.recursion
    }

    /// Whether strict readers are treated as always includable.
    #[must_use]
    pub const fn insecure_includes(&self) -> bool {
        self.insecure_includes
    }

    /// Effective cache policy.
    #[must_use]
    pub const fn cache(&self) -> CachePolicy {
        self.cache
    }

    /// Forced document format, if any.
    #[must_use]
    pub const fn config_format(&self) -> Option<ConfigFormat> {
        self.config_format
    }

    /// Declared text encoding, if any.
    #[must_use]
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// When the cached destinations were loaded.
    #[must_use]
    pub const fn cached_time(&self) -> Option<Instant> {
        self.cached_time
    }

    /// Returns true when the next access must load again.
    ///
    /// An unloaded source is always expired.
    #[must_use]
    pub fn expired(&self) -> bool {
        match (&self.cached_destinations, self.cached_time) {
            (Some(_), Some(loaded_at)) => self
                .cache
                .is_expired(self.deps.clock.now().saturating_duration_since(loaded_at)),
            _ => true,
        }
    }

    /// Destinations of this source, loading first when expired.
    pub fn destinations(&mut self) -> &[Arc<dyn Destination>] {
        if self.expired() {
            self.load();
        }
        self.cached_destinations.as_deref().unwrap_or_default()
    }

    /// Owned copy of [`Self::destinations`].
    pub fn resolve(&mut self) -> Vec<Arc<dyn Destination>> {
        self.destinations().to_vec()
    }

    /// Number of cached destinations, loading once if never loaded.
    pub fn len(&mut self) -> usize {
        self.ensure_loaded().len()
    }

    /// Returns true when the source holds no destinations.
    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Remove the destination at `index` from the cache.
    pub fn pop(&mut self, index: usize) -> Option<Arc<dyn Destination>> {
        let cached = self.ensure_loaded();
        (index < cached.len()).then(|| cached.remove(index))
    }

    fn ensure_loaded(&mut self) -> &mut Vec<Arc<dyn Destination>> {
        if self.cached_destinations.is_none() {
            self.load();
        }
        self.cached_destinations.get_or_insert_with(Vec::new)
    }

    #[tracing::instrument(skip_all, fields(schema = %self.location.schema(), recursion = self.recursion))]
    fn load(&mut self) {
        let mut destinations = Vec::new();

        if let Some(document) = self.fetch_document() {
            let context = LoadContext {
                registry: &self.deps.plugins,
                logger: self.deps.logger.as_deref(),
            };
            let loaded = load_document(context, document, &self.asset);
            destinations.extend(loaded.destinations());

            for include in &loaded.includes {
                if self.recursion == 0 {
                    self.log(
                        LogLevel::Debug,
                        EVENT_INCLUDE_DEPTH,
                        &format!(
                            "Recursion limit reached; ignoring Include URL: {}",
                            loggable_url(include, &self.asset)
                        ),
                    );
                    continue;
                }
                destinations.extend(self.resolve_include(include));
            }
        }

        let privacy = self.asset.secure_logging;
        if destinations.is_empty() {
            self.log(
                LogLevel::Warn,
                EVENT_SOURCE_EMPTY,
                &format!("Failed to load configuration from {}", self.url(privacy)),
            );
        } else {
            self.log(
                LogLevel::Info,
                EVENT_SOURCE_LOADED,
                &format!("Loaded {} entries from {}", destinations.len(), self.url(privacy)),
            );
        }

        self.cached_destinations = Some(destinations);
        self.cached_time = Some(self.deps.clock.now());
    }

    fn fetch_document(&self) -> Option<ParsedDocument> {
        let privacy = self.asset.secure_logging;
        let content = self.reader.read(&self.location).or_report(|error| {
            self.log_error(
                LogLevel::Error,
                EVENT_FETCH_FAILED,
                &format!("Failed to read configuration from {}", self.url(privacy)),
                error,
            );
        })?;

        let format = match self.config_format.or(content.format_hint) {
            Some(format) => format,
            None => detect_format(&content.text)
                .map_err(ErrorEnvelope::from)
                .or_report(|error| {
                    self.log_error(
                        LogLevel::Error,
                        EVENT_FORMAT_UNDETECTED,
                        &format!("Failed to detect configuration format of {}", self.url(privacy)),
                        error,
                    );
                })?,
        };

        parse_document(&content.text, format, &self.asset)
            .map_err(ErrorEnvelope::from)
            .or_report(|error| {
                self.log_error(
                    LogLevel::Error,
                    EVENT_PARSE_FAILED,
                    &format!("Failed to parse {format} configuration from {}", self.url(privacy)),
                    error,
                );
            })
    }

    fn resolve_include(&self, raw: &str) -> Vec<Arc<dyn Destination>> {
        let raw = raw.trim();
        let (schema, url) = match schema_of(raw) {
            Some(schema) => (schema, raw.to_owned()),
            None => {
                let path = Path::new(raw);
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    self.config_dir().join(path)
                };
                (DEFAULT_SOURCE_SCHEMA.to_owned(), file_url(&path))
            },
        };
        let loggable = loggable_url(&url, &self.asset);

        let Some(reader) = self.deps.readers.lookup(&schema) else {
            self.log(
                LogLevel::Warn,
                EVENT_INCLUDE_UNSUPPORTED,
                &format!("Unsupported include schema {schema}."),
            );
            return Vec::new();
        };

        if !reader
            .include_mode()
            .allows(&schema, self.reader.schemas(), self.insecure_includes)
        {
            self.log(
                LogLevel::Warn,
                EVENT_INCLUDE_REJECTED,
                &format!("Including {schema}:// based configuration is prohibited. Ignoring URL {loggable}"),
            );
            return Vec::new();
        }

        let options = ResolveOptions {
            recursion: self.recursion.saturating_sub(1),
            insecure_includes: self.insecure_includes,
            cache: CachePolicy::Disabled,
            config_format: None,
        };
        match Self::new(&url, options, self.deps.clone()) {
            Ok(child) => {
                let mut child = child.with_asset(Arc::clone(&self.asset));
                child.cache = CachePolicy::Disabled;
                child.resolve()
            },
            Err(error) => {
                self.log_error(
                    LogLevel::Warn,
                    EVENT_INCLUDE_FAILED,
                    &format!("Could not load include URL: {loggable}"),
                    &error,
                );
                Vec::new()
            },
        }
    }

    fn config_dir(&self) -> PathBuf {
        self.reader
            .base_dir(&self.location)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default()
    }

    fn log(&self, level: LogLevel, event: &str, message: &str) {
        if let Some(logger) = self.deps.logger.as_ref() {
            let fields = log_fields([("schema", self.location.schema())]);
            logger.log(LogEvent::new(level, event, message, Some(fields)));
        }
    }

    fn log_error(&self, level: LogLevel, event: &str, message: &str, error: &ErrorEnvelope) {
        if let Some(logger) = self.deps.logger.as_ref() {
            let fields = log_fields([("schema", self.location.schema())]);
            logger.log(LogEvent::new(level, event, message, Some(fields)).with_error(error));
        }
    }
}

/// `file://` URL for `path`, percent-encoded except for separators.
#[must_use]
pub fn file_url(path: &Path) -> String {
    format!(
        "{DEFAULT_SOURCE_SCHEMA}://{}",
        quote(&path.to_string_lossy(), "/\\:")
    )
}

fn unsupported_schema(schema: &str) -> ErrorEnvelope {
    ErrorEnvelope::expected(
        ErrorCode::new("include", "unregistered_scheme"),
        format!("no configuration reader serves `{schema}`"),
    )
    .with_metadata("schema", schema)
}
