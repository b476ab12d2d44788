//! Turning parsed documents and service URLs into destinations.
//!
//! Every entry yields an [`EntryOutcome`]; a bad entry never stops the
//! entries after it. Problems are logged with masked URLs.

use crate::registry::PluginRegistry;
use notifyconf_config::{EntryOrigin, ParsedDocument, ServiceEntry};
use notifyconf_domain::{
    ArgMap, AssetOptions, ParseOptions, TagGroups, TagSet, is_valid_token, mask_url, parse_url,
    post_process, remap_special_tokens, schema_of,
};
use notifyconf_ports::{BuildContext, Destination, LoggerPort, NotifyPlugin, log_fields};
use notifyconf_shared::{ErrorCode, ErrorEnvelope};
use std::fmt;
use std::sync::Arc;

/// An entry was dropped.
pub const EVENT_ENTRY_SKIPPED: &str = "config.entry.skipped";
/// An entry produced a destination.
pub const EVENT_ENTRY_LOADED: &str = "config.entry.loaded";
/// A token was removed before construction.
pub const EVENT_TOKEN_INVALID: &str = "config.token.invalid";
/// A tag group had no members.
pub const EVENT_GROUP_EMPTY: &str = "config.group.empty";

/// Why an entry did not produce a destination.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The URL does not parse.
    Unparseable {
        /// Masked URL.
        url: String,
    },
    /// No plugin serves the schema.
    UnregisteredScheme {
        /// Requested schema.
        schema: String,
    },
    /// The plugin rejected its arguments.
    Construction(ErrorEnvelope),
}

impl SkipReason {
    /// Stable error code for the reason.
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Unparseable { .. } => ErrorCode::new("url", "malformed_url"),
            Self::UnregisteredScheme { .. } => ErrorCode::new("plugin", "unregistered_scheme"),
            Self::Construction(error) => error.code.clone(),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unparseable { url } => write!(formatter, "unparseable URL {url}"),
            Self::UnregisteredScheme { schema } => write!(formatter, "unsupported schema {schema}"),
            Self::Construction(error) => write!(formatter, "{}", error.message),
        }
    }
}

/// Result of loading one entry.
#[derive(Debug, Clone)]
pub enum EntryOutcome {
    /// A destination was built.
    Loaded(Arc<dyn Destination>),
    /// The entry was dropped.
    Skipped(SkipReason),
}

impl EntryOutcome {
    /// The destination, when one was built.
    #[must_use]
    pub fn destination(self) -> Option<Arc<dyn Destination>> {
        match self {
            Self::Loaded(destination) => Some(destination),
            Self::Skipped(_) => None,
        }
    }

    /// Returns true when a destination was built.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// What a document contributed.
#[derive(Debug, Clone, Default)]
pub struct LoadedDocument {
    /// One outcome per service entry, in document order.
    pub outcomes: Vec<EntryOutcome>,
    /// Include directives, unresolved.
    pub includes: Vec<String>,
}

impl LoadedDocument {
    /// Built destinations in document order.
    #[must_use]
    pub fn destinations(&self) -> Vec<Arc<dyn Destination>> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                EntryOutcome::Loaded(destination) => Some(Arc::clone(destination)),
                EntryOutcome::Skipped(_) => None,
            })
            .collect()
    }
}

/// Collaborators used while loading entries.
#[derive(Clone, Copy)]
pub struct LoadContext<'a> {
    /// Plugins to build with.
    pub registry: &'a PluginRegistry,
    /// Optional logger.
    pub logger: Option<&'a dyn LoggerPort>,
}

impl LoadContext<'_> {
    fn warn(&self, event: &str, message: &str, origin: Option<EntryOrigin>) {
        if let Some(logger) = self.logger {
            let fields = origin.map(|origin| log_fields([("origin", origin.to_string())]));
            logger.warn(event, message, fields);
        }
    }
}

/// Build every entry of `document` and collect its includes.
///
/// Parser warnings are logged here. Entries use the document's own asset
/// section when it has one, else `base_asset`.
pub fn load_document(
    context: LoadContext<'_>,
    document: ParsedDocument,
    base_asset: &Arc<AssetOptions>,
) -> LoadedDocument {
    for warning in &document.warnings {
        context.warn(warning.event, &warning.message, None);
    }

    let asset = document.asset.map_or_else(|| Arc::clone(base_asset), Arc::new);
    let mut groups = document.groups;
    for group in groups.normalize() {
        context.warn(
            EVENT_GROUP_EMPTY,
            &format!("Dropped empty tag group {group}"),
            None,
        );
    }

    let outcomes = document
        .entries
        .iter()
        .map(|entry| load_entry(context, entry, &groups, &asset))
        .collect();

    LoadedDocument {
        outcomes,
        includes: document.includes,
    }
}

/// Build a destination from a bare service URL.
pub fn load_url(
    context: LoadContext<'_>,
    url: &str,
    tags: TagSet,
    asset: &Arc<AssetOptions>,
) -> EntryOutcome {
    let entry = ServiceEntry {
        url: url.trim().to_owned(),
        overrides: None,
        tags,
        origin: EntryOrigin::Line(1),
    };
    load_entry(context, &entry, &TagGroups::new(), asset)
}

/// Build one service entry.
///
/// The URL is parsed by its plugin; YAML tokens are remapped and layered
/// over the result. When the URL itself does not parse but tokens exist,
/// the tokens alone (plus the schema) are used.
pub fn load_entry(
    context: LoadContext<'_>,
    entry: &ServiceEntry,
    groups: &TagGroups,
    asset: &Arc<AssetOptions>,
) -> EntryOutcome {
    let loggable = loggable_url(&entry.url, asset);
    let skip = |reason: SkipReason| {
        context.warn(
            EVENT_ENTRY_SKIPPED,
            &format!("Skipped {loggable}: {reason}"),
            Some(entry.origin),
        );
        EntryOutcome::Skipped(reason)
    };

    let Some(schema) = schema_of(&entry.url) else {
        return skip(SkipReason::Unparseable {
            url: loggable.clone(),
        });
    };
    let Some(plugin) = context.registry.lookup(&schema) else {
        return skip(SkipReason::UnregisteredScheme { schema });
    };

    let Some(mut args) = entry_args(plugin.as_ref(), &schema, entry) else {
        return skip(SkipReason::Unparseable {
            url: loggable.clone(),
        });
    };

    let invalid: Vec<String> = args.keys().filter(|key| !is_valid_token(key)).cloned().collect();
    for key in invalid {
        context.warn(
            EVENT_TOKEN_INVALID,
            &format!("Ignoring invalid token ({key}) found in {}", entry.origin),
            Some(entry.origin),
        );
        args.remove(&key);
    }
    post_process(&mut args);

    let mut tags = entry.tags.clone();
    groups.apply(&mut tags);
    let build = BuildContext {
        tags,
        asset: Arc::clone(asset),
    };

    match context.registry.instantiate(&schema, args, &build) {
        Ok(destination) => {
            if let Some(logger) = context.logger {
                logger.debug(
                    EVENT_ENTRY_LOADED,
                    &format!("Loaded URL: {}", destination.url(asset.secure_logging)),
                    None,
                );
            }
            EntryOutcome::Loaded(destination)
        },
        Err(error) => skip(SkipReason::Construction(error)),
    }
}

fn entry_args(plugin: &dyn NotifyPlugin, schema: &str, entry: &ServiceEntry) -> Option<ArgMap> {
    let options = ParseOptions {
        strict_host: plugin.strict_host(),
        ..ParseOptions::default()
    };
    let parsed = parse_url(&entry.url, &options)
        .map_err(ErrorEnvelope::from)
        .and_then(|parsed| plugin.parse_url(&parsed));

    let Some(overrides) = &entry.overrides else {
        return parsed.ok();
    };
    let mut args = parsed.unwrap_or_else(|_| {
        let mut minimal = ArgMap::new();
        minimal.insert("schema", schema);
        minimal
    });

    let mut overrides = overrides.clone();
    overrides.remove("schema");
    args.update(remap_special_tokens(plugin.descriptor(), overrides));
    Some(args)
}

/// Mask `url` unless the asset disables secure logging.
#[must_use]
pub fn loggable_url(url: &str, asset: &AssetOptions) -> String {
    if asset.secure_logging {
        mask_url(url)
    } else {
        url.to_owned()
    }
}
