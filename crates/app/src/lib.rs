//! # notifyconf-app
//!
//! Resolution use cases: the plugin registry, document loading, and
//! configuration sources with recursive include resolution.
//! This crate depends on `ports`, `config`, `domain`, and `shared`.

pub mod load;
pub mod reader_registry;
pub mod registry;
pub mod source;

pub use load::{
    EntryOutcome, LoadContext, LoadedDocument, SkipReason, load_document, load_entry, load_url,
    loggable_url,
};
pub use reader_registry::ReaderRegistry;
pub use registry::PluginRegistry;
pub use source::{ConfigSource, DEFAULT_SOURCE_SCHEMA, ResolveOptions, ResolverDeps, file_url};

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
