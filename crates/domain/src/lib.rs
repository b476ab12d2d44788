//! # notifyconf-domain
//!
//! Value types and pure parsing rules for notification configuration.
//!
//! - **URLs** - `parse_url`, `ParsedUrl`, host validation, path tidying
//! - **Query dialect** - `QueryParts` with `+`/`-`/`:` partitions
//! - **Helpers** - `parse_bool`, `parse_list`, `parse_urls`
//! - **Tags** - `TagSet`, `TagGroups`
//! - **Arguments** - `ArgValue`, `ArgMap`, `url_to_args`, `post_process`
//! - **Plugins** - `PluginDescriptor`, `TokenSpec`, alias/prefix remapping
//! - **Policies** - `ConfigFormat`, `IncludeMode`, `CachePolicy`
//! - **Redaction** - `mask_word`, `mask_url`
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No I/O; nothing here touches the filesystem or network

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use notifyconf_shared::shared_crate_version;

// =============================================================================
// DOMAIN MODULES
// =============================================================================

pub mod args;
pub mod asset;
pub mod descriptor;
pub mod encoding;
pub mod fields;
pub mod format;
pub mod host;
pub mod parse;
pub mod patterns;
pub mod policy;
pub mod query;
pub mod redact;
pub mod remap;
pub mod tags;
pub mod url;

pub use args::{ArgMap, ArgValue};
pub use asset::{AssetError, AssetOptions};
pub use descriptor::{KwargSpec, PluginDescriptor, PluginError, TokenSpec, TokenType};
pub use fields::{STRUCTURAL_KEYS, base_args, password_of, post_process, url_to_args};
pub use format::{ConfigFormat, UnknownFormat};
pub use host::{HostRules, is_hostname, is_ipaddr};
pub use parse::{is_valid_token, parse_bool, parse_list, parse_urls};
pub use policy::{CachePolicy, IncludeMode, InvalidCache};
pub use query::{QueryParts, Sigil, parse_qsd};
pub use redact::{MaskOptions, mask_url, mask_word};
pub use remap::remap_special_tokens;
pub use tags::{TagGroups, TagSet};
pub use url::{
    DEFAULT_SCHEMA, ParseOptions, ParsedUrl, UrlError, parse_url, schema_of, tidy_path, url_path,
};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// =============================================================================
// TESTS
// =============================================================================
