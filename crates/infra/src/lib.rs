//! # notifyconf-infra
//!
//! Infrastructure wiring and runtime composition.
//! This crate depends on `app`, `adapters`, `config`, and `shared`.

/// Format detection and masking helpers for CLI surfaces.
pub mod inspect;
/// Service URL and configuration source resolution facade.
pub mod resolve;
/// Registries, readers and logger wiring.
pub mod runtime;

pub use inspect::{Detection, FormatOrigin, detect_source, mask};
pub use resolve::{
    DestinationSummary, Resolution, ResolveRequest, SkippedInput, resolve_urls,
};
pub use runtime::{LoggerChoice, Runtime, RuntimeBuilder};

// Re-exported so CLI surfaces depend on infra alone.
pub use notifyconf_adapters::{CustomPluginBuilder, HttpReaderConfig};
pub use notifyconf_app::ResolveOptions;
pub use notifyconf_domain::{CachePolicy, ConfigFormat, TagSet, parse_list};
pub use notifyconf_shared::{ErrorCode, ErrorEnvelope, ErrorKind, REDACTED, is_secret_key};

/// Infra-level error type (shared error envelope).
pub type InfraError = ErrorEnvelope;

/// Infra-level result type.
pub type InfraResult<T> = Result<T, InfraError>;

/// Returns the infra crate version.
#[must_use]
pub const fn infra_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
