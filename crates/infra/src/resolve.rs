//! One-call resolution of service URLs and configuration sources.

use crate::runtime::Runtime;
use notifyconf_app::{ConfigSource, EntryOutcome, LoadContext, ResolveOptions, load_url};
use notifyconf_domain::{AssetOptions, TagSet, mask_url, parse_urls};
use notifyconf_ports::Destination;
use serde::Serialize;
use std::sync::Arc;

/// What to resolve.
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    /// Service URLs; each string may hold several separated by commas or
    /// whitespace. Duplicates collapse and the result is sorted.
    pub urls: Vec<String>,
    /// Configuration source URLs or paths.
    pub configs: Vec<String>,
    /// Tags given to every service URL.
    pub tags: TagSet,
    /// Options for every configuration source.
    pub options: ResolveOptions,
}

/// An input that produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedInput {
    /// Masked input URL.
    pub url: String,
    /// Stable error code.
    pub code: String,
    /// Reason.
    pub message: String,
}

/// Outcome of [`resolve_urls`].
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Destinations: service URLs first, then each source in order.
    pub destinations: Vec<Arc<dyn Destination>>,
    /// Service URLs that failed and sources that could not be opened.
    pub skipped: Vec<SkippedInput>,
}

impl Resolution {
    /// Serializable view of every destination.
    #[must_use]
    pub fn summaries(&self, privacy: bool) -> Vec<DestinationSummary> {
        self.destinations
            .iter()
            .map(|destination| DestinationSummary::of(destination.as_ref(), privacy))
            .collect()
    }
}

/// Printable description of a destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationSummary {
    /// Schema it was built for.
    pub schema: String,
    /// Service name.
    pub service_name: String,
    /// Canonical URL, masked under privacy.
    pub url: String,
    /// Sorted tags.
    pub tags: Vec<String>,
}

impl DestinationSummary {
    /// Describe `destination`.
    #[must_use]
    pub fn of(destination: &dyn Destination, privacy: bool) -> Self {
        Self {
            schema: destination.schema().to_owned(),
            service_name: destination.service_name().to_owned(),
            url: destination.url(privacy),
            tags: destination.tags().iter().cloned().collect(),
        }
    }
}

/// Build destinations from service URLs and configuration sources.
///
/// Failures never abort the call: a bad service URL or an unopenable
/// source lands in [`Resolution::skipped`], and problems inside a source
/// are logged by the source itself.
#[tracing::instrument(
    name = "resolve_urls",
    skip_all,
    fields(urls = request.urls.len(), configs = request.configs.len())
)]
pub fn resolve_urls(runtime: &Runtime, request: &ResolveRequest) -> Resolution {
    let mut resolution = Resolution::default();
    let context = LoadContext {
        registry: runtime.plugins(),
        logger: runtime.logger(),
    };
    let asset = Arc::new(AssetOptions::default());

    for url in parse_urls(&request.urls) {
        match load_url(context, &url, request.tags.clone(), &asset) {
            EntryOutcome::Loaded(destination) => resolution.destinations.push(destination),
            EntryOutcome::Skipped(reason) => resolution.skipped.push(SkippedInput {
                url: mask_url(&url),
                code: reason.error_code().to_string(),
                message: reason.to_string(),
            }),
        }
    }

    for config in &request.configs {
        match ConfigSource::new(config, request.options, runtime.deps()) {
            Ok(mut source) => resolution.destinations.extend(source.resolve()),
            Err(error) => resolution.skipped.push(SkippedInput {
                url: mask_url(config),
                code: error.code.to_string(),
                message: error.message,
            }),
        }
    }

    tracing::debug!(
        destinations = resolution.destinations.len(),
        skipped = resolution.skipped.len(),
        "resolution finished"
    );
    resolution
}
