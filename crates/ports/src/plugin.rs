//! Notification plugins and the destinations they build.

use notifyconf_domain::{
    ArgMap, AssetOptions, ParsedUrl, PluginDescriptor, PluginError, TagSet, url_to_args,
};
use notifyconf_shared::Result;
use std::fmt;
use std::sync::Arc;

/// A message handed to a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Optional title.
    pub title: Option<String>,
    /// Body text.
    pub body: String,
}

impl Message {
    /// Message with a body only.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            title: None,
            body: body.into(),
        }
    }
}

/// Context passed to a plugin when it builds a destination.
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    /// Tags the destination carries (groups already applied).
    pub tags: TagSet,
    /// Asset options of the owning document.
    pub asset: Arc<AssetOptions>,
}

/// A configured notification destination.
pub trait Destination: Send + Sync + fmt::Debug {
    /// Schema the destination was built from.
    fn schema(&self) -> &str;

    /// Human-readable service name.
    fn service_name(&self) -> &str;

    /// Tags carried by the destination.
    fn tags(&self) -> &TagSet;

    /// Asset options of the document the destination came from.
    fn asset(&self) -> &AssetOptions;

    /// Canonical URL; secrets are masked when `privacy` is set.
    fn url(&self, privacy: bool) -> String;

    /// Deliver a message.
    ///
    /// Destinations without a transport report
    /// [`PluginError::DeliveryUnsupported`].
    fn notify(&self, _message: &Message) -> Result<()> {
        Err(PluginError::DeliveryUnsupported {
            schema: self.schema().to_owned(),
        }
        .into())
    }
}

/// A notification plugin: a descriptor plus a constructor.
pub trait NotifyPlugin: Send + Sync {
    /// Static description of schemas and arguments.
    fn descriptor(&self) -> &PluginDescriptor;

    /// Whether service URLs for this plugin need a valid host and a numeric
    /// port before [`NotifyPlugin::parse_url`] sees them.
    fn strict_host(&self) -> bool {
        true
    }

    /// Convert a parsed URL into constructor arguments.
    fn parse_url(&self, parsed: &ParsedUrl) -> Result<ArgMap> {
        Ok(url_to_args(parsed, self.descriptor()))
    }

    /// Build a destination from arguments.
    fn build(&self, args: &ArgMap, context: &BuildContext) -> Result<Arc<dyn Destination>>;
}
