//! Built-in notification plugins and the runtime plugin builder.

mod common;
mod custom;
mod mailto;
mod webhook;

pub use custom::{
    CustomDestination, CustomNotification, CustomPlugin, CustomPluginBuilder, SendCallback,
};
pub use mailto::{Email, MailtoPlugin, SECURE_MODES, is_email};
pub use webhook::{METHODS, Webhook, WebhookKind, WebhookPlugin};

use notifyconf_ports::NotifyPlugin;
use std::sync::Arc;

/// Every built-in plugin, ready for registration.
#[must_use]
pub fn builtin_plugins() -> Vec<Arc<dyn NotifyPlugin>> {
    vec![
        Arc::new(WebhookPlugin::json()),
        Arc::new(WebhookPlugin::form()),
        Arc::new(MailtoPlugin::new()),
    ]
}
