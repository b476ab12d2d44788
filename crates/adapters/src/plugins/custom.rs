//! Plugins defined at runtime from a schema and a send callback.
//!
//! ```
//! use notifyconf_adapters::CustomPluginBuilder;
//!
//! let plugin = CustomPluginBuilder::new("mycall", |notification| {
//!     println!("{}: {}", notification.url, notification.message.body);
//!     Ok(())
//! })
//! .name("My Callback")
//! .build();
//! assert!(plugin.is_ok());
//! ```

use super::common::{port_of, render_auth, render_port, render_query, trimmed};
use notifyconf_domain::{
    ArgMap, AssetOptions, ParsedUrl, PluginDescriptor, PluginError, STRUCTURAL_KEYS, TagSet,
    TokenSpec, base_args, mask_url, password_of, post_process, schema_of,
};
use notifyconf_ports::{BuildContext, Destination, Message, NotifyPlugin};
use notifyconf_shared::{Result, SecretString};
use std::fmt;
use std::sync::Arc;

/// What a send callback receives.
#[derive(Debug)]
pub struct CustomNotification<'a> {
    /// Message to deliver.
    pub message: &'a Message,
    /// Full destination URL, secrets included.
    pub url: &'a str,
    /// Arguments the destination was built from.
    pub args: &'a ArgMap,
}

/// Send callback of a custom plugin.
pub type SendCallback = Arc<dyn Fn(&CustomNotification<'_>) -> Result<()> + Send + Sync>;

/// Builder for a runtime-defined plugin.
pub struct CustomPluginBuilder {
    schema: String,
    name: Option<String>,
    tokens: Vec<TokenSpec>,
    send: SendCallback,
}

impl fmt::Debug for CustomPluginBuilder {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CustomPluginBuilder")
            .field("schema", &self.schema)
            .field("name", &self.name)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl CustomPluginBuilder {
    /// Start a plugin serving `schema` that delivers through `send`.
    pub fn new<F>(schema: impl Into<String>, send: F) -> Self
    where
        F: Fn(&CustomNotification<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            schema: schema.into(),
            name: None,
            tokens: Vec::new(),
            send: Arc::new(send),
        }
    }

    /// Human-readable service name (defaults to `Custom - <schema>`).
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declare a token; required tokens are checked on construction.
    #[must_use]
    pub fn token(mut self, spec: TokenSpec) -> Self {
        self.tokens.push(spec);
        self
    }

    /// Validate the schema and produce the plugin.
    pub fn build(self) -> std::result::Result<CustomPlugin, PluginError> {
        let schema = self.schema.trim().to_lowercase();
        let canonical = schema_of(&format!("{schema}://"));
        if canonical.as_deref() != Some(schema.as_str()) {
            return Err(PluginError::InvalidValue {
                schema: self.schema.clone(),
                token: "schema".to_owned(),
                value: self.schema,
            });
        }

        let name = self
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("Custom - {schema}"));
        let descriptor = self
            .tokens
            .into_iter()
            .fold(PluginDescriptor::new(name, [schema.as_str()]), PluginDescriptor::token);
        Ok(CustomPlugin {
            descriptor,
            send: self.send,
        })
    }
}

/// A plugin produced by [`CustomPluginBuilder`].
pub struct CustomPlugin {
    descriptor: PluginDescriptor,
    send: SendCallback,
}

impl fmt::Debug for CustomPlugin {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CustomPlugin")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl NotifyPlugin for CustomPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    /// Hosts are free-form; the callback decides what they mean.
    fn strict_host(&self) -> bool {
        false
    }

    /// Every query entry is kept, declared or not.
    fn parse_url(&self, parsed: &ParsedUrl) -> Result<ArgMap> {
        let mut args = base_args(parsed);
        for (key, value) in parsed.params.qsd() {
            if !STRUCTURAL_KEYS.contains(&key.as_str()) {
                args.insert(key.clone(), value.as_str());
            }
        }
        post_process(&mut args);
        Ok(args)
    }

    fn build(&self, args: &ArgMap, context: &BuildContext) -> Result<Arc<dyn Destination>> {
        let schema = self
            .descriptor
            .schemas()
            .first()
            .cloned()
            .unwrap_or_default();
        Ok(Arc::new(CustomDestination {
            service_name: self.descriptor.service_name().to_owned(),
            user: trimmed(args, "user"),
            password: password_of(args),
            host: args.text("host").unwrap_or_default(),
            port: port_of(args, &schema)?,
            fullpath: trimmed(args, "fullpath"),
            query: args.string_map("qsd").into_iter().collect(),
            schema,
            args: args.clone(),
            send: Arc::clone(&self.send),
            tags: context.tags.clone(),
            asset: Arc::clone(&context.asset),
        }))
    }
}

/// Destination built by a [`CustomPlugin`].
pub struct CustomDestination {
    schema: String,
    service_name: String,
    user: Option<String>,
    password: Option<SecretString>,
    host: String,
    port: Option<u16>,
    fullpath: Option<String>,
    query: Vec<(String, String)>,
    args: ArgMap,
    send: SendCallback,
    tags: TagSet,
    asset: Arc<AssetOptions>,
}

impl fmt::Debug for CustomDestination {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CustomDestination")
            .field("url", &self.url(true))
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

impl Destination for CustomDestination {
    fn schema(&self) -> &str {
        &self.schema
    }

    fn service_name(&self) -> &str {
        &self.service_name
    }

    fn tags(&self) -> &TagSet {
        &self.tags
    }

    fn asset(&self) -> &AssetOptions {
        &self.asset
    }

    fn url(&self, privacy: bool) -> String {
        let mut url = format!(
            "{schema}://{auth}{host}{port}{path}",
            schema = self.schema,
            auth = render_auth(self.user.as_deref(), self.password.as_ref(), false),
            host = self.host,
            port = render_port(self.port, 0),
            path = self.fullpath.as_deref().unwrap_or_default(),
        );
        if !self.query.is_empty() {
            url.push('?');
            url.push_str(&render_query(self.query.iter().cloned()));
        }
        if privacy { mask_url(&url) } else { url }
    }

    fn notify(&self, message: &Message) -> Result<()> {
        let url = self.url(false);
        (self.send)(&CustomNotification {
            message,
            url: &url,
            args: &self.args,
        })
    }
}
