//! Generic JSON and form webhooks (`json://`, `jsons://`, `form://`,
//! `forms://`).
//!
//! Query sigils carry the request shape: `+name` headers, `-name` GET
//! parameters and `:name` extra payload fields.

use super::common::{port_of, render_auth, render_port, render_query, trimmed};
use notifyconf_domain::encoding::{quote, unquote};
use notifyconf_domain::{
    ArgMap, AssetOptions, PluginDescriptor, PluginError, Sigil, TagSet, TokenSpec, TokenType,
    password_of,
};
use notifyconf_ports::{BuildContext, Destination, NotifyPlugin};
use notifyconf_shared::{Result, SecretString};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Request methods a webhook may use.
pub const METHODS: &[&str] = &["POST", "GET", "DELETE", "PUT", "HEAD", "PATCH"];

/// Payload encoding of a webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookKind {
    /// `application/json` body.
    Json,
    /// `multipart/form-data` body.
    Form,
}

impl WebhookKind {
    const fn protocols(self) -> (&'static str, &'static str) {
        match self {
            Self::Json => ("json", "jsons"),
            Self::Form => ("form", "forms"),
        }
    }

    const fn service_name(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Form => "Form",
        }
    }
}

/// Plugin serving one [`WebhookKind`].
#[derive(Debug)]
pub struct WebhookPlugin {
    kind: WebhookKind,
    descriptor: PluginDescriptor,
}

impl WebhookPlugin {
    /// Plugin for `kind`.
    #[must_use]
    pub fn new(kind: WebhookKind) -> Self {
        let (insecure, secure) = kind.protocols();
        let methods = METHODS.iter().map(|method| (*method).to_owned()).collect();
        let descriptor = PluginDescriptor::new(kind.service_name(), [insecure, secure])
            .token(TokenSpec::new("host", TokenType::String).required())
            .token(TokenSpec::new("port", TokenType::Int))
            .token(TokenSpec::new("user", TokenType::String))
            .token(TokenSpec::new("password", TokenType::String).private())
            .arg(TokenSpec::new("method", TokenType::Choice(methods)).with_default("POST"))
            .kwarg("headers", Sigil::Plus)
            .kwarg("params", Sigil::Minus)
            .kwarg("payload", Sigil::Colon);
        Self { kind, descriptor }
    }

    /// `json://` / `jsons://` plugin.
    #[must_use]
    pub fn json() -> Self {
        Self::new(WebhookKind::Json)
    }

    /// `form://` / `forms://` plugin.
    #[must_use]
    pub fn form() -> Self {
        Self::new(WebhookKind::Form)
    }
}

impl NotifyPlugin for WebhookPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn build(&self, args: &ArgMap, context: &BuildContext) -> Result<Arc<dyn Destination>> {
        Ok(Arc::new(Webhook::from_args(self.kind, args, context)?))
    }
}

/// A configured webhook.
#[derive(Debug, Clone)]
pub struct Webhook {
    kind: WebhookKind,
    secure: bool,
    user: Option<String>,
    password: Option<SecretString>,
    host: String,
    port: Option<u16>,
    fullpath: Option<String>,
    method: String,
    verify: bool,
    headers: BTreeMap<String, String>,
    params: BTreeMap<String, String>,
    payload: BTreeMap<String, String>,
    tags: TagSet,
    asset: Arc<AssetOptions>,
}

impl Webhook {
    fn from_args(
        kind: WebhookKind,
        args: &ArgMap,
        context: &BuildContext,
    ) -> std::result::Result<Self, PluginError> {
        let schema = args.get_str("schema").unwrap_or(kind.protocols().0).to_owned();
        let host = trimmed(args, "host").ok_or_else(|| PluginError::MissingToken {
            schema: schema.clone(),
            token: "host".to_owned(),
        })?;
        let method = trimmed(args, "method").map_or_else(|| "POST".to_owned(), |m| m.to_uppercase());
        if !METHODS.contains(&method.as_str()) {
            return Err(PluginError::InvalidValue {
                schema,
                token: "method".to_owned(),
                value: method,
            });
        }

        let secure = args.flag("secure", schema.ends_with('s'));
        let fullpath = trimmed(args, "fullpath").map(|path| unquote(&path));
        Ok(Self {
            kind,
            secure,
            user: trimmed(args, "user").map(|user| unquote(&user)),
            password: password_of(args).map(|password| SecretString::from(unquote(password.expose()))),
            port: port_of(args, &schema)?,
            host,
            fullpath,
            method,
            verify: args.flag("verify", true),
            headers: args.string_map("headers"),
            params: args.string_map("params"),
            payload: args.string_map("payload"),
            tags: context.tags.clone(),
            asset: Arc::clone(&context.asset),
        })
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Extra request headers.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Extra GET parameters.
    #[must_use]
    pub const fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Extra payload fields.
    #[must_use]
    pub const fn payload(&self) -> &BTreeMap<String, String> {
        &self.payload
    }

    /// Whether certificates are verified.
    #[must_use]
    pub const fn verify(&self) -> bool {
        self.verify
    }
}

impl Destination for Webhook {
    fn schema(&self) -> &str {
        let (insecure, secure) = self.kind.protocols();
        if self.secure { secure } else { insecure }
    }

    fn service_name(&self) -> &str {
        self.kind.service_name()
    }

    fn tags(&self) -> &TagSet {
        &self.tags
    }

    fn asset(&self) -> &AssetOptions {
        &self.asset
    }

    fn url(&self, privacy: bool) -> String {
        let mut pairs = vec![
            ("method".to_owned(), self.method.clone()),
            ("verify".to_owned(), if self.verify { "yes" } else { "no" }.to_owned()),
        ];
        let groups = [('+', &self.headers), ('-', &self.params), (':', &self.payload)];
        for (sigil, group) in groups {
            pairs.extend(group.iter().map(|(key, value)| (format!("{sigil}{key}"), value.clone())));
        }

        let default_port = if self.secure { 443 } else { 80 };
        format!(
            "{schema}://{auth}{host}{port}{path}?{query}",
            schema = self.schema(),
            auth = render_auth(self.user.as_deref(), self.password.as_ref(), privacy),
            host = self.host,
            port = render_port(self.port, default_port),
            path = self
                .fullpath
                .as_deref()
                .map_or_else(|| "/".to_owned(), |path| quote(path, "/")),
            query = render_query(pairs),
        )
    }
}
