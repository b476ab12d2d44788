//! SMTP e-mail (`mailto://`, `mailtos://`).

use super::common::{port_of, render_auth, render_port, render_query, trimmed};
use notifyconf_domain::encoding::{quote, unquote};
use notifyconf_domain::patterns::static_regex;
use notifyconf_domain::{
    ArgMap, AssetOptions, ArgValue, ParsedUrl, PluginDescriptor, PluginError, TagSet, TokenSpec,
    TokenType, parse_list, password_of, url_to_args,
};
use notifyconf_ports::{BuildContext, Destination, NotifyPlugin};
use notifyconf_shared::{Result, SecretString};
use regex::Regex;
use std::sync::{Arc, LazyLock};

static IS_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"^[^@\s/]+@[^@\s/]+\.[^@\s/]+$|^[^@\s/]+@[^@\s/.]+$"));

/// Secure transport modes.
pub const SECURE_MODES: &[&str] = &["insecure", "ssl", "starttls"];

const DEFAULT_PORT: u16 = 25;
const DEFAULT_SECURE_PORT: u16 = 587;

/// Returns true when `address` has the shape `local@domain`.
#[must_use]
pub fn is_email(address: &str) -> bool {
    IS_EMAIL.is_match(address.trim())
}

/// E-mail plugin.
#[derive(Debug)]
pub struct MailtoPlugin {
    descriptor: PluginDescriptor,
}

impl Default for MailtoPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl MailtoPlugin {
    /// Create the plugin.
    #[must_use]
    pub fn new() -> Self {
        let modes = SECURE_MODES.iter().map(|mode| (*mode).to_owned()).collect();
        let descriptor = PluginDescriptor::new("E-Mail", ["mailto", "mailtos"])
            .token(TokenSpec::new("host", TokenType::String).required())
            .token(TokenSpec::new("port", TokenType::Int))
            .token(TokenSpec::new("user", TokenType::String))
            .token(TokenSpec::new("password", TokenType::String).private())
            .token(TokenSpec::new("targets", TokenType::List))
            .arg(TokenSpec::new("to", TokenType::String).alias_of("targets"))
            .arg(TokenSpec::new("from", TokenType::String))
            .arg(TokenSpec::new("name", TokenType::String))
            .arg(TokenSpec::new("smtp", TokenType::String))
            .arg(TokenSpec::new("mode", TokenType::Choice(modes)));
        Self { descriptor }
    }
}

impl NotifyPlugin for MailtoPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn parse_url(&self, parsed: &ParsedUrl) -> Result<ArgMap> {
        let mut args = url_to_args(parsed, &self.descriptor);

        // Path segments are recipients, listed ahead of any `?to=`.
        let mut targets: Vec<ArgValue> = parsed
            .fullpath
            .as_deref()
            .unwrap_or_default()
            .split('/')
            .map(unquote)
            .filter(|segment| !segment.trim().is_empty())
            .map(ArgValue::Str)
            .collect();
        if let Some(existing) = args.remove("targets") {
            targets.extend(existing.to_strings().into_iter().map(ArgValue::Str));
        }
        if !targets.is_empty() {
            args.insert("targets", ArgValue::List(targets));
        }
        Ok(args)
    }

    fn build(&self, args: &ArgMap, context: &BuildContext) -> Result<Arc<dyn Destination>> {
        Ok(Arc::new(Email::from_args(args, context)?))
    }
}

/// A configured e-mail destination.
#[derive(Debug, Clone)]
pub struct Email {
    secure: bool,
    user: Option<String>,
    password: Option<SecretString>,
    host: String,
    port: Option<u16>,
    from: Option<String>,
    name: Option<String>,
    smtp: Option<String>,
    mode: String,
    verify: bool,
    targets: Vec<String>,
    tags: TagSet,
    asset: Arc<AssetOptions>,
}

impl Email {
    fn from_args(args: &ArgMap, context: &BuildContext) -> std::result::Result<Self, PluginError> {
        let schema = args.get_str("schema").unwrap_or("mailto").to_owned();
        let invalid = |token: &str, value: String| PluginError::InvalidValue {
            schema: schema.clone(),
            token: token.to_owned(),
            value,
        };

        let host = trimmed(args, "host").ok_or_else(|| PluginError::MissingToken {
            schema: schema.clone(),
            token: "host".to_owned(),
        })?;
        let user = trimmed(args, "user").map(|user| unquote(&user));
        let secure = args.flag("secure", schema.ends_with('s'));
        let mode = trimmed(args, "mode").map_or_else(
            || if secure { "starttls" } else { "insecure" }.to_owned(),
            |mode| mode.to_lowercase(),
        );
        if !SECURE_MODES.contains(&mode.as_str()) {
            return Err(invalid("mode", mode));
        }

        let from = trimmed(args, "from").map(|from| unquote(&from));
        if let Some(from) = from.as_ref().filter(|from| !is_email(from)) {
            return Err(invalid("from", from.clone()));
        }
        let sender = from.clone().or_else(|| {
            user.as_ref().map(|user| {
                if user.contains('@') {
                    user.clone()
                } else {
                    format!("{user}@{host}")
                }
            })
        });
        let Some(sender) = sender else {
            return Err(PluginError::Construction {
                schema,
                message: "no from address could be determined".to_owned(),
            });
        };

        let raw_targets = args
            .get("targets")
            .map(ArgValue::to_strings)
            .unwrap_or_default();
        let mut targets = parse_list(raw_targets);
        if let Some(bad) = targets.iter().find(|target| !is_email(target)) {
            return Err(invalid("targets", bad.clone()));
        }
        if targets.is_empty() {
            targets.push(sender);
        }

        Ok(Self {
            secure,
            password: password_of(args).map(|password| SecretString::from(unquote(password.expose()))),
            port: port_of(args, &schema)?,
            user,
            host,
            from,
            name: trimmed(args, "name"),
            smtp: trimmed(args, "smtp"),
            mode,
            verify: args.flag("verify", true),
            targets,
            tags: context.tags.clone(),
            asset: Arc::clone(&context.asset),
        })
    }

    /// Recipients.
    #[must_use]
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Sender address.
    #[must_use]
    pub fn from_address(&self) -> String {
        self.from.clone().unwrap_or_else(|| {
            let user = self.user.as_deref().unwrap_or_default();
            if user.contains('@') {
                user.to_owned()
            } else {
                format!("{user}@{}", self.host)
            }
        })
    }

    /// SMTP server to connect to.
    #[must_use]
    pub fn smtp_host(&self) -> &str {
        self.smtp.as_deref().unwrap_or(&self.host)
    }

    /// Secure transport mode.
    #[must_use]
    pub fn mode(&self) -> &str {
        &self.mode
    }
}

impl Destination for Email {
    fn schema(&self) -> &str {
        if self.secure { "mailtos" } else { "mailto" }
    }

    fn service_name(&self) -> &str {
        "E-Mail"
    }

    fn tags(&self) -> &TagSet {
        &self.tags
    }

    fn asset(&self) -> &AssetOptions {
        &self.asset
    }

    fn url(&self, privacy: bool) -> String {
        let mut pairs = vec![
            ("mode".to_owned(), self.mode.clone()),
            ("verify".to_owned(), if self.verify { "yes" } else { "no" }.to_owned()),
        ];
        let optional = [("from", &self.from), ("name", &self.name), ("smtp", &self.smtp)];
        for (key, value) in optional {
            if let Some(value) = value {
                pairs.push((key.to_owned(), value.clone()));
            }
        }

        let path = if self.targets == [self.from_address()] {
            String::new()
        } else {
            self.targets
                .iter()
                .map(|target| quote(target, "@"))
                .collect::<Vec<_>>()
                .join("/")
        };
        let default_port = if self.secure {
            DEFAULT_SECURE_PORT
        } else {
            DEFAULT_PORT
        };
        format!(
            "{schema}://{auth}{host}{port}/{path}?{query}",
            schema = self.schema(),
            auth = render_auth(self.user.as_deref(), self.password.as_ref(), privacy),
            host = self.host,
            port = render_port(self.port, default_port),
            query = render_query(pairs),
        )
    }
}
