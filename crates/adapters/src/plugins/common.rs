//! Rendering helpers shared by the built-in plugins.

use notifyconf_domain::encoding::quote;
use notifyconf_domain::{ArgMap, ArgValue, MaskOptions, PluginError, QueryParts, mask_word};
use notifyconf_shared::SecretString;

/// Read the `port` argument, rejecting values outside `1..=65535`.
pub fn port_of(args: &ArgMap, schema: &str) -> Result<Option<u16>, PluginError> {
    let invalid = |value: String| PluginError::InvalidValue {
        schema: schema.to_owned(),
        token: "port".to_owned(),
        value,
    };
    match args.get("port") {
        None | Some(ArgValue::Null) => Ok(None),
        Some(ArgValue::Int(port)) => u16::try_from(*port)
            .ok()
            .filter(|port| *port > 0)
            .map(Some)
            .ok_or_else(|| invalid(port.to_string())),
        Some(other) => {
            let text = other.to_text();
            if text.trim().is_empty() {
                return Ok(None);
            }
            text.trim()
                .parse::<u16>()
                .ok()
                .filter(|port| *port > 0)
                .map(Some)
                .ok_or_else(|| invalid(text))
        },
    }
}

/// `user[:password]@`, quoted, with the password masked under `privacy`.
pub fn render_auth(user: Option<&str>, password: Option<&SecretString>, privacy: bool) -> String {
    let Some(user) = user.filter(|user| !user.is_empty()) else {
        return String::new();
    };
    let user = quote(user, "");
    match password.map(SecretString::expose).filter(|password| !password.is_empty()) {
        Some(password) if privacy => {
            format!("{user}:{}@", mask_word(password, MaskOptions::forced()))
        },
        Some(password) => format!("{user}:{}@", quote(password, "")),
        None => format!("{user}@"),
    }
}

/// `:port`, or nothing when it is the scheme default.
pub fn render_port(port: Option<u16>, default: u16) -> String {
    port.filter(|port| *port != default)
        .map(|port| format!(":{port}"))
        .unwrap_or_default()
}

/// Encode ordered query pairs.
pub fn render_query<I>(pairs: I) -> String
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut query = QueryParts::default();
    for (key, value) in pairs {
        query.insert(key, value);
    }
    query.to_query_string()
}

/// Text argument with surrounding whitespace removed; blank yields `None`.
pub fn trimmed(args: &ArgMap, key: &str) -> Option<String> {
    args.text(key)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports_are_range_checked() {
        let mut args = ArgMap::new();
        assert_eq!(port_of(&args, "json"), Ok(None));
        args.insert("port", ArgValue::Int(8080));
        assert_eq!(port_of(&args, "json"), Ok(Some(8080)));
        args.insert("port", "443");
        assert_eq!(port_of(&args, "json"), Ok(Some(443)));
        args.insert("port", ArgValue::Int(70_000));
        assert!(port_of(&args, "json").is_err());
        args.insert("port", "zero");
        assert!(port_of(&args, "json").is_err());
    }

    #[test]
    fn auth_masks_password_under_privacy() {
        let password = SecretString::from("hunter2");
        assert_eq!(render_auth(Some("user"), Some(&password), false), "user:hunter2@");
        assert_eq!(render_auth(Some("user"), Some(&password), true), "user:h...2@");
        assert_eq!(render_auth(Some("a b"), None, true), "a%20b@");
        assert_eq!(render_auth(None, Some(&password), false), "");
    }

    #[test]
    fn default_ports_are_omitted() {
        assert_eq!(render_port(Some(443), 443), "");
        assert_eq!(render_port(Some(8443), 443), ":8443");
        assert_eq!(render_port(None, 80), "");
    }
}
