//! Argument remapping driven by a plugin descriptor.
//!
//! Two passes run in order:
//!
//! 1. **Prefix aggregation**: keys such as `+X-Token` are folded into the
//!    keyword group declared for their sigil (`headers`, `payload`, ...).
//! 2. **Alias renaming**: arguments declaring `alias_of` or `map_to` move
//!    into their target, creating it as a list when the target is a list
//!    and coercing to text when the target is a string.

use crate::args::{ArgMap, ArgValue};
use crate::descriptor::PluginDescriptor;
use std::collections::BTreeMap;

/// Apply prefix aggregation and alias renaming to `tokens`.
#[must_use]
pub fn remap_special_tokens(descriptor: &PluginDescriptor, mut tokens: ArgMap) -> ArgMap {
    aggregate_prefixed(descriptor, &mut tokens);
    rename_aliases(descriptor, &mut tokens);
    tokens
}

fn aggregate_prefixed(descriptor: &PluginDescriptor, tokens: &mut ArgMap) {
    for kwarg in descriptor.kwargs() {
        let prefix = kwarg.prefix.as_char();
        let matches: BTreeMap<String, ArgValue> = tokens
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(prefix)
                    .map(|stripped| (stripped.to_owned(), ArgValue::Str(value.to_text())))
            })
            .collect();
        if matches.is_empty() {
            continue;
        }

        tokens.retain(|key, _| !key.starts_with(prefix));
        let group = tokens
            .entry(kwarg.name.clone())
            .or_insert_with(|| ArgValue::Map(BTreeMap::new()));
        if !matches!(group, ArgValue::Map(_)) {
            *group = ArgValue::Map(BTreeMap::new());
        }
        if let ArgValue::Map(entries) = group {
            entries.extend(matches);
        }
    }
}

fn rename_aliases(descriptor: &PluginDescriptor, tokens: &mut ArgMap) {
    let keys: Vec<String> = tokens.keys().cloned().collect();
    for key in keys {
        let Some(arg) = descriptor.args().get(&key) else {
            continue;
        };
        let map_to = arg
            .alias_of
            .as_deref()
            .or(arg.map_to.as_deref())
            .unwrap_or(&key)
            .to_owned();
        if map_to == key {
            continue;
        }

        let meta = descriptor
            .tokens()
            .get(&map_to)
            .or_else(|| descriptor.args().get(&map_to))
            .unwrap_or(arg);
        let Some(mut value) = tokens.remove(&key) else {
            continue;
        };

        let is_list = meta.kind.is_list();
        match tokens.get_mut(&map_to) {
            None => {
                if is_list {
                    tokens.insert(map_to.clone(), ArgValue::List(Vec::new()));
                } else if let Some(default) = &meta.default {
                    tokens.insert(map_to.clone(), default.clone());
                }
            },
            Some(current) if is_list && !current.is_list() => {
                let scalar = std::mem::replace(current, ArgValue::Null);
                *current = ArgValue::List(vec![scalar]);
            },
            Some(_) => {},
        }

        if meta.kind.is_string() && !matches!(value, ArgValue::Str(_)) {
            value = ArgValue::Str(value.to_text());
        }

        let absolute = meta.map_to.clone().unwrap_or_else(|| map_to.clone());
        let target_is_list = tokens.get(&map_to).is_some_and(ArgValue::is_list);
        if target_is_list {
            match tokens.get_mut(&absolute) {
                Some(ArgValue::List(items)) => items.push(value),
                _ => {
                    tokens.insert(absolute, ArgValue::List(vec![value]));
                },
            }
        } else {
            tokens.insert(absolute, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{TokenSpec, TokenType};
    use crate::query::Sigil;

    fn mail_like() -> PluginDescriptor {
        PluginDescriptor::new("Mail", ["mailto"])
            .token(TokenSpec::new("host", TokenType::String))
            .token(TokenSpec::new("targets", TokenType::List))
            .arg(TokenSpec::new("to", TokenType::String).alias_of("targets"))
            .arg(TokenSpec::new("from", TokenType::String).map_to("from_addr"))
            .arg(TokenSpec::new("priority", TokenType::String).map_to("level"))
            .arg(TokenSpec::new("level", TokenType::String).with_default("normal"))
            .kwarg("headers", Sigil::Plus)
            .kwarg("payload", Sigil::Colon)
    }

    fn list(items: &[&str]) -> ArgValue {
        ArgValue::List(items.iter().map(|item| ArgValue::from(*item)).collect())
    }

    #[test]
    fn prefixed_keys_fold_into_keyword_groups() {
        let mut tokens = ArgMap::new();
        tokens.insert("+X-Token", "abc");
        tokens.insert(":count", ArgValue::Int(3));
        tokens.insert("headers", "not a map");
        let tokens = remap_special_tokens(&mail_like(), tokens);

        assert!(!tokens.contains_key("+X-Token"));
        assert_eq!(
            tokens.string_map("headers").get("X-Token").map(String::as_str),
            Some("abc")
        );
        assert_eq!(
            tokens.string_map("payload").get("count").map(String::as_str),
            Some("3")
        );
    }

    #[test]
    fn alias_promotes_into_list() {
        let mut tokens = ArgMap::new();
        tokens.insert("to", "a@example.com");
        let tokens = remap_special_tokens(&mail_like(), tokens);

        assert!(!tokens.contains_key("to"));
        assert_eq!(tokens.get("targets"), Some(&list(&["a@example.com"])));
    }

    #[test]
    fn alias_wraps_existing_scalar_target() {
        let mut tokens = ArgMap::new();
        tokens.insert("targets", "first@example.com");
        tokens.insert("to", ArgValue::Int(7));
        let tokens = remap_special_tokens(&mail_like(), tokens);

        assert_eq!(
            tokens.get("targets"),
            Some(&ArgValue::List(vec![
                ArgValue::from("first@example.com"),
                ArgValue::Int(7),
            ]))
        );
    }

    #[test]
    fn map_to_renames_and_coerces_to_text() {
        let mut tokens = ArgMap::new();
        tokens.insert("from", ArgValue::Int(5));
        tokens.insert("priority", "high");
        let tokens = remap_special_tokens(&mail_like(), tokens);

        assert_eq!(tokens.get("from_addr"), Some(&ArgValue::from("5")));
        assert_eq!(tokens.get("level"), Some(&ArgValue::from("high")));
        assert!(!tokens.contains_key("priority"));
    }
}
