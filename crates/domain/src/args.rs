//! Loosely typed plugin arguments.
//!
//! Both URL parsing and YAML token blocks end up as an [`ArgMap`]: a
//! string-keyed map of [`ArgValue`]s that plugins read and validate when
//! they build a destination.

use crate::parse::parse_bool;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// A single argument value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// Explicitly empty.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Str(String),
    /// Ordered list.
    List(Vec<ArgValue>),
    /// Nested string-keyed map.
    Map(BTreeMap<String, ArgValue>),
}

impl ArgValue {
    /// Borrow the text of a [`ArgValue::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Borrow the items of a [`ArgValue::List`].
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the entries of a [`ArgValue::Map`].
    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Returns true for [`ArgValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for [`ArgValue::List`].
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Render the value as plain text.
    ///
    /// Lists are joined with `, `; maps render as `key=value` pairs.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(value) => value.to_string(),
            Self::Int(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Str(value) => value.clone(),
            Self::List(items) => items
                .iter()
                .map(Self::to_text)
                .collect::<Vec<_>>()
                .join(", "),
            Self::Map(entries) => entries
                .iter()
                .map(|(key, value)| format!("{key}={}", value.to_text()))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Interpret the value as a flag.
    #[must_use]
    pub fn to_flag(&self, default: bool) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Int(value) => *value != 0,
            Self::Str(value) => parse_bool(value, default),
            _ => default,
        }
    }

    /// Flatten the value into strings: lists yield each item, scalars
    /// yield themselves, null yields nothing.
    #[must_use]
    pub fn to_strings(&self) -> Vec<String> {
        match self {
            Self::Null => Vec::new(),
            Self::List(items) => items.iter().flat_map(Self::to_strings).collect(),
            Self::Map(entries) => entries.keys().cloned().collect(),
            scalar => vec![scalar.to_text()],
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u16> for ArgValue {
    fn from(value: u16) -> Self {
        Self::Int(i64::from(value))
    }
}

impl<T: Into<Self>> From<Option<T>> for ArgValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<Vec<String>> for ArgValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values.into_iter().map(Self::Str).collect())
    }
}

impl From<&BTreeMap<String, String>> for ArgValue {
    fn from(values: &BTreeMap<String, String>) -> Self {
        Self::Map(
            values
                .iter()
                .map(|(key, value)| (key.clone(), Self::Str(value.clone())))
                .collect(),
        )
    }
}

/// String-keyed argument map handed to plugins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgMap(BTreeMap<String, ArgValue>);

impl ArgMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.0.get(key)
    }

    /// Mutably look up a value.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut ArgValue> {
        self.0.get_mut(key)
    }

    /// Borrow a value only when it is text.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ArgValue::as_str)
    }

    /// Render a non-null value as text; empty text counts as absent.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key)
            .filter(|value| !value.is_null())
            .map(ArgValue::to_text)
            .filter(|text| !text.is_empty())
    }

    /// Read a flag, falling back to `default` when absent.
    #[must_use]
    pub fn flag(&self, key: &str, default: bool) -> bool {
        self.get(key).map_or(default, |value| value.to_flag(default))
    }

    /// Borrow a nested map value as string pairs.
    #[must_use]
    pub fn string_map(&self, key: &str) -> BTreeMap<String, String> {
        self.get(key)
            .and_then(ArgValue::as_map)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_text()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Option<ArgValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove a value.
    pub fn remove(&mut self, key: &str) -> Option<ArgValue> {
        self.0.remove(key)
    }

    /// Returns true when `key` is present (even if null).
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, ArgValue> {
        self.0.iter()
    }

    /// Entry API passthrough.
    pub fn entry(&mut self, key: impl Into<String>) -> btree_map::Entry<'_, String, ArgValue> {
        self.0.entry(key.into())
    }

    /// Keep only entries matching `keep`.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&String, &mut ArgValue) -> bool,
    {
        self.0.retain(keep);
    }

    /// Overwrite entries with those of `other`.
    pub fn update(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, ArgValue)> for ArgMap {
    fn from_iter<I: IntoIterator<Item = (String, ArgValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ArgMap {
    type Item = (String, ArgValue);
    type IntoIter = btree_map::IntoIter<String, ArgValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ArgMap {
    type Item = (&'a String, &'a ArgValue);
    type IntoIter = btree_map::Iter<'a, String, ArgValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<BTreeMap<String, ArgValue>> for ArgMap {
    fn from(entries: BTreeMap<String, ArgValue>) -> Self {
        Self(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_rendering_covers_every_variant() {
        assert_eq!(ArgValue::Null.to_text(), "");
        assert_eq!(ArgValue::Bool(true).to_text(), "true");
        assert_eq!(ArgValue::Int(42).to_text(), "42");
        assert_eq!(ArgValue::from("x").to_text(), "x");
        assert_eq!(
            ArgValue::from(vec!["a".to_owned(), "b".to_owned()]).to_text(),
            "a, b"
        );
    }

    #[test]
    fn flags_accept_words_and_numbers() {
        let mut args = ArgMap::new();
        args.insert("verify", "no");
        args.insert("secure", ArgValue::Int(1));
        assert!(!args.flag("verify", true));
        assert!(args.flag("secure", false));
        assert!(args.flag("missing", true));
    }

    #[test]
    fn text_treats_null_and_empty_as_absent() {
        let mut args = ArgMap::new();
        args.insert("user", ArgValue::Null);
        args.insert("host", "");
        args.insert("port", 8080_u16);
        assert_eq!(args.text("user"), None);
        assert_eq!(args.text("host"), None);
        assert_eq!(args.text("port").as_deref(), Some("8080"));
    }

    #[test]
    fn serializes_untagged() -> Result<(), serde_json::Error> {
        let mut args = ArgMap::new();
        args.insert("host", "example.com");
        args.insert("port", ArgValue::Null);
        args.insert("targets", vec!["a@b.c".to_owned()]);
        let json = serde_json::to_string(&args)?;
        assert_eq!(json, r#"{"host":"example.com","port":null,"targets":["a@b.c"]}"#);
        Ok(())
    }
}
