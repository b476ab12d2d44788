//! Query-string partitioning for service URLs.
//!
//! Every `key=value` pair lands in the main `qsd` map under a lower-cased,
//! trimmed key. Keys that start with `+` (or a space, which is what a bare
//! `+` decodes to), `-` or `:` are additionally stored, sigil stripped and
//! case preserved, in the matching auxiliary partition. Plugins use these
//! partitions for HTTP headers, GET parameters and payload extras.

use crate::encoding::{quote, unquote};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Auxiliary partition selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sigil {
    /// `+key=value` (also a leading space).
    Plus,
    /// `-key=value`.
    Minus,
    /// `:key=value`.
    Colon,
}

impl Sigil {
    /// All sigils in partition order.
    pub const ALL: [Self; 3] = [Self::Plus, Self::Minus, Self::Colon];

    /// The canonical character written in front of a key.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
            Self::Colon => ':',
        }
    }

    /// Resolve a declared prefix character.
    #[must_use]
    pub const fn from_char(ch: char) -> Option<Self> {
        match ch {
            '+' | ' ' => Some(Self::Plus),
            '-' => Some(Self::Minus),
            ':' => Some(Self::Colon),
            _ => None,
        }
    }

    fn strip(self, key: &str) -> Option<&str> {
        match self {
            Self::Plus => key.strip_prefix(['+', ' ']),
            Self::Minus => key.strip_prefix('-'),
            Self::Colon => key.strip_prefix(':'),
        }
    }
}

/// Parsed query string: ordered pairs plus the derived partitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParts {
    pairs: Vec<(String, String)>,
    qsd: BTreeMap<String, String>,
    plus: BTreeMap<String, String>,
    minus: BTreeMap<String, String>,
    colon: BTreeMap<String, String>,
}

impl QueryParts {
    /// Parse a raw query string (without the leading `?`).
    ///
    /// `plus_to_space` turns `+` into a space inside values; keys always keep
    /// their first character so a leading `+` sigil survives.
    #[must_use]
    pub fn parse(query: &str, plus_to_space: bool) -> Self {
        let mut parts = Self::default();
        for pair in query.split(['&', ';']) {
            if pair.is_empty() {
                continue;
            }

            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = unquote(&decode_key_spaces(raw_key));
            let value = if plus_to_space {
                unquote(&raw_value.replace('+', " "))
            } else {
                unquote(raw_value)
            };
            parts.insert(key, value.trim().to_owned());
        }
        parts
    }

    /// Insert one decoded pair, updating every partition it belongs to.
    pub fn insert(&mut self, key: String, value: String) {
        self.qsd
            .insert(key.trim().to_lowercase(), value.clone());
        for sigil in Sigil::ALL {
            if let Some(stripped) = sigil.strip(&key) {
                self.partition_mut(sigil)
                    .insert(stripped.to_owned(), value.clone());
            }
        }
        self.pairs.push((key, value));
    }

    /// Main lower-cased key map.
    #[must_use]
    pub const fn qsd(&self) -> &BTreeMap<String, String> {
        &self.qsd
    }

    /// Look up a value by (case-insensitive) key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.qsd.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Returns true when `key` was present in the query.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.qsd.contains_key(&key.to_lowercase())
    }

    /// Auxiliary partition for `sigil`.
    #[must_use]
    pub const fn partition(&self, sigil: Sigil) -> &BTreeMap<String, String> {
        match sigil {
            Sigil::Plus => &self.plus,
            Sigil::Minus => &self.minus,
            Sigil::Colon => &self.colon,
        }
    }

    const fn partition_mut(&mut self, sigil: Sigil) -> &mut BTreeMap<String, String> {
        match sigil {
            Sigil::Plus => &mut self.plus,
            Sigil::Minus => &mut self.minus,
            Sigil::Colon => &mut self.colon,
        }
    }

    /// Decoded pairs in their original order and case.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Returns true when no pair was parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Re-encode the pairs as a query string.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| format!("{}={}", quote(key, "+-:"), quote(value, "")))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Parse a raw query string into its partitions.
#[must_use]
pub fn parse_qsd(query: &str, plus_to_space: bool) -> QueryParts {
    QueryParts::parse(query, plus_to_space)
}

fn decode_key_spaces(raw_key: &str) -> String {
    let mut chars = raw_key.chars();
    chars.next().map_or_else(String::new, |first| {
        let mut key = String::with_capacity(raw_key.len());
        key.push(first);
        key.push_str(&chars.as_str().replace('+', " "));
        key
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_pairs_and_missing_values() {
        let parts = QueryParts::parse("a=1&B=2;c", false);
        assert_eq!(parts.get("a"), Some("1"));
        assert_eq!(parts.get("b"), Some("2"));
        assert_eq!(parts.get("c"), Some(""));
        assert!(parts.contains("C"));
    }

    #[test]
    fn last_value_wins() {
        let parts = QueryParts::parse("to=a&to=b", false);
        assert_eq!(parts.get("to"), Some("b"));
        assert_eq!(parts.pairs().len(), 2);
    }

    #[test]
    fn sigils_route_into_partitions() {
        let parts = QueryParts::parse("+X-Token=abc&-Page=2&:Extra=yes&plain=1", false);
        assert_eq!(
            parts.partition(Sigil::Plus).get("X-Token").map(String::as_str),
            Some("abc")
        );
        assert_eq!(
            parts.partition(Sigil::Minus).get("Page").map(String::as_str),
            Some("2")
        );
        assert_eq!(
            parts.partition(Sigil::Colon).get("Extra").map(String::as_str),
            Some("yes")
        );
        assert_eq!(parts.get("+x-token"), Some("abc"));
        assert!(parts.partition(Sigil::Plus).get("plain").is_none());
    }

    #[test]
    fn plus_handling_depends_on_flag() {
        let raw = QueryParts::parse("key=a+b&my+key=v", false);
        assert_eq!(raw.get("key"), Some("a+b"));
        assert_eq!(raw.get("my key"), Some("v"));

        let spaced = QueryParts::parse("key=a+b", true);
        assert_eq!(spaced.get("key"), Some("a b"));
    }

    #[test]
    fn values_are_decoded_and_trimmed() {
        let parts = QueryParts::parse("msg=%20hello%20world%20&%2Bh=x", false);
        assert_eq!(parts.get("msg"), Some("hello world"));
        assert_eq!(parts.partition(Sigil::Plus).get("h").map(String::as_str), Some("x"));
    }

    proptest! {
        #[test]
        fn reencoded_query_parses_identically(
            pairs in proptest::collection::vec(("[+:-]?[A-Za-z][A-Za-z0-9_]{0,8}", "[A-Za-z0-9 @/+%]{0,12}"), 0..6)
        ) {
            let mut parts = QueryParts::default();
            for (key, value) in pairs {
                parts.insert(key, value.trim().to_owned());
            }
            let reparsed = QueryParts::parse(&parts.to_query_string(), false);
            prop_assert_eq!(reparsed, parts);
        }
    }
}
