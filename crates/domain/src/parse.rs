//! Lenient scalar parsing shared by both configuration formats.

use crate::patterns::static_regex;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static LIST_DELIMITERS: LazyLock<Regex> = LazyLock::new(|| static_regex(r"[\[\]\;,\s]+"));

static VALID_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"(?i)^[a-z0-9][a-z0-9_]+"));

static URL_START: LazyLock<Regex> = LazyLock::new(|| static_regex(r"(?i)[a-z0-9]+://"));

static URL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"(?i)^[\s,]+[a-z0-9]{1,12}://"));

/// Interpret a user-supplied flag.
///
/// Only the first two characters matter, compared case-insensitively, so
/// `"enabled"`, `"yes"`, `"true"`, `"on"` and `"1"` are all true. Anything
/// unrecognized yields `default`.
#[must_use]
pub fn parse_bool(value: &str, default: bool) -> bool {
    let prefix: String = value.chars().take(2).collect::<String>().to_lowercase();
    match prefix.as_str() {
        "de" | "di" | "ne" | "f" | "n" | "no" | "of" | "0" | "fa" => false,
        "en" | "al" | "t" | "y" | "ye" | "on" | "1" | "tr" => true,
        _ => default,
    }
}

/// Split each input on brackets, semicolons, commas and whitespace.
///
/// The result is de-duplicated and sorted; empty pieces are dropped.
#[must_use]
pub fn parse_list<I, S>(inputs: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut items = BTreeSet::new();
    for input in inputs {
        for piece in LIST_DELIMITERS.split(input.as_ref()) {
            if !piece.is_empty() {
                items.insert(piece.to_owned());
            }
        }
    }
    items.into_iter().collect()
}

/// Extract service URLs from free text.
///
/// A URL starts at `schema://` and runs until the next separator that is
/// itself followed by a schema, so commas and spaces inside a URL survive.
/// A line break always ends a URL. Text without any `schema://` falls back
/// to [`parse_list`] splitting.
#[must_use]
pub fn parse_urls<I, S>(inputs: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut items = BTreeSet::new();
    for input in inputs {
        let input = input.as_ref();
        let urls = detect_urls(input);
        if urls.is_empty() {
            items.extend(parse_list([input]));
        } else {
            items.extend(urls.into_iter().map(str::to_owned));
        }
    }
    items.into_iter().collect()
}

fn detect_urls(text: &str) -> Vec<&str> {
    let mut urls = Vec::new();
    let mut offset = 0;
    while let Some(start) = URL_START.find_at(text, offset) {
        let end = url_end(text, start.end());
        if let Some(url) = text.get(start.start()..end) {
            urls.push(url.trim_end_matches(['\r', ' ', '\t', ',']));
        }
        offset = end;
    }
    urls
}

/// A URL ends before a separator run that leads into another schema, or at
/// the end of its line.
fn url_end(text: &str, from: usize) -> usize {
    let mut index = from;
    while let Some(rest) = text.get(index..).filter(|rest| !rest.is_empty()) {
        if URL_BOUNDARY.is_match(rest) || rest.starts_with('\n') {
            return index;
        }
        index += rest.chars().next().map_or(1, char::len_utf8);
    }
    text.len()
}

/// Returns true when `key` looks like a plugin argument name.
///
/// Only the leading characters are checked.
#[must_use]
pub fn is_valid_token(key: &str) -> bool {
    VALID_TOKEN.is_match(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_recognizes_prefixes() {
        for truthy in ["yes", "YES", "true", "1", "on", "enable", "allow", "t", "y"] {
            assert!(parse_bool(truthy, false), "{truthy}");
        }
        for falsy in ["no", "False", "0", "off", "disable", "deny", "never", "f", "n"] {
            assert!(!parse_bool(falsy, true), "{falsy}");
        }
        assert!(parse_bool("maybe", true));
        assert!(!parse_bool("", false));
    }

    #[test]
    fn parse_list_dedupes_and_sorts() {
        assert_eq!(
            parse_list(["b, a;c [d] a"]),
            vec!["a", "b", "c", "d"]
        );
        assert_eq!(parse_list(["  ", ",;"]), Vec::<String>::new());
        assert_eq!(parse_list(["x", "y x"]), vec!["x", "y"]);
    }

    #[test]
    fn parse_urls_keeps_delimiters_inside_urls() {
        let urls = parse_urls(["json://host/a,b?x=1 2, mailto://me@host"]);
        assert_eq!(urls, vec!["json://host/a,b?x=1 2", "mailto://me@host"]);
    }

    #[test]
    fn parse_urls_ends_urls_at_line_breaks() {
        let urls = parse_urls(["json://one\njson://two"]);
        assert_eq!(urls, vec!["json://one", "json://two"]);

        let urls = parse_urls(["file:///a.yml\r\n  file:///b.yml\n"]);
        assert_eq!(urls, vec!["file:///a.yml", "file:///b.yml"]);
    }

    #[test]
    fn parse_urls_falls_back_to_list_split() {
        assert_eq!(
            parse_urls(["/etc/a.yml, b.txt"]),
            vec!["/etc/a.yml", "b.txt"]
        );
    }

    #[test]
    fn valid_token_checks_leading_characters() {
        assert!(is_valid_token("host"));
        assert!(is_valid_token("to_email"));
        assert!(is_valid_token("ab-c"));
        assert!(!is_valid_token("_hidden"));
        assert!(!is_valid_token("a"));
        assert!(!is_valid_token("+h"));
    }
}
