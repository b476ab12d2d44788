//! Format-independent result of parsing one configuration document.

use notifyconf_domain::{ArgMap, AssetOptions, ConfigFormat, TagGroups, TagSet};
use std::fmt;

/// Where a service entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOrigin {
    /// TEXT line number (1-based).
    Line(usize),
    /// YAML `urls` entry and item within it (both 1-based).
    Item {
        /// Position in `urls`.
        entry: usize,
        /// Position within a token list.
        item: usize,
    },
}

impl fmt::Display for EntryOrigin {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(line) => write!(formatter, "line {line}"),
            Self::Item { entry, item } => write!(formatter, "entry #{entry}, item #{item}"),
        }
    }
}

/// One service URL found in a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEntry {
    /// Service URL as written.
    pub url: String,
    /// YAML tokens layered over the parsed URL.
    pub overrides: Option<ArgMap>,
    /// Tags from the document (groups not yet applied).
    pub tags: TagSet,
    /// Source position.
    pub origin: EntryOrigin,
}

/// Non-fatal problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// Stable event name.
    pub event: &'static str,
    /// Human-readable message; URLs are masked.
    pub message: String,
}

impl ParseWarning {
    pub(crate) fn new(event: &'static str, message: impl Into<String>) -> Self {
        Self {
            event,
            message: message.into(),
        }
    }
}

/// Everything a document contributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// Format the document was parsed as.
    pub format: ConfigFormat,
    /// Service entries in document order.
    pub entries: Vec<ServiceEntry>,
    /// Include directives, verbatim.
    pub includes: Vec<String>,
    /// Tag groups declared by the document.
    pub groups: TagGroups,
    /// Asset options when the document declares any.
    pub asset: Option<AssetOptions>,
    /// Non-fatal problems.
    pub warnings: Vec<ParseWarning>,
}

impl ParsedDocument {
    pub(crate) fn new(format: ConfigFormat) -> Self {
        Self {
            format,
            entries: Vec::new(),
            includes: Vec::new(),
            groups: TagGroups::new(),
            asset: None,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn warn(&mut self, event: &'static str, message: impl Into<String>) {
        self.warnings.push(ParseWarning::new(event, message));
    }
}
