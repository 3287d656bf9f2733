//! Core data types for the Hister search core.
//!
//! Documents, queries and results are plain serde records so they can
//! cross a process boundary (web, websocket, CLI JSON output) unchanged.

use serde::{Deserialize, Serialize};

/// One indexed page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Canonical URL, unique key of the document
    #[serde(default)]
    pub url: String,

    /// Host of the URL (with port when present)
    #[serde(default)]
    pub domain: String,

    /// Raw HTML source (stored, never searched)
    #[serde(default)]
    pub html: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub text: String,

    /// Either a `data:` URI or empty
    #[serde(default)]
    pub favicon: String,

    /// Search score, populated on results only
    #[serde(default)]
    pub score: f32,

    /// Unix timestamp of the first successful processing
    #[serde(default)]
    pub added: i64,

    /// Icon link discovered during extraction
    #[serde(skip)]
    pub(crate) favicon_url: String,

    #[serde(skip)]
    pub(crate) processed: bool,

    #[serde(skip)]
    pub(crate) skip_sensitive_check: bool,
}

impl Document {
    /// Create a document from a submitted URL and its HTML source
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            ..Default::default()
        }
    }

    /// Whether `DocumentProcessor::process` already succeeded on this document
    pub fn is_processed(&self) -> bool {
        self.processed
    }

    /// Icon link found while extracting, if any
    pub fn favicon_url(&self) -> &str {
        &self.favicon_url
    }
}

/// Fragment formatting for search results. Never affects matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    #[default]
    #[serde(alias = "")]
    None,
    #[serde(alias = "HTML")]
    Html,
    /// Plain text with ANSI reverse-video markers
    #[serde(alias = "ansi")]
    Text,
    Tui,
}

impl Highlight {
    /// Opening and closing markers wrapped around highlighted terms
    pub fn markers(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Highlight::None => None,
            Highlight::Html => Some(("<b>", "</b>")),
            Highlight::Text => Some(("\x1b[7m", "\x1b[0m")),
            Highlight::Tui => Some(("[", "]")),
        }
    }
}

/// Result ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Descending score
    #[default]
    Relevance,
    /// Most recently added first
    Newest,
    Oldest,
}

/// One search request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Query {
    /// Raw query in the Hister query language
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub highlight: Highlight,

    /// Subset of `title`, `text`, `url`, `domain` to search (empty = all)
    #[serde(default)]
    pub fields: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    #[serde(default)]
    pub offset: usize,

    #[serde(default)]
    pub sort: SortOrder,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<i64>,

    /// Multiplier applied to every result score
    #[serde(skip)]
    pub boost: Option<f32>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = Some(boost);
        self
    }

    pub fn boost(&self) -> f32 {
        self.boost.unwrap_or(1.0)
    }
}

/// Entry from the external recent-history store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: String,
    pub title: String,
    pub count: u64,
}

/// Search response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Results {
    /// Total number of matching documents (not just this page)
    pub total: u64,

    /// The query, echoed back
    pub query: Query,

    pub documents: Vec<Document>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryEntry>,

    /// Human readable duration, e.g. `1.52ms`
    #[serde(default)]
    pub search_duration: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub query_suggestion: String,
}

/// Statistics from a reindex run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexStats {
    /// Documents read from the source index
    pub visited: usize,

    /// Documents written to the new index
    pub written: usize,

    /// Documents dropped because they now match a skip rule
    pub skipped_rules: usize,

    /// Documents dropped by the sensitive content screen
    pub skipped_sensitive: usize,

    pub duration_ms: u64,
}

/// Progress report passed to the reindex callback after each page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReindexProgress {
    pub page: usize,
    pub visited: usize,
    pub written: usize,
}
