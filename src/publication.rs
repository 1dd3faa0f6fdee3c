//! Publication records as returned by the SerpAPI `google_scholar_author` engine.
//!
//! Pages are kept as raw JSON items and each item is decoded on its own, so one
//! odd record never fails the decoding of a whole page. Every field is optional
//! at the serde level; required fields are checked when the record is turned
//! into BibTeX.

use serde::Deserialize;
use serde_json::Value;

/// Year placeholder used when a record has no publication year
pub const UNKNOWN_YEAR: &str = "XXXX";

/// A single entry of the `articles` array
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Publication {
    /// Article title
    #[serde(default)]
    pub title: Option<String>,
    /// Authors, comma-separated with the last pair possibly joined by " and "
    #[serde(default)]
    pub authors: Option<String>,
    /// Publication year, sent either as a string or a number
    #[serde(default)]
    pub year: Option<Year>,
    /// Journal/Conference venue
    #[serde(default)]
    pub publication: Option<String>,
    /// Citation counter
    #[serde(default)]
    pub cited_by: Option<CitedBy>,
    /// Canonical URL of the article on Google Scholar
    #[serde(default)]
    pub link: Option<String>,
}

/// Publication year in either of the shapes SerpAPI emits
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Year {
    Number(i64),
    Text(String),
}

/// Nested citation counter (`{"value": 42, ...}`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CitedBy {
    #[serde(default)]
    pub value: Option<u64>,
}

impl Publication {
    /// Decode one raw `articles` item.
    pub fn from_article(article: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(article)
    }

    /// Year as text, or [`UNKNOWN_YEAR`] if absent or blank.
    pub fn year_or_unknown(&self) -> String {
        match &self.year {
            Some(Year::Number(n)) => n.to_string(),
            Some(Year::Text(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => UNKNOWN_YEAR.to_string(),
        }
    }

    /// Citation count, if the record carries one.
    pub fn citation_count(&self) -> Option<u64> {
        self.cited_by.as_ref().and_then(|c| c.value)
    }
}

/// Title of a raw article for log messages; never fails.
pub fn article_title(article: &Value) -> &str {
    article
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("<untitled>")
}
