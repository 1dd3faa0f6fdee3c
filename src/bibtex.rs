//! BibTeX formatting for publication records.
//!
//! Turns one [`Publication`] into an `@article` entry with a deterministic
//! citation key of the form `{surname}{year}_{hash}`, where `hash` is the first
//! four hex characters of the MD5 digest of the title. The hash only
//! disambiguates entries by the same author in the same year; two different
//! titles can still collide on four hex characters.

use crate::publication::Publication;
use md5::{Digest, Md5};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Entry type written for every record
const ENTRY_TYPE: &str = "article";

/// Number of hex characters of the title digest kept in the key
const HASH_LEN: usize = 4;

/// BibTeX multi-author delimiter
const AUTHOR_DELIMITER: &str = " AND ";

/// Separators between author names in Google Scholar author strings
static AUTHOR_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*,\s*|\s+and\s+").expect("author separator pattern"));

/// Why a record could not be formatted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("record has no authors")]
    MissingAuthors,

    #[error("record has no title")]
    MissingTitle,

    #[error("undecodable record: {0}")]
    Undecodable(String),
}

/// Citation key such as `smith2020_1a2b`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationKey(String);

impl CitationKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CitationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A rendered BibTeX entry together with its key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibtexEntry {
    pub key: CitationKey,
    pub text: String,
}

impl BibtexEntry {
    /// Derive the key and render the entry for one record
    pub fn from_publication(publication: &Publication) -> Result<Self, EntryError> {
        let key = citation_key(publication)?;
        let text = render_entry(publication, &key)?;
        Ok(Self { key, text })
    }

    /// Decode a raw `articles` item and render it
    pub fn from_article(article: &Value) -> Result<Self, EntryError> {
        let publication =
            Publication::from_article(article).map_err(|e| EntryError::Undecodable(e.to_string()))?;
        Self::from_publication(&publication)
    }
}

impl fmt::Display for BibtexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Derive the citation key for a record.
///
/// The surname is the last whitespace-separated token of the first
/// comma-separated segment of the authors field, lowercased. A missing year
/// becomes `XXXX`.
pub fn citation_key(publication: &Publication) -> Result<CitationKey, EntryError> {
    let authors = publication.authors.as_deref().ok_or(EntryError::MissingAuthors)?;
    let title = required_title(publication)?;

    let first_author = authors.split(',').next().unwrap_or_default().trim();
    let last_name = first_author
        .split_whitespace()
        .last()
        .ok_or(EntryError::MissingAuthors)?
        .to_lowercase();

    let year = publication.year_or_unknown();

    Ok(CitationKey(format!("{}{}_{}", last_name, year, title_hash(title))))
}

/// First four hex characters of the MD5 digest of `title`
pub fn title_hash(title: &str) -> String {
    let digest = format!("{:x}", Md5::digest(title.as_bytes()));
    digest[..HASH_LEN].to_string()
}

/// Escape the braces of a title. Nothing else is touched.
pub fn escape_title(title: &str) -> String {
    title.replace('{', "\\{").replace('}', "\\}")
}

/// Rejoin a Google Scholar author string with the BibTeX delimiter.
///
/// Names are split on commas and on the standalone word `and`, so a name that
/// merely contains those letters (`Sandy Anderson`) is kept intact.
pub fn format_authors(authors: &str) -> String {
    AUTHOR_SPLIT
        .split(authors.trim())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join(AUTHOR_DELIMITER)
}

/// Render a record as a BibTeX entry under `key`.
///
/// Fields are written in a fixed order: title, author, year, then journal,
/// note and url whenever the record carries them, even if empty.
pub fn render_entry(publication: &Publication, key: &CitationKey) -> Result<String, EntryError> {
    let title = required_title(publication)?;
    let authors = format_authors(publication.authors.as_deref().ok_or(EntryError::MissingAuthors)?);
    if authors.is_empty() {
        return Err(EntryError::MissingAuthors);
    }

    let mut entry = vec![
        format!("@{}{{{},", ENTRY_TYPE, key),
        field("title", &escape_title(title)),
        field("author", &authors),
        field("year", &publication.year_or_unknown()),
    ];

    if let Some(journal) = publication.publication.as_deref() {
        entry.push(field("journal", journal));
    }

    if let Some(count) = publication.citation_count() {
        entry.push(field("note", &format!("Cited by {}", count)));
    }

    if let Some(link) = publication.link.as_deref() {
        entry.push(field("url", link));
    }

    entry.push("}".to_string());
    Ok(entry.join("\n"))
}

fn field(name: &str, value: &str) -> String {
    format!("  {} = {{{}}},", name, value)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn required_title(publication: &Publication) -> Result<&str, EntryError> {
    non_blank(publication.title.as_deref()).ok_or(EntryError::MissingTitle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publication::{CitedBy, Year};

    fn sample() -> Publication {
        Publication {
            title: Some("Deep Learning".to_string()),
            authors: Some("Jane Q. Smith, Bob Lee".to_string()),
            year: Some(Year::Number(2020)),
            ..Default::default()
        }
    }

    #[test]
    fn test_citation_key_shape() {
        let key = citation_key(&sample()).expect("key");
        assert_eq!(key.as_str(), format!("smith2020_{}", title_hash("Deep Learning")));
        assert_eq!(title_hash("Deep Learning").len(), 4);
        assert!(title_hash("Deep Learning").chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_title_hash_is_md5_prefix() {
        // md5("") = d41d8cd98f00b204e9800998ecf8427e
        assert_eq!(title_hash(""), "d41d");
        // md5("abc") = 900150983cd24fb0d6963f7d28e17f72
        assert_eq!(title_hash("abc"), "9001");
    }

    #[test]
    fn test_key_is_deterministic_and_input_sensitive() {
        let base = citation_key(&sample()).expect("key");
        assert_eq!(base, citation_key(&sample()).expect("key"));

        let mut other_year = sample();
        other_year.year = Some(Year::Text("2021".to_string()));
        assert_ne!(base, citation_key(&other_year).expect("key"));

        let mut other_author = sample();
        other_author.authors = Some("Jane Q. Doe, Bob Lee".to_string());
        assert_ne!(base, citation_key(&other_author).expect("key"));

        let mut other_title = sample();
        other_title.title = Some("Shallow Learning".to_string());
        let changed = citation_key(&other_title).expect("key");
        assert!(changed.as_str().starts_with("smith2020_"));
        assert_ne!(base, changed);
    }

    #[test]
    fn test_key_without_year() {
        let mut publication = sample();
        publication.year = None;
        assert!(citation_key(&publication).expect("key").as_str().starts_with("smithXXXX_"));
    }

    #[test]
    fn test_key_requires_authors() {
        let mut publication = sample();
        publication.authors = None;
        assert_eq!(citation_key(&publication), Err(EntryError::MissingAuthors));

        publication.authors = Some("  , Bob Lee".to_string());
        assert_eq!(citation_key(&publication), Err(EntryError::MissingAuthors));
    }

    #[test]
    fn test_render_concrete_entry() {
        let publication = sample();
        let key = citation_key(&publication).expect("key");
        let text = render_entry(&publication, &key).expect("render");
        let expected = format!(
            "@article{{{key},\n  title = {{Deep Learning}},\n  author = {{Jane Q. Smith AND Bob Lee}},\n  year = {{2020}},\n}}"
        );
        assert_eq!(text, expected);
        assert!(text.starts_with(&format!("@article{{smith2020_{},\n", title_hash("Deep Learning"))));
    }

    #[test]
    fn test_render_optional_fields_in_order() {
        let publication = Publication {
            publication: Some("Nature 521, 2015".to_string()),
            cited_by: Some(CitedBy { value: Some(42) }),
            link: Some("https://example.org/paper".to_string()),
            ..sample()
        };
        let entry = BibtexEntry::from_publication(&publication).expect("entry");
        let lines: Vec<&str> = entry.text.lines().collect();
        assert_eq!(lines[4], "  journal = {Nature 521, 2015},");
        assert_eq!(lines[5], "  note = {Cited by 42},");
        assert_eq!(lines[6], "  url = {https://example.org/paper},");
        assert_eq!(lines[7], "}");
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn test_present_but_empty_fields_are_kept() {
        let publication = Publication {
            publication: Some(String::new()),
            link: Some(String::new()),
            ..sample()
        };
        let entry = BibtexEntry::from_publication(&publication).expect("entry");
        let lines: Vec<&str> = entry.text.lines().collect();
        assert_eq!(lines[4], "  journal = {},");
        assert_eq!(lines[5], "  url = {},");
        assert_eq!(lines[6], "}");

        let absent = BibtexEntry::from_publication(&sample()).expect("entry");
        assert!(!absent.text.contains("journal"));
        assert!(!absent.text.contains("url"));
    }

    #[test]
    fn test_from_article_reports_undecodable_record() {
        let err = BibtexEntry::from_article(&serde_json::json!({
            "title": "odd",
            "authors": "C D",
            "cited_by": {"value": "12"}
        }))
        .expect_err("string citation count");
        assert!(matches!(err, EntryError::Undecodable(_)));
        assert!(err.to_string().starts_with("undecodable record: "));
    }

    #[test]
    fn test_render_is_idempotent() {
        let first = BibtexEntry::from_publication(&sample()).expect("entry");
        let second = BibtexEntry::from_publication(&sample()).expect("entry");
        assert_eq!(first.text, second.text);
    }

    #[test]
    fn test_escape_title_braces_only() {
        assert_eq!(escape_title("A {B} C"), "A \\{B\\} C");
        assert_eq!(escape_title("x^2 & \\alpha"), "x^2 & \\alpha");
        assert_eq!(escape_title("}{"), "\\}\\{");
    }

    #[test]
    fn test_hash_uses_raw_title() {
        let mut publication = sample();
        publication.title = Some("Sets {A}".to_string());
        let key = citation_key(&publication).expect("key");
        assert!(key.as_str().ends_with(&title_hash("Sets {A}")));
    }

    #[test]
    fn test_format_authors() {
        assert_eq!(format_authors("A Smith, B Lee and C Wu"), "A Smith AND B Lee AND C Wu");
        assert_eq!(format_authors("Sandy Anderson, Brandon Lee"), "Sandy Anderson AND Brandon Lee");
        assert_eq!(format_authors("A Smith,  B Lee, "), "A Smith AND B Lee");
        assert_eq!(format_authors("Single Author"), "Single Author");
    }

    #[test]
    fn test_render_requires_title() {
        let mut publication = sample();
        publication.title = Some("   ".to_string());
        assert_eq!(
            BibtexEntry::from_publication(&publication),
            Err(EntryError::MissingTitle)
        );
    }
}
