//! Profile-to-bibliography conversion.
//!
//! Ties the pieces together: parse the profile URL, fetch every publication,
//! render each one, and join the entries into a single `.bib` text that can be
//! returned directly or written to `scholar_{author_id}_publications.bib`.

use crate::author::extract_author_id;
use crate::bibtex::BibtexEntry;
use crate::config::Config;
use crate::error::{Result, ScholarBibError};
use crate::publication::article_title;
use crate::serpapi::SerpApiClient;
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Separator placed between entries in the output file
pub const ENTRY_SEPARATOR: &str = "\n\n";

/// A record that was skipped during rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    /// Position of the record in the fetched list
    pub index: usize,
    pub title: String,
    pub reason: String,
}

/// Outcome of rendering a list of records
#[derive(Debug, Default)]
pub struct RenderReport {
    pub entries: Vec<BibtexEntry>,
    pub failures: Vec<RecordFailure>,
}

/// A converted publication list
#[derive(Debug)]
pub struct Bibliography {
    pub author_id: String,
    /// Number of records fetched from the API
    pub publication_count: usize,
    pub entries: Vec<BibtexEntry>,
    /// Records that could not be rendered
    pub skipped: Vec<RecordFailure>,
}

impl Bibliography {
    /// All entries separated by a blank line
    pub fn text(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join(ENTRY_SEPARATOR)
    }

    /// Download/output file name for this author
    pub fn file_name(&self) -> String {
        output_file_name(&self.author_id)
    }

    /// Write the bibliography into `dir` and return the file path.
    ///
    /// The file is fully written and closed before this returns.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        let mut file = File::create(&path)?;
        file.write_all(self.text().as_bytes())?;
        file.sync_all()?;
        info!(path = ?path, entries = self.entries.len(), "Saved bibliography");
        Ok(path)
    }
}

/// `scholar_{author_id}_publications.bib`
pub fn output_file_name(author_id: &str) -> String {
    format!("scholar_{}_publications.bib", author_id)
}

/// Render every record, collecting failures instead of stopping.
///
/// With `strict` set, the first failure is returned as an error instead.
pub fn render_all(articles: &[Value], strict: bool) -> Result<RenderReport> {
    let mut report = RenderReport::default();

    for (index, article) in articles.iter().enumerate() {
        match BibtexEntry::from_article(article) {
            Ok(entry) => report.entries.push(entry),
            Err(e) => {
                if strict {
                    return Err(ScholarBibError::MalformedRecord {
                        index,
                        reason: e.to_string(),
                    });
                }
                warn!(index = index, title = article_title(article), error = %e, "Skipping record");
                report.failures.push(RecordFailure {
                    index,
                    title: article_title(article).to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

/// Convert an already-fetched list of raw articles.
///
/// # Errors
///
/// [`ScholarBibError::NoPublications`] for an empty list, and
/// [`ScholarBibError::MalformedRecord`] if no record could be rendered.
pub fn build_bibliography(author_id: &str, articles: &[Value], strict: bool) -> Result<Bibliography> {
    if articles.is_empty() {
        return Err(ScholarBibError::NoPublications(author_id.to_string()));
    }

    let RenderReport { entries, failures } = render_all(articles, strict)?;

    if entries.is_empty() {
        if let Some(first) = failures.first() {
            return Err(ScholarBibError::MalformedRecord {
                index: first.index,
                reason: first.reason.clone(),
            });
        }
    }

    Ok(Bibliography {
        author_id: author_id.to_string(),
        publication_count: articles.len(),
        entries,
        skipped: failures,
    })
}

/// Convert a Google Scholar profile URL into a bibliography.
///
/// The URL is checked and the API key required before any request is made.
pub async fn convert(scholar_url: &str, config: &Config) -> Result<Bibliography> {
    let author_id = extract_author_id(scholar_url)
        .ok_or_else(|| ScholarBibError::InvalidUrl(scholar_url.to_string()))?;
    config.require_api_key()?;

    let client = SerpApiClient::new(config.clone())?;
    let articles = client.fetch_publications(&author_id).await?;

    let bibliography = build_bibliography(&author_id, &articles, config.strict)?;
    info!(
        author_id = %author_id,
        fetched = bibliography.publication_count,
        rendered = bibliography.entries.len(),
        skipped = bibliography.skipped.len(),
        "Conversion complete"
    );
    Ok(bibliography)
}

/// Convert a profile and write `scholar_{author_id}_publications.bib` into `dir`.
///
/// Nothing is written when the conversion fails.
pub async fn convert_to_file(scholar_url: &str, config: &Config, dir: &Path) -> Result<(Bibliography, PathBuf)> {
    let bibliography = convert(scholar_url, config).await?;
    let path = bibliography.write_to(dir)?;
    Ok((bibliography, path))
}
