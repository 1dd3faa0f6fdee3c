//! SerpAPI client for the `google_scholar_author` engine.
//!
//! Fetches the complete publication list of one author by paging through the
//! `articles` array until an empty page comes back.
//!
//! API Details:
//! - Endpoint: GET /search.json?engine=google_scholar_author
//! - Max 100 articles per request (`num`), offset with `start`
//! - Sorted newest first with `sort=pubdate`

use crate::config::Config;
use crate::error::{Result, ScholarBibError};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// SerpAPI engine selector for author profiles
const ENGINE: &str = "google_scholar_author";

/// Sort order requested from the API
const SORT_ORDER: &str = "pubdate";

/// User agent string for requests
const USER_AGENT: &str = concat!("rustscholarbib/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct AuthorResponse {
    #[serde(default)]
    articles: Option<Vec<Value>>,
    #[serde(default)]
    error: Option<String>,
}

/// Paginated SerpAPI client
pub struct SerpApiClient {
    client: Client,
    config: Config,
}

impl SerpApiClient {
    /// Create a new client from an explicit configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ScholarBibError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Fetch all publications for an author.
    ///
    /// Pages are requested one after another, starting at offset 0 and
    /// advancing by the page size, until a page has no articles. Records keep
    /// the order the API returns them in. Hitting `max_pages` first is an error.
    ///
    /// Articles are returned as raw JSON items; each one is decoded separately
    /// by the formatter so a single odd record cannot fail a page.
    ///
    /// # Errors
    ///
    /// Returns [`ScholarBibError::MissingApiKey`] before any request if no key
    /// is configured, and propagates any transport or API error unchanged.
    pub async fn fetch_publications(&self, author_id: &str) -> Result<Vec<Value>> {
        let api_key = self.config.require_api_key()?;
        let page_size = self.config.page_size;

        info!(author_id = author_id, page_size = page_size, "Fetching publications");

        let mut all_articles = Vec::new();
        let mut start = 0;

        for page in 0..self.config.max_pages {
            let articles = self.fetch_page(api_key, author_id, start).await?;

            if articles.is_empty() {
                info!(
                    author_id = author_id,
                    pages = page + 1,
                    total = all_articles.len(),
                    "Reached end of publication list"
                );
                return Ok(all_articles);
            }

            all_articles.extend(articles);
            start += page_size;

            info!(page = page + 1, total = all_articles.len(), "Fetched publications");
        }

        warn!(
            author_id = author_id,
            max_pages = self.config.max_pages,
            "Page limit reached before an empty page"
        );
        Err(ScholarBibError::PageLimit {
            pages: self.config.max_pages,
        })
    }

    /// Fetch a single page of articles starting at `start`
    async fn fetch_page(&self, api_key: &str, author_id: &str, start: usize) -> Result<Vec<Value>> {
        let start_param = start.to_string();
        let num_param = self.config.page_size.to_string();

        debug!(url = %self.config.base_url, start = start, "Sending page request");

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("api_key", api_key),
                ("engine", ENGINE),
                ("author_id", author_id),
                ("start", start_param.as_str()),
                ("num", num_param.as_str()),
                ("sort", SORT_ORDER),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), error = %error_text, "API error");
            return Err(ScholarBibError::Api {
                code: status.as_u16(),
                message: api_error_message(&error_text).unwrap_or(error_text),
            });
        }

        let body: AuthorResponse = response.json().await.map_err(|e| {
            ScholarBibError::Parse(format!("Failed to parse SerpAPI response: {}", e))
        })?;

        if let Some(message) = body.error {
            warn!(start = start, error = %message, "SerpAPI reported an error; treating page as empty");
        }

        Ok(body.articles.unwrap_or_default())
    }
}

/// Fetch all publications for `author_id` with a one-off client.
pub async fn fetch_publications(author_id: &str, config: &Config) -> Result<Vec<Value>> {
    // Check before building a client so a missing key never touches the network
    config.require_api_key()?;
    SerpApiClient::new(config.clone())?
        .fetch_publications(author_id)
        .await
}

/// Pull the `error` string out of a SerpAPI error body
fn api_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<AuthorResponse>(body).ok()?.error
}
