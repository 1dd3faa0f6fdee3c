//! Runtime configuration.
//!
//! A [`Config`] value is built once (usually from the environment) and passed
//! explicitly into every fetch and conversion, so tests can point the client
//! at a mock server or drop the API key per call.

use crate::error::{Result, ScholarBibError};
use std::fmt;
use std::time::Duration;

/// SerpAPI search endpoint
pub const SERPAPI_URL: &str = "https://serpapi.com/search.json";

/// Environment variable holding the SerpAPI key
pub const API_KEY_ENV: &str = "SERPAPI_KEY";

/// Optional override of the SerpAPI endpoint
pub const BASE_URL_ENV: &str = "SERPAPI_BASE_URL";

/// Optional override of the page cap
pub const MAX_PAGES_ENV: &str = "SCHOLAR_MAX_PAGES";

/// SerpAPI's max items per request
pub const PAGE_SIZE: usize = 100;

/// Default page cap (5000 publications)
pub const MAX_PAGES: usize = 50;

/// Default per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Converter configuration.
#[derive(Clone)]
pub struct Config {
    /// SerpAPI key. `None` is reported by `/health` and rejected before any fetch.
    pub api_key: Option<String>,
    /// SerpAPI endpoint (overridden in tests)
    pub base_url: String,
    /// Records requested per page
    pub page_size: usize,
    /// Maximum number of pages fetched before giving up
    pub max_pages: usize,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Abort the whole batch on the first malformed record
    pub strict: bool,
}

impl Config {
    /// Create a configuration with default endpoint and limits.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: SERPAPI_URL.to_string(),
            page_size: PAGE_SIZE,
            max_pages: MAX_PAGES,
            request_timeout: REQUEST_TIMEOUT,
            strict: false,
        }
    }

    /// Create a test configuration pointing at a mock server.
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            base_url: format!("{}/search.json", base_url.trim_end_matches('/')),
            request_timeout: Duration::from_secs(5),
            ..Self::new(Some("test-key".to_string()))
        }
    }

    /// Load configuration from the environment, reading `.env` first if present.
    ///
    /// A missing key is not an error here; it surfaces on the first conversion.
    pub fn from_env() -> Result<Self> {
        // Absent .env is fine
        dotenv::dotenv().ok();

        let mut config = Self::new(std::env::var(API_KEY_ENV).ok());

        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config.base_url = base_url;
        }

        if let Ok(raw) = std::env::var(MAX_PAGES_ENV) {
            config.max_pages = raw.trim().parse().map_err(|e| {
                ScholarBibError::Config(format!("Invalid {} '{}': {}", MAX_PAGES_ENV, raw, e))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the numeric limits.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(ScholarBibError::Config("page_size must be positive".to_string()));
        }
        if self.max_pages == 0 {
            return Err(ScholarBibError::Config("max_pages must be positive".to_string()));
        }
        Ok(())
    }

    /// Check if an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The API key, or [`ScholarBibError::MissingApiKey`].
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(ScholarBibError::MissingApiKey)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("has_api_key", &self.has_api_key())
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("max_pages", &self.max_pages)
            .field("request_timeout", &self.request_timeout)
            .field("strict", &self.strict)
            .finish()
    }
}
