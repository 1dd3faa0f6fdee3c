//! Custom error types for rustscholarbib.
//!
//! This module defines all error types used throughout the application.
//! All functions return `Result<T, ScholarBibError>` instead of using `unwrap()`.

use thiserror::Error;

/// Main error type for rustscholarbib operations.
///
/// Uses `thiserror` for ergonomic error handling and automatic `Display` implementation.
/// The HTTP layer maps each variant to a fixed status code, so variants are kept
/// distinct instead of being flattened into a single message.
#[derive(Debug, Error)]
pub enum ScholarBibError {
    /// Profile URL does not carry a `user` query parameter
    #[error("Invalid Google Scholar URL: {0}")]
    InvalidUrl(String),

    /// `SERPAPI_KEY` was not configured
    #[error("SERPAPI_KEY not found in environment variables")]
    MissingApiKey,

    /// The upstream API returned zero publications for the author
    #[error("No publications found for author {0}")]
    NoPublications(String),

    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// External API returned an error
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code from the API
        code: u16,
        /// Error message from the API
        message: String,
    },

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// A publication record could not be turned into a BibTeX entry
    #[error("Malformed record #{index}: {reason}")]
    MalformedRecord {
        /// Position of the record in the fetched list
        index: usize,
        /// What was wrong with it
        reason: String,
    },

    /// Pagination ran past the configured page cap without seeing an empty page
    #[error("Stopped after {pages} pages without reaching the end of the publication list")]
    PageLimit {
        /// Number of pages fetched before giving up
        pages: usize,
    },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl ScholarBibError {
    /// Whether the error was caused by the caller's input rather than by
    /// configuration or the upstream service.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidUrl(_))
    }
}

/// Result type alias using `ScholarBibError`
pub type Result<T> = std::result::Result<T, ScholarBibError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_classification() {
        assert!(ScholarBibError::InvalidUrl("x".into()).is_user_error());
        assert!(!ScholarBibError::MissingApiKey.is_user_error());
        assert!(!ScholarBibError::NoPublications("abc".into()).is_user_error());
    }
}
