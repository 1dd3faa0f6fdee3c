//! # rustscholarbib
//!
//! Google Scholar profile to BibTeX converter - CLI and Rust Microservice
//!
//! ## Modules
//!
//! - [`author`] - Author ID extraction from profile URLs
//! - [`serpapi`] - Paginated SerpAPI client for author publication lists
//! - [`bibtex`] - Citation keys and BibTeX entry rendering
//! - [`batch`] - Profile-to-bibliography conversion and file output
//! - [`server`] - HTTP endpoints
//! - [`config`] - Explicit runtime configuration
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustscholarbib::{batch, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let bib = batch::convert("https://scholar.google.com/citations?user=ilO06uUAAAAJ", &config).await?;
//!     println!("{}", bib.text());
//!     Ok(())
//! }
//! ```

pub mod author;
pub mod batch;
pub mod bibtex;
pub mod config;
pub mod error;
pub mod publication;
pub mod serpapi;
pub mod server;

pub use error::{Result, ScholarBibError};
