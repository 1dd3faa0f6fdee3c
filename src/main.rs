//! rustscholarbib - Google Scholar profile to BibTeX converter
//!
//! Fetches every publication of a Google Scholar author through SerpAPI and
//! writes them as a BibTeX bibliography.
//!
//! ## Usage
//!
//! ### CLI Mode
//! ```bash
//! rustscholarbib convert "https://scholar.google.com/citations?user=ilO06uUAAAAJ" -o ./output
//! ```
//!
//! ### HTTP Server Mode
//! ```bash
//! rustscholarbib serve --port 5000
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rustscholarbib::{batch, config::Config, server, ScholarBibError};

const ENV_FILE_HINT: &str = "Please create a .env file with your SerpAPI key: SERPAPI_KEY=your_key_here";
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Google Scholar profile to BibTeX converter
#[derive(Parser)]
#[command(name = "rustscholarbib")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Google Scholar profile into a .bib file
    Convert {
        /// Google Scholar profile URL (must contain a `user` parameter)
        scholar_url: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Maximum number of 100-record pages to fetch
        #[arg(long)]
        max_pages: Option<usize>,

        /// Fail on the first malformed record instead of skipping it
        #[arg(long)]
        strict: bool,
    },

    /// Run as HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Convert {
            scholar_url,
            output,
            max_pages,
            strict,
        } => run_convert(scholar_url, output, max_pages, strict, config).await,
        Commands::Serve { port, host } => server::run_server(&host, port, config)
            .await
            .context("Server error"),
    }
}

// ============================================================================
// Batch Conversion
// ============================================================================

async fn run_convert(
    scholar_url: String,
    output_dir: PathBuf,
    max_pages: Option<usize>,
    strict: bool,
    mut config: Config,
) -> Result<()> {
    if let Some(pages) = max_pages {
        config.max_pages = pages;
    }
    config.strict = strict;

    require_api_key(&config)?;

    std::fs::create_dir_all(&output_dir).context("Failed to create output directory")?;

    let (bibliography, path) = batch::convert_to_file(&scholar_url, &config, &output_dir)
        .await
        .context("Conversion failed")?;

    for failure in &bibliography.skipped {
        println!("Skipped record #{} ({}): {}", failure.index, failure.title, failure.reason);
    }

    println!(
        "Successfully saved {} publications to {}",
        bibliography.entries.len(),
        path.display()
    );
    Ok(())
}

/// Fail early with a setup hint; the error is reported once, by `main`.
fn require_api_key(config: &Config) -> Result<()> {
    if config.has_api_key() {
        return Ok(());
    }
    Err(ScholarBibError::MissingApiKey).context(ENV_FILE_HINT)
}
