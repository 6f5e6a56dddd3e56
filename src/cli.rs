//! Command-line interface parsing for the Pokedex CLI
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! the validated settings the application starts with.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::cache::DEFAULT_INTERVAL;
use crate::data::DEFAULT_BASE_URL;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The cache interval must be positive
    #[error("Invalid cache interval: {0}ms. The interval must be greater than zero")]
    InvalidInterval(u64),

    /// The base URL is not an http(s) URL
    #[error("Invalid base URL: '{0}'. Expected an http:// or https:// URL")]
    InvalidBaseUrl(String),
}

/// Pokedex CLI - Explore location areas and catch Pokemon from the PokeAPI
#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "Interactive Pokedex over the PokeAPI")]
#[command(version)]
pub struct Cli {
    /// How long fetched responses stay cached, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_INTERVAL.as_millis() as u64)]
    pub cache_interval: u64,

    /// Root URL of the PokeAPI
    #[arg(long, value_name = "URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored prompt and errors
    #[arg(long)]
    pub no_color: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq)]
pub struct StartupConfig {
    /// Expiry interval of the response cache
    pub cache_interval: Duration,
    /// Root URL of the API, without trailing slash
    pub base_url: String,
    /// Whether debug logging is enabled by default
    pub verbose: bool,
    /// Whether colored output is allowed
    pub color: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            cache_interval: DEFAULT_INTERVAL,
            base_url: DEFAULT_BASE_URL.to_string(),
            verbose: false,
            color: true,
        }
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if the interval is zero or the base URL is not http(s)
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.cache_interval == 0 {
            return Err(CliError::InvalidInterval(cli.cache_interval));
        }

        let base_url = cli.base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CliError::InvalidBaseUrl(cli.base_url.clone()));
        }

        Ok(StartupConfig {
            cache_interval: Duration::from_millis(cli.cache_interval),
            base_url: base_url.to_string(),
            verbose: cli.verbose,
            color: !cli.no_color,
        })
    }

    /// Default log filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "pokedex=debug"
        } else {
            "pokedex=warn"
        }
    }
}
