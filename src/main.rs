//! Pokedex CLI - Explore location areas and catch Pokemon
//!
//! A line-based interactive client over the PokeAPI. Every request goes through
//! an in-memory cache whose entries expire after a configurable interval.

use std::io::{self, IsTerminal};
use std::process;

use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pokedex::cli::{Cli, StartupConfig};
use pokedex::commands::Session;
use pokedex::data::{HttpFetcher, PokeApi};
use pokedex::repl;

/// Initializes logging to stderr, honouring `RUST_LOG` when set
fn init_logging(config: &StartupConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    };

    init_logging(&config);
    info!(
        base_url = %config.base_url,
        cache_interval_ms = config.cache_interval.as_millis() as u64,
        "starting pokedex"
    );

    if !io::stdin().is_terminal() {
        info!("stdin is not a terminal, reading commands non-interactively");
    }

    let api = PokeApi::with_fetcher(HttpFetcher::new(), &config.base_url, config.cache_interval);
    let mut session = Session::new(api);

    let color = config.color && io::stdout().is_terminal();
    let mut stdout = io::stdout();
    repl::run(&mut session, BufReader::new(tokio::io::stdin()), &mut stdout, color).await?;

    Ok(())
}
