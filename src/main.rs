//! Steno-Harvest main entry point
//!
//! This is the command-line interface for the Steno-Harvest transcript downloader.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use steno_harvest::config::{load_config_with_hash, Config};
use steno_harvest::crawler::{build_http_client, discover_keys, harvest};
use steno_harvest::output::{load_statistics, print_report, print_statistics};
use tracing_subscriber::EnvFilter;

/// Steno-Harvest: a downloader for Czech parliamentary transcripts
///
/// Walks the stenographic protocol archive session by session and part by
/// part, stopping each walk after a run of missing pages, and mirrors every
/// transcript page into the download directory. Re-running resumes where
/// the previous run stopped.
#[derive(Parser, Debug)]
#[command(name = "steno-harvest")]
#[command(version)]
#[command(about = "A downloader for Czech parliamentary transcripts", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Derive and print the key list without downloading anything
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the download directory and exit (read-only)
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(cli.config.as_ref())?;

    if cli.dry_run {
        handle_dry_run(&config).await?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("steno_harvest=info,warn"),
            1 => EnvFilter::new("steno_harvest=debug,info"),
            2 => EnvFilter::new("steno_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or the defaults when none is given
fn load(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using built-in defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles the --dry-run mode: prints the keys a harvest would scan
async fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Steno-Harvest Dry Run ===\n");

    println!("Source:");
    println!("  Index: {}", config.source.index_url);
    println!("  Documents: {}", config.source.base_url);

    println!("\nScan:");
    println!("  Min content length: {}", config.scan.min_content_length);
    println!(
        "  Max consecutive part errors: {}",
        config.scan.max_consecutive_part_errors
    );
    println!(
        "  Max consecutive session errors: {}",
        config.scan.max_consecutive_session_errors
    );

    println!("\nOutput:");
    println!("  Download directory: {}", config.output.download_dir);
    println!("  Min file size: {} bytes", config.output.min_file_size_bytes);

    let client = build_http_client(&config.http)?;
    let keys = discover_keys(&client, config).await?;

    println!("\nKeys ({}), most recent first:", keys.len());
    for key in &keys {
        println!("  - {}", key);
    }

    Ok(())
}

/// Handles the --stats mode: summarizes the download directory
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Download directory: {}\n", config.output.download_dir);

    let stats = load_statistics(&config.output)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Starting harvest into {} (resuming from files already present)",
        config.output.download_dir
    );

    match harvest(config).await {
        Ok(report) => {
            tracing::info!("Harvest completed successfully");
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
