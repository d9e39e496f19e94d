//! Custody-Statement main entry point
//!
//! This is the command-line interface for the custody statement collector.

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::Parser;
use custody_statement::config::{load_config, Config};
use custody_statement::output::{log_collection_summary, log_options_summary, write_json};
use custody_statement::{get_statement_collection, get_statement_options, RetryPolicy, Session};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Custody-Statement: collects custody statements from a postback-driven site
///
/// Walks every institution and account of an authenticated session, requests
/// the statement for the month of the given date, and writes the extracted
/// holdings as JSON.
#[derive(Parser, Debug)]
#[command(name = "custody-statement")]
#[command(version = "1.0.0")]
#[command(about = "Collects custody statements as JSON", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Statement date (YYYY-MM-DD); defaults to today
    #[arg(long, value_name = "DATE", conflicts_with = "options")]
    date: Option<NaiveDate>,

    /// List selectable institutions, accounts and months instead of collecting
    #[arg(long)]
    options: bool,

    /// Write JSON to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    setup_logging(cli.verbose, cli.quiet, config.crawl.trace);
    tracing::info!("Configuration loaded from: {}", cli.config.display());

    let session = Session::new(&config.session, RetryPolicy::from(&config.retry))
        .context("Failed to build HTTP session")?;

    if cli.options {
        handle_options(&session, &config, &cli).await
    } else {
        handle_statement(&session, &config, &cli).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// The `trace` crawl option raises the crate's own filter to `trace`
/// regardless of `-v`.
fn setup_logging(verbose: u8, quiet: bool, trace: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else if trace {
        EnvFilter::new("custody_statement=trace,info")
    } else {
        match verbose {
            0 => EnvFilter::new("custody_statement=info,warn"),
            1 => EnvFilter::new("custody_statement=debug,info"),
            2 => EnvFilter::new("custody_statement=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --options mode: lists what can be selected
async fn handle_options(session: &Session, config: &Config, cli: &Cli) -> anyhow::Result<()> {
    let options = get_statement_options(session, &config.crawl)
        .await
        .context("Option discovery failed")?;

    log_options_summary(&options);
    write_json(&options, cli.output.as_deref()).context("Failed to write options")?;
    Ok(())
}

/// Handles the main collection run
async fn handle_statement(session: &Session, config: &Config, cli: &Cli) -> anyhow::Result<()> {
    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());
    tracing::info!(
        "Collecting statements for {} (cap dates: {}, downloads: {})",
        date,
        config.crawl.cap_dates,
        config.crawl.downloaded_folder.display()
    );

    let collection = match get_statement_collection(session, &config.crawl, date).await {
        Ok(collection) => collection,
        Err(e) => {
            tracing::error!("Collection failed: {}", e);
            return Err(e).context("Statement collection failed");
        }
    };

    write_json(&collection, cli.output.as_deref()).context("Failed to write statements")?;
    log_collection_summary(&collection);
    Ok(())
}
