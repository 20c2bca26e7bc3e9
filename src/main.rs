//! Ripple-Deepcrawl main entry point
//!
//! This is the command-line interface for the Ripple-Deepcrawl traversal engine.

use anyhow::Context;
use clap::Parser;
use futures::StreamExt;
use ripple_deepcrawl::config::{
    build_filter_chain, build_scorer, build_strategy, load_config_with_hash, validate_start_url,
    Config,
};
use ripple_deepcrawl::fetcher::HttpFetcher;
use ripple_deepcrawl::output::{
    print_summary, write_markdown_summary, OutcomeStore, RunStatus, RunSummary,
};
use ripple_deepcrawl::{CrawlOutcome, DeepCrawlDispatcher, RunOptions, RunOutput, TraversalStrategy};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Ripple-Deepcrawl: breadth-first, depth-first and best-first site traversal
///
/// Ripple-Deepcrawl walks a site from a start URL, filtering and scoring the
/// links it discovers, and stops at the configured depth and page budgets.
#[derive(Parser, Debug)]
#[command(name = "ripple-deepcrawl")]
#[command(version = "1.0.0")]
#[command(about = "A bounded deep-crawl traversal engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Start URL, overriding traversal.start-url
    #[arg(long, value_name = "URL")]
    start_url: Option<String>,

    /// Print outcomes as they arrive instead of after the run
    #[arg(long)]
    stream: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

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

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let start_url = cli
        .start_url
        .clone()
        .or_else(|| config.traversal.start_url.clone())
        .context("No start URL: set traversal.start-url or pass --start-url")?;
    validate_start_url(&start_url)?;

    if cli.dry_run {
        handle_dry_run(&config, &start_url)
    } else {
        let stream = cli.stream || config.traversal.stream;
        handle_crawl(&config, &config_hash, &start_url, stream).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_deepcrawl=info,warn"),
            1 => EnvFilter::new("ripple_deepcrawl=debug,info"),
            2 => EnvFilter::new("ripple_deepcrawl=trace,debug"),
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

/// Builds the strategy the config describes, sharing one HTTP client
/// between page fetches and head fetches
fn build_components(
    config: &Config,
) -> anyhow::Result<(HttpFetcher, Arc<dyn TraversalStrategy>)> {
    let fetcher =
        HttpFetcher::from_config(&config.user_agent).context("Failed to build HTTP client")?;

    let chain = build_filter_chain(&config.filters, Arc::new(fetcher.clone()))?;
    let scorer = build_scorer(&config.scoring);
    let strategy = build_strategy(&config.traversal, chain, scorer)?;

    Ok((fetcher, strategy))
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, start_url: &str) -> anyhow::Result<()> {
    let (_, strategy) = build_components(config)?;
    let traversal = &config.traversal;

    println!("=== Ripple-Deepcrawl Dry Run ===\n");

    println!("Traversal:");
    println!("  Strategy: {}", strategy.name());
    println!("  Start URL: {}", start_url);
    println!("  Max depth: {}", traversal.max_depth);
    println!("  Max pages: {}", traversal.max_pages);
    println!("  Include external: {}", traversal.include_external);
    println!("  Concurrency: {}", traversal.concurrency);
    if let Some(threshold) = traversal.score_threshold {
        println!("  Score threshold: {}", threshold);
    }

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    let filters = strategy.filter_chain().filters();
    println!("\nFilters ({}):", filters.len());
    for filter in filters {
        println!("  - {}", filter.name());
    }

    println!("\nOutput:");
    println!(
        "  Database: {}",
        config.output.database_path.as_deref().unwrap_or("(none)")
    );
    println!(
        "  Summary: {}",
        config.output.summary_path.as_deref().unwrap_or("(none)")
    );

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    config_hash: &str,
    start_url: &str,
    stream: bool,
) -> anyhow::Result<()> {
    let (fetcher, strategy) = build_components(config)?;

    let mut store = config
        .output
        .database_path
        .as_deref()
        .map(|path| {
            OutcomeStore::open(Path::new(path))
                .with_context(|| format!("Failed to open database {}", path))
        })
        .transpose()?;
    let run_id = match store.as_mut() {
        Some(store) => Some(store.start_run(config_hash, strategy.name(), start_url)?),
        None => None,
    };

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let strategy = strategy.clone();
        let interrupted = interrupted.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping after the current round");
                interrupted.store(true, Ordering::SeqCst);
                strategy.shutdown();
            }
        });
    }

    tracing::info!(
        "Starting {} crawl from {} (max depth {}, max pages {})",
        strategy.name(),
        start_url,
        config.traversal.max_depth,
        config.traversal.max_pages
    );

    let dispatcher = DeepCrawlDispatcher::new(fetcher);
    let options = RunOptions::new()
        .with_strategy(strategy.clone())
        .with_stream(stream)
        .with_concurrency(config.traversal.concurrency);

    let outcomes = match dispatcher.run(start_url, &options).await {
        RunOutput::Stream(mut outcomes_stream) => {
            let mut outcomes = Vec::new();
            while let Some(outcome) = outcomes_stream.next().await {
                print_outcome(&outcome);
                if let (Some(store), Some(run_id)) = (store.as_mut(), run_id) {
                    store.record_outcome(run_id, &outcome)?;
                }
                outcomes.push(outcome);
            }
            outcomes
        }
        RunOutput::Batch(outcomes) => {
            if let (Some(store), Some(run_id)) = (store.as_mut(), run_id) {
                store.record_outcomes(run_id, &outcomes)?;
            }
            outcomes
        }
        RunOutput::Single(outcome) => vec![outcome],
    };

    let stats = strategy.stats();
    let cancelled = interrupted.load(Ordering::SeqCst);

    if let (Some(store), Some(run_id)) = (store.as_mut(), run_id) {
        let status = if cancelled {
            RunStatus::Cancelled
        } else {
            RunStatus::Completed
        };
        store.finish_run(run_id, &stats, status)?;
    }

    let summary = RunSummary::new(
        strategy.name(),
        start_url,
        config_hash,
        stats,
        strategy.filter_chain(),
        &outcomes,
    )
    .with_cancelled(cancelled);

    print_summary(&summary);

    if let Some(path) = &config.output.summary_path {
        write_markdown_summary(&summary, Path::new(path))
            .with_context(|| format!("Failed to write summary to {}", path))?;
        println!("\n✓ Summary written to: {}", path);
    }

    Ok(())
}

fn print_outcome(outcome: &CrawlOutcome) {
    let depth = outcome.depth().unwrap_or_default();
    if outcome.success {
        println!(
            "[depth {}] {} ({} links)",
            depth,
            outcome.url,
            outcome.links.len()
        );
    } else {
        println!(
            "[depth {}] {} FAILED: {}",
            depth,
            outcome.url,
            outcome.error_message.as_deref().unwrap_or("unknown error")
        );
    }
}
