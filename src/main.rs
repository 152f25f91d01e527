//! Reel Harvester main entry point
//!
//! This is the command-line interface for the Reel Harvester review crawler.

use anyhow::Context;
use clap::Parser;
use reel_harvester::config::{load_config_with_hash, validate, Config, ConfigOverrides};
use reel_harvester::crawler::{run_crawl, seed_frontier};
use reel_harvester::output::{generate_markdown_summary, print_statistics, DocumentStatistics};
use reel_harvester::storage::{load_prior_documents, JsonCheckpointStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Reel Harvester: a polite film-review harvester
///
/// Walks the paginated review listings of RogerEbert.com, extracts each new
/// review into a structured document and keeps a deduplicated, resumable JSON
/// document set on disk.
#[derive(Parser, Debug)]
#[command(name = "reel-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A polite film-review harvester", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to the built-in RogerEbert.com profile)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of new reviews to collect [default: 100]
    #[arg(long)]
    limit: Option<usize>,

    /// Listing page to start from; 1 starts at the seeds only [default: 1]
    #[arg(long)]
    start_page: Option<u32>,

    /// Seconds to wait before each listing page request [default: 2.0]
    #[arg(long, value_name = "SECONDS")]
    sleep: Option<f64>,

    /// Seconds to wait before each review page request [default: 1.0]
    #[arg(long, value_name = "SECONDS")]
    detail_sleep: Option<f64>,

    /// Checkpoint/output JSON file [default: data/raw/rogerebert_reviews.json]
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start a fresh crawl, ignoring any previous checkpoint
    #[arg(long)]
    fresh: bool,

    /// Validate settings and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show statistics of the checkpoint file and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Write a markdown summary of the checkpoint file to PATH and exit
    #[arg(long, value_name = "PATH", conflicts_with_all = ["dry_run", "stats"])]
    export_summary: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            limit: self.limit,
            start_page: self.start_page,
            listing_delay_secs: self.sleep,
            detail_delay_secs: self.detail_sleep,
            output: self.output.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load_settings(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {:#}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(path) = &cli.export_summary {
        handle_export_summary(&config, path)?;
    } else {
        handle_crawl(config, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG`, when set, takes precedence over the flags.
fn setup_logging(verbose: u8, quiet: bool) {
    let default_filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "reel_harvester=info,warn",
            1 => "reel_harvester=debug,info",
            2 => "reel_harvester=trace,debug",
            _ => "trace",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (if any), applies flags and validates the result
fn load_settings(cli: &Cli) -> anyhow::Result<Config> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("cannot load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using built-in profile");
            Config::default()
        }
    };

    let config = config.with_overrides(&cli.overrides());
    validate(&config).context("invalid settings")?;
    Ok(config)
}

/// Handles the --dry-run mode: validates settings and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Reel Harvester Dry Run ===\n");

    println!("Site:");
    println!("  Name: {}", config.site.name);
    println!("  Base URL: {}", config.site.base_url);
    println!("  Review path prefix: {}", config.site.review_path_prefix);
    println!("  Minimum slug tokens: {}", config.site.min_slug_tokens);
    println!("  Rating scale: {}", config.site.rating_scale);

    println!("\nCrawler Configuration:");
    println!("  Limit: {}", config.crawler.limit);
    println!("  Start page: {}", config.crawler.start_page);
    println!("  Listing delay: {}s", config.crawler.listing_delay_secs);
    println!("  Detail delay: {}s", config.crawler.detail_delay_secs);
    println!(
        "  Candidates per listing page: {}",
        config.crawler.max_candidates_per_page
    );
    println!("  Checkpoint every: {} reviews", config.crawler.checkpoint_every);
    println!("  Respect robots.txt: {}", config.crawler.respect_robots);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);

    println!("\nOutput:");
    println!("  Checkpoint: {}", config.output.path.display());

    let frontier = seed_frontier(config)?;
    println!("\nInitial Listing Queue ({}):", frontier.len());
    for url in frontier.iter() {
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Loads the documents of the configured checkpoint file
fn load_checkpoint(config: &Config) -> anyhow::Result<Vec<reel_harvester::Document>> {
    let store = JsonCheckpointStore::new(config.output.path.clone());
    load_prior_documents(&store)
        .with_context(|| format!("cannot read {}", config.output.path.display()))
}

/// Handles the --stats mode: shows statistics of the checkpoint file
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Checkpoint: {}\n", config.output.path.display());

    let documents = load_checkpoint(config)?;
    let stats = DocumentStatistics::from_documents(&documents);
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: generates a markdown summary
fn handle_export_summary(config: &Config, output_path: &Path) -> anyhow::Result<()> {
    println!("=== Exporting Review Summary ===\n");
    println!("Checkpoint: {}", config.output.path.display());
    println!("Output: {}", output_path.display());
    println!();

    let documents = load_checkpoint(config)?;
    let stats = DocumentStatistics::from_documents(&documents);

    tracing::info!("Generating markdown summary...");
    let source = config.output.path.display().to_string();
    generate_markdown_summary(&stats, &source, output_path)
        .with_context(|| format!("cannot write {}", output_path.display()))?;

    println!("✓ Summary exported to: {}", output_path.display());

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring previous checkpoint)");
    } else {
        tracing::info!("Starting crawl (will resume from checkpoint if present)");
    }

    match run_crawl(config, fresh).await {
        Ok(report) => {
            tracing::info!(
                "Crawl completed successfully: {} new reviews, {} total",
                report.collected,
                report.total
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
