//! Hero-Harvest main entry point
//!
//! This is the command-line interface for the hero image harvester.

use anyhow::Context;
use clap::Parser;
use hero_harvest::config::{load_config_with_hash, Config};
use hero_harvest::crawler::{crawl, resume_index, RunOptions};
use hero_harvest::output::{print_summary, OutputStore};
use hero_harvest::urllist::{merge_url_list, read_merge_file};
use hero_harvest::UrlList;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Hero-Harvest: collects the hero images of every page in a URL list
///
/// Each page is rendered in headless Chromium; up to four large, distinct
/// images are downloaded, recompressed into a shared 100KB budget and saved
/// as `{index}_{slot}.png`. Interrupted runs resume from the last page with
/// saved images.
#[derive(Parser, Debug)]
#[command(name = "hero-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Harvests hero images from a list of web pages", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start from the first URL, ignoring existing images
    #[arg(long)]
    fresh: bool,

    /// Validate config and show where the crawl would start without crawling
    #[arg(long, conflicts_with = "merge_only")]
    dry_run: bool,

    /// Merge the input file into the URL list and exit
    #[arg(long, conflicts_with = "dry_run")]
    merge_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(cli.config.as_deref())?;

    if cli.dry_run {
        handle_dry_run(&config, cli.fresh)?;
    } else if cli.merge_only {
        handle_merge_only(&config)?;
    } else {
        handle_crawl(&config, cli.fresh).await?;
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
            0 => EnvFilter::new("hero_harvest=info,warn"),
            1 => EnvFilter::new("hero_harvest=debug,info"),
            2 => EnvFilter::new("hero_harvest=trace,debug"),
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

fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles the --dry-run mode: shows the configuration and the resume point
fn handle_dry_run(config: &Config, fresh: bool) -> anyhow::Result<()> {
    println!("=== Hero-Harvest Dry Run ===\n");

    println!("Paths:");
    println!("  URL list: {}", config.paths.url_list);
    println!("  Merge file: {}", config.paths.merge_file);
    println!("  Output directory: {}", config.paths.output_dir);

    println!("\nBrowser:");
    println!("  Headless: {}", config.browser.headless);
    println!(
        "  Window: {}x{}",
        config.browser.window_width, config.browser.window_height
    );
    println!("  Settle delay: {}ms", config.browser.settle_delay_ms);
    println!(
        "  Navigation timeout: {}s",
        config.browser.navigation_timeout_secs
    );
    if let Some(path) = &config.browser.chrome_path {
        println!("  Chrome: {}", path);
    }

    println!("\nFetch:");
    println!("  Probe timeout: {}s", config.fetch.probe_timeout_secs);
    println!("  Fetch timeout: {}s", config.fetch.fetch_timeout_secs);

    println!("\nHarvest:");
    println!("  Max images per page: {}", config.harvest.max_images);
    println!(
        "  Min image size: {:.1}KB",
        config.harvest.min_image_bytes as f64 / 1024.0
    );
    println!("  Page budget: {:.1}KB", config.harvest.page_budget_kib);

    let list_path = Path::new(&config.paths.url_list);
    let merge_path = Path::new(&config.paths.merge_file);

    println!("\nURLs:");
    if list_path.exists() {
        let list = UrlList::load(list_path)?;
        println!("  In URL list: {}", list.len());
    } else {
        println!("  In URL list: none (file missing)");
    }
    if merge_path.exists() {
        println!("  In merge file: {}", read_merge_file(merge_path)?.len());
    }

    let store = OutputStore::new(&config.paths.output_dir);
    println!("\nWould start at index: {}", resume_index(&store, fresh)?);

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --merge-only mode: normalizes the URL list and exits
fn handle_merge_only(config: &Config) -> anyhow::Result<()> {
    let outcome = merge_url_list(
        Path::new(&config.paths.url_list),
        Path::new(&config.paths.merge_file),
    )?;

    println!("Processed {} URLs", outcome.processed);
    println!("Added {} new URLs", outcome.added);
    println!("Removed {} duplicates", outcome.removed);
    if let Some(index) = outcome.first_shifted {
        println!("Page indices shifted from {}", index);
    }
    println!("Total unique URLs: {}", outcome.list.len());
    Ok(())
}

/// Handles the normal crawl mode
async fn handle_crawl(config: &Config, fresh: bool) -> anyhow::Result<()> {
    tracing::info!("Starting harvest...");

    let summary = crawl(config, RunOptions { fresh }).await?;

    println!();
    print_summary(&summary);
    Ok(())
}
