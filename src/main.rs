//! Gallery-Harvest main entry point
//!
//! This is the command-line interface for the Gallery-Harvest image harvester.

use anyhow::Context;
use clap::Parser;
use gallery_harvest::config::{
    apply_env_overrides, load_config_with_hash, validate, Config, PageFailurePolicy,
    TARGET_URL_ENV,
};
use gallery_harvest::harvest::{register_interrupt, run_harvest, InterruptAction};
use gallery_harvest::output::print_statistics;
use gallery_harvest::url::listing_page_url;
use gallery_harvest::{ConfigError, HarvestError};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Exit status for a run that started but did not finish normally
const EXIT_RUN_FAILED: u8 = 1;

/// Exit status for configuration errors, reported before any navigation
const EXIT_CONFIG: u8 = 2;

/// Exit status after a second Ctrl-C, matching shell convention for SIGINT
const EXIT_INTERRUPTED: i32 = 130;

/// Gallery-Harvest: a listing-to-disk image harvester
///
/// Pages through a product listing, opens every product's detail page and
/// saves the images found in its media containers as
/// `<item-id>_<item-name>_<n>.jpg`.
#[derive(Parser, Debug)]
#[command(name = "gallery-harvest")]
#[command(version)]
#[command(about = "A listing-to-disk image harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Listing base URL (overrides TARGET_URL)
    #[arg(long, value_name = "URL")]
    target_url: Option<String>,

    /// Maximum number of listing pages to visit
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Directory receiving the downloaded images
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Continue with the next page when a listing page fails to load
    #[arg(long)]
    skip_failed_pages: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            if is_config_error(&e) {
                ExitCode::from(EXIT_CONFIG)
            } else {
                ExitCode::from(EXIT_RUN_FAILED)
            }
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gallery_harvest=info,warn"),
            1 => EnvFilter::new("gallery_harvest=debug,info"),
            2 => EnvFilter::new("gallery_harvest=trace,debug"),
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

fn is_config_error(error: &anyhow::Error) -> bool {
    error.downcast_ref::<ConfigError>().is_some()
        || matches!(
            error.downcast_ref::<HarvestError>(),
            Some(HarvestError::Config(_))
        )
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = resolve_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config)?;
        return Ok(ExitCode::SUCCESS);
    }

    handle_harvest(config).await
}

/// Builds the effective configuration: file, then environment, then flags
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
    }

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    apply_env_overrides(&mut config);

    if let Some(target_url) = &cli.target_url {
        config.crawler.target_url = Some(target_url.clone());
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output.output_dir = output_dir.clone();
    }
    if cli.skip_failed_pages {
        config.crawler.on_page_failure = PageFailurePolicy::SkipPage;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let target_url = config
        .target_url()
        .ok_or(ConfigError::MissingSetting(TARGET_URL_ENV))?;
    let first_page = listing_page_url(target_url, 1)?;

    println!("=== Gallery-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  First page: {}", first_page);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Render timeout: {}s", config.crawler.render_timeout_seconds);
    println!("  Poll interval: {}ms", config.crawler.poll_interval_ms);
    println!("  Download delay: {}ms", config.crawler.download_delay_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_seconds);
    match config.crawler.max_run_seconds {
        Some(limit) => println!("  Run limit: {}s", limit),
        None => println!("  Run limit: none"),
    }
    println!("  On page failure: {:?}", config.crawler.on_page_failure);

    println!("\nSelectors:");
    println!("  Listing item: {}", config.selectors.listing_item);
    println!("  Media container: {}", config.selectors.media_container);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Directory: {}", config.output.output_dir.display());

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config) -> anyhow::Result<ExitCode> {
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                match register_interrupt(&cancel) {
                    InterruptAction::Stop => tracing::warn!(
                        "Interrupt received, stopping after the current product (Ctrl-C again to quit now)"
                    ),
                    InterruptAction::ForceQuit => {
                        tracing::error!("Second interrupt received, exiting");
                        std::process::exit(EXIT_INTERRUPTED);
                    }
                }
            }
        });
    }

    let stats = run_harvest(&config, cancel).await?;

    print_statistics(&stats);

    if stats.is_failure() {
        tracing::error!(
            "Harvest stopped early: {}",
            stats
                .outcome
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default()
        );
        Ok(ExitCode::from(EXIT_RUN_FAILED))
    } else {
        tracing::info!("Harvest completed successfully");
        Ok(ExitCode::SUCCESS)
    }
}
