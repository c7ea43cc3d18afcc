//! Trust-Scout main entry point
//!
//! This is the command-line interface for the Trust-Scout business-directory scraper.

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use trust_scout::config::{
    is_known_category, load_config_with_hash, validate, Config, KNOWN_CATEGORIES,
};
use trust_scout::output::{generate_markdown_report, load_report, print_report, TOP_N};
use trust_scout::scrape::{build_http_client, Coordinator};
use trust_scout::session::HttpSession;
use trust_scout::storage::{RunLog, RunRecord, RunStatus};

/// Trust-Scout: a business-directory scraper
///
/// Trust-Scout walks the listing pages of one review-site category, visits
/// each business's detail page for its contact details, and appends one CSV
/// row per business as it goes.
#[derive(Parser, Debug)]
#[command(name = "trust-scout")]
#[command(version = "1.0.0")]
#[command(about = "A business-directory scraper for review sites", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG", required_unless_present = "list_categories")]
    config: Option<PathBuf>,

    /// Category slug to scrape, overriding the config file
    #[arg(long, value_name = "SLUG")]
    category: Option<String>,

    /// CSV file to append to, overriding the config file
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Stop after this many listing pages
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be scraped without scraping
    #[arg(long, conflicts_with_all = ["report", "export_summary", "history", "list_categories"])]
    dry_run: bool,

    /// Show a report of the CSV file and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary", "history", "list_categories"])]
    report: bool,

    /// Write a markdown report of the CSV file and exit
    #[arg(long, conflicts_with_all = ["dry_run", "report", "history", "list_categories"])]
    export_summary: bool,

    /// List recorded runs from the run log and exit
    #[arg(long, conflicts_with_all = ["dry_run", "report", "export_summary", "list_categories"])]
    history: bool,

    /// List the known category slugs and exit
    #[arg(long)]
    list_categories: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if cli.list_categories {
        handle_list_categories();
        return Ok(());
    }

    let config_path = cli
        .config
        .as_deref()
        .ok_or("a configuration file is required")?;

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", config_path.display());
    let (mut config, config_hash) = match load_config_with_hash(config_path) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    apply_overrides(&mut config, &cli)?;

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.report {
        handle_report(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else if cli.history {
        handle_history(&config)?;
    } else {
        handle_scrape(config, &config_hash).await?;
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
            0 => EnvFilter::new("trust_scout=info,warn"),
            1 => EnvFilter::new("trust_scout=debug,info"),
            2 => EnvFilter::new("trust_scout=trace,debug"),
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

/// Applies command-line overrides and re-validates the result
fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(category) = &cli.category {
        config.scraper.category = category.clone();
    }
    if let Some(output) = &cli.output {
        config.output.csv_path = output.display().to_string();
    }
    if let Some(max_pages) = cli.max_pages {
        config.scraper.max_pages = Some(max_pages);
    }

    if cli.category.is_some() || cli.output.is_some() || cli.max_pages.is_some() {
        validate(config)?;
    }
    Ok(())
}

fn handle_list_categories() {
    for category in KNOWN_CATEGORIES {
        println!("{}", category);
    }
}

/// Handles the --dry-run mode: validates config and shows what would be scraped
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Trust-Scout Dry Run ===\n");

    println!("Scraper Configuration:");
    println!("  Base URL: {}", config.scraper.base_url);
    println!("  Category: {}", config.scraper.category);
    if !is_known_category(&config.scraper.category) {
        println!("    (not a known category; the listing may be empty)");
    }
    println!("  Landing page: {}", config.scraper.landing_url()?);
    println!("  Page size: {}", config.scraper.page_size);
    match config.scraper.max_pages {
        Some(max) => println!("  Max pages: {}", max),
        None => println!("  Max pages: all"),
    }
    println!("  Wait timeout: {}ms", config.scraper.wait_timeout);
    println!("  Detail delay: {}ms", config.scraper.detail_delay);
    println!("  Page delay: {}ms", config.scraper.page_delay);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    println!("  Summary: {}", config.output.summary_path);
    if let Some(run_log) = &config.output.run_log_path {
        println!("  Run log: {}", run_log);
    }

    println!("\nSelectors:");
    for (key, selector) in config.selectors.entries() {
        println!("  {}: {}", key, selector);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --report mode: prints rankings from the CSV file
fn handle_report(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let summary = load_report(Path::new(&config.output.csv_path), TOP_N)?
        .with_last_run(latest_run(config)?);

    print_report(&summary);

    Ok(())
}

/// Handles the --export-summary mode: writes the markdown report
fn handle_export_summary(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Exporting Company Report ===\n");
    println!("CSV: {}", config.output.csv_path);
    println!("Output: {}", config.output.summary_path);
    println!();

    tracing::info!("Loading records from {}", config.output.csv_path);
    let summary = load_report(Path::new(&config.output.csv_path), TOP_N)?
        .with_last_run(latest_run(config)?);

    tracing::info!("Generating markdown report...");
    generate_markdown_report(&summary, Path::new(&config.output.summary_path))?;

    println!("✓ Report exported to: {}", config.output.summary_path);

    Ok(())
}

/// Handles the --history mode: lists recorded runs
fn handle_history(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = &config.output.run_log_path else {
        println!("No run log configured (set output.run-log-path)");
        return Ok(());
    };

    let run_log = RunLog::open(Path::new(path))?;
    let runs = run_log.list_runs(20)?;

    if runs.is_empty() {
        println!("No runs recorded in {}", path);
        return Ok(());
    }

    println!("=== Run History ({}) ===\n", path);
    for run in runs {
        println!(
            "#{:<4} {:<10} {:<28} {:>6} rows  {}  {}",
            run.id,
            run.status.to_db_string(),
            run.category,
            run.rows_written,
            run.started_at,
            run.output_path
        );
    }

    Ok(())
}

fn latest_run(
    config: &Config,
) -> Result<Option<RunRecord>, Box<dyn std::error::Error>> {
    match &config.output.run_log_path {
        Some(path) => Ok(RunLog::open(Path::new(path))?.latest_run()?),
        None => Ok(None),
    }
}

/// Handles the main scrape operation
async fn handle_scrape(config: Config, config_hash: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Category: {}, output: {}",
        config.scraper.category,
        config.output.csv_path
    );

    let mut run_log = match &config.output.run_log_path {
        Some(path) => Some(RunLog::open(Path::new(path))?),
        None => None,
    };
    let run_id = match run_log.as_mut() {
        Some(log) => Some(log.create_run(
            &config.scraper.category,
            &config.output.csv_path,
            config_hash,
        )?),
        None => None,
    };

    let client = build_http_client(&config.user_agent)?;
    let session = HttpSession::new(client.clone());
    let coordinator = Coordinator::with_client(config, client, session)?;

    let cancel = coordinator.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping before the next business");
            cancel.cancel();
        }
    });

    let progress = coordinator.subscribe();

    // Run the scraper
    match coordinator.run().await {
        Ok(summary) => {
            if let (Some(log), Some(id)) = (run_log.as_mut(), run_id) {
                log.finish_run(id, summary.outcome.into(), summary.rows_written)?;
            }
            tracing::info!(
                "Scrape {}: {} rows written",
                summary.outcome.as_str(),
                summary.rows_written
            );
            Ok(())
        }
        Err(e) => {
            let rows_written = progress.borrow().rows_written;
            if let (Some(log), Some(id)) = (run_log.as_mut(), run_id) {
                if let Err(log_err) = log.finish_run(id, RunStatus::Failed, rows_written) {
                    tracing::warn!("Failed to record run outcome: {}", log_err);
                }
            }
            tracing::error!("Scrape failed: {}", e);
            Err(e.into())
        }
    }
}
