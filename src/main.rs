//! Link-Ripple main entry point
//!
//! This is the command-line interface for the Link-Ripple broken-link checker.

use anyhow::{Context, Result};
use clap::Parser;
use link_ripple::config::{load_config_with_hash, validate, Config};
use link_ripple::crawler::{crawl, CrawlReport, FetchMode, MAX_CRAWL_DEPTH};
use link_ripple::output::{print_statistics, write_report, CrawlStatistics, ReportFormat};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Link-Ripple: a concurrent broken-link checker
///
/// Link-Ripple starts from a seed URL, follows every link it finds up to
/// the given depth, and reports which links are working and which are
/// broken. Pages are rendered in headless Chromium when one is available.
#[derive(Parser, Debug)]
#[command(name = "link-ripple")]
#[command(version = "1.0.0")]
#[command(about = "A concurrent broken-link checker", long_about = None)]
struct Cli {
    /// Absolute http(s) URL to start checking from
    #[arg(value_name = "URL")]
    url: String,

    /// Link hops to follow from the seed page
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(0..=MAX_CRAWL_DEPTH as i64))]
    depth: u32,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Skip the headless browser and fetch pages over plain HTTP
    #[arg(long)]
    http_only: bool,

    /// Maximum number of fetches in flight at once
    #[arg(long, value_name = "N")]
    max_concurrent: Option<u32>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Exit with a non-zero status when any broken link is found
    #[arg(long)]
    fail_on_broken: bool,

    /// Print link statistics after the report
    #[arg(long)]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_effective_config(&cli)?;

    // Run the crawler
    let report = match crawl(&config, &cli.url, cli.depth).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if report.mode == FetchMode::Http && config.browser.enabled {
        tracing::warn!("Ran without a browser; JavaScript-generated links were missed");
    }

    let seed = seed_url(&report, &cli.url);
    write_report(&report, &seed, cli.format, cli.output.as_deref())
        .context("Failed to write report")?;

    let stats = CrawlStatistics::from_outcomes(&report.outcomes);
    if cli.stats {
        println!();
        print_statistics(&stats);
    }

    tracing::info!(
        "Checked {} links: {} working, {} broken",
        stats.total_links,
        stats.working_links,
        stats.broken_links
    );

    if cli.fail_on_broken && stats.broken_links > 0 {
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_ripple=info,warn"),
            1 => EnvFilter::new("link_ripple=debug,info"),
            2 => EnvFilter::new("link_ripple=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so reports on stdout stay machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// The seed as the crawler recorded it, or as typed if nothing was recorded
fn seed_url(report: &CrawlReport, requested: &str) -> String {
    report
        .outcomes
        .iter()
        .find(|o| o.is_seed())
        .map(|o| o.url.clone())
        .unwrap_or_else(|| requested.trim().to_string())
}

/// Loads the config file (if any) and applies command-line overrides
fn load_effective_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if cli.http_only {
        config.browser.enabled = false;
    }
    if let Some(max) = cli.max_concurrent {
        config.crawler.max_concurrent_fetches = max;
    }

    validate(&config).context("Invalid configuration")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["link-ripple", "https://example.com"]).unwrap();
        assert_eq!(cli.depth, 1);
        assert_eq!(cli.format, ReportFormat::Text);
        assert!(!cli.http_only);
        assert!(!cli.fail_on_broken);
    }

    #[test]
    fn test_cli_rejects_excess_depth() {
        assert!(Cli::try_parse_from(["link-ripple", "https://example.com", "-d", "5"]).is_err());
        assert!(Cli::try_parse_from(["link-ripple", "https://example.com", "-d", "4"]).is_ok());
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::try_parse_from([
            "link-ripple",
            "https://example.com",
            "--http-only",
            "--max-concurrent",
            "12",
            "-f",
            "json",
        ])
        .unwrap();

        let config = load_effective_config(&cli).unwrap();
        assert!(!config.browser.enabled);
        assert_eq!(config.crawler.max_concurrent_fetches, 12);
        assert_eq!(cli.format, ReportFormat::Json);
    }

    #[test]
    fn test_seed_url_prefers_recorded_form() {
        use link_ripple::LinkOutcome;
        use std::time::Duration;

        let mut report = CrawlReport {
            outcomes: vec![LinkOutcome::response(
                "https://example.com/".to_string(),
                None,
                0,
                200,
                Duration::from_millis(5),
            )],
            mode: FetchMode::Http,
            peak_in_flight: 1,
            elapsed: Duration::from_millis(5),
        };
        assert_eq!(seed_url(&report, "https://example.com"), "https://example.com/");

        report.outcomes.clear();
        assert_eq!(seed_url(&report, " https://example.com "), "https://example.com");
    }

    #[test]
    fn test_invalid_override_rejected() {
        let cli =
            Cli::try_parse_from(["link-ripple", "https://example.com", "--max-concurrent", "0"])
                .unwrap();
        assert!(load_effective_config(&cli).is_err());
    }
}
