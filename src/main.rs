//! Burrow main entry point
//!
//! This is the command-line interface for the Burrow crawler.

use anyhow::{bail, Context};
use burrow::config::{load_config_or_default, parse_command, CrawlConfiguration, Settings, DEFAULT_PREFIX};
use burrow::crawler::Crawler;
use burrow::ingest::{ingest_pages, HttpIngestor, IngestReport, Session};
use burrow::notify::{Notifier, TracingNotifier};
use burrow::output::{generate_markdown_summary, summary_message, CrawlStatistics};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Burrow: a concurrent, policy-constrained web crawler
///
/// Crawls from the given seed URLs, staying within the seeds' domains and
/// paths plus any `--allow` domains (fetched but never followed), and hands
/// every recorded page to the configured ingestion service.
#[derive(Parser, Debug)]
#[command(name = "burrow")]
#[command(version)]
#[command(about = "A concurrent, policy-constrained web crawler", long_about = None)]
struct Cli {
    /// Path to TOML settings file (defaults are used when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write a markdown report of the run to this file
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Skip ingestion even when an endpoint is configured
    #[arg(long)]
    no_ingest: bool,

    /// Seed URLs, optionally followed by `--allow` and extra domains.
    /// Without words, the configured scheduled command is run.
    #[arg(value_name = "WORDS", trailing_var_arg = true, allow_hyphen_values = true)]
    words: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let settings = load_config_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    let (text, scheduled) = command_text(&cli, &settings)?;
    let Some(command) = parse_command(&text, DEFAULT_PREFIX) else {
        bail!("Not a {} command: {}", DEFAULT_PREFIX, text);
    };
    if !command.rejected.is_empty() {
        tracing::warn!("Ignored invalid entries: {}", command.rejected.join(", "));
    }

    let session = Session::new(command.text.clone(), scheduled);
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
    let config = CrawlConfiguration::from_command(&settings, &command);

    tracing::info!(
        "Session {}: roots [{}], fetch-only [{}]",
        session.id,
        sorted(&config.root_domains),
        sorted(&config.allowed_domains)
    );

    let crawler = Crawler::new(config).with_notifier(Arc::clone(&notifier));
    let result = crawler.run(&command.seeds).await.context("Crawl failed")?;

    let report = run_ingestion(&cli, &settings, &result, notifier.as_ref(), &session).await?;

    let stats = CrawlStatistics::from_run(&result, report.as_ref());
    let message = summary_message(&stats);
    notifier.notify(&message);
    if !cli.quiet {
        println!("{}", message);
    }

    if let Some(path) = &cli.summary {
        generate_markdown_summary(&stats, &result, path)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
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
            0 => EnvFilter::new("burrow=info,warn"),
            1 => EnvFilter::new("burrow=debug,info"),
            2 => EnvFilter::new("burrow=trace,debug"),
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

/// Builds the command text from the CLI words, or the scheduled command
fn command_text(cli: &Cli, settings: &Settings) -> anyhow::Result<(String, bool)> {
    if !cli.words.is_empty() {
        return Ok((format!("{} {}", DEFAULT_PREFIX, cli.words.join(" ")), false));
    }

    match settings.scheduled_command() {
        Some(command) => {
            tracing::info!(
                "Running scheduled command (daily at {:02}:{:02} UTC): {}",
                settings.schedule_hour,
                settings.schedule_minute,
                command
            );
            let text = if command.split_whitespace().next() == Some(DEFAULT_PREFIX) {
                command.to_string()
            } else {
                format!("{} {}", DEFAULT_PREFIX, command)
            };
            Ok((text, true))
        }
        None => bail!("No seed URLs given and no scheduled-command configured"),
    }
}

/// Hands the scraped pages to the ingestion service, if one is configured
async fn run_ingestion(
    cli: &Cli,
    settings: &Settings,
    result: &burrow::CrawlResult,
    notifier: &dyn Notifier,
    session: &Session,
) -> anyhow::Result<Option<IngestReport>> {
    if cli.no_ingest {
        tracing::info!("Ingestion disabled by --no-ingest");
        return Ok(None);
    }

    let Some(endpoint) = settings.ingest.endpoint.as_deref() else {
        tracing::debug!("No ingestion endpoint configured");
        return Ok(None);
    };

    let timeout = Duration::from_secs(settings.clamped_page_timeout());
    let ingestor = HttpIngestor::new(endpoint, timeout).context("Failed to build ingestion client")?;
    tracing::info!(
        "Ingesting {} pages into {}",
        result.scraped_count(),
        ingestor.endpoint()
    );
    Ok(Some(
        ingest_pages(result, &ingestor, notifier, session, settings).await,
    ))
}

fn sorted(domains: &std::collections::HashSet<String>) -> String {
    let mut domains: Vec<&str> = domains.iter().map(String::as_str).collect();
    domains.sort_unstable();
    domains.join(", ")
}
