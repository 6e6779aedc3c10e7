//! Arachnid main entry point
//!
//! This is the command-line interface for the Arachnid reconnaissance crawler.

use anyhow::{bail, Context};
use arachnid::config::{load_config_with_hash, validate, validate_seed, CrawlerConfig};
use arachnid::crawler::{Crawler, ReqwestTransport};
use arachnid::fuzz::FuzzingOptions;
use arachnid::output::generate_markdown_summary;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Arachnid: a single-domain reconnaissance crawler
///
/// Arachnid crawls one domain (and optionally its subdomains), following
/// links and word-list candidates while respecting scope, robots.txt and
/// politeness delays. It reports pages, documents, emails, phone numbers,
/// social profiles and custom matches as JSON.
#[derive(Parser, Debug)]
#[command(name = "arachnid")]
#[command(version = "1.0.0")]
#[command(about = "A single-domain reconnaissance crawler", long_about = None)]
struct Cli {
    /// URL the crawl starts from
    #[arg(value_name = "SEED")]
    seed: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Obey robots.txt, identify as Googlebot, wait long between requests, no fuzzing
    #[arg(long, conflicts_with = "aggressive")]
    stealth: bool,

    /// Ignore robots.txt, no delay, fuzz paths and subdomains
    #[arg(long, conflicts_with = "stealth")]
    aggressive: bool,

    /// Map links only, collecting no contact signals or documents
    #[arg(long)]
    layout_only: bool,

    /// Signal families to collect: phone, email, social, docs, all, none
    #[arg(long, value_name = "KIND", num_args = 1.., value_delimiter = ',')]
    find: Vec<String>,

    /// Request every path in the path word list
    #[arg(long)]
    fuzz_paths: bool,

    /// Request every subdomain in the subdomain word list
    #[arg(long)]
    fuzz_subs: bool,

    /// Crawl robots-disallowed URLs too, flagging them in the report
    #[arg(long)]
    ignore_robots: bool,

    /// User agent sent with every request
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Write the JSON report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also write a markdown summary
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Validate the configuration and show what would be crawled without crawling
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

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    validate_seed(&cli.seed).with_context(|| format!("Cannot crawl '{}'", cli.seed))?;

    if cli.dry_run {
        handle_dry_run(&cli.seed, &config)
    } else {
        handle_crawl(&cli, config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("arachnid=info,warn"),
            1 => EnvFilter::new("arachnid=debug,info"),
            2 => EnvFilter::new("arachnid=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so the JSON report on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<CrawlerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => CrawlerConfig::default(),
    };

    if cli.stealth {
        config.set_stealth();
    }
    if cli.aggressive {
        config.set_aggressive();
    }
    if cli.layout_only {
        config.set_layout_only();
    }
    if !cli.find.is_empty() {
        if cli.layout_only {
            bail!("--find cannot be combined with --layout-only");
        }
        config.apply_find_options(cli.find.as_slice())?;
    }
    if cli.fuzz_paths {
        config.fuzz_paths = true;
    }
    if cli.fuzz_subs {
        config.fuzz_subs = true;
    }
    if cli.ignore_robots {
        config.obey_robots = false;
    }
    if let Some(user_agent) = &cli.user_agent {
        config.user_agent = user_agent.clone();
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(seed: &str, config: &CrawlerConfig) -> anyhow::Result<()> {
    let fuzzing = FuzzingOptions::from_config(config)?;

    println!("=== Arachnid Dry Run ===\n");
    println!("Seed: {}\n", seed);

    println!("Crawler Configuration:");
    println!("  Follow links: {}", config.scrape_links);
    println!("  Subdomains in scope: {}", config.scrape_subdomains);
    println!("  Obey robots.txt: {}", config.obey_robots);
    println!("  Keep query strings: {}", config.allow_query);
    println!("  User agent: {}", config.user_agent);
    println!("  Delay profile: {:?}", config.default_delay);
    println!("  Timeout: {}s", config.timeout_secs);

    println!("\nSignals:");
    println!("  Emails: {}", config.scrape_email);
    println!("  Phone numbers: {}", config.scrape_phone_number);
    println!("  Social profiles: {}", config.scrape_social_media);
    let documents: Vec<String> = config.recognized_documents().into_iter().collect();
    println!("  Documents ({}): {}", documents.len(), documents.join(", "));
    if let Some(needle) = &config.custom_str {
        println!("  Custom string: {:?}", needle);
    }
    if let Some(pattern) = &config.custom_regex {
        println!("  Custom regex: {}", pattern);
    }

    println!("\nFuzzing:");
    println!("  Paths: {}", fuzzing.fuzz_paths());
    println!("  Subdomains: {}", fuzzing.fuzz_subdomains());

    println!(
        "\nBlacklisted ({}):",
        config.blacklisted_directories.len()
    );
    for entry in &config.blacklisted_directories {
        println!("  - {}", entry);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(cli: &Cli, config: CrawlerConfig) -> anyhow::Result<()> {
    let transport = Arc::new(ReqwestTransport::new().context("Failed to build HTTP client")?);
    let mut crawler = Crawler::new(&cli.seed, config, transport).await?;

    let interrupted = crawler
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;
    if interrupted {
        tracing::warn!("Interrupted; reporting partial results");
    }

    let report = crawler.dumps(true)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, report)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            tracing::info!("Report written to: {}", path.display());
        }
        None => println!("{}", report),
    }

    if let Some(path) = &cli.summary {
        generate_markdown_summary(crawler.output(), path)?;
        tracing::info!("Summary written to: {}", path.display());
    }

    Ok(())
}
