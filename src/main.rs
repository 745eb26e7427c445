//! Cardscout main entry point
//!
//! This is the command-line interface for the cardscout crawler.

use cardscout::config::{load_config_with_hash, Config};
use cardscout::crawler::{Crawler, CrawlSession};
use cardscout::fetch::{HttpFetcher, RetryingFetcher};
use cardscout::oracle::{reconcile, LlmClient, RelevanceOracle};
use cardscout::output::{
    combine_nodes, latest_result_file, load_results, print_report, save_results, RunReport,
};
use cardscout::page::CrawlNode;
use cardscout::ScoutError;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Per-attempt timeout for page fetches
const FETCH_TIMEOUT_SECS: u64 = 30;

/// Cardscout: an LLM-guided credit-card offer crawler
///
/// Cardscout crawls bank websites from a set of root URLs, asks a language
/// model which links are worth following and which card offers a page
/// contains, and synthesizes the collected pages into one structured answer.
#[derive(Parser, Debug)]
#[command(name = "cardscout")]
#[command(version)]
#[command(about = "An LLM-guided credit-card offer crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resume from the most recent result file (default behavior)
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Crawl from scratch, ignoring previous result files
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Override the configured crawl depth
    #[arg(long, value_name = "DEPTH")]
    max_depth: Option<u32>,

    /// Override the configured intent query
    #[arg(long, value_name = "QUERY")]
    intent: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(depth) = cli.max_depth {
        config.crawler.max_depth = depth;
    }
    if let Some(query) = cli.intent {
        config.intent.query = query;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, cli.fresh).await?;
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("cardscout=info,warn"),
            1 => EnvFilter::new("cardscout=debug,info"),
            2 => EnvFilter::new("cardscout=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &Config) {
    println!("=== Cardscout Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max links per page: {}", config.crawler.max_links_per_page);
    println!("  Branch workers: {}", config.crawler.branch_workers);
    println!("  Fetch retries: {}", config.crawler.fetch_retries);
    println!("  Retry delay: {}ms", config.crawler.retry_delay_ms);
    println!("  Interactive fetch: {}", config.crawler.interactive_fetch);

    println!("\nOracle:");
    println!("  Base URL: {}", config.oracle.base_url);
    println!("  Model: {}", config.oracle.model);
    println!("  API key env: {}", config.oracle.api_key_env);

    println!("\nIntent:");
    println!("  Query: {}", config.intent.query);
    println!(
        "  Priority keywords: {}",
        config.intent.priority_keywords.join(", ")
    );

    println!("\nOutput:");
    println!("  Results dir: {}", config.output.results_dir);
    println!("  Raw dir: {}", config.output.raw_dir);

    println!("\nRoot URLs ({}):", config.roots.len());
    for root in &config.roots {
        println!("  - {}", root.url);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling {} root URLs", config.roots.len());
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool) -> Result<(), Box<dyn std::error::Error>> {
    let results_dir = PathBuf::from(&config.output.results_dir);

    // Resume from the most recent persisted result unless told otherwise
    if !fresh {
        if let Some(previous) = latest_result_file(&results_dir) {
            tracing::info!("Resuming from previous results: {}", previous.display());
            let trees = load_results(&previous)?;
            return finish_run(&config, trees, None, Some(previous)).await;
        }
    }

    tracing::info!(
        "Starting crawl: {} roots, max depth {}",
        config.roots.len(),
        config.crawler.max_depth
    );

    let http = HttpFetcher::new(FETCH_TIMEOUT_SECS, config.crawler.ready_poll_ceiling)?;
    let fetcher = Arc::new(RetryingFetcher::new(
        http,
        config.crawler.fetch_retries,
        Duration::from_millis(config.crawler.retry_delay_ms),
    ));
    let oracle = Arc::new(LlmClient::from_config(&config.oracle)?);
    let session = Arc::new(CrawlSession::new());

    let crawler = Crawler::new(fetcher, oracle, Arc::clone(&session), &config);

    // All roots crawl concurrently, sharing the visited set
    let branches = config.roots.iter().map(|root| crawler.crawl(&root.url));
    let trees: Vec<CrawlNode> = futures::future::join_all(branches)
        .await
        .into_iter()
        .flatten()
        .collect();

    finish_run(&config, trees, Some(session), None).await
}

/// Persists the trees, runs the final synthesis and prints the summary
///
/// `persisted` carries the result file a resumed run was loaded from, so it
/// is not re-saved. Teardown and the summary run on every path; a failed
/// save is reported only after both.
async fn finish_run(
    config: &Config,
    trees: Vec<CrawlNode>,
    session: Option<Arc<CrawlSession>>,
    persisted: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if trees.is_empty() {
        tracing::warn!("No pages collected; nothing to synthesize");
        if let Some(session) = session {
            let report = RunReport::new(&trees, session.teardown());
            print_report(&report, None);
        }
        return Ok(());
    }

    let saved = match persisted {
        Some(path) => Ok(path),
        None => save_results(&trees, Path::new(&config.output.results_dir)),
    };
    if let Err(e) = &saved {
        tracing::error!("Failed to persist results: {}", e);
    }

    synthesize(config, &trees).await;

    let summary = match session {
        Some(session) => session.teardown(),
        None => Default::default(),
    };
    let report = RunReport::new(&trees, summary);
    print_report(&report, saved.as_ref().ok().map(|p| p.as_path()));

    saved?;
    Ok(())
}

/// Asks the oracle to merge everything collected into one card listing
///
/// Unrepairable output is saved as a raw artifact and reported; it never
/// fails the run.
async fn synthesize(config: &Config, trees: &[CrawlNode]) {
    let oracle = match LlmClient::from_config(&config.oracle) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Cannot run final synthesis: {}", e);
            return;
        }
    };

    // Phrasing selects the synthesis prompt in the oracle adapter
    let synthesis_query = format!(
        "{} (merge the combined content into one JSON card listing)",
        config.intent.query
    );
    let corpus = combine_nodes(trees);

    let raw = match oracle.ask(&synthesis_query, &corpus).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!("Final synthesis call failed: {}", e);
            return;
        }
    };

    match reconcile(&raw, Path::new(&config.output.raw_dir)) {
        Ok(answer) => {
            let pretty = serde_json::to_string_pretty(&answer)
                .unwrap_or_else(|_| answer.to_string());
            println!("=== Card Listing ===\n");
            println!("{}", pretty);
        }
        Err(ScoutError::FinalJson { artifact }) => {
            tracing::error!(
                "Final answer was not repairable JSON; raw text saved to {}",
                artifact.display()
            );
        }
        Err(e) => {
            tracing::error!("Final synthesis failed: {}", e);
        }
    }
}
