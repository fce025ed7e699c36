// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap and validate them
// 2. Open the output sink (so a bad path fails before any crawling)
// 3. Build the HTTP fetcher, link extractor and host filter
// 4. Run the crawl until the target count is reached, the reachable pages
//    run out, or the user cancels (Ctrl-C / --deadline)
// 5. Dump every address found and exit with the proper code
//    (0 = success, 2 = configuration or output error)
//
// Rust concepts used:
// - async/await: Many pages are fetched concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// - Arc: Shared ownership of the fetcher between worker tasks
// =============================================================================

mod address;       // src/address.rs - URL normalization
mod cli;           // src/cli.rs - command-line parsing
mod config;        // src/config.rs - validated configuration
mod crawl;         // src/crawl/ - frontier and worker pool
mod dump;          // src/dump.rs - rendering and writing the result
mod error;         // src/error.rs - error types
mod extract;       // src/extract/ - finding links in pages
mod fetch;         // src/fetch/ - HTTP requests
mod filter;        // src/filter.rs - host restriction

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::CrawlConfig;
use crawl::Crawler;
use dump::Sink;
use extract::LinkExtractor;
use fetch::HttpFetcher;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = CrawlConfig::from_cli(cli)?;

    if config.logging {
        init_logging();
    }

    let mut sink = Sink::open(config.output.as_deref())?;

    let fetcher = HttpFetcher::new(config.timeout, &config.user_agent)?;
    let extractor = LinkExtractor::new(config.extractor)?;
    let crawler = Crawler::new(
        Arc::new(fetcher),
        extractor,
        config.filter.clone(),
        config.graph,
    );

    info!(
        "Crawling from {} (timeout {:?}, output to {})",
        config.seed,
        config.timeout,
        sink.describe()
    );

    let cancel = CancellationToken::new();
    watch_for_cancellation(cancel.clone(), config.deadline);

    let outcome = crawler
        .run(config.seed.clone(), config.max_count, config.workers, cancel)
        .await;

    let rendered = dump::render(&outcome.frontier.dump_all(), config.format)?;
    sink.write(&rendered)
        .with_context(|| format!("failed to write dump to {}", sink.describe()))?;

    if config.logging {
        outcome.stats.write_stats_to_stderr();
    }

    Ok(0)
}

// Installs the stderr log subscriber. RUST_LOG overrides the default level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// Cancels the crawl on Ctrl-C or once the deadline passes.
// Partial results are still dumped.
fn watch_for_cancellation(cancel: CancellationToken, deadline: Option<Duration>) {
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if result.is_ok() {
                    warn!("Interrupted, stopping workers");
                    on_signal.cancel();
                }
            }
            _ = on_signal.cancelled() => {}
        }
    });

    if let Some(deadline) = deadline {
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(deadline) => {
                    warn!("Deadline of {:?} reached, stopping workers", deadline);
                    cancel.cancel();
                }
                _ = cancel.cancelled() => {}
            }
        });
    }
}
