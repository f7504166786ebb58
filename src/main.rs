// src/main.rs
// =============================================================================
// This is the entry point of the crawler.
//
// What happens here:
// 1. Parse command-line arguments and validate them into a CrawlConfig
// 2. Set up logging and the interrupt handler
// 3. Run the crawl and print the report
// 4. Exit with proper code (0 = clean run, 1 = page errors or interrupted,
//    2 = fatal error such as an invalid configuration)
//
// A first Ctrl-C (or SIGTERM) does not kill the process. It cancels the
// crawl, which then drains the pages already queued and still prints a
// (partial) report.
// =============================================================================

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use word_crawler::cli::Cli;
use word_crawler::crawl::CrawlController;
use word_crawler::fetch::HttpFetcher;
use word_crawler::logging;
use word_crawler::report::{self, TerminalProgress};

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

// Returns:
//   Ok(0) = crawl finished without page errors
//   Ok(1) = some pages failed, or the run was interrupted
//   Err   = nothing was crawled (bad configuration, setup failure)
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let json = cli.json;

    logging::init()?;
    let config = cli.into_config()?;

    let fetcher = HttpFetcher::new(&config).context("failed to create HTTP client")?;

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone());

    let progress = Arc::new(TerminalProgress::new());
    let mut controller = CrawlController::new(config.clone(), Arc::new(fetcher));
    if !json {
        controller = controller.with_progress(progress.clone());
    }

    let outcome = controller.run(&cancel).await;
    progress.clear_line();

    report::print_report(&outcome, &config.lengths, config.top_words, json)?;

    if outcome.interrupted || !outcome.errors.is_empty() {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Cancels the crawl on the first SIGINT/SIGTERM
fn spawn_signal_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        let Some(signal) = wait_for_signal().await else {
            return;
        };
        warn!(signal, "... draining queue");
        cancel.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_signal() -> Option<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, "cannot listen for SIGTERM, only Ctrl-C will interrupt");
            return tokio::signal::ctrl_c().await.ok().map(|_| "SIGINT");
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => result.ok().map(|_| "SIGINT"),
        _ = terminate.recv() => Some("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Option<&'static str> {
    tokio::signal::ctrl_c().await.ok().map(|_| "Ctrl-C")
}
