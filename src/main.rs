// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, so stdout only carries the crawl output)
// 3. Run the crawl, printing each page's links as it is processed
// 4. Exit with proper code (0 = success, 1 = some pages failed, 2 = error)
// =============================================================================

mod cli; // src/cli.rs - command-line parsing

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use log::{error, info};

use cli::Cli;
use site_crawler::{run_crawl_with, HttpFetcher, JsonSink, OutputSink, TextSink};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins when set; otherwise info, or debug with --verbose
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

// Returns:
//   Ok(0) = every page was fetched
//   Ok(1) = the crawl finished but some pages failed to fetch
//   Err   = the crawl could not start or was aborted
async fn run(cli: Cli) -> Result<i32> {
    let config = cli.crawl_config()?;

    let sink: Arc<dyn OutputSink> = if cli.json {
        Arc::new(JsonSink::stdout())
    } else {
        Arc::new(TextSink::stdout())
    };
    let fetcher = Arc::new(HttpFetcher::new(&config)?);

    let summary = run_crawl_with(&config, fetcher, sink).await?;

    info!(
        "Done: {} pages crawled, {} failed, {} URLs discovered",
        summary.pages_processed, summary.pages_failed, summary.urls_discovered
    );

    if summary.pages_failed > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}
