// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every flag is optional so that a --config file can supply the value. The
// merge order is: defaults, then the config file, then the flags given here.
//
// Example:
//   site-crawler --root-url https://example.com/ --num-workers 8 --json
// =============================================================================

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use site_crawler::CrawlConfig;

#[derive(Parser, Debug)]
#[command(
    name = "site-crawler",
    version,
    about = "Crawls a website and lists the same-site links found on every page",
    long_about = "site-crawler starts at a root URL, follows every link that stays on the same host, \
                  and prints the links found on each page. It stops once every reachable page has \
                  been visited exactly once."
)]
pub struct Cli {
    /// The site root URL, e.g. https://example.com/index.html
    #[arg(long)]
    pub root_url: Option<String>,

    /// Number of worker tasks fetching pages concurrently (default: 5)
    #[arg(long)]
    pub num_workers: Option<usize>,

    /// How often the crawl checks whether it is finished, in milliseconds (default: 250)
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Per-request timeout in seconds (default: 10)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// User-Agent header to send
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Stop the whole crawl on the first page that fails to fetch
    #[arg(long)]
    pub fail_fast: bool,

    /// Output one JSON object per page instead of text
    #[arg(long)]
    pub json: bool,

    /// JSON config file with any of the settings above
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log every fetch and queued URL
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    // Builds the crawl configuration: file values first, then flag overrides
    pub fn crawl_config(&self) -> Result<CrawlConfig> {
        let mut config = match &self.config {
            Some(path) => CrawlConfig::from_file(path)?,
            None => CrawlConfig::new(""),
        };

        if let Some(root_url) = &self.root_url {
            config = config.with_root_url(root_url);
        }
        if let Some(num_workers) = self.num_workers {
            config = config.with_num_workers(num_workers);
        }
        if let Some(poll_interval_ms) = self.poll_interval_ms {
            config = config.with_poll_interval_ms(poll_interval_ms);
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config = config.with_request_timeout_secs(timeout_secs);
        }
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent);
        }
        if self.fail_fast {
            config = config.with_fail_fast(true);
        }

        config.validate()?;
        Ok(config)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Option<usize> instead of default_value_t?
//    - A default would always "win" over the config file
//    - None means "not given on the command line", so the file value stays
//
// 2. Why is `bool` fine for --json and --fail-fast?
//    - clap turns a bool field into a flag that is false unless given
// -----------------------------------------------------------------------------
