// src/config.rs
// =============================================================================
// The crawl tunables.
//
// CrawlConfig is built from the command line (every flag also reads a
// FORM_SCOUT_* environment variable, see cli.rs) and handed to the engine by
// value. Default holds the same values as the CLI defaults.
// =============================================================================

use std::time::Duration;

use crate::cli::Cli;

pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("form-scout/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Deepest hop count (seeds are depth 0) that is still fetched
    pub max_depth: usize,
    /// Maximum number of fetches in flight across the whole run
    pub concurrency_limit: usize,
    /// Timeout for one HTTP request, redirects included
    pub fetch_timeout: Duration,
    /// Minimum gap between fetch starts on the same origin (zero = off)
    pub crawl_delay: Duration,
    /// Stop admitting new pages after this long
    pub deadline: Option<Duration>,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            concurrency_limit: DEFAULT_CONCURRENCY,
            fetch_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            crawl_delay: Duration::ZERO,
            deadline: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl From<&Cli> for CrawlConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            max_depth: cli.max_depth,
            // The CLI rejects 0, but a zero-permit gate would hang the crawl
            concurrency_limit: cli.concurrency.max(1),
            fetch_timeout: Duration::from_secs(cli.timeout),
            crawl_delay: Duration::from_millis(cli.crawl_delay_ms),
            deadline: cli.deadline.map(Duration::from_secs),
            user_agent: cli.user_agent.clone(),
        }
    }
}
