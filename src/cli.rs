// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the CLI structure is a plain Rust struct and the
// #[arg(...)] attributes describe flags, defaults and environment fallbacks.
//
// Every tunable can also come from a FORM_SCOUT_* environment variable, which
// is handy when the crawler runs from a script or a container.
// =============================================================================

use std::path::PathBuf;

use clap::Parser;

use crate::config::{DEFAULT_CONCURRENCY, DEFAULT_MAX_DEPTH, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

#[derive(Parser, Debug)]
#[command(
    name = "form-scout",
    version,
    about = "Crawl websites from a list of seed URLs and report pages with forms",
    long_about = "form-scout reads seed URLs from a file (one per line), follows same-site links \
                  up to a maximum depth and reports every page that contains a <form> or a text \
                  <input>. Useful for mapping login and search surfaces of sites you are \
                  authorized to test."
)]
pub struct Cli {
    /// File with one seed URL per line (blank lines are ignored)
    ///
    /// If omitted, you will be asked for the path interactively.
    #[arg(env = "FORM_SCOUT_SEEDS")]
    pub seed_file: Option<PathBuf>,

    /// Maximum crawl depth; seeds are depth 0
    #[arg(long, env = "FORM_SCOUT_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Maximum number of pages fetched at the same time (across all seeds)
    #[arg(
        short,
        long,
        env = "FORM_SCOUT_CONCURRENCY",
        default_value_t = DEFAULT_CONCURRENCY,
        value_parser = parse_concurrency
    )]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, env = "FORM_SCOUT_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Minimum milliseconds between two requests to the same site (0 = no delay)
    #[arg(long, env = "FORM_SCOUT_CRAWL_DELAY_MS", default_value_t = 0)]
    pub crawl_delay_ms: u64,

    /// Stop starting new page fetches after this many seconds
    #[arg(long, env = "FORM_SCOUT_DEADLINE")]
    pub deadline: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long, env = "FORM_SCOUT_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Print events as JSON lines instead of colored text
    #[arg(long)]
    pub json: bool,

    /// Show debug logs on stderr (RUST_LOG overrides this)
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_concurrency(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("concurrency must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
impl Cli {
    /// Parses `args` as if no FORM_SCOUT_* variables were set, so tests do
    /// not depend on the shell they run in.
    pub(crate) fn parse_without_env<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        use clap::builder::Resettable;
        use clap::{CommandFactory, FromArgMatches};

        let matches = Cli::command()
            .mut_args(|arg| arg.env(Resettable::Reset))
            .try_get_matches_from(args)?;
        Cli::from_arg_matches(&matches)
    }
}
