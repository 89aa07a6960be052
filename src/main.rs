// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, to stderr)
// 3. Find the seed file (argument, env var, or interactive prompt)
// 4. Start the event printer, run the crawl, wait for the printer to drain
// 5. Exit with proper code (0 = crawl completed, 2 = fatal error)
// =============================================================================

mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - crawl tunables
mod crawl; // src/crawl/ - the crawl engine and run orchestration
mod page; // src/page/ - fetching and inspecting single pages
mod report; // src/report.rs - FORM_FOUND / PARSE_ERROR / RUN_COMPLETE output
mod seeds; // src/seeds.rs - seed file loading

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use colored::Colorize;
use config::CrawlConfig;
use crawl::CancelHandle;
use report::OutputFormat;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("{} {:#}", "Error:".red(), e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let seed_file = match &cli.seed_file {
        Some(path) => path.clone(),
        None => seeds::prompt_for_seed_file()?,
    };
    let config = CrawlConfig::from(&cli);
    debug!(?config, seed_file = %seed_file.display(), "configuration");

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Console
    };
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        report::render(events_rx, format, &mut std::io::stdout()).await
    });

    let cancel = CancelHandle::new();
    cancel_on_ctrl_c(cancel.clone());

    // The sender moves into the crawl; once it finishes, the printer drains
    // whatever is left and stops.
    let outcome = crawl::run(&seed_file, config, events_tx, cancel).await;
    printer.await??;

    let stats = outcome?;
    info!(
        seeds = stats.seeds,
        urls = stats.totals.urls_claimed,
        pages = stats.totals.pages_fetched,
        forms = stats.totals.forms_found,
        parse_errors = stats.totals.parse_errors,
        elapsed_secs = stats.elapsed.as_secs_f64(),
        "run complete"
    );
    Ok(0)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// First Ctrl-C stops admitting new pages; the crawl then winds down normally
// and still prints its execution time.
fn cancel_on_ctrl_c(cancel: CancelHandle) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, finishing in-flight pages");
            cancel.cancel();
        }
    });
}
