// src/report.rs
// =============================================================================
// The observable output of a crawl.
//
// Crawl tasks never print. They send CrawlEvents over an unbounded tokio
// channel and a single printer task (render) writes them to stdout, either as
// colored text or as one JSON object per line (--json). Diagnostic logging
// goes through `tracing` to stderr and is separate from this stream.
// =============================================================================

use std::io::Write;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// How much of a failing page body is shown with a parse error
pub const PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CrawlEvent {
    /// The page has a <form> or <input type="text">
    FormFound { url: String },
    /// Inspecting the page failed; the page is skipped
    ParseError {
        url: String,
        error: String,
        preview: String,
    },
    /// Emitted once, after every crawl task has finished
    RunComplete { elapsed_secs: f64 },
}

pub type EventSender = UnboundedSender<CrawlEvent>;
pub type EventReceiver = UnboundedReceiver<CrawlEvent>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Console,
    Json,
}

/// First [`PREVIEW_CHARS`] characters of a body (never splits a UTF-8 char).
pub fn preview(body: &str) -> String {
    body.chars().take(PREVIEW_CHARS).collect()
}

// Writes one line per event to `out` until every sender has been dropped.
pub async fn render<W: Write>(
    mut events: EventReceiver,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    while let Some(event) = events.recv().await {
        let line = match format {
            OutputFormat::Console => format_console(&event),
            OutputFormat::Json => serde_json::to_string(&event)?,
        };
        writeln!(out, "{}", line)?;
        out.flush()?;
    }
    Ok(())
}

fn format_console(event: &CrawlEvent) -> String {
    match event {
        CrawlEvent::FormFound { url } => format!("{} {}", "Form Found:".green(), url),
        CrawlEvent::ParseError { url, error, preview } => format!(
            "{} {}\n{} {}\n{} {}...",
            "Error parsing content from URL:".red(),
            url,
            "Error:".red(),
            error,
            "Content:".yellow(),
            preview
        ),
        CrawlEvent::RunComplete { elapsed_secs } => {
            format!("{} {:.2} seconds", "Execution time:".blue(), elapsed_secs)
        }
    }
}
