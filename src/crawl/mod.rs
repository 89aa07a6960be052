// src/crawl/mod.rs
// =============================================================================
// This module handles crawling.
//
// Features:
// - Depth-bounded crawl from many seeds at once, all sharing one visited set
// - Same-origin restriction per page (never leaves the seed's site)
// - Global cap on in-flight fetches, optional per-origin crawl delay
// - Optional deadline / Ctrl-C cancellation
//
// run() is the entry point: load seeds, crawl them all, report timing.
// =============================================================================

mod engine;
pub mod scope;
mod throttle;
mod visited;

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info};
use url::Url;

pub use engine::{CancelHandle, CrawlTotals, Crawler};

use crate::config::CrawlConfig;
use crate::page::{HtmlInspector, HttpFetcher};
use crate::report::{CrawlEvent, EventSender};
use crate::seeds;

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub elapsed: Duration,
    /// Seeds that passed validation and were crawled
    pub seeds: usize,
    pub totals: CrawlTotals,
}

// Crawls every valid seed listed in `seed_file` and waits for all of them.
//
// Only a seed file that cannot be read is an error. Invalid seeds are
// skipped, and page-level problems never stop the run.
pub async fn run(
    seed_file: &Path,
    config: CrawlConfig,
    events: EventSender,
    cancel: CancelHandle,
) -> Result<RunStats> {
    let started = Instant::now();

    let seeds = valid_seeds(seeds::load_seeds(seed_file)?);
    info!(
        seeds = seeds.len(),
        max_depth = config.max_depth,
        concurrency = config.concurrency_limit,
        "starting crawl"
    );

    let fetcher = HttpFetcher::new(&config)?;
    let inspector = HtmlInspector::new()?;
    let seed_count = seeds.len();

    let crawler = Crawler::new(config, fetcher, inspector, events.clone(), cancel);
    let totals = crawler.crawl(seeds).await;

    let elapsed = started.elapsed();
    let _ = events.send(CrawlEvent::RunComplete {
        elapsed_secs: elapsed.as_secs_f64(),
    });

    Ok(RunStats {
        elapsed,
        seeds: seed_count,
        totals,
    })
}

fn valid_seeds(raw: Vec<String>) -> Vec<Url> {
    raw.into_iter()
        .filter_map(|seed| {
            let parsed = scope::parse_valid(&seed);
            if parsed.is_none() {
                debug!(%seed, "skipping invalid seed");
            }
            parsed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::sync::mpsc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn html_page(server: &MockServer, p: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
            .mount(server)
            .await;
    }

    #[test]
    fn test_invalid_seeds_are_dropped() {
        let seeds = valid_seeds(vec![
            "https://a.example.com".to_string(),
            "example.com".to_string(),
            "mailto:x@example.com".to_string(),
            "http://b.example.com/x".to_string(),
        ]);
        let seeds: Vec<String> = seeds.into_iter().map(String::from).collect();
        assert_eq!(seeds, vec!["https://a.example.com/", "http://b.example.com/x"]);
    }

    #[tokio::test]
    async fn test_missing_seed_file_is_fatal() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let result = run(
            Path::new("/definitely/not/here/seeds.txt"),
            CrawlConfig::default(),
            tx,
            CancelHandle::new(),
        )
        .await;

        assert!(result.is_err());
        assert!(rx.recv().await.is_none(), "no events before a fatal error");
    }

    #[tokio::test]
    async fn test_end_to_end_run() {
        let server = MockServer::start().await;
        html_page(
            &server,
            "/",
            r#"<a href="/login">Login</a><a href="/about">About</a><a href="https://elsewhere.invalid/">x</a>"#,
        )
        .await;
        html_page(&server, "/login", r#"<form><input type="text" name="user"></form>"#).await;
        html_page(&server, "/about", "<p>About us</p>").await;

        let mut seed_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(seed_file, "{}/", server.uri()).unwrap();
        writeln!(seed_file).unwrap();
        writeln!(seed_file, "not a url").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let config = CrawlConfig {
            fetch_timeout: Duration::from_secs(5),
            ..CrawlConfig::default()
        };
        let stats = run(seed_file.path(), config, tx, CancelHandle::new())
            .await
            .unwrap();

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert_eq!(stats.seeds, 1);
        assert_eq!(stats.totals.pages_fetched, 3);
        assert_eq!(stats.totals.forms_found, 1);
        assert_eq!(
            events[0],
            CrawlEvent::FormFound {
                url: format!("{}/login", server.uri())
            }
        );
        assert!(matches!(events.last(), Some(CrawlEvent::RunComplete { .. })));
        assert_eq!(events.len(), 2);
    }
}
