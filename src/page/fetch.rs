// src/page/fetch.rs
// =============================================================================
// Fetches one page over HTTP.
//
// The crawl only cares about one thing: "did I get an HTML body or not?"
// So instead of returning errors, fetching returns a FetchOutcome:
// - Page(body) when the status is 200 and the content-type is text/html
// - Absent(reason) for everything else (timeouts, DNS failures, 404s, PDFs...)
//
// The reason is kept only so it can be logged. The crawl engine treats every
// Absent the same way: skip the URL, never retry.
//
// PageSource is the seam the engine fetches through, so tests can crawl an
// in-memory site without a network.
// =============================================================================

use std::future::Future;

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

use crate::config::CrawlConfig;

// Redirects followed before giving up on a URL
const MAX_REDIRECTS: usize = 10;

/// Result of a single fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Decoded HTML body
    Page(String),
    /// No usable content; the URL is skipped
    Absent(Absence),
}

/// Why a fetch produced no content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Absence {
    #[error("request timed out")]
    Timeout,
    #[error("too many redirects")]
    TooManyRedirects,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("not HTML (content-type: {0})")]
    NotHtml(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Anything the crawl engine can fetch pages from.
pub trait PageSource: Send + Sync + 'static {
    /// Performs one fetch attempt for `url`.
    fn fetch(&self, url: &Url) -> impl Future<Output = FetchOutcome> + Send;
}

/// The real fetcher: one pooled reqwest client shared by every task.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client })
    }

    async fn fetch_page(&self, url: &Url) -> FetchOutcome {
        let response = match self.client.get(url.as_str()).send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Absent(categorize_error(e)),
        };

        if response.status() != StatusCode::OK {
            return FetchOutcome::Absent(Absence::Status(response.status().as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !is_html(&content_type) {
            return FetchOutcome::Absent(Absence::NotHtml(content_type));
        }

        // text() decodes using the charset from the content-type, lossily
        match response.text().await {
            Ok(body) => FetchOutcome::Page(body),
            Err(e) => FetchOutcome::Absent(categorize_error(e)),
        }
    }
}

impl PageSource for HttpFetcher {
    fn fetch(&self, url: &Url) -> impl Future<Output = FetchOutcome> + Send {
        self.fetch_page(url)
    }
}

fn is_html(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}

// Maps reqwest's error kinds onto the reasons we log.
fn categorize_error(error: reqwest::Error) -> Absence {
    if error.is_timeout() {
        Absence::Timeout
    } else if error.is_redirect() {
        Absence::TooManyRedirects
    } else if error.is_connect() {
        Absence::Connect(error.to_string())
    } else {
        Absence::Transport(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(timeout: Duration) -> HttpFetcher {
        let config = CrawlConfig {
            fetch_timeout: timeout,
            ..CrawlConfig::default()
        };
        HttpFetcher::new(&config).unwrap()
    }

    fn page_url(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{}", server.uri(), p)).unwrap()
    }

    #[test]
    fn test_is_html() {
        assert!(is_html("text/html"));
        assert!(is_html("text/html; charset=utf-8"));
        assert!(is_html("TEXT/HTML"));
        assert!(!is_html("application/json"));
        assert!(!is_html(""));
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body>hi</body></html>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let outcome = fetcher(Duration::from_secs(5))
            .fetch(&page_url(&server, "/"))
            .await;
        assert_eq!(
            outcome,
            FetchOutcome::Page("<html><body>hi</body></html>".to_string())
        );
    }

    #[tokio::test]
    async fn test_non_200_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_raw("nope", "text/html"))
            .mount(&server)
            .await;

        let outcome = fetcher(Duration::from_secs(5))
            .fetch(&page_url(&server, "/missing"))
            .await;
        assert_eq!(outcome, FetchOutcome::Absent(Absence::Status(404)));
    }

    #[tokio::test]
    async fn test_non_html_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data.json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
            .mount(&server)
            .await;

        let outcome = fetcher(Duration::from_secs(5))
            .fetch(&page_url(&server, "/data.json"))
            .await;
        assert_eq!(
            outcome,
            FetchOutcome::Absent(Absence::NotHtml("application/json".to_string()))
        );
    }

    #[tokio::test]
    async fn test_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<p>moved</p>", "text/html"))
            .mount(&server)
            .await;

        let outcome = fetcher(Duration::from_secs(5))
            .fetch(&page_url(&server, "/old"))
            .await;
        assert_eq!(outcome, FetchOutcome::Page("<p>moved</p>".to_string()));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<p>late</p>", "text/html")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let outcome = fetcher(Duration::from_millis(200))
            .fetch(&page_url(&server, "/slow"))
            .await;
        assert_eq!(outcome, FetchOutcome::Absent(Absence::Timeout));
    }

    #[tokio::test]
    async fn test_connection_refused_is_absent() {
        // Port 1 on loopback is reserved and nothing listens there
        let url = Url::parse("http://127.0.0.1:1/").unwrap();
        let outcome = fetcher(Duration::from_secs(2)).fetch(&url).await;
        assert!(matches!(outcome, FetchOutcome::Absent(_)));
    }
}
