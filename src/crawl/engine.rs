// src/crawl/engine.rs
// =============================================================================
// The crawl traversal engine.
//
// Every (url, depth) pair is one task. A task walks these steps and stops at
// the first one that says no:
//
//   1. Admit    - not cancelled, depth <= max_depth, URL valid, and we are the
//                 first task to claim the URL in the VisitedSet
//   2. Fetch    - wait for the origin's crawl delay, take a permit from the
//                 global concurrency gate, GET the page
//   3. Inspect  - parse the body on the blocking pool, report form surfaces
//   4. Extract  - same-origin links come back from the same parse
//   5. Recurse  - spawn one child task per link at depth + 1 and wait for all
//                 of them (tree-shaped join)
//
// The permit is released right after step 3/4, before children are spawned.
// A parent waiting on its children never holds a permit, so the gate cannot
// deadlock no matter how deep the tree gets.
//
// Nothing crosses a task boundary as an error: absent pages are skipped,
// inspection failures become ParseError events, and a child that panics is
// logged by its parent and otherwise ignored.
// =============================================================================

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, warn};
use url::Url;

use super::scope;
use super::throttle::OriginThrottle;
use super::visited::VisitedSet;
use crate::config::CrawlConfig;
use crate::page::{FetchOutcome, InspectError, Inspection, PageInspector, PageSource};
use crate::report::{self, CrawlEvent, EventSender};

/// Shared stop switch for a run. Clones all point at the same flag.
///
/// Once set, every task that reaches Admit stops, and tasks waiting out a
/// crawl delay or a fetch slot are woken and stop. Tasks already fetching
/// finish their current page.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<CancelState>);

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    wakeup: Notify,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.cancelled.store(true, Ordering::SeqCst);
        self.0.wakeup.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        let notified = self.0.wakeup.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a cancel in between is not lost
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

/// Counters gathered while crawling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlTotals {
    /// URLs that won the VisitedSet race
    pub urls_claimed: usize,
    /// Fetches that returned an HTML body
    pub pages_fetched: usize,
    pub forms_found: usize,
    pub parse_errors: usize,
}

#[derive(Debug, Default)]
struct Counters {
    pages_fetched: AtomicUsize,
    forms_found: AtomicUsize,
    parse_errors: AtomicUsize,
}

// State shared by every task of a run.
struct Shared<S, I> {
    config: CrawlConfig,
    source: S,
    inspector: Arc<I>,
    visited: VisitedSet,
    gate: Semaphore,
    throttle: OriginThrottle,
    cancel: CancelHandle,
    events: EventSender,
    counters: Counters,
}

pub struct Crawler<S, I> {
    shared: Arc<Shared<S, I>>,
}

impl<S: PageSource, I: PageInspector> Crawler<S, I> {
    pub fn new(
        config: CrawlConfig,
        source: S,
        inspector: I,
        events: EventSender,
        cancel: CancelHandle,
    ) -> Self {
        let gate = Semaphore::new(config.concurrency_limit.max(1));
        let throttle = OriginThrottle::new(config.crawl_delay);

        Self {
            shared: Arc::new(Shared {
                config,
                source,
                inspector: Arc::new(inspector),
                visited: VisitedSet::new(),
                gate,
                throttle,
                cancel,
                events,
                counters: Counters::default(),
            }),
        }
    }

    /// Crawls every seed at depth 0 and returns once all of their trees are done.
    pub async fn crawl(&self, seeds: Vec<Url>) -> CrawlTotals {
        let shared = &self.shared;

        // The deadline just flips the cancel flag when it expires
        let deadline_timer = shared.config.deadline.map(|deadline| {
            let cancel = shared.cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(deadline).await;
                debug!(?deadline, "deadline reached, cancelling crawl");
                cancel.cancel();
            })
        });

        let mut roots = JoinSet::new();
        for seed in seeds {
            roots.spawn(Self::crawl_task(Arc::clone(shared), seed, 0));
        }
        while let Some(joined) = roots.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "seed crawl task failed");
            }
        }

        if let Some(timer) = deadline_timer {
            timer.abort();
        }

        self.totals()
    }

    pub fn totals(&self) -> CrawlTotals {
        let counters = &self.shared.counters;
        CrawlTotals {
            urls_claimed: self.shared.visited.len(),
            pages_fetched: counters.pages_fetched.load(Ordering::Relaxed),
            forms_found: counters.forms_found.load(Ordering::Relaxed),
            parse_errors: counters.parse_errors.load(Ordering::Relaxed),
        }
    }

    // One frontier task. Boxed because it recurses through tokio::spawn.
    fn crawl_task(shared: Arc<Shared<S, I>>, url: Url, depth: usize) -> BoxFuture<'static, ()> {
        async move {
            if !shared.admit(&url, depth) {
                return;
            }

            let Some(inspection) = shared.visit(&url).await else {
                return;
            };

            // Children of a page at max depth would all be refused at Admit
            if depth >= shared.config.max_depth || inspection.links.is_empty() {
                return;
            }

            debug!(%url, depth, links = inspection.links.len(), "scheduling children");
            let mut children = JoinSet::new();
            for link in inspection.links {
                children.spawn(Self::crawl_task(Arc::clone(&shared), link, depth + 1));
            }
            while let Some(joined) = children.join_next().await {
                if let Err(e) = joined {
                    warn!(parent = %url, error = %e, "child crawl task failed");
                }
            }
        }
        .boxed()
    }
}

impl<S: PageSource, I: PageInspector> Shared<S, I> {
    fn admit(&self, url: &Url, depth: usize) -> bool {
        if self.cancel.is_cancelled() {
            debug!(%url, "cancelled, not admitting");
            return false;
        }
        if depth > self.config.max_depth {
            debug!(%url, depth, "beyond max depth");
            return false;
        }
        if !scope::is_valid(url) {
            debug!(%url, "invalid URL");
            return false;
        }
        if !self.visited.try_mark(url.as_str()) {
            return false;
        }
        true
    }

    // Fetch + inspect under one gate permit. Returns None when the page is
    // skipped for any reason.
    async fn visit(&self, url: &Url) -> Option<Inspection> {
        let origin = scope::origin_key(url);
        tokio::select! {
            _ = self.throttle.wait(&origin) => {}
            _ = self.cancel.cancelled() => return None,
        }

        let _permit = tokio::select! {
            permit = self.gate.acquire() => permit.ok()?,
            _ = self.cancel.cancelled() => return None,
        };
        if self.cancel.is_cancelled() {
            return None;
        }

        debug!(%url, "fetching");
        let body: Arc<str> = match self.source.fetch(url).await {
            FetchOutcome::Page(body) => body.into(),
            FetchOutcome::Absent(reason) => {
                debug!(%url, %reason, "no content");
                return None;
            }
        };
        self.counters.pages_fetched.fetch_add(1, Ordering::Relaxed);

        match self.inspect(url, Arc::clone(&body)).await {
            Ok(inspection) => {
                if inspection.has_form_surface {
                    self.counters.forms_found.fetch_add(1, Ordering::Relaxed);
                    self.emit(CrawlEvent::FormFound {
                        url: url.to_string(),
                    });
                }
                Some(inspection)
            }
            Err(e) => {
                debug!(%url, error = %e, "inspection failed");
                self.counters.parse_errors.fetch_add(1, Ordering::Relaxed);
                self.emit(CrawlEvent::ParseError {
                    url: url.to_string(),
                    error: e.to_string(),
                    preview: report::preview(&body),
                });
                None
            }
        }
    }

    // Parsing is CPU-bound, so it runs on the blocking pool. A panic in
    // there comes back as a JoinError and is treated like any other failure.
    async fn inspect(&self, url: &Url, body: Arc<str>) -> Result<Inspection, InspectError> {
        let inspector = Arc::clone(&self.inspector);
        let page_url = url.clone();

        match tokio::task::spawn_blocking(move || inspector.inspect(&page_url, &body)).await {
            Ok(result) => result,
            Err(e) => Err(InspectError::Parser(e.to_string())),
        }
    }

    fn emit(&self, event: CrawlEvent) {
        // The printer may already be gone on shutdown; that is fine
        let _ = self.events.send(event);
    }
}
