// src/page/mod.rs
// =============================================================================
// Everything the crawler does with a single page:
//
// - fetch: one HTTP GET, returning the HTML body or "absent"
// - inspect: one parse of that body for form surfaces and same-origin links
//
// Both sit behind traits (PageSource, PageInspector) so the crawl engine can
// be driven by an in-memory site in tests.
// =============================================================================

mod fetch;
mod inspect;

pub use fetch::{Absence, FetchOutcome, HttpFetcher, PageSource};
pub use inspect::{HtmlInspector, InspectError, Inspection, PageInspector};
