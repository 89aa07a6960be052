// src/page/inspect.rs
// =============================================================================
// Looks inside a fetched HTML page.
//
// One parse of the body answers both questions the crawler asks:
// 1. Does the page have a "form surface"? (a <form>, or an <input type="text">)
// 2. Which same-origin pages does it link to?
//
// We use the `scraper` crate (html5ever underneath) with CSS selectors.
// The selectors are compiled once in HtmlInspector::new() and an invalid one
// is reported as an InspectError instead of panicking.
//
// Rust concepts:
// - Traits: PageInspector lets the engine take any inspector (tests use fakes)
// - Iterator chains: filter_map/filter to go from <a> elements to URLs
// =============================================================================

use std::collections::HashSet;

use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

use crate::crawl::scope;

const FORM_SELECTOR: &str = "form";
const TEXT_INPUT_SELECTOR: &str = r#"input[type="text"]"#;
const LINK_SELECTOR: &str = "a[href]";

/// What a page told us.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inspection {
    pub has_form_surface: bool,
    /// Absolute, valid, same-origin links in discovery order, without duplicates
    pub links: Vec<Url>,
}

#[derive(Debug, Clone, Error)]
pub enum InspectError {
    #[error("invalid selector `{selector}`: {message}")]
    Selector {
        selector: &'static str,
        message: String,
    },
    #[error("HTML parser failed: {0}")]
    Parser(String),
}

/// Anything that can turn a page body into an [`Inspection`].
pub trait PageInspector: Send + Sync + 'static {
    fn inspect(&self, page_url: &Url, body: &str) -> Result<Inspection, InspectError>;
}

#[derive(Debug, Clone)]
pub struct HtmlInspector {
    forms: Selector,
    text_inputs: Selector,
    links: Selector,
}

impl HtmlInspector {
    pub fn new() -> Result<Self, InspectError> {
        Ok(Self {
            forms: compile(FORM_SELECTOR)?,
            text_inputs: compile(TEXT_INPUT_SELECTOR)?,
            links: compile(LINK_SELECTOR)?,
        })
    }

    /// True if the document contains a `<form>` or an `<input type="text">`.
    fn has_form_surface(&self, document: &Html) -> bool {
        document.select(&self.forms).next().is_some()
            || document.select(&self.text_inputs).next().is_some()
    }

    // Resolves every <a href> against the page URL and keeps the ones that
    // are valid and on the same origin. Duplicates within one page are
    // dropped here so the engine schedules each link once per page.
    fn same_origin_links(&self, page_url: &Url, document: &Html) -> Vec<Url> {
        let mut seen = HashSet::new();

        document
            .select(&self.links)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| scope::resolve(page_url, href))
            .filter(|link| scope::is_valid(link) && scope::same_origin(page_url, link))
            .filter(|link| seen.insert(link.as_str().to_string()))
            .collect()
    }
}

impl PageInspector for HtmlInspector {
    fn inspect(&self, page_url: &Url, body: &str) -> Result<Inspection, InspectError> {
        let document = Html::parse_document(body);

        Ok(Inspection {
            has_form_surface: self.has_form_surface(&document),
            links: self.same_origin_links(page_url, &document),
        })
    }
}

fn compile(selector: &'static str) -> Result<Selector, InspectError> {
    Selector::parse(selector).map_err(|e| InspectError::Selector {
        selector,
        message: e.to_string(),
    })
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why is `<input>` without a type attribute not a form surface?
//    - Browsers treat it as a text input, but we only match an explicit
//      type="text". A page with such an input almost always has a <form>
//      around it anyway.
//
// 2. Why Html is parsed inside inspect() and never stored?
//    - scraper's Html is not Send, so it cannot cross an .await or a thread.
//      The engine runs inspect() on the blocking pool and only the
//      Inspection (plain Strings/Urls) comes back.
// -----------------------------------------------------------------------------
