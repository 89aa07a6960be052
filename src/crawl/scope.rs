// src/crawl/scope.rs
// =============================================================================
// URL validation, relative link resolution and same-origin scoping.
//
// Every URL that enters the crawl goes through this file first:
// - parse_valid() gates seeds and discovered links (invalid = silently dropped)
// - resolve() turns an href into an absolute URL against the page it was on
// - same_origin() keeps each crawl on the site its seed started from
//
// URL identity is the url crate's serialization (Url::as_str()). That
// lowercases scheme and host, drops default ports and turns an empty path
// into "/", but it keeps query strings and fragments exactly as written.
// So "/page#a" and "/page#b" are two different URLs and both get fetched.
// =============================================================================

use url::Url;

// Returns true if the URL has both a scheme and a non-empty host.
//
// Examples:
//   https://example.com/x  -> true
//   mailto:a@example.com   -> false (no host)
//   file:///etc/passwd     -> false (empty host)
pub fn is_valid(url: &Url) -> bool {
    !url.scheme().is_empty() && url.host_str().is_some_and(|host| !host.is_empty())
}

/// Parses a raw string and keeps it only if it passes [`is_valid`].
pub fn parse_valid(raw: &str) -> Option<Url> {
    Url::parse(raw.trim()).ok().filter(is_valid)
}

// Resolves a link (possibly relative) against the page it was found on.
//
// Absolute, scheme-relative ("//host/x") and path-relative hrefs are all
// handled by Url::join. A join failure returns None, which callers treat the
// same as a URL that fails validation.
pub fn resolve(base: &Url, href: &str) -> Option<Url> {
    base.join(href.trim()).ok()
}

// Returns true if `candidate` is on the same host (and explicit port) as
// `page`.
//
// The scheme is not compared: a link from https://site/ to
// http://site/login stays in scope.
pub fn same_origin(page: &Url, candidate: &Url) -> bool {
    page.host_str() == candidate.host_str() && page.port() == candidate.port()
}

/// Key used to group URLs per origin for the crawl delay: host plus explicit port.
pub fn origin_key(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn test_valid_absolute_url() {
        assert!(parse_valid("https://example.com/page").is_some());
        assert!(parse_valid("  http://example.com  ").is_some());
    }

    #[test]
    fn test_invalid_urls_are_rejected() {
        assert!(parse_valid("not a url").is_none());
        assert!(parse_valid("/relative/path").is_none());
        assert!(parse_valid("mailto:test@example.com").is_none());
        assert!(parse_valid("javascript:void(0)").is_none());
        assert!(parse_valid("file:///etc/passwd").is_none());
        assert!(parse_valid("").is_none());
    }

    #[test]
    fn test_resolve_relative_link() {
        let base = url("https://example.com/docs/page");
        assert_eq!(
            resolve(&base, "other").unwrap().as_str(),
            "https://example.com/docs/other"
        );
        assert_eq!(
            resolve(&base, "/root").unwrap().as_str(),
            "https://example.com/root"
        );
        assert_eq!(
            resolve(&base, "../up").unwrap().as_str(),
            "https://example.com/up"
        );
    }

    #[test]
    fn test_resolve_scheme_relative_and_absolute() {
        let base = url("https://example.com/page");
        assert_eq!(
            resolve(&base, "//cdn.example.com/x").unwrap().as_str(),
            "https://cdn.example.com/x"
        );
        assert_eq!(
            resolve(&base, "http://other.com").unwrap().as_str(),
            "http://other.com/"
        );
    }

    #[test]
    fn test_resolve_keeps_fragments() {
        let base = url("https://example.com/page");
        let a = resolve(&base, "#a").unwrap();
        let b = resolve(&base, "#b").unwrap();
        assert_eq!(a.as_str(), "https://example.com/page#a");
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_resolve_mailto_is_not_crawlable() {
        let base = url("https://example.com/page");
        let resolved = resolve(&base, "mailto:test@example.com").unwrap();
        assert!(!is_valid(&resolved));
    }

    #[test]
    fn test_same_origin_by_host() {
        let page = url("https://site.example.com/");
        assert!(same_origin(&page, &url("https://site.example.com/y")));
        assert!(!same_origin(&page, &url("https://other.example.com/x")));
    }

    #[test]
    fn test_same_origin_ignores_scheme() {
        let page = url("https://site.example.com/");
        assert!(same_origin(&page, &url("http://site.example.com/login")));
    }

    #[test]
    fn test_same_origin_compares_explicit_port() {
        let page = url("http://127.0.0.1:8080/");
        assert!(same_origin(&page, &url("http://127.0.0.1:8080/a")));
        assert!(!same_origin(&page, &url("http://127.0.0.1:9090/a")));
    }

    #[test]
    fn test_origin_key() {
        assert_eq!(origin_key(&url("https://Example.com/a")), "example.com");
        assert_eq!(origin_key(&url("http://127.0.0.1:8080/")), "127.0.0.1:8080");
    }
}
