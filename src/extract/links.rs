// src/extract/links.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
//
// We also use the `url` crate to:
// - Resolve relative URLs to absolute URLs
// - Normalize URLs so the same page is not crawled twice under two spellings
//
// Rust concepts:
// - Option<T>: for links that cannot be resolved
// - Iterators: For processing collections
// =============================================================================

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

// Extracts every http(s) link from HTML content
//
// Parameters:
//   html: the HTML content to parse
//   base_url: the URL of the page (for resolving relative links)
//
// Returns: absolute, normalized URLs, in document order, without duplicates
//
// Example:
//   html = "<a href='/docs#intro'>Docs</a>"
//   base_url = "https://example.com"
//   result = ["https://example.com/docs"]
pub fn extract_links(html: &str, base_url: &str) -> Vec<String> {
    let mut links = Vec::new();

    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(base_url, error = %e, "invalid base URL, no links extracted");
            return links;
        }
    };

    let document = Html::parse_document(html);

    // Our selector is a constant and known to be valid
    let selector = Selector::parse("a[href]").unwrap();

    let mut seen = HashSet::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if let Some(absolute_url) = resolve_link(&base, href) {
            if seen.insert(absolute_url.clone()) {
                links.push(absolute_url);
            }
        }
    }

    links
}

// Parses a URL and strips the parts that never change which page is served
//
// Today that is only the fragment: "/a#top" and "/a" are the same document.
// Returns None for anything that does not parse or is not http(s).
pub fn normalize_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);
    Some(url.to_string())
}

// Resolves a link (possibly relative) to a normalized absolute URL
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();

    // Skip anchors and special protocols
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let joined = base.join(href).ok()?;
    normalize_url(joined.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_absolute_link() {
        let html = r#"<a href="https://www.rust-lang.org">Rust</a>"#;
        let links = extract_links(html, "https://example.com");
        assert_eq!(links, vec!["https://www.rust-lang.org/"]);
    }

    #[test]
    fn test_resolve_relative_link() {
        let html = r#"<a href="/docs">Docs</a>"#;
        let links = extract_links(html, "https://example.com/page");
        assert_eq!(links, vec!["https://example.com/docs"]);
    }

    #[test]
    fn test_skip_anchor_and_mailto() {
        let html = r##"
            <a href="#section">Jump</a>
            <a href="mailto:test@example.com">Email</a>
            <a href="javascript:void(0)">Nothing</a>
        "##;
        let links = extract_links(html, "https://example.com");
        assert!(links.is_empty());
    }

    #[test]
    fn test_fragments_collapse_into_one_link() {
        let html = r#"
            <a href="/a">A</a>
            <a href="/a#top">A again</a>
            <a href="../about">About</a>
        "#;
        let links = extract_links(html, "https://example.com/page/");
        assert_eq!(
            links,
            vec!["https://example.com/a", "https://example.com/about"]
        );
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("https://example.com/a#frag"),
            Some("https://example.com/a".to_string())
        );
        assert_eq!(normalize_url("ftp://example.com/file"), None);
        assert_eq!(normalize_url("not a url"), None);
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does Url::join do?
//    - Resolves a link the way a browser would
//    - "intro" on https://a.com/docs/ -> https://a.com/docs/intro
//    - "/intro" on https://a.com/docs/ -> https://a.com/intro
//    - That is why the base must be the URL the page was REALLY served from
//
// 2. Why drop the #fragment?
//    - /page#top and /page#bottom are the same document
//    - Keeping fragments would fetch and save the same page twice
//
// 3. Why a HashSet AND a Vec?
//    - The HashSet answers "seen it already?" quickly
//    - The Vec keeps the links in the order they appear on the page
// -----------------------------------------------------------------------------
