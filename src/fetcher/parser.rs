//! HTML parsing for fetched pages
//!
//! This module extracts:
//! - Outbound links with their anchor text, split into internal/external
//! - The page title
//! - `<head>` metadata used by the relevance and SEO filters

use crate::fetcher::{Link, Links};
use crate::url::{is_same_site, resolve_link};
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Outbound links (absolute, normalized, deduplicated)
    pub links: Links,
}

/// Metadata found in a page's `<head>`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadData {
    pub title: Option<String>,
    /// `<meta name=.. content=..>` and `<meta property=.. content=..>`,
    /// keyed by the lowercased name/property
    pub meta: HashMap<String, String>,
    pub canonical: Option<String>,
    /// Whether a `application/ld+json` script block is present
    pub has_json_ld: bool,
}

impl HeadData {
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }
}

/// Parses HTML content and extracts the title and outbound links
///
/// # Link Extraction Rules
///
/// **Include:** `<a href="...">` anywhere in the document
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Fragment-only links
/// - Anything that does not resolve to an HTTP(S) URL
///
/// Links on the same site as `base_url` (ignoring `www.`) are internal,
/// everything else is external. The first occurrence of a target wins.
///
/// # Example
///
/// ```
/// use ripple_deepcrawl::fetcher::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links.internal[0].href, "https://example.com/page");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, base_url),
    }
}

/// Parses the `<head>` section of a (possibly truncated) HTML document
pub fn extract_head(html: &str) -> HeadData {
    let document = Html::parse_document(html);
    let mut head = HeadData {
        title: extract_title(&document),
        ..HeadData::default()
    };

    if let Ok(meta_selector) = Selector::parse("meta[content]") {
        for element in document.select(&meta_selector) {
            let attrs = element.value();
            let key = attrs.attr("name").or_else(|| attrs.attr("property"));
            if let (Some(key), Some(content)) = (key, attrs.attr("content")) {
                head.meta
                    .entry(key.trim().to_lowercase())
                    .or_insert_with(|| content.trim().to_string());
            }
        }
    }

    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        head.canonical = document
            .select(&canonical_selector)
            .next()
            .and_then(|element| element.value().attr("href"))
            .map(|href| href.trim().to_string());
    }

    if let Ok(ld_selector) = Selector::parse("script[type='application/ld+json']") {
        head.has_json_ld = document.select(&ld_selector).next().is_some();
    }

    head
}

fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| collapse_text(&element))
        .filter(|s| !s.is_empty())
}

fn extract_links(document: &Html, base_url: &Url) -> Links {
    let mut links = Links::default();
    let mut seen = HashSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(target) = resolve_link(href, base_url) else {
            continue;
        };
        if !seen.insert(target.to_string()) {
            continue;
        }

        let link = Link::new(target.as_str(), collapse_text(&element));
        if is_same_site(&target, base_url) {
            links.internal.push(link);
        } else {
            links.external.push(link);
        }
    }

    links
}

fn collapse_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    #[test]
    fn test_extract_title_with_whitespace() {
        let html = r#"<html><head><title>  Test
            Page  </title></head><body></body></html>"#;
        let parsed = parse_html(html, &base_url());
        assert_eq!(parsed.title, Some("Test Page".to_string()));
    }

    #[test]
    fn test_no_title() {
        let parsed = parse_html("<html><head></head><body></body></html>", &base_url());
        assert_eq!(parsed.title, None);
    }

    #[test]
    fn test_internal_and_external_partition() {
        let html = r#"
            <html><body>
                <a href="/page1">Link 1</a>
                <a href="https://www.example.com/page2">Link 2</a>
                <a href="https://other.com/page3"> Other   site </a>
            </body></html>
        "#;
        let parsed = parse_html(html, &base_url());

        assert_eq!(parsed.links.internal.len(), 2);
        assert_eq!(parsed.links.external.len(), 1);
        assert_eq!(parsed.links.internal[0].href, "https://example.com/page1");
        assert_eq!(parsed.links.internal[0].text, "Link 1");
        assert_eq!(parsed.links.external[0].text, "Other site");
    }

    #[test]
    fn test_relative_path_link() {
        let html = r#"<html><body><a href="other">Link</a></body></html>"#;
        let parsed = parse_html(html, &base_url());
        assert_eq!(parsed.links.internal[0].href, "https://example.com/other");
    }

    #[test]
    fn test_skips_non_crawlable_links() {
        let html = r##"
            <html><body>
                <a href="javascript:void(0)">js</a>
                <a href="mailto:test@example.com">mail</a>
                <a href="tel:+1234567890">call</a>
                <a href="data:text/html,hi">data</a>
                <a href="/file.pdf" download>dl</a>
                <a href="#section">jump</a>
            </body></html>
        "##;
        let parsed = parse_html(html, &base_url());
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn test_duplicate_targets_keep_first() {
        let html = r#"
            <html><body>
                <a href="/a">First</a>
                <a href="/a/">Second</a>
                <a href="/a#frag">Third</a>
            </body></html>
        "#;
        let parsed = parse_html(html, &base_url());
        assert_eq!(parsed.links.len(), 1);
        assert_eq!(parsed.links.internal[0].text, "First");
    }

    #[test]
    fn test_extract_head_metadata() {
        let html = r#"<html><head>
            <title>Async Rust Guide</title>
            <meta name="Description" content=" Learn async Rust ">
            <meta property="og:title" content="Async Rust">
            <meta name="robots" content="index,follow">
            <link rel="canonical" href="https://example.com/guide">
            <script type="application/ld+json">{"@type":"Article"}</script>
        </head>"#;
        let head = extract_head(html);

        assert_eq!(head.title.as_deref(), Some("Async Rust Guide"));
        assert_eq!(head.meta("description"), Some("Learn async Rust"));
        assert_eq!(head.meta("og:title"), Some("Async Rust"));
        assert_eq!(head.meta("robots"), Some("index,follow"));
        assert_eq!(head.canonical.as_deref(), Some("https://example.com/guide"));
        assert!(head.has_json_ld);
    }

    #[test]
    fn test_extract_head_empty() {
        let head = extract_head("<html><head></head>");
        assert_eq!(head, HeadData::default());
    }
}
