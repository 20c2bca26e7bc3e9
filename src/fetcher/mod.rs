//! Page fetching collaborators
//!
//! The traversal engine never talks to the network directly. It drives a
//! [`PageFetcher`], which turns a URL into a [`CrawlOutcome`], and the
//! relevance/SEO filters use a [`HeadFetcher`] to peek at a page's
//! `<head>` before committing to a full fetch.
//!
//! [`HttpFetcher`] is the reqwest + scraper implementation of both.

mod http;
mod parser;

pub use http::{build_http_client, HttpFetcher};
pub use parser::{extract_head, parse_html, HeadData, ParsedPage};

use crate::traversal::TraversalStrategy;
use crate::DeepCrawlError;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Default number of fetches allowed in flight at once
pub const DEFAULT_CONCURRENCY: usize = 5;

/// An outbound link found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Absolute, normalized target URL
    pub href: String,
    /// Anchor text, whitespace-collapsed
    pub text: String,
}

impl Link {
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
        }
    }
}

/// Outbound links partitioned by site
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links {
    /// Links to the same site as the page
    pub internal: Vec<Link>,
    /// Links to other sites
    pub external: Vec<Link>,
}

impl Links {
    pub fn len(&self) -> usize {
        self.internal.len() + self.external.len()
    }

    pub fn is_empty(&self) -> bool {
        self.internal.is_empty() && self.external.is_empty()
    }
}

/// Annotations attached to an outcome
///
/// The traversal engine writes `depth`, `parent_url` and, when a scorer
/// produced one, `score`. Fetchers may put anything else in `extra`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub depth: Option<u32>,
    pub parent_url: Option<String>,
    pub score: Option<f64>,
    pub extra: HashMap<String, String>,
}

/// Result of fetching one URL
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlOutcome {
    /// URL the fetcher was asked for
    pub requested_url: String,
    /// Final URL after redirects
    pub url: String,
    pub success: bool,
    pub status_code: Option<u16>,
    pub error_message: Option<String>,
    pub title: Option<String>,
    pub links: Links,
    pub metadata: Metadata,
}

impl CrawlOutcome {
    /// A successful outcome with no links yet
    pub fn success(requested_url: impl Into<String>, final_url: impl Into<String>) -> Self {
        Self {
            requested_url: requested_url.into(),
            url: final_url.into(),
            success: true,
            status_code: None,
            error_message: None,
            title: None,
            links: Links::default(),
            metadata: Metadata::default(),
        }
    }

    /// A failed outcome for `url`
    pub fn failure(url: impl Into<String>, error: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            requested_url: url.clone(),
            url,
            success: false,
            status_code: None,
            error_message: Some(error.into()),
            title: None,
            links: Links::default(),
            metadata: Metadata::default(),
        }
    }

    pub fn with_links(mut self, links: Links) -> Self {
        self.links = links;
        self
    }

    pub fn depth(&self) -> Option<u32> {
        self.metadata.depth
    }

    pub fn parent_url(&self) -> Option<&str> {
        self.metadata.parent_url.as_deref()
    }

    pub fn score(&self) -> Option<f64> {
        self.metadata.score
    }
}

/// Options threaded through every fetch of one run
#[derive(Clone)]
pub struct RunOptions {
    /// Strategy to hand the run to; `None` means a plain single fetch
    pub deep_crawl_strategy: Option<Arc<dyn TraversalStrategy>>,
    /// Deliver results as a lazy stream instead of a collected batch
    pub stream: bool,
    /// Maximum fetches in flight at once
    pub concurrency: usize,
    /// Set while a strategy is driving the run. Fetches issued from inside
    /// a strategy carry it, so they never start a nested deep crawl.
    pub deep_crawl_active: bool,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn TraversalStrategy>) -> Self {
        self.deep_crawl_strategy = Some(strategy);
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Copy of these options marked as running inside a deep crawl
    pub fn inside_deep_crawl(&self) -> Self {
        let mut options = self.clone();
        options.deep_crawl_active = true;
        options
    }

    pub(crate) fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            deep_crawl_strategy: None,
            stream: false,
            concurrency: DEFAULT_CONCURRENCY,
            deep_crawl_active: false,
        }
    }
}

impl fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field(
                "deep_crawl_strategy",
                &self.deep_crawl_strategy.as_ref().map(|s| s.name()),
            )
            .field("stream", &self.stream)
            .field("concurrency", &self.concurrency)
            .field("deep_crawl_active", &self.deep_crawl_active)
            .finish()
    }
}

/// Turns URLs into crawl outcomes
///
/// Failures are reported inside the outcome (`success == false`), never as
/// an error, so a single bad page cannot abort a traversal.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches one URL
    async fn fetch(&self, url: &str, options: &RunOptions) -> CrawlOutcome;

    /// Fetches several URLs concurrently, returning outcomes in input order
    async fn fetch_many(&self, urls: Vec<String>, options: &RunOptions) -> Vec<CrawlOutcome> {
        let concurrency = options.effective_concurrency();
        stream::iter(urls)
            .map(|url| async move { self.fetch(&url, options).await })
            .buffered(concurrency)
            .collect()
            .await
    }

    /// Fetches several URLs concurrently, yielding outcomes as they complete
    fn fetch_stream<'a>(
        &'a self,
        urls: Vec<String>,
        options: RunOptions,
    ) -> BoxStream<'a, CrawlOutcome> {
        let concurrency = options.effective_concurrency();
        stream::iter(urls)
            .map(move |url| {
                let options = options.clone();
                async move { self.fetch(&url, &options).await }
            })
            .buffer_unordered(concurrency)
            .boxed()
    }
}

/// Fetches just the `<head>` of a page
#[async_trait]
pub trait HeadFetcher: Send + Sync {
    async fn fetch_head(&self, url: &str) -> Result<HeadData, DeepCrawlError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageFetcher for EchoFetcher {
        async fn fetch(&self, url: &str, _options: &RunOptions) -> CrawlOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if url.contains("broken") {
                CrawlOutcome::failure(url, "boom")
            } else {
                CrawlOutcome::success(url, url)
            }
        }
    }

    fn urls() -> Vec<String> {
        vec![
            "https://x.com/a".to_string(),
            "https://x.com/broken".to_string(),
            "https://x.com/c".to_string(),
        ]
    }

    #[tokio::test]
    async fn test_fetch_many_keeps_input_order() {
        let fetcher = EchoFetcher {
            calls: AtomicUsize::new(0),
        };
        let outcomes = fetcher.fetch_many(urls(), &RunOptions::default()).await;

        let got: Vec<&str> = outcomes.iter().map(|o| o.url.as_str()).collect();
        assert_eq!(got, vec!["https://x.com/a", "https://x.com/broken", "https://x.com/c"]);
        assert!(!outcomes[1].success);
        assert_eq!(outcomes[1].error_message.as_deref(), Some("boom"));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fetch_stream_yields_every_url() {
        let fetcher = EchoFetcher {
            calls: AtomicUsize::new(0),
        };
        let mut got: Vec<String> = fetcher
            .fetch_stream(urls(), RunOptions::default().with_concurrency(2))
            .map(|o| o.requested_url)
            .collect()
            .await;
        got.sort();

        assert_eq!(got.len(), 3);
        assert_eq!(got[0], "https://x.com/a");
    }

    #[test]
    fn test_inside_deep_crawl_sets_flag() {
        let options = RunOptions::new().with_stream(true);
        let inner = options.inside_deep_crawl();

        assert!(!options.deep_crawl_active);
        assert!(inner.deep_crawl_active);
        assert!(inner.stream);
    }

    #[test]
    fn test_zero_concurrency_still_fetches() {
        let options = RunOptions::new().with_concurrency(0);
        assert_eq!(options.effective_concurrency(), 1);
    }
}
