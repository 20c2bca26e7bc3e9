//! Single entry point for plain fetches and deep crawls
//!
//! [`DeepCrawlDispatcher`] wraps a [`PageFetcher`]. When the run options
//! name a traversal strategy, [`DeepCrawlDispatcher::run`] hands the whole
//! run to it and passes *itself* as the strategy's fetcher. The options
//! given to the strategy are marked with `deep_crawl_active`, so every
//! fetch the strategy issues back through the dispatcher is a plain fetch
//! and never starts a nested deep crawl.

use crate::fetcher::{CrawlOutcome, PageFetcher, RunOptions};
use crate::traversal::CrawlStream;
use async_trait::async_trait;
use std::fmt;

/// What a call to [`DeepCrawlDispatcher::run`] produced
pub enum RunOutput<'a> {
    /// No strategy configured (or already inside a deep crawl)
    Single(CrawlOutcome),
    /// Deep crawl collected to completion
    Batch(Vec<CrawlOutcome>),
    /// Deep crawl delivered lazily
    Stream(CrawlStream<'a>),
}

impl fmt::Debug for RunOutput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(outcome) => f.debug_tuple("Single").field(&outcome.url).finish(),
            Self::Batch(outcomes) => f.debug_tuple("Batch").field(&outcomes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Routes fetch requests to a plain fetch or a traversal strategy
pub struct DeepCrawlDispatcher<F> {
    inner: F,
}

impl<F: PageFetcher> DeepCrawlDispatcher<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Fetches `url`, or deep-crawls from it when `options` carries a
    /// strategy and no deep crawl is already in progress
    pub async fn run<'a>(&'a self, url: &str, options: &'a RunOptions) -> RunOutput<'a> {
        match &options.deep_crawl_strategy {
            Some(strategy) if !options.deep_crawl_active => {
                tracing::debug!("Dispatching {} to {} strategy", url, strategy.name());
                let inner_options = options.inside_deep_crawl();
                if options.stream {
                    RunOutput::Stream(strategy.run_stream(url, self, inner_options))
                } else {
                    RunOutput::Batch(strategy.run_batch(url, self, &inner_options).await)
                }
            }
            _ => RunOutput::Single(self.inner.fetch(url, options).await),
        }
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for DeepCrawlDispatcher<F> {
    async fn fetch(&self, url: &str, options: &RunOptions) -> CrawlOutcome {
        if options.deep_crawl_strategy.is_some() && !options.deep_crawl_active {
            tracing::warn!(
                "fetch() called for {} with a strategy outside a deep crawl; use run() to crawl",
                url
            );
        }
        self.inner.fetch(url, options).await
    }
}
