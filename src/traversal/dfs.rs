use crate::fetcher::{CrawlOutcome, PageFetcher, RunOptions};
use crate::filter::FilterChain;
use crate::scorer::UrlScorer;
use crate::stats::TraversalStatsSnapshot;
use crate::traversal::engine::{drive, RoundMode, TraversalCore};
use crate::traversal::frontier::{Frontier, FrontierItem};
use crate::traversal::{CrawlStream, TraversalConfig, TraversalStrategy};
use crate::ConfigError;
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;

/// LIFO stack, one page per round
#[derive(Debug, Default)]
struct Stack {
    items: Vec<FrontierItem>,
}

impl Frontier for Stack {
    fn next_round(&mut self, limit: usize) -> Vec<FrontierItem> {
        if limit == 0 {
            return Vec::new();
        }
        self.items.pop().into_iter().collect()
    }

    /// Pushed in reverse so the first-discovered child is popped first
    fn extend(&mut self, items: Vec<FrontierItem>) {
        self.items.extend(items.into_iter().rev());
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// Depth-first traversal
///
/// A branch is followed to `max_depth` before its siblings are visited.
/// Pages are fetched one at a time, so outcomes come out in exact
/// depth-first order in both batch and stream mode.
///
/// Scorer handling matches [`BfsStrategy`](crate::traversal::BfsStrategy).
pub struct DfsStrategy {
    core: TraversalCore,
}

impl DfsStrategy {
    pub fn new(config: TraversalConfig, filter_chain: FilterChain) -> Result<Self, ConfigError> {
        Ok(Self {
            core: TraversalCore::new(config, filter_chain, true)?,
        })
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn UrlScorer>) -> Self {
        self.core.scorer = Some(scorer);
        self
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.core.config
    }
}

#[async_trait]
impl TraversalStrategy for DfsStrategy {
    fn name(&self) -> &'static str {
        "dfs"
    }

    async fn run_batch(
        &self,
        start_url: &str,
        fetcher: &dyn PageFetcher,
        options: &RunOptions,
    ) -> Vec<CrawlOutcome> {
        drive(
            &self.core,
            self.name(),
            start_url,
            fetcher,
            options.clone(),
            RoundMode::Ordered,
            Stack::default(),
        )
        .collect()
        .await
    }

    fn run_stream<'a>(
        &'a self,
        start_url: &str,
        fetcher: &'a dyn PageFetcher,
        options: RunOptions,
    ) -> CrawlStream<'a> {
        drive(
            &self.core,
            self.name(),
            start_url,
            fetcher,
            options,
            RoundMode::Streaming,
            Stack::default(),
        )
    }

    async fn can_process_url(&self, url: &str, depth: u32) -> bool {
        self.core.can_process_url(url, depth).await
    }

    fn shutdown(&self) {
        self.core.shutdown();
    }

    fn stats(&self) -> TraversalStatsSnapshot {
        self.core.stats.snapshot()
    }

    fn filter_chain(&self) -> &FilterChain {
        &self.core.filter_chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traversal::test_support::{depths, small_site, urls, MapFetcher};

    const START: &str = "https://site.test/";

    fn dfs(max_depth: u32, max_pages: usize) -> DfsStrategy {
        DfsStrategy::new(TraversalConfig::new(max_depth, max_pages), FilterChain::default())
            .unwrap()
    }

    #[tokio::test]
    async fn test_branch_exhausted_before_sibling() {
        let outcomes = dfs(2, 100)
            .run_batch(START, &small_site(), &RunOptions::default())
            .await;

        assert_eq!(
            urls(&outcomes),
            vec![
                "https://site.test/",
                "https://site.test/a",
                "https://site.test/c",
                "https://site.test/b",
            ]
        );
        assert_eq!(depths(&outcomes), vec![0, 1, 2, 1]);
    }

    #[tokio::test]
    async fn test_stream_matches_batch_order() {
        let strategy = dfs(2, 100);
        let site = small_site();
        let streamed: Vec<CrawlOutcome> = strategy
            .run_stream(START, &site, RunOptions::default().with_stream(true))
            .collect()
            .await;
        assert_eq!(
            urls(&streamed),
            vec![
                "https://site.test/",
                "https://site.test/a",
                "https://site.test/c",
                "https://site.test/b",
            ]
        );
    }

    #[tokio::test]
    async fn test_deep_chain_respects_max_depth() {
        let site = MapFetcher::new()
            .page(START, &["https://site.test/1"])
            .page("https://site.test/1", &["https://site.test/2"])
            .page("https://site.test/2", &["https://site.test/3"])
            .page("https://site.test/3", &["https://site.test/4"]);

        let strategy = dfs(2, 100);
        let outcomes = strategy.run_batch(START, &site, &RunOptions::default()).await;

        assert_eq!(depths(&outcomes), vec![0, 1, 2]);
        assert_eq!(strategy.stats().max_depth_reached, 2);
    }

    #[tokio::test]
    async fn test_tight_budget_still_goes_deep_first() {
        let strategy = dfs(2, 3);
        let outcomes = strategy
            .run_batch(START, &small_site(), &RunOptions::default())
            .await;

        assert_eq!(
            urls(&outcomes),
            vec![
                "https://site.test/",
                "https://site.test/a",
                "https://site.test/c",
            ]
        );
        assert_eq!(depths(&outcomes), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_page_bound() {
        let strategy = dfs(3, 3);
        let outcomes = strategy
            .run_batch(START, &small_site(), &RunOptions::default())
            .await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(strategy.stats().pages_processed, 3);
    }
}
