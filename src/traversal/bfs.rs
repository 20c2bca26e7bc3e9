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
use std::collections::VecDeque;
use std::sync::Arc;

/// FIFO queue; each round takes everything pending, which is exactly one
/// depth level because children only arrive while their parents' round runs
#[derive(Debug, Default)]
struct LevelQueue {
    queue: VecDeque<FrontierItem>,
}

impl Frontier for LevelQueue {
    fn next_round(&mut self, limit: usize) -> Vec<FrontierItem> {
        let take = limit.min(self.queue.len());
        self.queue.drain(..take).collect()
    }

    fn extend(&mut self, items: Vec<FrontierItem>) {
        self.queue.extend(items);
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Breadth-first traversal
///
/// Every page of depth N is fetched, and has its links discovered, before
/// any page of depth N + 1. Batch runs return outcomes level by level in
/// discovery order; streamed runs keep the level order but pages within a
/// level arrive in completion order.
///
/// With a scorer, outcomes carry a score, links below `score_threshold`
/// are dropped and the page budget keeps the best-scored links.
pub struct BfsStrategy {
    core: TraversalCore,
}

impl BfsStrategy {
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
impl TraversalStrategy for BfsStrategy {
    fn name(&self) -> &'static str {
        "bfs"
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
            LevelQueue::default(),
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
            LevelQueue::default(),
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
