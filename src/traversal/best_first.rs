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
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

/// Heap entry: higher score first, then earlier insertion
#[derive(Debug)]
struct Prioritized {
    score: f64,
    seq: u64,
    item: FrontierItem,
}

impl Ord for Prioritized {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Prioritized {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Prioritized {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Prioritized {}

#[derive(Debug)]
struct PriorityFrontier {
    heap: BinaryHeap<Prioritized>,
    next_seq: u64,
    batch_size: usize,
}

impl PriorityFrontier {
    fn new(batch_size: usize) -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
            batch_size,
        }
    }
}

impl Frontier for PriorityFrontier {
    fn next_round(&mut self, limit: usize) -> Vec<FrontierItem> {
        let take = limit.min(self.batch_size);
        std::iter::from_fn(|| self.heap.pop())
            .take(take)
            .map(|entry| entry.item)
            .collect()
    }

    /// Unscored items rank as 0.0
    fn extend(&mut self, items: Vec<FrontierItem>) {
        for mut item in items {
            let score = *item.score.get_or_insert(0.0);
            self.heap.push(Prioritized {
                score,
                seq: self.next_seq,
                item,
            });
            self.next_seq += 1;
        }
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

/// Best-first traversal driven by a scorer
///
/// Each round fetches up to `batch_size` of the highest-scored pending
/// pages; equal scores go in discovery order. Links found in a round are
/// only ranked once that round has finished, so the overall order is
/// approximately, not strictly, by descending score. Without a scorer every
/// link scores 0.0 and the run degrades to batched discovery order.
///
/// Links are never dropped for a low score; `score_threshold` does not
/// apply here.
pub struct BestFirstStrategy {
    core: TraversalCore,
}

impl BestFirstStrategy {
    pub fn new(config: TraversalConfig, filter_chain: FilterChain) -> Result<Self, ConfigError> {
        Ok(Self {
            core: TraversalCore::new(config, filter_chain, false)?,
        })
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn UrlScorer>) -> Self {
        self.core.scorer = Some(scorer);
        self
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.core.config
    }

    fn frontier(&self) -> PriorityFrontier {
        PriorityFrontier::new(self.core.config.batch_size)
    }
}

#[async_trait]
impl TraversalStrategy for BestFirstStrategy {
    fn name(&self) -> &'static str {
        "best-first"
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
            self.frontier(),
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
            self.frontier(),
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
