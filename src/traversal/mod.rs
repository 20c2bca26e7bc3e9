//! Deep-crawl traversal strategies
//!
//! A [`TraversalStrategy`] starts at one URL, fetches it through a
//! [`PageFetcher`], and follows discovered links within depth and page
//! budgets. Three strategies share one round-based engine and differ only
//! in how their frontier hands out the next round of work:
//!
//! - [`BfsStrategy`]: a whole depth level per round
//! - [`DfsStrategy`]: one page per round, most recently discovered first
//! - [`BestFirstStrategy`]: up to `batch_size` highest-scored pages per round
//!
//! Discovered links go through the strategy's [`FilterChain`] (never
//! applied to the start URL) and, when configured, a [`UrlScorer`].
//!
//! # Rounds and cancellation
//!
//! Each round's fetches run concurrently. New links are discovered as each
//! outcome arrives, and the next round starts only once the current one has
//! drained. [`TraversalStrategy::shutdown`] is observed at that boundary:
//! the current round finishes, no new one starts.

mod best_first;
mod bfs;
mod dfs;
mod engine;
mod frontier;

pub use best_first::BestFirstStrategy;
pub use bfs::BfsStrategy;
pub use dfs::DfsStrategy;
pub use frontier::FrontierItem;

use crate::fetcher::{CrawlOutcome, PageFetcher, RunOptions, DEFAULT_CONCURRENCY};
use crate::filter::FilterChain;
use crate::stats::TraversalStatsSnapshot;
use crate::ConfigError;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Lazily produced outcomes of one traversal run
///
/// Dropping the stream stops the run: no further rounds are fetched.
pub type CrawlStream<'a> = BoxStream<'a, CrawlOutcome>;

/// Default number of pages per Best-First round
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Upper bound accepted for `concurrency`
pub const MAX_CONCURRENCY: usize = 100;

/// Budgets and knobs shared by every strategy
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalConfig {
    /// Deepest link level followed; the start URL is depth 0
    pub max_depth: u32,
    /// Maximum number of pages fetched, successful or failed
    pub max_pages: usize,
    /// Whether cross-site links are eligible at all
    pub include_external: bool,
    /// Pages per Best-First round
    pub batch_size: usize,
    /// Maximum fetches in flight within a round
    pub concurrency: usize,
    /// BFS/DFS drop scored links below this value
    pub score_threshold: Option<f64>,
}

impl TraversalConfig {
    pub fn new(max_depth: u32, max_pages: usize) -> Self {
        Self {
            max_depth,
            max_pages,
            ..Self::default()
        }
    }

    /// Rejects budgets and knobs no run could honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pages == 0 {
            return Err(ConfigError::Validation(
                "max-pages must be at least 1".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Validation(
                "batch-size must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ConfigError::Validation(format!(
                "concurrency must be between 1 and {}",
                MAX_CONCURRENCY
            )));
        }
        if let Some(threshold) = self.score_threshold {
            if !threshold.is_finite() {
                return Err(ConfigError::Validation(
                    "score-threshold must be a finite number".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_pages: 100,
            include_external: false,
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            score_threshold: None,
        }
    }
}

/// A deep-crawl algorithm
///
/// One instance carries one set of run statistics and one cancellation
/// flag, both reset when a run starts. Running the same instance twice at
/// the same time is not supported.
#[async_trait]
pub trait TraversalStrategy: Send + Sync {
    /// Short name used in logs and the run summary
    fn name(&self) -> &'static str;

    /// Runs to completion, budget exhaustion or shutdown and returns every
    /// outcome, in round order
    async fn run_batch(
        &self,
        start_url: &str,
        fetcher: &dyn PageFetcher,
        options: &RunOptions,
    ) -> Vec<CrawlOutcome>;

    /// Starts a run whose outcomes are yielded as their fetches complete
    fn run_stream<'a>(
        &'a self,
        start_url: &str,
        fetcher: &'a dyn PageFetcher,
        options: RunOptions,
    ) -> CrawlStream<'a>;

    /// Whether a discovered URL at `depth` may be crawled
    ///
    /// Depth 0 is the start URL and always passes; anything else must pass
    /// the filter chain and stay within `max_depth`.
    async fn can_process_url(&self, url: &str, depth: u32) -> bool;

    /// Stops the run at the next round boundary and records the end time
    ///
    /// Calling it again has no further effect.
    fn shutdown(&self);

    fn stats(&self) -> TraversalStatsSnapshot;

    fn filter_chain(&self) -> &FilterChain;
}
