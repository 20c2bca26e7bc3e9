//! Round-based traversal engine shared by every strategy

use crate::fetcher::{CrawlOutcome, PageFetcher, RunOptions};
use crate::filter::FilterChain;
use crate::scorer::UrlScorer;
use crate::stats::TraversalStats;
use crate::traversal::frontier::{Frontier, FrontierItem, VisitTracker};
use crate::traversal::{CrawlStream, TraversalConfig};
use crate::url::normalize_url;
use crate::ConfigError;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// How a round's fetches are delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RoundMode {
    /// Whole round fetched, outcomes in frontier order
    Ordered,
    /// Outcomes yielded as each fetch completes
    Streaming,
}

/// State every strategy carries: budgets, filters, scorer, stats and the
/// cancellation flag
pub(crate) struct TraversalCore {
    pub(crate) config: TraversalConfig,
    pub(crate) filter_chain: FilterChain,
    pub(crate) scorer: Option<Arc<dyn UrlScorer>>,
    pub(crate) stats: TraversalStats,
    /// Whether scored links below `config.score_threshold` are dropped
    drop_below_threshold: bool,
    cancelled: AtomicBool,
}

impl TraversalCore {
    pub(crate) fn new(
        config: TraversalConfig,
        filter_chain: FilterChain,
        drop_below_threshold: bool,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            filter_chain,
            scorer: None,
            stats: TraversalStats::new(),
            drop_below_threshold,
            cancelled: AtomicBool::new(false),
        })
    }

    pub(crate) fn shutdown(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            tracing::info!("Traversal shutdown requested");
        }
        self.stats.finish();
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// A shutdown requested before the run starts still cancels it
    fn begin(&self) {
        self.stats.begin();
    }

    /// Stamps the end time and rearms the strategy for its next run
    fn end(&self) {
        self.stats.finish();
        self.cancelled.store(false, Ordering::SeqCst);
    }

    fn remaining_budget(&self) -> usize {
        let attempted = usize::try_from(self.stats.pages_attempted()).unwrap_or(usize::MAX);
        self.config.max_pages.saturating_sub(attempted)
    }

    pub(crate) async fn can_process_url(&self, url: &str, depth: u32) -> bool {
        if depth == 0 {
            return true;
        }
        depth <= self.config.max_depth && self.filter_chain.apply(url).await
    }

    /// Turns the links of one fetched page into new frontier items
    ///
    /// Links are normalized, deduplicated against everything already
    /// enqueued, filtered and scored. The page budget left after the pages
    /// attempted and the `in_flight` fetches caps how many are kept: the
    /// best-scored win, discovery order without a scorer. Links already
    /// pending in the frontier do not count against it, since the frontier
    /// decides which pending page is fetched next. Survivors are marked
    /// visited before returning.
    pub(crate) async fn discover_links(
        &self,
        outcome: &CrawlOutcome,
        source_url: &str,
        current_depth: u32,
        in_flight: usize,
        tracker: &mut VisitTracker,
    ) -> Vec<FrontierItem> {
        let next_depth = current_depth + 1;
        if next_depth > self.config.max_depth {
            return Vec::new();
        }

        let external: &[_] = if self.config.include_external {
            &outcome.links.external
        } else {
            &[]
        };

        let mut candidates: Vec<FrontierItem> = Vec::new();
        for link in outcome.links.internal.iter().chain(external) {
            let url = match normalize_url(&link.href) {
                Ok(url) => url.to_string(),
                Err(e) => {
                    tracing::debug!("Skipping malformed link {}: {}", link.href, e);
                    self.stats.record_skipped();
                    continue;
                }
            };

            if tracker.contains(&url) {
                tracing::trace!(
                    "{} already queued at depth {:?}",
                    url,
                    tracker.depth_of(&url)
                );
                continue;
            }
            if candidates.iter().any(|c| c.url == url) {
                continue;
            }

            if !self.can_process_url(&url, next_depth).await {
                tracing::debug!("Filtered out {}", url);
                self.stats.record_skipped();
                continue;
            }

            let score = self.scorer.as_ref().map(|scorer| scorer.score(&url));
            if let (true, Some(score), Some(threshold)) =
                (self.drop_below_threshold, score, self.config.score_threshold)
            {
                if score < threshold {
                    tracing::debug!("Dropping {} (score {:.3} < {:.3})", url, score, threshold);
                    self.stats.record_skipped();
                    continue;
                }
            }

            candidates.push(FrontierItem {
                url,
                depth: next_depth,
                parent_url: Some(source_url.to_string()),
                score,
            });
        }

        let capacity = self.remaining_budget().saturating_sub(in_flight);
        if candidates.len() > capacity {
            tracing::debug!(
                "Page budget leaves room for {} of {} links from {}",
                capacity,
                candidates.len(),
                source_url
            );
            candidates = keep_best(candidates, capacity, self.scorer.is_some());
        }

        candidates.retain(|item| tracker.insert(&item.url, item.depth));
        candidates
    }
}

/// Keeps `capacity` items, highest score first when scored, then restores
/// discovery order among the survivors
fn keep_best(items: Vec<FrontierItem>, capacity: usize, scored: bool) -> Vec<FrontierItem> {
    if !scored {
        let mut items = items;
        items.truncate(capacity);
        return items;
    }

    let mut indexed: Vec<(usize, FrontierItem)> = items.into_iter().enumerate().collect();
    // Stable sort: equal scores keep discovery order
    indexed.sort_by(|(_, a), (_, b)| {
        b.score
            .unwrap_or(0.0)
            .total_cmp(&a.score.unwrap_or(0.0))
    });
    indexed.truncate(capacity);
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, item)| item).collect()
}

struct RunState<'a, F> {
    core: &'a TraversalCore,
    fetcher: &'a dyn PageFetcher,
    options: RunOptions,
    mode: RoundMode,
    name: &'static str,
    frontier: F,
    tracker: VisitTracker,
    round: Option<CrawlStream<'a>>,
    in_flight: HashMap<String, FrontierItem>,
}

impl<'a, F: Frontier + 'a> RunState<'a, F> {
    /// Launches the next round; false when the run is over
    fn start_round(&mut self) -> bool {
        if self.core.is_cancelled() {
            tracing::debug!("{} traversal cancelled, not starting a new round", self.name);
            return false;
        }

        let remaining = self.core.remaining_budget();
        if remaining == 0 {
            tracing::debug!("Page budget of {} exhausted", self.core.config.max_pages);
            return false;
        }

        let items = self.frontier.next_round(remaining);
        if items.is_empty() {
            return false;
        }

        tracing::debug!(
            "Starting round of {} page(s), {} pending",
            items.len(),
            self.frontier.len()
        );

        let urls: Vec<String> = items.iter().map(|item| item.url.clone()).collect();
        for item in items {
            self.in_flight.insert(item.url.clone(), item);
        }

        let options = self.options.clone();
        let fetcher = self.fetcher;
        self.round = Some(match self.mode {
            RoundMode::Streaming => fetcher.fetch_stream(urls, options),
            RoundMode::Ordered => {
                stream::once(async move { fetcher.fetch_many(urls, &options).await })
                    .flat_map(stream::iter)
                    .boxed()
            }
        });
        true
    }

    /// Annotates one outcome, updates stats and feeds its links back into
    /// the frontier
    ///
    /// A page that redirected to a URL this run already knows yields
    /// nothing: that URL has its own outcome, fetched or pending.
    async fn handle(&mut self, mut outcome: CrawlOutcome) -> Option<CrawlOutcome> {
        let item = match self.in_flight.remove(&outcome.requested_url) {
            Some(item) => item,
            None => {
                tracing::warn!(
                    "Fetcher returned an outcome for unrequested URL {}",
                    outcome.requested_url
                );
                FrontierItem::start(outcome.requested_url.clone())
            }
        };

        outcome.metadata.depth = Some(item.depth);
        outcome.metadata.parent_url = item.parent_url.clone();
        if item.score.is_some() {
            outcome.metadata.score = item.score;
        }

        if !outcome.success {
            tracing::warn!(
                "Failed to crawl {}: {}",
                item.url,
                outcome.error_message.as_deref().unwrap_or("unknown error")
            );
            self.core.stats.record_failed();
            return Some(outcome);
        }

        let redirect = normalize_url(&outcome.url)
            .map(|url| url.to_string())
            .ok()
            .filter(|url| *url != item.url);
        if let Some(final_url) = redirect {
            if !self.tracker.insert(&final_url, item.depth) {
                tracing::debug!(
                    "{} redirected to {}, already part of this run",
                    item.url,
                    final_url
                );
                self.core.stats.record_skipped();
                return None;
            }
        }

        self.core.stats.record_processed(item.depth);
        tracing::trace!("Crawled {} at depth {}", outcome.url, item.depth);

        let discovered = self
            .core
            .discover_links(
                &outcome,
                &outcome.url,
                item.depth,
                self.in_flight.len(),
                &mut self.tracker,
            )
            .await;
        self.frontier.extend(discovered);
        Some(outcome)
    }

    fn finish(&self) {
        self.core.end();
        let stats = self.core.stats.snapshot();
        tracing::info!(
            "{} traversal finished: {} processed, {} failed, {} skipped, max depth {}",
            self.name,
            stats.pages_processed,
            stats.pages_failed,
            stats.pages_skipped,
            stats.max_depth_reached
        );
    }
}

/// Runs a traversal as a lazy stream of outcomes
///
/// The start URL is enqueued at depth 0 without consulting the filter
/// chain. Stats are reset when this is called; the cancellation flag is
/// cleared once the run ends, so a shutdown that lands before the first
/// round stops the run without fetching anything.
pub(crate) fn drive<'a, F: Frontier + 'a>(
    core: &'a TraversalCore,
    name: &'static str,
    start_url: &str,
    fetcher: &'a dyn PageFetcher,
    options: RunOptions,
    mode: RoundMode,
    mut frontier: F,
) -> CrawlStream<'a> {
    core.begin();
    tracing::info!(
        "Starting {} traversal from {} (max depth {}, max pages {})",
        name,
        start_url,
        core.config.max_depth,
        core.config.max_pages
    );

    let start = match normalize_url(start_url) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::warn!("Start URL {} does not normalize: {}", start_url, e);
            start_url.to_string()
        }
    };

    let mut tracker = VisitTracker::default();
    tracker.insert(&start, 0);
    frontier.extend(vec![FrontierItem::start(start)]);

    let state = RunState {
        core,
        fetcher,
        options: options.with_concurrency(core.config.concurrency),
        mode,
        name,
        frontier,
        tracker,
        round: None,
        in_flight: HashMap::new(),
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(round) = state.round.as_mut() {
                if let Some(outcome) = round.next().await {
                    if let Some(outcome) = state.handle(outcome).await {
                        return Some((outcome, state));
                    }
                    continue;
                }
                state.round = None;
            }

            if !state.start_round() {
                state.finish();
                return None;
            }
        }
    })
    .boxed()
}
