//! Counters maintained by filters, scorers and traversal strategies
//!
//! Filter and traversal counters are plain atomics: they only ever grow
//! within a run and are read without locking. Scoring aggregates carry
//! floating point min/max/sum and sit behind a small mutex.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Per-filter (and per-chain) counters
#[derive(Debug, Default)]
pub struct FilterStats {
    total_seen: AtomicU64,
    passed: AtomicU64,
    rejected: AtomicU64,
}

impl FilterStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one verdict and hands it back, so filters can end with
    /// `self.stats.record(verdict)`.
    pub fn record(&self, passed: bool) -> bool {
        self.total_seen.fetch_add(1, Ordering::Relaxed);
        if passed {
            self.passed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.rejected.fetch_add(1, Ordering::Relaxed);
        }
        passed
    }

    pub fn total_seen(&self) -> u64 {
        self.total_seen.load(Ordering::Relaxed)
    }

    pub fn passed(&self) -> u64 {
        self.passed.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct ScoringAggregate {
    count: u64,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

/// Per-scorer aggregate of every score produced
#[derive(Debug, Default)]
pub struct ScoringStats {
    inner: Mutex<ScoringAggregate>,
}

impl ScoringStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, score: f64) {
        let mut agg = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        agg.count += 1;
        agg.sum += score;
        agg.min = Some(agg.min.map_or(score, |m| m.min(score)));
        agg.max = Some(agg.max.map_or(score, |m| m.max(score)));
    }

    fn snapshot(&self) -> ScoringAggregate {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn count(&self) -> u64 {
        self.snapshot().count
    }

    pub fn sum(&self) -> f64 {
        self.snapshot().sum
    }

    /// Smallest score seen, `None` before the first score
    pub fn min(&self) -> Option<f64> {
        self.snapshot().min
    }

    /// Largest score seen, `None` before the first score
    pub fn max(&self) -> Option<f64> {
        self.snapshot().max
    }

    /// Mean score, 0.0 before the first score
    pub fn average(&self) -> f64 {
        let agg = self.snapshot();
        if agg.count == 0 {
            0.0
        } else {
            agg.sum / agg.count as f64
        }
    }
}

/// Per-run traversal counters, owned by one strategy instance
#[derive(Debug, Default)]
pub struct TraversalStats {
    start_time: Mutex<Option<DateTime<Utc>>>,
    end_time: Mutex<Option<DateTime<Utc>>>,
    pages_processed: AtomicU64,
    pages_failed: AtomicU64,
    pages_skipped: AtomicU64,
    max_depth_reached: AtomicU32,
}

impl TraversalStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all counters and stamps a fresh start time
    pub(crate) fn begin(&self) {
        *self.start_time.lock().unwrap_or_else(|e| e.into_inner()) = Some(Utc::now());
        *self.end_time.lock().unwrap_or_else(|e| e.into_inner()) = None;
        self.pages_processed.store(0, Ordering::Relaxed);
        self.pages_failed.store(0, Ordering::Relaxed);
        self.pages_skipped.store(0, Ordering::Relaxed);
        self.max_depth_reached.store(0, Ordering::Relaxed);
    }

    /// Stamps the end time unless one is already recorded
    pub(crate) fn finish(&self) {
        let mut end = self.end_time.lock().unwrap_or_else(|e| e.into_inner());
        if end.is_none() {
            *end = Some(Utc::now());
        }
    }

    pub(crate) fn record_processed(&self, depth: u32) {
        self.pages_processed.fetch_add(1, Ordering::Relaxed);
        self.max_depth_reached.fetch_max(depth, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.pages_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skipped(&self) {
        self.pages_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pages_processed(&self) -> u64 {
        self.pages_processed.load(Ordering::Relaxed)
    }

    pub fn pages_failed(&self) -> u64 {
        self.pages_failed.load(Ordering::Relaxed)
    }

    pub fn pages_skipped(&self) -> u64 {
        self.pages_skipped.load(Ordering::Relaxed)
    }

    /// Pages that consumed budget, successful or not
    pub fn pages_attempted(&self) -> u64 {
        self.pages_processed() + self.pages_failed()
    }

    pub fn max_depth_reached(&self) -> u32 {
        self.max_depth_reached.load(Ordering::Relaxed)
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        *self.start_time.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        *self.end_time.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> TraversalStatsSnapshot {
        TraversalStatsSnapshot {
            start_time: self.start_time(),
            end_time: self.end_time(),
            pages_processed: self.pages_processed(),
            pages_failed: self.pages_failed(),
            pages_skipped: self.pages_skipped(),
            max_depth_reached: self.max_depth_reached(),
        }
    }
}

/// Point-in-time copy of [`TraversalStats`]
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalStatsSnapshot {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub pages_processed: u64,
    pub pages_failed: u64,
    pub pages_skipped: u64,
    pub max_depth_reached: u32,
}

impl TraversalStatsSnapshot {
    /// Wall-clock duration of the run, once it has finished
    pub fn duration(&self) -> Option<Duration> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => (end - start).to_std().ok(),
            _ => None,
        }
    }
}
