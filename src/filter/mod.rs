//! URL filtering
//!
//! A [`UrlFilter`] decides whether a single discovered URL is worth
//! crawling. Filters are combined into a [`FilterChain`], which evaluates
//! them in order and stops at the first rejection.
//!
//! # Components
//!
//! - `PatternFilter`: glob / regex allow or block lists
//! - `DomainFilter`: host allow and block lists
//! - `ContentTypeFilter`: MIME type inferred from the file extension
//! - `ContentRelevanceFilter`: BM25 relevance of the page `<head>` to a query
//! - `SeoFilter`: weighted SEO-quality heuristic over the page `<head>`
//! - `FnFilter`: any closure

mod content_type;
mod domain;
mod pattern;
mod relevance;
mod seo;

pub use content_type::ContentTypeFilter;
pub use domain::DomainFilter;
pub use pattern::PatternFilter;
pub use relevance::ContentRelevanceFilter;
pub use seo::{SeoFilter, DEFAULT_SEO_THRESHOLD};

use crate::stats::FilterStats;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Decides whether one URL should be crawled
///
/// Implementations count every URL they evaluate in their own
/// [`FilterStats`]. Filters that need I/O fail closed: an evaluation error
/// is a rejection.
#[async_trait]
pub trait UrlFilter: Send + Sync {
    /// Short human-readable name used in logs and summaries
    fn name(&self) -> &str;

    /// Returns true if the URL passes this filter
    async fn apply(&self, url: &str) -> bool;

    fn stats(&self) -> &FilterStats;
}

/// Ordered AND-composition of filters with short-circuit evaluation
pub struct FilterChain {
    filters: Vec<Arc<dyn UrlFilter>>,
    allow_empty: bool,
    stats: FilterStats,
}

impl FilterChain {
    /// Creates a chain; an empty chain passes every URL
    pub fn new(filters: Vec<Arc<dyn UrlFilter>>) -> Self {
        Self {
            filters,
            allow_empty: true,
            stats: FilterStats::new(),
        }
    }

    /// Chooses what an empty chain answers
    pub fn with_allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }

    /// Appends a filter at the end of the chain
    pub fn add(mut self, filter: Arc<dyn UrlFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(&self) -> &[Arc<dyn UrlFilter>] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn stats(&self) -> &FilterStats {
        &self.stats
    }

    /// Runs the URL through every filter in order
    ///
    /// Returns false at the first rejection; filters after it never see
    /// the URL.
    pub async fn apply(&self, url: &str) -> bool {
        if self.filters.is_empty() {
            return self.stats.record(self.allow_empty);
        }

        for filter in &self.filters {
            if !filter.apply(url).await {
                tracing::trace!("{} rejected by {}", url, filter.name());
                return self.stats.record(false);
            }
        }

        self.stats.record(true)
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field(
                "filters",
                &self.filters.iter().map(|x| x.name()).collect::<Vec<_>>(),
            )
            .field("allow_empty", &self.allow_empty)
            .finish()
    }
}

/// Wraps a plain predicate as a [`UrlFilter`]
pub struct FnFilter<F> {
    name: String,
    predicate: F,
    stats: FilterStats,
}

impl<F> FnFilter<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    pub fn new(name: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            predicate,
            stats: FilterStats::new(),
        }
    }
}

#[async_trait]
impl<F> UrlFilter for FnFilter<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(&self, url: &str) -> bool {
        self.stats.record((self.predicate)(url))
    }

    fn stats(&self) -> &FilterStats {
        &self.stats
    }
}
