//! URL scoring
//!
//! A [`UrlScorer`] turns a discovered URL into a priority. Best-first
//! traversal orders its frontier by it; breadth- and depth-first use it to
//! annotate outcomes, apply a score threshold and pick which links to keep
//! when the page budget runs short.
//!
//! Every scorer produces `weight * calculate_score(url)` and records each
//! result in its own [`ScoringStats`]. Scorers are combined with
//! [`CompositeScorer`], which is itself a scorer.

mod composite;
mod content_type;
mod domain_authority;
mod freshness;
mod keyword;
mod path_depth;

pub use composite::CompositeScorer;
pub use content_type::ContentTypeScorer;
pub use domain_authority::{DomainAuthorityScorer, DEFAULT_DOMAIN_WEIGHT};
pub use freshness::FreshnessScorer;
pub use keyword::KeywordRelevanceScorer;
pub use path_depth::PathDepthScorer;

use crate::stats::ScoringStats;

pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Computes a numeric priority for a URL
///
/// Scoring is synchronous and must not do I/O; it runs inside the
/// traversal bookkeeping between fetch rounds.
pub trait UrlScorer: Send + Sync {
    fn name(&self) -> &str;

    /// Multiplier applied to [`calculate_score`](Self::calculate_score)
    fn weight(&self) -> f64;

    /// Unweighted score for one URL
    fn calculate_score(&self, url: &str) -> f64;

    fn stats(&self) -> &ScoringStats;

    /// Weighted score, recorded in [`stats`](Self::stats)
    fn score(&self, url: &str) -> f64 {
        let score = self.weight() * self.calculate_score(url);
        self.stats().record(score);
        score
    }
}
