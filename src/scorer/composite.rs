use crate::scorer::{UrlScorer, DEFAULT_WEIGHT};
use crate::stats::ScoringStats;
use std::fmt;
use std::sync::Arc;

/// Sums the weighted scores of several scorers
///
/// With `normalize` the sum is divided by the number of scorers. A
/// composite is a scorer too, so composites nest. Each child records its
/// own score in its own stats; the composite records the combined value.
pub struct CompositeScorer {
    scorers: Vec<Arc<dyn UrlScorer>>,
    normalize: bool,
    weight: f64,
    stats: ScoringStats,
}

impl CompositeScorer {
    pub fn new(scorers: Vec<Arc<dyn UrlScorer>>, normalize: bool) -> Self {
        Self {
            scorers,
            normalize,
            weight: DEFAULT_WEIGHT,
            stats: ScoringStats::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn scorers(&self) -> &[Arc<dyn UrlScorer>] {
        &self.scorers
    }
}

impl UrlScorer for CompositeScorer {
    fn name(&self) -> &str {
        "composite"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn calculate_score(&self, url: &str) -> f64 {
        if self.scorers.is_empty() {
            return 0.0;
        }

        let total: f64 = self.scorers.iter().map(|s| s.score(url)).sum();
        if self.normalize {
            total / self.scorers.len() as f64
        } else {
            total
        }
    }

    fn stats(&self) -> &ScoringStats {
        &self.stats
    }
}

impl fmt::Debug for CompositeScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeScorer")
            .field(
                "scorers",
                &self.scorers.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("normalize", &self.normalize)
            .field("weight", &self.weight)
            .finish()
    }
}
