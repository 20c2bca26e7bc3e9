use crate::scorer::{UrlScorer, DEFAULT_WEIGHT};
use crate::stats::ScoringStats;
use crate::url::path_depth;

/// Prefers URLs whose path depth is close to an optimum
///
/// The score is `1 / (1 + |depth - optimal|)`: 1.0 at the optimal depth,
/// 0.5 one level away, 0.33 two levels away and so on.
#[derive(Debug)]
pub struct PathDepthScorer {
    optimal_depth: usize,
    weight: f64,
    stats: ScoringStats,
}

impl PathDepthScorer {
    pub fn new(optimal_depth: usize) -> Self {
        Self {
            optimal_depth,
            weight: DEFAULT_WEIGHT,
            stats: ScoringStats::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn score_for_depth(&self, depth: usize) -> f64 {
        1.0 / (1.0 + depth.abs_diff(self.optimal_depth) as f64)
    }
}

impl UrlScorer for PathDepthScorer {
    fn name(&self) -> &str {
        "path-depth"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn calculate_score(&self, url: &str) -> f64 {
        self.score_for_depth(path_depth(url))
    }

    fn stats(&self) -> &ScoringStats {
        &self.stats
    }
}
