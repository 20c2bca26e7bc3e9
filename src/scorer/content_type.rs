use crate::scorer::{UrlScorer, DEFAULT_WEIGHT};
use crate::stats::ScoringStats;
use crate::url::{mime_for_extension, url_extension};
use std::collections::HashMap;

/// Scores URLs by a weight table keyed on extension or MIME type
///
/// The extension is looked up first, then its MIME type. A URL without an
/// extension is treated as `html`. Unmapped types score 0.
#[derive(Debug)]
pub struct ContentTypeScorer {
    type_weights: HashMap<String, f64>,
    weight: f64,
    stats: ScoringStats,
}

impl ContentTypeScorer {
    pub fn new(type_weights: HashMap<String, f64>) -> Self {
        Self {
            type_weights: type_weights
                .into_iter()
                .map(|(k, v)| (k.trim_start_matches('.').to_lowercase(), v))
                .collect(),
            weight: DEFAULT_WEIGHT,
            stats: ScoringStats::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl UrlScorer for ContentTypeScorer {
    fn name(&self) -> &str {
        "content-type"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn calculate_score(&self, url: &str) -> f64 {
        let ext = url_extension(url).unwrap_or_else(|| "html".to_string());
        if let Some(weight) = self.type_weights.get(&ext) {
            return *weight;
        }
        mime_for_extension(&ext)
            .and_then(|mime| self.type_weights.get(mime))
            .copied()
            .unwrap_or(0.0)
    }

    fn stats(&self) -> &ScoringStats {
        &self.stats
    }
}
