use crate::scorer::{UrlScorer, DEFAULT_WEIGHT};
use crate::stats::ScoringStats;
use crate::url::extract_domain_str;
use std::collections::HashMap;

pub const DEFAULT_DOMAIN_WEIGHT: f64 = 0.5;

/// Scores URLs by a per-domain authority table
///
/// Hosts are compared lowercased and exactly. Unknown hosts, and URLs
/// without one, get the default weight.
#[derive(Debug)]
pub struct DomainAuthorityScorer {
    domain_weights: HashMap<String, f64>,
    default_weight: f64,
    weight: f64,
    stats: ScoringStats,
}

impl DomainAuthorityScorer {
    pub fn new(domain_weights: HashMap<String, f64>) -> Self {
        Self {
            domain_weights: domain_weights
                .into_iter()
                .map(|(domain, weight)| (domain.to_lowercase(), weight))
                .collect(),
            default_weight: DEFAULT_DOMAIN_WEIGHT,
            weight: DEFAULT_WEIGHT,
            stats: ScoringStats::new(),
        }
    }

    pub fn with_default_weight(mut self, default_weight: f64) -> Self {
        self.default_weight = default_weight;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl UrlScorer for DomainAuthorityScorer {
    fn name(&self) -> &str {
        "domain-authority"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn calculate_score(&self, url: &str) -> f64 {
        extract_domain_str(url)
            .and_then(|domain| self.domain_weights.get(&domain).copied())
            .unwrap_or(self.default_weight)
    }

    fn stats(&self) -> &ScoringStats {
        &self.stats
    }
}
