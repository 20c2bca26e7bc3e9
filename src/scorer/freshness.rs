use crate::scorer::{UrlScorer, DEFAULT_WEIGHT};
use crate::stats::ScoringStats;
use chrono::Datelike;
use regex::Regex;
use std::sync::OnceLock;

const NO_YEAR_SCORE: f64 = 0.5;
const RECENT_SCORES: [f64; 6] = [1.0, 0.9, 0.8, 0.7, 0.6, 0.5];

fn year_regex() -> &'static Regex {
    static YEAR: OnceLock<Regex> = OnceLock::new();
    YEAR.get_or_init(|| Regex::new(r"(?:^|\D)((?:19|20)\d{2})(?:\D|$)").expect("valid year regex"))
}

/// Prefers URLs that mention a recent year
///
/// The most recent year between 1900 and the current year found in the URL
/// decides the score: 1.0 for this year, minus 0.1 per year of age, never
/// below 0.1. URLs without a year score 0.5.
#[derive(Debug)]
pub struct FreshnessScorer {
    current_year: i32,
    weight: f64,
    stats: ScoringStats,
}

impl FreshnessScorer {
    pub fn new() -> Self {
        Self {
            current_year: chrono::Utc::now().year(),
            weight: DEFAULT_WEIGHT,
            stats: ScoringStats::new(),
        }
    }

    /// Pins "now" to a fixed year
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Most recent plausible year mentioned in the URL
    pub fn extract_year(&self, url: &str) -> Option<i32> {
        // Matches can share a separator, so scan overlapping windows
        let regex = year_regex();
        let mut best: Option<i32> = None;
        let mut start = 0;
        while let Some(caps) = regex.captures_at(url, start) {
            let Some(year_match) = caps.get(1) else {
                break;
            };
            if let Ok(year) = year_match.as_str().parse::<i32>() {
                if (1900..=self.current_year).contains(&year) {
                    best = Some(best.map_or(year, |b| b.max(year)));
                }
            }
            start = year_match.end();
        }
        best
    }

    pub fn score_for_year(&self, year: i32) -> f64 {
        let diff = (self.current_year - year).max(0) as usize;
        match RECENT_SCORES.get(diff) {
            Some(score) => *score,
            None => (1.0 - 0.1 * diff as f64).max(0.1),
        }
    }
}

impl Default for FreshnessScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlScorer for FreshnessScorer {
    fn name(&self) -> &str {
        "freshness"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn calculate_score(&self, url: &str) -> f64 {
        match self.extract_year(url) {
            Some(year) => self.score_for_year(year),
            None => NO_YEAR_SCORE,
        }
    }

    fn stats(&self) -> &ScoringStats {
        &self.stats
    }
}
