use crate::scorer::{UrlScorer, DEFAULT_WEIGHT};
use crate::stats::ScoringStats;

/// Scores a URL by the fraction of keywords it contains
///
/// # Example
///
/// ```
/// use ripple_deepcrawl::scorer::{KeywordRelevanceScorer, UrlScorer};
///
/// let scorer = KeywordRelevanceScorer::new(&["rust", "async"]);
/// assert_eq!(scorer.calculate_score("https://x.com/rust/intro"), 0.5);
/// ```
#[derive(Debug)]
pub struct KeywordRelevanceScorer {
    keywords: Vec<String>,
    case_sensitive: bool,
    weight: f64,
    stats: ScoringStats,
}

impl KeywordRelevanceScorer {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|k| k.as_ref().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
            case_sensitive: false,
            weight: DEFAULT_WEIGHT,
            stats: ScoringStats::new(),
        }
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl UrlScorer for KeywordRelevanceScorer {
    fn name(&self) -> &str {
        "keywords"
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn calculate_score(&self, url: &str) -> f64 {
        if self.keywords.is_empty() {
            return 0.0;
        }

        let found = if self.case_sensitive {
            self.keywords.iter().filter(|k| url.contains(k.as_str())).count()
        } else {
            let url = url.to_lowercase();
            self.keywords
                .iter()
                .filter(|k| url.contains(&k.to_lowercase()))
                .count()
        };

        found as f64 / self.keywords.len() as f64
    }

    fn stats(&self) -> &ScoringStats {
        &self.stats
    }
}
