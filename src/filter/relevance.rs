use crate::fetcher::{HeadData, HeadFetcher};
use crate::filter::UrlFilter;
use crate::stats::FilterStats;
use async_trait::async_trait;
use std::sync::Arc;

const DEFAULT_K1: f64 = 1.2;
const DEFAULT_B: f64 = 0.75;
const DEFAULT_AVGDL: f64 = 1000.0;

/// Accepts URLs whose `<head>` is relevant to a query
///
/// Only the head of the candidate page is fetched. Its title, description,
/// keywords and Open Graph title/description form a single document that
/// is scored against the query with BM25. The URL passes when the score
/// reaches the threshold. A failed head fetch rejects the URL.
pub struct ContentRelevanceFilter {
    head_fetcher: Arc<dyn HeadFetcher>,
    query_terms: Vec<String>,
    threshold: f64,
    k1: f64,
    b: f64,
    avgdl: f64,
    stats: FilterStats,
}

impl ContentRelevanceFilter {
    pub fn new(head_fetcher: Arc<dyn HeadFetcher>, query: &str, threshold: f64) -> Self {
        let mut query_terms: Vec<String> = Vec::new();
        for term in tokenize(query) {
            if !query_terms.contains(&term) {
                query_terms.push(term);
            }
        }

        Self {
            head_fetcher,
            query_terms,
            threshold,
            k1: DEFAULT_K1,
            b: DEFAULT_B,
            avgdl: DEFAULT_AVGDL,
            stats: FilterStats::new(),
        }
    }

    /// Overrides the BM25 term-saturation (`k1`), length-normalization
    /// (`b`) and average document length parameters
    pub fn with_bm25_params(mut self, k1: f64, b: f64, avgdl: f64) -> Self {
        self.k1 = k1;
        self.b = b;
        self.avgdl = avgdl;
        self
    }

    /// BM25 score of a page head against the query
    pub fn score_head(&self, head: &HeadData) -> f64 {
        let document = tokenize(&head_document(head));
        if document.is_empty() {
            return 0.0;
        }

        let doc_len = document.len() as f64;
        // Single-document corpus where the term is present: N = 1, n = 1
        let idf = ((1.0 - 1.0 + 0.5) / (1.0 + 0.5) + 1.0_f64).ln();
        let norm = self.k1 * (1.0 - self.b + self.b * doc_len / self.avgdl);

        self.query_terms
            .iter()
            .map(|term| {
                let tf = document.iter().filter(|t| *t == term).count() as f64;
                if tf == 0.0 {
                    0.0
                } else {
                    idf * tf * (self.k1 + 1.0) / (tf + norm)
                }
            })
            .sum()
    }
}

#[async_trait]
impl UrlFilter for ContentRelevanceFilter {
    fn name(&self) -> &str {
        "relevance"
    }

    async fn apply(&self, url: &str) -> bool {
        let verdict = match self.head_fetcher.fetch_head(url).await {
            Ok(head) => {
                let score = self.score_head(&head);
                tracing::trace!("Relevance of {}: {:.3}", url, score);
                score >= self.threshold
            }
            Err(e) => {
                tracing::warn!("Relevance check failed for {}: {}", url, e);
                false
            }
        };
        self.stats.record(verdict)
    }

    fn stats(&self) -> &FilterStats {
        &self.stats
    }
}

fn head_document(head: &HeadData) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(title) = &head.title {
        parts.push(title);
    }
    for key in ["description", "keywords", "og:title", "og:description"] {
        if let Some(value) = head.meta(key) {
            parts.push(value);
        }
    }
    parts.join(" ")
}

/// Lowercased alphanumeric tokens
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeepCrawlError;
    use std::collections::HashMap;

    struct StaticHeads(HashMap<String, HeadData>);

    #[async_trait]
    impl HeadFetcher for StaticHeads {
        async fn fetch_head(&self, url: &str) -> Result<HeadData, DeepCrawlError> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| DeepCrawlError::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    fn head(title: &str, description: &str) -> HeadData {
        let mut head = HeadData {
            title: Some(title.to_string()),
            ..HeadData::default()
        };
        head.meta
            .insert("description".to_string(), description.to_string());
        head
    }

    fn heads() -> Arc<StaticHeads> {
        let mut pages = HashMap::new();
        pages.insert(
            "https://x.com/async".to_string(),
            head("Async Rust tutorial", "Learn the Rust async runtime"),
        );
        pages.insert(
            "https://x.com/garden".to_string(),
            head("Gardening tips", "Grow tomatoes at home"),
        );
        Arc::new(StaticHeads(pages))
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Async-Rust, 2024 edition!"),
            vec!["async", "rust", "2024", "edition"]
        );
    }

    #[test]
    fn test_score_ranks_relevant_higher() {
        let filter = ContentRelevanceFilter::new(heads(), "rust async", 0.5);
        let relevant = filter.score_head(&head("Async Rust tutorial", "Rust runtime"));
        let unrelated = filter.score_head(&head("Gardening tips", "Tomatoes"));

        assert!(relevant > 0.5);
        assert_eq!(unrelated, 0.0);
    }

    #[test]
    fn test_empty_head_scores_zero() {
        let filter = ContentRelevanceFilter::new(heads(), "rust", 0.1);
        assert_eq!(filter.score_head(&HeadData::default()), 0.0);
    }

    #[tokio::test]
    async fn test_apply_threshold() {
        let filter = ContentRelevanceFilter::new(heads(), "rust async", 0.5);

        assert!(filter.apply("https://x.com/async").await);
        assert!(!filter.apply("https://x.com/garden").await);
        assert_eq!(filter.stats().passed(), 1);
        assert_eq!(filter.stats().rejected(), 1);
    }

    #[tokio::test]
    async fn test_fetch_error_fails_closed() {
        let filter = ContentRelevanceFilter::new(heads(), "rust", 0.0);
        assert!(!filter.apply("https://x.com/missing").await);
        assert_eq!(filter.stats().rejected(), 1);
    }
}
