use crate::fetcher::{HeadData, HeadFetcher};
use crate::filter::UrlFilter;
use crate::stats::FilterStats;
use crate::url::normalize_url;
use async_trait::async_trait;
use std::sync::Arc;

pub const DEFAULT_SEO_THRESHOLD: f64 = 0.65;

const WEIGHT_TITLE_LENGTH: f64 = 0.15;
const WEIGHT_TITLE_KEYWORD: f64 = 0.18;
const WEIGHT_META_DESCRIPTION: f64 = 0.12;
const WEIGHT_CANONICAL: f64 = 0.10;
const WEIGHT_ROBOTS: f64 = 0.20;
const WEIGHT_JSON_LD: f64 = 0.10;
const WEIGHT_URL_QUALITY: f64 = 0.15;

/// Accepts URLs whose `<head>` looks search-engine friendly
///
/// Seven signals are scored in `[0, 1]` and summed with fixed weights
/// (which add up to 1.0):
///
/// | Signal | Weight |
/// |--------|--------|
/// | title length close to 50-60 chars | 0.15 |
/// | keywords present in the title | 0.18 |
/// | meta description of 140-160 chars | 0.12 |
/// | canonical link pointing at the URL | 0.10 |
/// | robots meta without `noindex` | 0.20 |
/// | schema.org JSON-LD block | 0.10 |
/// | short, clean URL | 0.15 |
///
/// A failed head fetch rejects the URL.
pub struct SeoFilter {
    head_fetcher: Arc<dyn HeadFetcher>,
    keywords: Vec<String>,
    threshold: f64,
    stats: FilterStats,
}

impl SeoFilter {
    pub fn new<S: AsRef<str>>(
        head_fetcher: Arc<dyn HeadFetcher>,
        keywords: &[S],
        threshold: f64,
    ) -> Self {
        Self {
            head_fetcher,
            keywords: keywords
                .iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            threshold,
            stats: FilterStats::new(),
        }
    }

    /// Weighted SEO score of a page head fetched from `url`
    pub fn score_head(&self, url: &str, head: &HeadData) -> f64 {
        WEIGHT_TITLE_LENGTH * title_length_score(head.title.as_deref())
            + WEIGHT_TITLE_KEYWORD * self.title_keyword_score(head.title.as_deref())
            + WEIGHT_META_DESCRIPTION * meta_description_score(head.meta("description"))
            + WEIGHT_CANONICAL * canonical_score(url, head.canonical.as_deref())
            + WEIGHT_ROBOTS * robots_score(head.meta("robots"))
            + WEIGHT_JSON_LD * if head.has_json_ld { 1.0 } else { 0.0 }
            + WEIGHT_URL_QUALITY * url_quality_score(url)
    }

    fn title_keyword_score(&self, title: Option<&str>) -> f64 {
        let Some(title) = title else {
            return 0.0;
        };
        // Nothing to look for: the signal is neutral
        if self.keywords.is_empty() {
            return 1.0;
        }

        let title = title.to_lowercase();
        let found = self
            .keywords
            .iter()
            .filter(|k| title.contains(k.as_str()))
            .count();
        found as f64 / self.keywords.len() as f64
    }
}

#[async_trait]
impl UrlFilter for SeoFilter {
    fn name(&self) -> &str {
        "seo"
    }

    async fn apply(&self, url: &str) -> bool {
        let verdict = match self.head_fetcher.fetch_head(url).await {
            Ok(head) => {
                let score = self.score_head(url, &head);
                tracing::trace!("SEO score of {}: {:.3}", url, score);
                score >= self.threshold
            }
            Err(e) => {
                tracing::warn!("SEO check failed for {}: {}", url, e);
                false
            }
        };
        self.stats.record(verdict)
    }

    fn stats(&self) -> &FilterStats {
        &self.stats
    }
}

fn title_length_score(title: Option<&str>) -> f64 {
    let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) else {
        return 0.0;
    };
    let len = title.chars().count() as f64;
    if (50.0..=60.0).contains(&len) {
        1.0
    } else {
        (1.0 - (len - 55.0).abs() / 55.0).max(0.0)
    }
}

fn meta_description_score(description: Option<&str>) -> f64 {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) if (140..=160).contains(&d.chars().count()) => 1.0,
        Some(_) => 0.5,
        None => 0.0,
    }
}

fn canonical_score(url: &str, canonical: Option<&str>) -> f64 {
    let Some(canonical) = canonical else {
        return 0.0;
    };
    match (normalize_url(url), normalize_url(canonical)) {
        (Ok(a), Ok(b)) if a == b => 1.0,
        _ => 0.5,
    }
}

fn robots_score(robots: Option<&str>) -> f64 {
    match robots {
        Some(r) if r.to_lowercase().contains("noindex") => 0.0,
        _ => 1.0,
    }
}

fn url_quality_score(url: &str) -> f64 {
    let mut score: f64 = 1.0;
    if url.len() > 100 {
        score -= 0.3;
    }
    if url.contains('?') {
        score -= 0.2;
    }
    if url.contains('_') {
        score -= 0.2;
    }
    if crate::url::path_depth(url) > 4 {
        score -= 0.3;
    }
    score.max(0.0)
}
