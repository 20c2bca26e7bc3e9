use crate::filter::UrlFilter;
use crate::stats::FilterStats;
use crate::url::{extract_domain_str, matches_domain};
use async_trait::async_trait;

/// Accepts URLs by host using allow and block lists
///
/// The block list is checked first and always wins. An empty allow list
/// admits every host that is not blocked. Entries may be exact hosts or
/// `*.example.com` wildcards; with `include_subdomains` an exact entry
/// also covers its subdomains. URLs without a host are rejected.
#[derive(Debug)]
pub struct DomainFilter {
    allowed: Vec<String>,
    blocked: Vec<String>,
    include_subdomains: bool,
    stats: FilterStats,
}

impl DomainFilter {
    pub fn new<S: AsRef<str>>(allowed: &[S], blocked: &[S]) -> Self {
        let normalize = |items: &[S]| {
            items
                .iter()
                .map(|d| d.as_ref().trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect::<Vec<String>>()
        };

        Self {
            allowed: normalize(allowed),
            blocked: normalize(blocked),
            include_subdomains: false,
            stats: FilterStats::new(),
        }
    }

    pub fn with_subdomains(mut self, include_subdomains: bool) -> Self {
        self.include_subdomains = include_subdomains;
        self
    }

    fn is_allowed(&self, url: &str) -> bool {
        let Some(domain) = extract_domain_str(url) else {
            return false;
        };

        if self
            .blocked
            .iter()
            .any(|b| matches_domain(b, &domain, self.include_subdomains))
        {
            return false;
        }

        self.allowed.is_empty()
            || self
                .allowed
                .iter()
                .any(|a| matches_domain(a, &domain, self.include_subdomains))
    }
}

#[async_trait]
impl UrlFilter for DomainFilter {
    fn name(&self) -> &str {
        "domain"
    }

    async fn apply(&self, url: &str) -> bool {
        self.stats.record(self.is_allowed(url))
    }

    fn stats(&self) -> &FilterStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_block_list_wins_over_allow_list() {
        let filter = DomainFilter::new(&["x.com"], &["x.com"]);
        assert!(!filter.apply("http://x.com/p").await);
        assert_eq!(filter.stats().rejected(), 1);
    }

    #[tokio::test]
    async fn test_allow_list() {
        let filter = DomainFilter::new(&["x.com"], &[]);
        assert!(filter.apply("https://X.com/a").await);
        assert!(!filter.apply("https://y.com/a").await);
        assert!(!filter.apply("https://blog.x.com/a").await);
    }

    #[tokio::test]
    async fn test_subdomains() {
        let filter = DomainFilter::new(&["x.com"], &["ads.x.com"]).with_subdomains(true);
        assert!(filter.apply("https://blog.x.com/a").await);
        assert!(!filter.apply("https://ads.x.com/a").await);
        assert!(!filter.apply("https://tracker.ads.x.com/a").await);
    }

    #[tokio::test]
    async fn test_wildcard_entry() {
        let filter = DomainFilter::new(&["*.x.com"], &[]);
        assert!(filter.apply("https://x.com/").await);
        assert!(filter.apply("https://a.b.x.com/").await);
        assert!(!filter.apply("https://notx.com/").await);
    }

    #[tokio::test]
    async fn test_empty_allow_list_admits_unblocked() {
        let filter = DomainFilter::new(&[], &["bad.com"]);
        assert!(filter.apply("https://good.com/").await);
        assert!(!filter.apply("https://bad.com/").await);
    }

    #[tokio::test]
    async fn test_unparseable_url_rejected() {
        let filter = DomainFilter::new::<&str>(&[], &[]);
        assert!(!filter.apply("no host here").await);
    }
}
