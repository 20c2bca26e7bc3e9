use crate::filter::UrlFilter;
use crate::stats::FilterStats;
use crate::url::{mime_for_extension, url_extension};
use async_trait::async_trait;

/// Accepts URLs whose inferred content type is allowed
///
/// The type is inferred from the file extension of the last path segment.
/// Allowed entries may be MIME types (`text/html`), MIME wildcards
/// (`image/*`) or bare extensions (`pdf`), which also covers extensions
/// missing from the MIME table. URLs without an extension are assumed to
/// be HTML pages and always pass.
#[derive(Debug)]
pub struct ContentTypeFilter {
    allowed: Vec<String>,
    stats: FilterStats,
}

impl ContentTypeFilter {
    pub fn new<S: AsRef<str>>(allowed: &[S]) -> Self {
        Self {
            allowed: allowed
                .iter()
                .map(|t| t.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            stats: FilterStats::new(),
        }
    }

    fn is_allowed(&self, url: &str) -> bool {
        let Some(ext) = url_extension(url) else {
            return true;
        };
        let mime = mime_for_extension(&ext);

        self.allowed.iter().any(|entry| {
            if *entry == ext {
                return true;
            }
            match mime {
                Some(mime) => match entry.strip_suffix("/*") {
                    Some(major) => mime.split('/').next() == Some(major),
                    None => entry == mime,
                },
                None => false,
            }
        })
    }
}

#[async_trait]
impl UrlFilter for ContentTypeFilter {
    fn name(&self) -> &str {
        "content-type"
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
    async fn test_mime_entries() {
        let filter = ContentTypeFilter::new(&["text/html", "application/pdf"]);

        assert!(filter.apply("https://x.com/index.html").await);
        assert!(filter.apply("https://x.com/legacy.php").await);
        assert!(filter.apply("https://x.com/paper.pdf").await);
        assert!(!filter.apply("https://x.com/photo.jpg").await);
    }

    #[tokio::test]
    async fn test_no_extension_assumed_html() {
        let filter = ContentTypeFilter::new(&["application/pdf"]);
        assert!(filter.apply("https://x.com/docs/intro").await);
        assert!(filter.apply("https://x.com/").await);
    }

    #[tokio::test]
    async fn test_wildcard_entry() {
        let filter = ContentTypeFilter::new(&["image/*"]);
        assert!(filter.apply("https://x.com/a.png").await);
        assert!(filter.apply("https://x.com/b.webp").await);
        assert!(!filter.apply("https://x.com/c.mp4").await);
    }

    #[tokio::test]
    async fn test_unmapped_extension_by_name() {
        let filter = ContentTypeFilter::new(&[".epub", "text/html"]);
        assert!(filter.apply("https://x.com/book.epub").await);
        assert!(!filter.apply("https://x.com/book.mobi").await);
        assert_eq!(filter.stats().total_seen(), 2);
    }
}
