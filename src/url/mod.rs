//! URL handling module
//!
//! This module provides URL normalization, link resolution, domain
//! extraction, wildcard domain matching and extension/MIME inference.

mod domain;
mod matcher;
mod normalize;

pub use domain::{extract_domain, extract_domain_str, is_same_site, site_key};
pub use matcher::matches_domain;
pub use normalize::{normalize_url, resolve_link};

use url::Url;

/// Extension to MIME type table used by content-type filtering and scoring
const MIME_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("htm", "text/html"),
    ("xhtml", "application/xhtml+xml"),
    ("php", "text/html"),
    ("asp", "text/html"),
    ("aspx", "text/html"),
    ("jsp", "text/html"),
    ("shtml", "text/html"),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("rss", "application/rss+xml"),
    ("atom", "application/atom+xml"),
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
    ("ico", "image/x-icon"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
];

/// Returns the lowercase file extension of the URL's last path segment
///
/// Query strings and fragments are ignored. URLs whose last segment has no
/// dot (or that fail to parse) yield `None`.
///
/// # Examples
///
/// ```
/// use ripple_deepcrawl::url::url_extension;
///
/// assert_eq!(url_extension("https://x.com/report.PDF?dl=1"), Some("pdf".to_string()));
/// assert_eq!(url_extension("https://x.com/docs/"), None);
/// ```
pub fn url_extension(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let (stem, ext) = last.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Maps a lowercase extension to its MIME type, if known
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

/// Number of non-empty path segments in a URL
///
/// `https://x.com/` has depth 0, `https://x.com/a/b` has depth 2.
/// Unparseable URLs report depth 0.
pub fn path_depth(url: &str) -> usize {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .map(|segments| segments.filter(|s| !s.is_empty()).count())
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_basic() {
        assert_eq!(
            url_extension("https://example.com/a/report.pdf"),
            Some("pdf".to_string())
        );
        assert_eq!(
            url_extension("https://example.com/page.HTML#top"),
            Some("html".to_string())
        );
    }

    #[test]
    fn test_extension_missing() {
        assert_eq!(url_extension("https://example.com/"), None);
        assert_eq!(url_extension("https://example.com/blog/post"), None);
        assert_eq!(url_extension("https://example.com/.hidden"), None);
        assert_eq!(url_extension("garbage"), None);
    }

    #[test]
    fn test_dotted_directory_is_ignored() {
        assert_eq!(url_extension("https://example.com/v1.2/guide"), None);
    }

    #[test]
    fn test_mime_lookup() {
        assert_eq!(mime_for_extension("htm"), Some("text/html"));
        assert_eq!(mime_for_extension("pdf"), Some("application/pdf"));
        assert_eq!(mime_for_extension("weird"), None);
    }

    #[test]
    fn test_path_depth() {
        assert_eq!(path_depth("https://example.com"), 0);
        assert_eq!(path_depth("https://example.com/"), 0);
        assert_eq!(path_depth("https://example.com/a/b/c"), 3);
        assert_eq!(path_depth("https://example.com/a//b/"), 2);
    }
}
