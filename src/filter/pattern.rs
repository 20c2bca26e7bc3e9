use crate::filter::UrlFilter;
use crate::stats::FilterStats;
use crate::ConfigError;
use async_trait::async_trait;
use regex::Regex;
use url::Url;

/// One compiled URL pattern
#[derive(Debug, Clone)]
enum UrlPattern {
    /// Glob over the whole URL, or over the path when it starts with `/`
    Glob(glob::Pattern),
    Regex(Regex),
}

impl UrlPattern {
    /// Patterns anchored with `^` or `$` are regular expressions,
    /// everything else is a glob
    fn parse(pattern: &str) -> Result<Self, ConfigError> {
        if pattern.starts_with('^') || pattern.ends_with('$') {
            Regex::new(pattern)
                .map(Self::Regex)
                .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
        } else {
            glob::Pattern::new(pattern)
                .map(Self::Glob)
                .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
        }
    }

    fn matches(&self, url: &str, path: Option<&str>) -> bool {
        match self {
            Self::Glob(glob) if glob.as_str().starts_with('/') => {
                path.is_some_and(|p| glob.matches(p))
            }
            Self::Glob(glob) => glob.matches(url),
            Self::Regex(regex) => regex.is_match(url),
        }
    }
}

/// Accepts URLs matching any of a set of glob or regex patterns
///
/// In reverse (block) mode the verdict flips: a match rejects the URL and
/// everything else passes.
///
/// # Example
///
/// ```
/// use ripple_deepcrawl::filter::PatternFilter;
///
/// let filter = PatternFilter::new(&["*/blog/*", "^https://x\\.com/docs/.*$"], false).unwrap();
/// assert!(filter.matches("https://x.com/blog/post"));
/// assert!(filter.matches("https://x.com/docs/intro"));
/// assert!(!filter.matches("https://x.com/about"));
/// ```
#[derive(Debug)]
pub struct PatternFilter {
    patterns: Vec<UrlPattern>,
    reverse: bool,
    stats: FilterStats,
}

impl PatternFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S], reverse: bool) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| UrlPattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns,
            reverse,
            stats: FilterStats::new(),
        })
    }

    /// Whether any pattern matches, ignoring block mode
    pub fn matches(&self, url: &str) -> bool {
        let path = Url::parse(url).ok().map(|u| u.path().to_string());
        self.patterns
            .iter()
            .any(|pattern| pattern.matches(url, path.as_deref()))
    }
}

#[async_trait]
impl UrlFilter for PatternFilter {
    fn name(&self) -> &str {
        if self.reverse {
            "pattern-block"
        } else {
            "pattern"
        }
    }

    async fn apply(&self, url: &str) -> bool {
        let matched = self.matches(url);
        self.stats.record(matched != self.reverse)
    }

    fn stats(&self) -> &FilterStats {
        &self.stats
    }
}
