use crate::fetcher::DEFAULT_CONCURRENCY;
use crate::filter::DEFAULT_SEO_THRESHOLD;
use crate::scorer::{DEFAULT_DOMAIN_WEIGHT, DEFAULT_WEIGHT};
use crate::traversal::{TraversalConfig, DEFAULT_BATCH_SIZE};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// Main configuration structure for Ripple-Deepcrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub traversal: TraversalSection,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Which traversal algorithm to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    #[default]
    Bfs,
    Dfs,
    BestFirst,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bfs => "bfs",
            Self::Dfs => "dfs",
            Self::BestFirst => "best-first",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Traversal behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TraversalSection {
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Where the crawl starts; the command line may override it
    #[serde(rename = "start-url", default)]
    pub start_url: Option<String>,

    /// Deepest link level followed from the start URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of pages fetched in one run
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Whether links to other sites are followed
    #[serde(rename = "include-external", default)]
    pub include_external: bool,

    /// Pages fetched per Best-First round
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum number of concurrent page fetches
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Stream outcomes as they arrive instead of collecting them
    #[serde(default)]
    pub stream: bool,

    /// BFS/DFS drop scored links below this value
    #[serde(rename = "score-threshold", default)]
    pub score_threshold: Option<f64>,
}

impl TraversalSection {
    pub fn to_traversal_config(&self) -> TraversalConfig {
        TraversalConfig {
            max_depth: self.max_depth,
            max_pages: self.max_pages,
            include_external: self.include_external,
            batch_size: self.batch_size,
            concurrency: self.concurrency,
            score_threshold: self.score_threshold,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration; each output is skipped when its path is absent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

/// Filter chain configuration
///
/// Filters run in a fixed order: pattern filters (file order), domain,
/// content type, relevance, SEO.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// What an empty chain answers
    #[serde(rename = "allow-empty", default = "default_true")]
    pub allow_empty: bool,

    #[serde(default)]
    pub pattern: Vec<PatternFilterConfig>,

    pub domain: Option<DomainFilterConfig>,

    #[serde(rename = "content-type")]
    pub content_type: Option<ContentTypeFilterConfig>,

    pub relevance: Option<RelevanceFilterConfig>,

    pub seo: Option<SeoFilterConfig>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            allow_empty: true,
            pattern: Vec::new(),
            domain: None,
            content_type: None,
            relevance: None,
            seo: None,
        }
    }
}

impl FilterConfig {
    /// Whether any configured filter fetches page heads
    pub fn needs_head_fetcher(&self) -> bool {
        self.relevance.is_some() || self.seo.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatternFilterConfig {
    pub patterns: Vec<String>,
    /// Block matching URLs instead of allowing them
    #[serde(default)]
    pub reverse: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DomainFilterConfig {
    #[serde(default)]
    pub allowed: Vec<String>,
    #[serde(default)]
    pub blocked: Vec<String>,
    #[serde(rename = "include-subdomains", default)]
    pub include_subdomains: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentTypeFilterConfig {
    pub allowed: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelevanceFilterConfig {
    pub query: String,
    pub threshold: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeoFilterConfig {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_seo_threshold")]
    pub threshold: f64,
}

/// Scorer configuration; several configured scorers are combined
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringConfig {
    /// Average the combined scores instead of summing them
    #[serde(default)]
    pub normalize: bool,

    pub keywords: Option<KeywordScorerConfig>,

    #[serde(rename = "path-depth")]
    pub path_depth: Option<PathDepthScorerConfig>,

    #[serde(rename = "content-type")]
    pub content_type: Option<ContentTypeScorerConfig>,

    pub freshness: Option<FreshnessScorerConfig>,

    #[serde(rename = "domain-authority")]
    pub domain_authority: Option<DomainAuthorityScorerConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordScorerConfig {
    pub keywords: Vec<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(rename = "case-sensitive", default)]
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathDepthScorerConfig {
    #[serde(rename = "optimal-depth")]
    pub optimal_depth: usize,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentTypeScorerConfig {
    /// Extension or MIME type -> score
    pub weights: HashMap<String, f64>,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FreshnessScorerConfig {
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Pins the current year; defaults to the system clock
    #[serde(rename = "current-year", default)]
    pub current_year: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DomainAuthorityScorerConfig {
    /// Host -> authority score
    #[serde(default)]
    pub weights: HashMap<String, f64>,
    #[serde(rename = "default-weight", default = "default_domain_weight")]
    pub default_weight: f64,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_true() -> bool {
    true
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

fn default_domain_weight() -> f64 {
    DEFAULT_DOMAIN_WEIGHT
}

fn default_seo_threshold() -> f64 {
    DEFAULT_SEO_THRESHOLD
}
