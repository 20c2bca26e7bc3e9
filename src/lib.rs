//! Ripple-Deepcrawl: a deep-crawl traversal engine
//!
//! This crate walks a site graph from a start URL using breadth-first,
//! depth-first or best-first order. Discovered links pass through a
//! composable filter chain and an optional weighted scorer, and the run is
//! bounded by depth and page budgets. Results are delivered either as one
//! collected batch or as a lazy, cancelable stream.

pub mod config;
pub mod dispatch;
pub mod fetcher;
pub mod filter;
pub mod output;
pub mod scorer;
pub mod stats;
pub mod traversal;
pub mod url;

use thiserror::Error;

/// Main error type for deep-crawl operations
#[derive(Debug, Error)]
pub enum DeepCrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Not an HTML document at {url} ({content_type})")]
    NotHtml { url: String, content_type: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for deep-crawl operations
pub type Result<T> = std::result::Result<T, DeepCrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use dispatch::{DeepCrawlDispatcher, RunOutput};
pub use fetcher::{CrawlOutcome, HeadFetcher, Link, Links, PageFetcher, RunOptions};
pub use filter::{FilterChain, UrlFilter};
pub use scorer::{CompositeScorer, UrlScorer};
pub use stats::{FilterStats, ScoringStats, TraversalStats};
pub use traversal::{
    BestFirstStrategy, BfsStrategy, CrawlStream, DfsStrategy, TraversalConfig, TraversalStrategy,
};
pub use url::{extract_domain, normalize_url};
