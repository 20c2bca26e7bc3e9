//! Configuration module for Ripple-Deepcrawl
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and building the filter chain, scorer and traversal strategy they
//! describe.
//!
//! # Example
//!
//! ```no_run
//! use ripple_deepcrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.traversal.max_depth);
//! ```

mod builder;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ContentTypeFilterConfig, ContentTypeScorerConfig, DomainAuthorityScorerConfig,
    DomainFilterConfig, FilterConfig, FreshnessScorerConfig, KeywordScorerConfig, OutputConfig,
    PathDepthScorerConfig, PatternFilterConfig, RelevanceFilterConfig, ScoringConfig,
    SeoFilterConfig, StrategyKind, TraversalSection, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

pub use builder::{build_filter_chain, build_scorer, build_strategy};
pub use validation::validate_start_url;
