use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates the TOML file at `path`
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use ripple_deepcrawl::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Strategy: {}", config.traversal.strategy);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Hex-encoded SHA-256 of the configuration file
///
/// Stored with every run, so runs made with different settings can be
/// told apart.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_content(&content))
}

/// Loads a configuration together with the hash of the exact bytes parsed
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[traversal]
max-depth = 2
max-pages = 50

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"
"#;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_minimal_config_uses_defaults() {
        let file = create_temp_config(MINIMAL);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.traversal.strategy, StrategyKind::Bfs);
        assert_eq!(config.traversal.max_depth, 2);
        assert_eq!(config.traversal.batch_size, 10);
        assert_eq!(config.traversal.concurrency, 5);
        assert!(!config.traversal.include_external);
        assert!(config.filters.allow_empty);
        assert!(config.output.database_path.is_none());
        assert!(config.scoring.keywords.is_none());
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"
[traversal]
strategy = "best-first"
start-url = "https://example.com/"
max-depth = 3
max-pages = 200
include-external = true
batch-size = 4
concurrency = 8
stream = true
score-threshold = 0.2

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[output]
database-path = "./test.db"
summary-path = "./summary.md"

[filters]
allow-empty = false

[[filters.pattern]]
patterns = ["*/blog/*", "^https://example\\.com/docs/.*$"]

[[filters.pattern]]
patterns = ["*.pdf"]
reverse = true

[filters.domain]
allowed = ["example.com"]
blocked = ["ads.example.com"]
include-subdomains = true

[filters.content-type]
allowed = ["text/html"]

[filters.seo]
keywords = ["rust"]

[scoring]
normalize = true

[scoring.keywords]
keywords = ["rust", "async"]
weight = 0.7
case-sensitive = true

[scoring.path-depth]
optimal-depth = 2

[scoring.content-type]
weights = { html = 1.0, pdf = 0.4 }

[scoring.freshness]
weight = 0.3
current-year = 2024

[scoring.domain-authority]
weights = { "docs.rs" = 0.9 }
default-weight = 0.3
"#;

        let file = create_temp_config(content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.traversal.strategy, StrategyKind::BestFirst);
        assert_eq!(config.traversal.start_url.as_deref(), Some("https://example.com/"));
        assert_eq!(config.traversal.score_threshold, Some(0.2));
        assert!(config.traversal.stream);
        assert_eq!(config.output.summary_path.as_deref(), Some("./summary.md"));

        assert!(!config.filters.allow_empty);
        assert_eq!(config.filters.pattern.len(), 2);
        assert!(config.filters.pattern[1].reverse);
        assert!(config.filters.domain.as_ref().unwrap().include_subdomains);
        assert_eq!(config.filters.seo.as_ref().unwrap().threshold, 0.65);

        assert!(config.scoring.normalize);
        let keywords = config.scoring.keywords.as_ref().unwrap();
        assert!(keywords.case_sensitive);
        assert_eq!(keywords.weight, 0.7);
        assert_eq!(config.scoring.path_depth.as_ref().unwrap().weight, 1.0);
        assert_eq!(config.scoring.content_type.as_ref().unwrap().weights["pdf"], 0.4);
        assert_eq!(config.scoring.freshness.as_ref().unwrap().current_year, Some(2024));
        assert_eq!(config.scoring.domain_authority.as_ref().unwrap().default_weight, 0.3);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let content = MINIMAL.replace("max-depth = 2", "strategy = \"random\"\nmax-depth = 2");
        assert!(matches!(parse_config(&content), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let content = MINIMAL.replace("max-pages = 50", "max-pages = 0");
        let file = create_temp_config(&content);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_negative_depth_is_a_parse_error() {
        let content = MINIMAL.replace("max-depth = 2", "max-depth = -1");
        assert!(matches!(parse_config(&content), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_load_config_with_hash() {
        let file = create_temp_config(MINIMAL);
        let (config, hash) = load_config_with_hash(file.path()).unwrap();
        assert_eq!(config.traversal.max_pages, 50);
        assert_eq!(hash, compute_config_hash(file.path()).unwrap());
    }
}
