use crate::config::types::{
    Config, FilterConfig, OutputConfig, ScoringConfig, TraversalSection, UserAgentConfig,
};
use crate::filter::PatternFilter;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_traversal(&config.traversal)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_filters(&config.filters)?;
    validate_scoring(&config.scoring)?;
    Ok(())
}

/// Validates traversal budgets and the start URL
fn validate_traversal(section: &TraversalSection) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed
    section.to_traversal_config().validate()?;

    if let Some(start_url) = &section.start_url {
        validate_start_url(start_url)?;
    }

    Ok(())
}

/// Start URLs must be absolute HTTP(S) URLs
pub fn validate_start_url(start_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(start_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid start URL '{}': {}", start_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Start URL '{}' must use HTTP or HTTPS",
            start_url
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Output paths are optional but may not be empty strings
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.as_deref() == Some("") {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.as_deref() == Some("") {
        return Err(ConfigError::Validation(
            "summary-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates filter settings, compiling patterns to surface syntax errors
fn validate_filters(config: &FilterConfig) -> Result<(), ConfigError> {
    for entry in &config.pattern {
        if entry.patterns.is_empty() {
            return Err(ConfigError::Validation(
                "pattern filter must list at least one pattern".to_string(),
            ));
        }
        PatternFilter::new(&entry.patterns, entry.reverse)?;
    }

    if let Some(domain) = &config.domain {
        for pattern in domain.allowed.iter().chain(&domain.blocked) {
            validate_domain_pattern(pattern)?;
        }
    }

    if let Some(content_type) = &config.content_type {
        if content_type.allowed.is_empty() {
            return Err(ConfigError::Validation(
                "content-type filter must allow at least one type".to_string(),
            ));
        }
    }

    if let Some(relevance) = &config.relevance {
        if relevance.query.trim().is_empty() {
            return Err(ConfigError::Validation(
                "relevance query cannot be empty".to_string(),
            ));
        }
        validate_non_negative("relevance threshold", relevance.threshold)?;
    }

    if let Some(seo) = &config.seo {
        if !(0.0..=1.0).contains(&seo.threshold) {
            return Err(ConfigError::Validation(format!(
                "seo threshold must be between 0 and 1, got {}",
                seo.threshold
            )));
        }
    }

    Ok(())
}

/// Weights must be finite and non-negative
fn validate_scoring(config: &ScoringConfig) -> Result<(), ConfigError> {
    if let Some(keywords) = &config.keywords {
        if keywords.keywords.is_empty() {
            return Err(ConfigError::Validation(
                "keyword scorer must list at least one keyword".to_string(),
            ));
        }
        validate_non_negative("keyword weight", keywords.weight)?;
    }

    if let Some(path_depth) = &config.path_depth {
        validate_non_negative("path-depth weight", path_depth.weight)?;
    }

    if let Some(content_type) = &config.content_type {
        validate_non_negative("content-type weight", content_type.weight)?;
        for (kind, weight) in &content_type.weights {
            validate_non_negative(&format!("content-type weight for '{}'", kind), *weight)?;
        }
    }

    if let Some(freshness) = &config.freshness {
        validate_non_negative("freshness weight", freshness.weight)?;
    }

    if let Some(authority) = &config.domain_authority {
        validate_non_negative("domain-authority weight", authority.weight)?;
        validate_non_negative("domain-authority default-weight", authority.default_weight)?;
        for (domain, weight) in &authority.weights {
            validate_domain_string(domain)?;
            validate_non_negative(&format!("authority of '{}'", domain), *weight)?;
        }
    }

    Ok(())
}

fn validate_non_negative(what: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} must be a finite, non-negative number, got {}",
            what, value
        )));
    }
    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    if let Some(domain) = pattern.strip_prefix("*.") {
        validate_domain_string(domain)?;
    } else {
        validate_domain_string(pattern)?;
    }

    Ok(())
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{
        DomainFilterConfig, KeywordScorerConfig, PatternFilterConfig, SeoFilterConfig,
    };

    #[test]
    fn test_validate_domain_pattern() {
        assert!(validate_domain_pattern("example.com").is_ok());
        assert!(validate_domain_pattern("*.example.com").is_ok());
        assert!(validate_domain_pattern("sub.example.com").is_ok());
        assert!(validate_domain_pattern("localhost").is_ok());

        assert!(validate_domain_pattern("").is_err());
        assert!(validate_domain_pattern("*.").is_err());
        assert!(validate_domain_pattern(".example.com").is_err());
        assert!(validate_domain_pattern("example.com.").is_err());
        assert!(validate_domain_pattern("exa mple.com").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
        assert!(validate_email("a@b@c.com").is_err());
    }

    #[test]
    fn test_validate_start_url() {
        assert!(validate_start_url("https://example.com/").is_ok());
        assert!(validate_start_url("http://127.0.0.1:8080/").is_ok());
        assert!(matches!(
            validate_start_url("ftp://example.com/"),
            Err(ConfigError::InvalidUrl(_))
        ));
        assert!(validate_start_url("not a url").is_err());
    }

    #[test]
    fn test_validate_filters() {
        let mut filters = FilterConfig::default();
        assert!(validate_filters(&filters).is_ok());

        filters.pattern.push(PatternFilterConfig {
            patterns: vec!["^([broken$".to_string()],
            reverse: false,
        });
        assert!(matches!(
            validate_filters(&filters),
            Err(ConfigError::InvalidPattern(_))
        ));

        let mut filters = FilterConfig::default();
        filters.domain = Some(DomainFilterConfig {
            allowed: vec!["good.com".to_string()],
            blocked: vec!["bad..com".to_string()],
            include_subdomains: false,
        });
        assert!(validate_filters(&filters).is_err());

        let mut filters = FilterConfig::default();
        filters.seo = Some(SeoFilterConfig {
            keywords: Vec::new(),
            threshold: 1.5,
        });
        assert!(validate_filters(&filters).is_err());
    }

    #[test]
    fn test_validate_scoring_weights() {
        let mut scoring = ScoringConfig::default();
        assert!(validate_scoring(&scoring).is_ok());

        scoring.keywords = Some(KeywordScorerConfig {
            keywords: vec!["rust".to_string()],
            weight: f64::INFINITY,
            case_sensitive: false,
        });
        assert!(validate_scoring(&scoring).is_err());

        scoring.keywords = Some(KeywordScorerConfig {
            keywords: vec!["rust".to_string()],
            weight: 0.7,
            case_sensitive: false,
        });
        assert!(validate_scoring(&scoring).is_ok());
    }
}
