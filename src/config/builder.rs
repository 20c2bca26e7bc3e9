//! Turns configuration sections into runtime components

use crate::config::types::{FilterConfig, ScoringConfig, StrategyKind, TraversalSection};
use crate::fetcher::HeadFetcher;
use crate::filter::{
    ContentRelevanceFilter, ContentTypeFilter, DomainFilter, FilterChain, PatternFilter,
    SeoFilter, UrlFilter,
};
use crate::scorer::{
    CompositeScorer, ContentTypeScorer, DomainAuthorityScorer, FreshnessScorer,
    KeywordRelevanceScorer, PathDepthScorer, UrlScorer,
};
use crate::traversal::{BestFirstStrategy, BfsStrategy, DfsStrategy, TraversalStrategy};
use crate::ConfigError;
use std::sync::Arc;

/// Builds the filter chain described by `[filters]`
///
/// Cheap checks run first: pattern filters in file order, then domain,
/// content type, and finally the relevance and SEO filters that fetch page
/// heads through `head_fetcher`.
pub fn build_filter_chain(
    config: &FilterConfig,
    head_fetcher: Arc<dyn HeadFetcher>,
) -> Result<FilterChain, ConfigError> {
    let mut filters: Vec<Arc<dyn UrlFilter>> = Vec::new();

    for entry in &config.pattern {
        filters.push(Arc::new(PatternFilter::new(&entry.patterns, entry.reverse)?));
    }

    if let Some(domain) = &config.domain {
        filters.push(Arc::new(
            DomainFilter::new(&domain.allowed, &domain.blocked)
                .with_subdomains(domain.include_subdomains),
        ));
    }

    if let Some(content_type) = &config.content_type {
        filters.push(Arc::new(ContentTypeFilter::new(&content_type.allowed)));
    }

    if let Some(relevance) = &config.relevance {
        filters.push(Arc::new(ContentRelevanceFilter::new(
            head_fetcher.clone(),
            &relevance.query,
            relevance.threshold,
        )));
    }

    if let Some(seo) = &config.seo {
        filters.push(Arc::new(SeoFilter::new(
            head_fetcher,
            &seo.keywords,
            seo.threshold,
        )));
    }

    Ok(FilterChain::new(filters).with_allow_empty(config.allow_empty))
}

/// Builds the scorer described by `[scoring]`
///
/// Returns `None` when no scorer is configured, the scorer itself when
/// exactly one is, and a [`CompositeScorer`] over all of them otherwise.
pub fn build_scorer(config: &ScoringConfig) -> Option<Arc<dyn UrlScorer>> {
    let mut scorers: Vec<Arc<dyn UrlScorer>> = Vec::new();

    if let Some(keywords) = &config.keywords {
        scorers.push(Arc::new(
            KeywordRelevanceScorer::new(&keywords.keywords)
                .with_case_sensitive(keywords.case_sensitive)
                .with_weight(keywords.weight),
        ));
    }

    if let Some(path_depth) = &config.path_depth {
        scorers.push(Arc::new(
            PathDepthScorer::new(path_depth.optimal_depth).with_weight(path_depth.weight),
        ));
    }

    if let Some(content_type) = &config.content_type {
        scorers.push(Arc::new(
            ContentTypeScorer::new(content_type.weights.clone()).with_weight(content_type.weight),
        ));
    }

    if let Some(freshness) = &config.freshness {
        let mut scorer = FreshnessScorer::new().with_weight(freshness.weight);
        if let Some(year) = freshness.current_year {
            scorer = scorer.with_current_year(year);
        }
        scorers.push(Arc::new(scorer));
    }

    if let Some(authority) = &config.domain_authority {
        scorers.push(Arc::new(
            DomainAuthorityScorer::new(authority.weights.clone())
                .with_default_weight(authority.default_weight)
                .with_weight(authority.weight),
        ));
    }

    match scorers.len() {
        0 => None,
        1 => scorers.pop(),
        _ => Some(Arc::new(CompositeScorer::new(scorers, config.normalize))),
    }
}

/// Builds the strategy named in `[traversal]`
pub fn build_strategy(
    section: &TraversalSection,
    filter_chain: FilterChain,
    scorer: Option<Arc<dyn UrlScorer>>,
) -> Result<Arc<dyn TraversalStrategy>, ConfigError> {
    let config = section.to_traversal_config();

    let strategy: Arc<dyn TraversalStrategy> = match section.strategy {
        StrategyKind::Bfs => {
            let mut strategy = BfsStrategy::new(config, filter_chain)?;
            if let Some(scorer) = scorer {
                strategy = strategy.with_scorer(scorer);
            }
            Arc::new(strategy)
        }
        StrategyKind::Dfs => {
            let mut strategy = DfsStrategy::new(config, filter_chain)?;
            if let Some(scorer) = scorer {
                strategy = strategy.with_scorer(scorer);
            }
            Arc::new(strategy)
        }
        StrategyKind::BestFirst => {
            if scorer.is_none() {
                tracing::warn!("best-first traversal without a scorer follows discovery order");
            }
            let mut strategy = BestFirstStrategy::new(config, filter_chain)?;
            if let Some(scorer) = scorer {
                strategy = strategy.with_scorer(scorer);
            }
            Arc::new(strategy)
        }
    };

    Ok(strategy)
}
