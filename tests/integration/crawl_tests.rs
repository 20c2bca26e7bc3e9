//! Integration tests for deep crawls
//!
//! These tests use wiremock to serve a small site and run every traversal
//! strategy against it end-to-end through the real HTTP fetcher.

use futures::StreamExt;
use ripple_deepcrawl::config::{
    build_filter_chain, build_scorer, build_strategy, parse_config, UserAgentConfig,
};
use ripple_deepcrawl::fetcher::HttpFetcher;
use ripple_deepcrawl::output::{OutcomeStore, RunStatus, RunSummary};
use ripple_deepcrawl::scorer::KeywordRelevanceScorer;
use ripple_deepcrawl::{
    BestFirstStrategy, BfsStrategy, CrawlOutcome, DeepCrawlDispatcher, DfsStrategy, FilterChain,
    RunOptions, RunOutput, TraversalConfig, TraversalStrategy,
};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

fn fetcher() -> HttpFetcher {
    HttpFetcher::from_config(&user_agent()).expect("Failed to build fetcher")
}

fn html_page(title: &str, links: &[&str]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|href| format!("<a href=\"{}\">{}</a>\n", href, href))
        .collect();
    let body = format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, anchors
    );
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

/// Serves:
///
/// ```text
/// /                 -> /a, /b, /blog/2025-rust, https://other.test/x
/// /a                -> /c, /
/// /b                -> /missing (404)
/// /blog/2025-rust   -> /a
/// /c                -> (nothing)
/// ```
///
/// The root must be fetched exactly once per test.
async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            "Home",
            &["/a", "/b", "/blog/2025-rust", "https://other.test/x"],
        ))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_page("A", &["/c", "/"]))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html_page("B", &["/missing"]))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blog/2025-rust"))
        .respond_with(html_page("Rust in 2025", &["/a"]))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(html_page("C", &[]))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

/// Paths of the outcomes, relative to the mock server
fn paths(outcomes: &[CrawlOutcome], base: &str) -> Vec<String> {
    outcomes
        .iter()
        .map(|o| o.url.trim_start_matches(base).to_string())
        .collect()
}

#[tokio::test]
async fn test_bfs_visits_levels_in_order() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let base = server.uri();

    let strategy = BfsStrategy::new(TraversalConfig::new(1, 100), FilterChain::default()).unwrap();
    let outcomes = strategy
        .run_batch(&format!("{}/", base), &fetcher(), &RunOptions::new())
        .await;

    assert_eq!(
        paths(&outcomes, &base),
        vec!["/", "/a", "/b", "/blog/2025-rust"]
    );
    let depths: Vec<u32> = outcomes.iter().filter_map(|o| o.depth()).collect();
    assert_eq!(depths, vec![0, 1, 1, 1]);
    assert_eq!(outcomes[1].parent_url(), Some(format!("{}/", base).as_str()));
    assert!(outcomes.iter().all(|o| !o.url.contains("other.test")));
}

#[tokio::test]
async fn test_bfs_records_failed_pages() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let base = server.uri();

    let strategy = BfsStrategy::new(TraversalConfig::new(2, 100), FilterChain::default()).unwrap();
    let outcomes = strategy
        .run_batch(&format!("{}/", base), &fetcher(), &RunOptions::new())
        .await;

    assert_eq!(
        paths(&outcomes, &base),
        vec!["/", "/a", "/b", "/blog/2025-rust", "/c", "/missing"]
    );

    let missing = &outcomes[5];
    assert!(!missing.success);
    assert_eq!(missing.status_code, Some(404));
    assert_eq!(missing.depth(), Some(2));

    let stats = strategy.stats();
    assert_eq!(stats.pages_processed, 5);
    assert_eq!(stats.pages_failed, 1);
    assert_eq!(stats.max_depth_reached, 2);
    assert!(stats.duration().is_some());
}

#[tokio::test]
async fn test_dfs_follows_first_branch_to_the_bottom() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let base = server.uri();

    let strategy = DfsStrategy::new(TraversalConfig::new(2, 100), FilterChain::default()).unwrap();
    let outcomes = strategy
        .run_batch(&format!("{}/", base), &fetcher(), &RunOptions::new())
        .await;

    let visited = paths(&outcomes, &base);
    assert_eq!(&visited[..3], &["/", "/a", "/c"]);
    assert_eq!(visited.len(), 6);
}

#[tokio::test]
async fn test_best_first_spends_budget_on_best_link() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let base = server.uri();

    let strategy = BestFirstStrategy::new(TraversalConfig::new(3, 2), FilterChain::default())
        .unwrap()
        .with_scorer(Arc::new(KeywordRelevanceScorer::new(&["rust"])));
    let outcomes = strategy
        .run_batch(&format!("{}/", base), &fetcher(), &RunOptions::new())
        .await;

    assert_eq!(paths(&outcomes, &base), vec!["/", "/blog/2025-rust"]);
    assert_eq!(outcomes[1].score(), Some(1.0));
}

#[tokio::test]
async fn test_dispatcher_streams_a_deep_crawl() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let base = server.uri();

    let strategy: Arc<dyn TraversalStrategy> = Arc::new(
        BfsStrategy::new(TraversalConfig::new(2, 100), FilterChain::default()).unwrap(),
    );
    let dispatcher = DeepCrawlDispatcher::new(fetcher());
    let options = RunOptions::new()
        .with_strategy(strategy.clone())
        .with_stream(true);

    let outcomes: Vec<CrawlOutcome> = match dispatcher.run(&format!("{}/", base), &options).await {
        RunOutput::Stream(stream) => stream.collect().await,
        other => panic!("expected a stream, got {:?}", other),
    };

    let mut visited = paths(&outcomes, &base);
    assert_eq!(visited[0], "/");
    visited.sort();
    assert_eq!(
        visited,
        vec!["/", "/a", "/b", "/blog/2025-rust", "/c", "/missing"]
    );
    assert_eq!(strategy.stats().pages_failed, 1);
}

#[tokio::test]
async fn test_config_built_crawl_with_filters_and_store() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let base = server.uri();

    let config = parse_config(&format!(
        r#"
[traversal]
strategy = "bfs"
start-url = "{}/"
max-depth = 2
max-pages = 100

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[[filters.pattern]]
patterns = ["/b"]
reverse = true
"#,
        base
    ))
    .unwrap();

    let fetcher = fetcher();
    let chain = build_filter_chain(&config.filters, Arc::new(fetcher.clone())).unwrap();
    let strategy = build_strategy(&config.traversal, chain, build_scorer(&config.scoring)).unwrap();

    let start_url = config.traversal.start_url.clone().unwrap();
    let dispatcher = DeepCrawlDispatcher::new(fetcher);
    let options = RunOptions::new().with_strategy(strategy.clone());
    let outcomes = match dispatcher.run(&start_url, &options).await {
        RunOutput::Batch(outcomes) => outcomes,
        other => panic!("expected a batch, got {:?}", other),
    };

    assert_eq!(
        paths(&outcomes, &base),
        vec!["/", "/a", "/blog/2025-rust", "/c"]
    );
    assert_eq!(strategy.filter_chain().filters()[0].stats().rejected(), 1);

    let dir = tempfile::tempdir().unwrap();
    let mut store = OutcomeStore::open(&dir.path().join("crawl.db")).unwrap();
    let run_id = store.start_run("hash", strategy.name(), &start_url).unwrap();
    store.record_outcomes(run_id, &outcomes).unwrap();
    store
        .finish_run(run_id, &strategy.stats(), RunStatus::Completed)
        .unwrap();

    let run = store.get_run(run_id).unwrap().unwrap();
    assert_eq!(run.strategy, "bfs");
    assert_eq!(run.pages_processed, 4);
    assert_eq!(run.status, RunStatus::Completed);

    let breakdown = store.depth_breakdown(run_id).unwrap();
    assert_eq!(breakdown.get(&0), Some(&1));
    assert_eq!(breakdown.get(&1), Some(&2));
    assert_eq!(breakdown.get(&2), Some(&1));

    let summary = RunSummary::new(
        strategy.name(),
        &start_url,
        "hash",
        strategy.stats(),
        strategy.filter_chain(),
        &outcomes,
    );
    assert_eq!(summary.filters[1].name, "pattern-block");
    assert!(summary.failures.is_empty());
}
