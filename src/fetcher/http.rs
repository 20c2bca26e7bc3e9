//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests issued on behalf of a traversal:
//! - Building HTTP clients with a descriptive user agent string
//! - GET requests that turn pages into [`CrawlOutcome`]s
//! - Lightweight `<head>` peeks for the relevance and SEO filters
//! - Error classification into failed outcomes

use crate::config::UserAgentConfig;
use crate::fetcher::parser::{extract_head, parse_html, HeadData};
use crate::fetcher::{CrawlOutcome, HeadFetcher, PageFetcher, RunOptions};
use crate::DeepCrawlError;
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;

/// Upper bound on bytes read while looking for `</head>`
pub const MAX_HEAD_BYTES: usize = 64 * 1024;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use ripple_deepcrawl::config::UserAgentConfig;
/// use ripple_deepcrawl::fetcher::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "RippleDeep".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed [`PageFetcher`] and [`HeadFetcher`]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &UserAgentConfig) -> Result<Self, DeepCrawlError> {
        Ok(Self::new(build_http_client(config)?))
    }

    async fn send(&self, url: &str) -> Result<Response, DeepCrawlError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeepCrawlError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    async fn get_page(&self, url: &str) -> Result<CrawlOutcome, DeepCrawlError> {
        let response = self.send(url).await?;
        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let content_type = content_type_of(&response);

        let mut outcome = CrawlOutcome::success(url, final_url.as_str());
        outcome.status_code = Some(status);
        outcome
            .metadata
            .extra
            .insert("content_type".to_string(), content_type.clone());

        // Non-HTML documents are valid pages without outbound links
        if !content_type.is_empty() && !content_type.contains("html") {
            tracing::debug!("{} is {}, not following links", final_url, content_type);
            return Ok(outcome);
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_error(url, e))?;
        let parsed = parse_html(&body, &final_url);

        tracing::trace!(
            "Parsed {}: {} internal, {} external links",
            final_url,
            parsed.links.internal.len(),
            parsed.links.external.len()
        );

        outcome.title = parsed.title;
        Ok(outcome.with_links(parsed.links))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, _options: &RunOptions) -> CrawlOutcome {
        match self.get_page(url).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Fetch failed for {}: {}", url, e);
                let mut outcome = CrawlOutcome::failure(url, e.to_string());
                if let DeepCrawlError::HttpStatus { status, .. } = e {
                    outcome.status_code = Some(status);
                }
                outcome
            }
        }
    }
}

#[async_trait]
impl HeadFetcher for HttpFetcher {
    async fn fetch_head(&self, url: &str) -> Result<HeadData, DeepCrawlError> {
        let mut response = self.send(url).await?;

        let content_type = content_type_of(&response);
        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(DeepCrawlError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        let mut buffer: Vec<u8> = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| classify_error(url, e))?
        {
            buffer.extend_from_slice(&chunk);
            if buffer.len() >= MAX_HEAD_BYTES || contains_head_end(&buffer) {
                break;
            }
        }
        buffer.truncate(MAX_HEAD_BYTES);

        Ok(extract_head(&String::from_utf8_lossy(&buffer)))
    }
}

fn content_type_of(response: &Response) -> String {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn contains_head_end(buffer: &[u8]) -> bool {
    buffer
        .windows(7)
        .any(|window| window.eq_ignore_ascii_case(b"</head>"))
}

fn classify_error(url: &str, error: reqwest::Error) -> DeepCrawlError {
    if error.is_timeout() {
        DeepCrawlError::Timeout {
            url: url.to_string(),
        }
    } else {
        DeepCrawlError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
