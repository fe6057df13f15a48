//! HTTP client for listing page fetches
//!
//! One GET per page with a fixed browser user agent and a bounded timeout.
//! No retries and no backoff: a failed fetch is reported once and the
//! caller moves on to the next page.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use scraper::Html;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::infrastructure::config::ScrapeConfig;

/// Why a page could not be fetched
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("HTTP request failed for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body from {url}: {reason}")]
    Body { url: String, reason: String },

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

/// Source of listing page markup.
///
/// Implementors return the raw HTML; [`PageFetcher::fetch_page`] turns it into
/// a parsed document and folds failures into `None`.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch HTML content and return it as a string (Send-compatible)
    async fn fetch_html_string(&self, url: &str) -> Result<String, FetchError>;

    /// Fetch and parse one page; failures are logged and yield `None`
    async fn fetch_page(&self, url: &str) -> Option<Html> {
        match self.fetch_html_string(url).await {
            Ok(body) => Some(Html::parse_document(&body)),
            Err(e) => {
                warn!("⚠️ Failed to fetch {}: {}", url, e);
                None
            }
        }
    }
}

/// Configuration for HTTP client behavior
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Whether to follow redirects
    pub follow_redirects: bool,
}

impl HttpClientConfig {
    /// Create HttpClientConfig from ScrapeConfig
    pub fn from_scrape_config(scrape: &ScrapeConfig) -> Self {
        Self {
            timeout_seconds: scrape.request_timeout_seconds,
            user_agent: scrape.user_agent.clone(),
            follow_redirects: true,
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from_scrape_config(&ScrapeConfig::default())
    }
}

/// reqwest-backed page fetcher
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client from ScrapeConfig
    pub fn from_scrape_config(scrape: &ScrapeConfig) -> Result<Self, FetchError> {
        Self::with_config(HttpClientConfig::from_scrape_config(scrape))
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .gzip(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_html_string(&self, url: &str) -> Result<String, FetchError> {
        info!("🌐 HTTP GET: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

/// In-memory fetcher serving fixed markup per URL; unknown URLs fail with 404
#[derive(Debug, Clone, Default)]
pub struct StaticPageFetcher {
    pages: HashMap<String, String>,
}

impl StaticPageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }
}

#[async_trait]
impl PageFetcher for StaticPageFetcher {
    async fn fetch_html_string(&self, url: &str) -> Result<String, FetchError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::with_config(HttpClientConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_config_follows_scrape_settings() {
        let scrape = ScrapeConfig {
            request_timeout_seconds: 3,
            user_agent: "Test Agent".to_string(),
            ..ScrapeConfig::default()
        };
        let client = HttpClient::from_scrape_config(&scrape).unwrap();
        assert_eq!(client.config().timeout_seconds, 3);
        assert_eq!(client.config().user_agent, "Test Agent");
    }

    #[tokio::test]
    async fn test_static_fetcher_serves_known_pages() {
        let fetcher = StaticPageFetcher::new().with_page("https://shop.test/", "<html><body><h1>ok</h1></body></html>");
        let body = fetcher.fetch_html_string("https://shop.test/").await.unwrap();
        assert!(body.contains("ok"));
    }

    #[tokio::test]
    async fn test_fetch_failure_becomes_none() {
        let fetcher = StaticPageFetcher::new();
        assert!(fetcher.fetch_page("https://shop.test/page9").await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_captured() {
        let client = HttpClient::with_config(HttpClientConfig {
            timeout_seconds: 1,
            ..HttpClientConfig::default()
        })
        .unwrap();
        // reserved TEST-NET address, never routable
        let page = client.fetch_page("http://192.0.2.1:9/").await;
        assert!(page.is_none());
    }
}
