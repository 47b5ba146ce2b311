//! Blocking HTTP client for catalog pages, plus the [PageFetcher] seam the page loop uses.

use crate::scraper::error::ScraperError;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 10;

/// Source of raw page HTML. Implemented by [CatalogClient]; tests script their own pages.
pub trait PageFetcher {
    /// GET `url` and return the body. Non-2xx is an error; there are no retries.
    fn fetch(&mut self, url: &str) -> Result<String, ScraperError>;
}

/// Stateless blocking HTTP client: no cookie jar, and no User-Agent unless one is configured.
#[derive(Debug)]
pub struct CatalogClient {
    inner: reqwest::blocking::Client,
}

impl CatalogClient {
    /// Build a client with the default timeout.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::builder().build()
    }

    pub fn builder() -> CatalogClientBuilder {
        CatalogClientBuilder::default()
    }
}

impl PageFetcher for CatalogClient {
    fn fetch(&mut self, url: &str) -> Result<String, ScraperError> {
        tracing::debug!(url, "GET");
        let response = self
            .inner
            .get(url)
            .send()
            .map_err(|e| ScraperError::Network {
                url: url.to_string(),
                source: e,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        response.text().map_err(|e| ScraperError::BodyRead {
            url: url.to_string(),
            source: e,
        })
    }
}

/// Builder for CatalogClient with optional User-Agent and timeout.
#[derive(Debug)]
pub struct CatalogClientBuilder {
    user_agent: Option<String>,
    timeout_secs: u64,
}

impl Default for CatalogClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl CatalogClientBuilder {
    /// Send this User-Agent. If not set, no User-Agent header is added.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Request timeout in seconds. Default 30.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<CatalogClient, reqwest::Error> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));
        if let Some(ua) = self.user_agent {
            builder = builder.user_agent(ua);
        }
        let inner = builder.build()?;
        Ok(CatalogClient { inner })
    }
}
