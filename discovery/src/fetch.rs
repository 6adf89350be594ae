//! Page transport.
//!
//! The crawler only sees [`FetchedPage`]s through the [`PageSource`] seam and
//! only reacts to success or failure. [`HttpPageSource`] is the production
//! implementation on `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use crate::config::HttpConfig;
use crate::error::{CrawlError, Result};

const BACKOFF_MULTIPLIER: u32 = 2;

/// Status and raw markup of one fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: Url,
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turns a non-success status into [`CrawlError::FetchStatus`].
    pub fn into_success(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(CrawlError::FetchStatus {
                url: self.url.to_string(),
                status: self.status,
            })
        }
    }
}

/// Something that can fetch documentation pages.
///
/// Implementations report transport failures as errors and hand back every
/// response, whatever its status.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage>;
}

/// Fetches `url` and fails on any non-success status.
pub async fn fetch_success<S: PageSource + ?Sized>(source: &S, url: &Url) -> Result<FetchedPage> {
    source.fetch(url).await?.into_success()
}

/// [`PageSource`] over HTTP with optional retry and exponential backoff.
///
/// Transport errors, `429` and `5xx` answers are retried up to
/// [`HttpConfig::retries`] times; other statuses are returned as-is.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
    retries: u32,
    base_delay: Duration,
}

impl HttpPageSource {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(CrawlError::HttpClient)?;

        Ok(Self {
            client,
            retries: config.retries,
            base_delay: config.retry_delay(),
        })
    }

    async fn fetch_once(&self, url: &Url) -> Result<FetchedPage> {
        let transport = |source| CrawlError::FetchTransport {
            url: url.to_string(),
            source,
        };
        let response = self.client.get(url.clone()).send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        Ok(FetchedPage {
            url: url.clone(),
            status: status.as_u16(),
            body,
        })
    }

    fn is_retryable(result: &Result<FetchedPage>) -> bool {
        match result {
            Ok(page) => StatusCode::from_u16(page.status)
                .is_ok_and(|s| s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS),
            Err(err) => err.is_fetch_failure(),
        }
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        let mut delay = self.base_delay;
        let mut attempt = 0;
        loop {
            debug!(url = %url, attempt, "Fetching page");
            let result = self.fetch_once(url).await;
            if attempt >= self.retries || !Self::is_retryable(&result) {
                return result;
            }

            attempt += 1;
            warn!(url = %url, attempt, delay_ms = delay.as_millis() as u64, "Retrying fetch");
            sleep(delay).await;
            delay *= BACKOFF_MULTIPLIER;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(status: u16) -> FetchedPage {
        FetchedPage {
            url: Url::parse("https://docs.example.com/cli/az/vm").unwrap(),
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_into_success() {
        assert!(page(200).into_success().is_ok());
        let err = page(404).into_success().unwrap_err();
        assert!(matches!(err, CrawlError::FetchStatus { status: 404, .. }));
        assert!(err.is_fetch_failure());
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(HttpPageSource::is_retryable(&Ok(page(503))));
        assert!(HttpPageSource::is_retryable(&Ok(page(429))));
        assert!(!HttpPageSource::is_retryable(&Ok(page(404))));
        assert!(!HttpPageSource::is_retryable(&Ok(page(200))));
    }
}
