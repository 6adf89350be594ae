//! Crawl settings.
//!
//! Every field has a default, so a partial YAML mapping (or none at all) is a
//! valid configuration:
//!
//! ```yaml
//! tool: az
//! root_url: https://learn.microsoft.com/en-us/cli/azure/reference-index?view=azure-cli-latest
//! release_url: https://github.com/Azure/azure-cli/releases/latest
//! fetch_concurrency: 2
//! subtree_concurrency: 1
//! duplicate_policy: keep-first
//! http:
//!   retries: 0
//!   retry_delay_ms: 500
//!   timeout_secs: 30
//! ```

use std::time::Duration;

use command_tree_core::DuplicatePolicy;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CrawlError, Result};
use crate::schedule::{DEFAULT_FETCH_CONCURRENCY, DEFAULT_SUBTREE_CONCURRENCY};

pub const DEFAULT_TOOL: &str = "az";
pub const DEFAULT_ROOT_URL: &str =
    "https://learn.microsoft.com/en-us/cli/azure/reference-index?view=azure-cli-latest";
pub const DEFAULT_RELEASE_URL: &str = "https://github.com/Azure/azure-cli/releases/latest";

/// Transport settings for [`HttpPageSource`](crate::HttpPageSource).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Extra attempts after a failed fetch; 0 fails on the first error.
    pub retries: u32,
    /// Delay before the first retry, doubled on each further attempt.
    pub retry_delay_ms: u64,
    /// Per-request timeout.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            retries: 0,
            retry_delay_ms: 500,
            timeout_secs: 30,
            user_agent: format!("command-tree/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// What to crawl and how hard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Root command name; also the first token of every heading label.
    pub tool: String,
    /// Reference index listing the base commands and global options.
    pub root_url: String,
    /// Page whose title carries the current release version.
    pub release_url: String,
    pub fetch_concurrency: usize,
    pub subtree_concurrency: usize,
    /// Which listing row survives when two base commands share a name.
    pub duplicate_policy: DuplicatePolicy,
    pub http: HttpConfig,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            tool: DEFAULT_TOOL.to_string(),
            root_url: DEFAULT_ROOT_URL.to_string(),
            release_url: DEFAULT_RELEASE_URL.to_string(),
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            subtree_concurrency: DEFAULT_SUBTREE_CONCURRENCY,
            duplicate_policy: DuplicatePolicy::default(),
            http: HttpConfig::default(),
        }
    }
}

impl CrawlConfig {
    /// Parsed reference index URL.
    pub fn root_url(&self) -> Result<Url> {
        parse_url(&self.root_url)
    }

    /// Parsed release page URL.
    pub fn release_url(&self) -> Result<Url> {
        parse_url(&self.release_url)
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|source| CrawlError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CrawlConfig::default();
        assert_eq!(config.tool, "az");
        assert_eq!(config.fetch_concurrency, 2);
        assert_eq!(config.subtree_concurrency, 1);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::KeepFirst);
        assert_eq!(config.http.retries, 0);
        assert!(config.root_url().is_ok());
        assert!(config.release_url().is_ok());
    }

    #[test]
    fn test_partial_mapping_fills_defaults() {
        let config: CrawlConfig = serde_json::from_str(
            r#"{"tool": "mytool", "duplicate_policy": "keep-last", "http": {"retries": 3}}"#,
        )
        .unwrap();
        assert_eq!(config.tool, "mytool");
        assert_eq!(config.duplicate_policy, DuplicatePolicy::KeepLast);
        assert_eq!(config.http.retries, 3);
        assert_eq!(config.http.timeout(), Duration::from_secs(30));
        assert_eq!(config.root_url, DEFAULT_ROOT_URL);
    }

    #[test]
    fn test_invalid_url_is_reported() {
        let config = CrawlConfig {
            root_url: "not a url".into(),
            ..CrawlConfig::default()
        };
        let err = config.root_url().unwrap_err();
        assert!(matches!(err, CrawlError::InvalidUrl { ref url, .. } if url == "not a url"));
    }
}
