//! Error types for crawling a documentation site.
//!
//! Every variant is fatal to the run: nothing in the crawler recovers
//! locally, so the first error aborts the whole crawl and no partial tree is
//! produced.

use thiserror::Error;

/// Errors that can occur while crawling.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// A page was fetched but the server answered with a non-success status.
    #[error("fetching {url} failed with HTTP status {status}")]
    FetchStatus { url: String, status: u16 },

    /// A page could not be fetched at all.
    #[error("fetching {url} failed: {source}")]
    FetchTransport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The release page title holds no `major.minor.patch` version.
    #[error("no version found in the title of {url} (title: {title:?})")]
    VersionResolution { url: String, title: String },

    /// A configured or discovered URL could not be parsed.
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A base command listed without a link has no heading on the listing
    /// page.
    #[error("base command {name} is not documented on {url}")]
    MissingBaseCommand { name: String, url: String },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// A concurrency pool was closed while a task waited on it.
    #[error("scheduler closed: {0}")]
    Scheduler(#[from] tokio::sync::AcquireError),
}

impl CrawlError {
    /// Whether this error is a fetch failure (status or transport).
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            CrawlError::FetchStatus { .. } | CrawlError::FetchTransport { .. }
        )
    }
}

/// Convenience alias for results with [`CrawlError`].
pub type Result<T> = std::result::Result<T, CrawlError>;
