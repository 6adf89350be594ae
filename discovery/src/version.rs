//! Current tool version from the release page title.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::info;
use url::Url;

use crate::error::{CrawlError, Result};
use crate::fetch::{PageSource, fetch_success};

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+\.\d+").expect("static regex must compile"));

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("static selector must parse"));

/// Text of the page's `<title>`, whitespace-trimmed; empty when absent.
pub fn page_title(html: &str) -> String {
    Html::parse_document(html)
        .select(&TITLE_SELECTOR)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// First `major.minor.patch` sequence in `title`.
///
/// ```
/// use command_tree_discovery::version::find_version;
///
/// assert_eq!(find_version("Release Azure CLI 2.61.0 · Azure/azure-cli"), Some("2.61.0"));
/// assert_eq!(find_version("Releases"), None);
/// ```
pub fn find_version(title: &str) -> Option<&str> {
    VERSION_RE.find(title).map(|m| m.as_str())
}

/// Fetches the release page and extracts the version from its title.
pub async fn resolve_version<S: PageSource + ?Sized>(source: &S, release_url: &Url) -> Result<String> {
    let page = fetch_success(source, release_url).await?;
    let title = page_title(&page.body);
    let version = find_version(&title)
        .ok_or_else(|| CrawlError::VersionResolution {
            url: release_url.to_string(),
            title: title.clone(),
        })?
        .to_string();
    info!(version = %version, "Resolved tool version");
    Ok(version)
}
