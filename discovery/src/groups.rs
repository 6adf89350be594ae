//! Group page discovery for one base command.

use tracing::debug;
use url::Url;

use crate::error::Result;
use crate::fetch::{PageSource, fetch_success};
use crate::page::Page;
use crate::page::listing::row_links;
use crate::schedule::Scheduler;

/// A base command's landing page and the group pages it links to.
#[derive(Debug, Clone)]
pub struct GroupListing {
    pub landing: Page,
    /// Distinct row links, absolute and fragment-free, in first-seen order.
    pub links: Vec<Url>,
}

/// Fetches the landing page once and collects its row links.
///
/// A failed fetch is returned as-is; no partial listing is produced.
pub async fn discover_group_pages<S: PageSource + ?Sized>(
    source: &S,
    scheduler: &Scheduler,
    landing_url: &Url,
) -> Result<GroupListing> {
    let fetched = scheduler.fetch(fetch_success(source, landing_url)).await?;
    let landing = Page::parse(landing_url, &fetched.body);
    let links = row_links(&landing);
    debug!(url = %landing.url, groups = links.len(), "Discovered group pages");
    Ok(GroupListing { landing, links })
}
