//! Listing-mode extraction: table rows of linked commands.

use url::Url;

use crate::text::label_tokens;

use super::{ElementKind, Page, resolve_link};

/// A base command row of the reference index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Second token of the row label (`az group (preview)` → `group`).
    pub name: String,
    /// Text of the row's description cell.
    pub description: String,
    /// Detail page of the command; `None` when the row points back at the
    /// listing page itself, i.e. the command is documented inline there.
    pub link: Option<Url>,
}

/// Extracts every base command row from the reference index page.
///
/// Rows whose label has fewer than two tokens are skipped.
///
/// # Examples
///
/// ```
/// use command_tree_discovery::page::{Page, listing::extract_listing};
/// use url::Url;
///
/// let url = Url::parse("https://docs.example.com/cli/reference-index").unwrap();
/// let page = Page::parse(&url, r#"<table>
///   <tr><td><a href="group#top">az group (preview)</a></td><td>Manage resource groups.</td></tr>
/// </table>"#);
///
/// let entries = extract_listing(&page);
/// assert_eq!(entries[0].name, "group");
/// assert_eq!(entries[0].link.as_ref().unwrap().as_str(), "https://docs.example.com/cli/group");
/// ```
pub fn extract_listing(page: &Page) -> Vec<ListingEntry> {
    page.elements
        .iter()
        .filter_map(|element| match &element.kind {
            ElementKind::ListingRow {
                label,
                description,
                href,
            } => {
                let name = label_tokens(label).into_iter().nth(1)?;
                let link = resolve_link(&page.url, href).filter(|link| *link != page.url);
                Some(ListingEntry {
                    name,
                    description: description.clone(),
                    link,
                })
            }
            _ => None,
        })
        .collect()
}

/// Every row link on the page, absolute and without fragment, deduplicated
/// in first-seen order.
pub fn row_links(page: &Page) -> Vec<Url> {
    let mut links: Vec<Url> = Vec::new();
    for element in &page.elements {
        if let ElementKind::ListingRow { href, .. } = &element.kind {
            if let Some(link) = resolve_link(&page.url, href) {
                if !links.contains(&link) {
                    links.push(link);
                }
            }
        }
    }
    links
}
