//! Documentation page parsing.
//!
//! A fetched page is first flattened into an ordered list of
//! [`PageElement`]s: the handful of structures the documentation layout uses
//! (listing rows, title, command headings, parameter section anchors,
//! parameter names and descriptions, paragraphs), each tagged with the
//! [`Scope`] it appears in. All extraction modes then work on that flat list
//! instead of on the DOM:
//!
//! - [`listing`]: base command rows of the reference index, and the row links
//!   of a base command's landing page.
//! - [`detail`]: command headings with their required/optional parameter
//!   blocks, and the group path/summary of a group page.
//! - [`globals`]: the global parameters of the reference index.
//! - [`walk`]: the parameter block state machine used by [`detail`].

pub mod detail;
pub mod globals;
pub mod listing;
pub mod walk;

use scraper::{ElementRef, Html};
use url::Url;

use crate::text::collapse_whitespace;

const REQUIRED_SUFFIX: &str = "-required-parameters";
const OPTIONAL_SUFFIX: &str = "-optional-parameters";
const PARAMETER_NAME_CLASS: &str = "parameterName";
const PARAMETER_INFO_CLASS: &str = "parameterInfo";

/// Where on the page an element sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Regular page content.
    Command,
    /// Inside the `index`-th `<details>` section of the page; `global` when
    /// that section's text mentions "global".
    Collapsible { index: usize, global: bool },
}

/// Which parameter list a section anchor opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Required,
    Optional,
}

impl SectionKind {
    pub fn is_required(self) -> bool {
        self == SectionKind::Required
    }
}

/// One structural element of a page, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    /// The page's `<h1>`.
    Title { label: String },
    /// A table row holding a link.
    ListingRow {
        label: String,
        description: String,
        href: String,
    },
    /// An `<h2 id>` naming a command.
    CommandHeading { id: String, label: String },
    /// An `<h3>`/`<h4>` whose id marks the required or optional parameters of
    /// the command heading with id `owner`.
    ParameterSection { owner: String, kind: SectionKind },
    /// Any other `<h2>`-`<h4>`.
    SectionHeading { label: String },
    /// The name cell of a parameter entry.
    ParameterName { text: String },
    /// The description cell of a parameter entry.
    ParameterInfo { text: String },
    /// A free-standing paragraph.
    Paragraph { text: String },
}

/// An [`ElementKind`] with its [`Scope`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageElement {
    pub kind: ElementKind,
    pub scope: Scope,
}

impl PageElement {
    /// Creates an element in [`Scope::Command`].
    pub fn command(kind: ElementKind) -> Self {
        Self {
            kind,
            scope: Scope::Command,
        }
    }

    pub fn is_command_scope(&self) -> bool {
        self.scope == Scope::Command
    }
}

/// A fetched page reduced to its structural elements.
#[derive(Debug, Clone)]
pub struct Page {
    /// Page URL with any fragment removed.
    pub url: Url,
    pub elements: Vec<PageElement>,
}

impl Page {
    /// Parses page markup.
    pub fn parse(url: &Url, html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut flattener = Flattener::default();
        flattener.visit(document.root_element(), Scope::Command);
        Self {
            url: without_fragment(url),
            elements: flattener.elements,
        }
    }

    /// Builds a page from an already flattened element list.
    pub fn from_elements(url: &Url, elements: Vec<PageElement>) -> Self {
        Self {
            url: without_fragment(url),
            elements,
        }
    }
}

/// Returns `url` without its `#fragment`.
pub fn without_fragment(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

/// Resolves `href` against `base` and drops the fragment.
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    base.join(href.trim()).ok().map(|url| without_fragment(&url))
}

#[derive(Default)]
struct Flattener {
    elements: Vec<PageElement>,
    collapsibles: usize,
}

impl Flattener {
    fn push(&mut self, kind: ElementKind, scope: Scope) {
        self.elements.push(PageElement { kind, scope });
    }

    fn visit(&mut self, element: ElementRef<'_>, scope: Scope) {
        let tag = element.value().name();
        let id = element.value().attr("id");

        if has_class(element, PARAMETER_NAME_CLASS) {
            self.push(
                ElementKind::ParameterName {
                    text: element_text(element),
                },
                scope,
            );
            return;
        }
        if has_class(element, PARAMETER_INFO_CLASS) {
            self.push(
                ElementKind::ParameterInfo {
                    text: element_text(element),
                },
                scope,
            );
            return;
        }

        match tag {
            "h1" => self.push(
                ElementKind::Title {
                    label: element_text(element),
                },
                scope,
            ),
            "h2" if id.is_some_and(|id| !id.is_empty()) => self.push(
                ElementKind::CommandHeading {
                    id: id.unwrap_or_default().to_string(),
                    label: element_text(element),
                },
                scope,
            ),
            "h2" | "h3" | "h4" => {
                let kind = id
                    .and_then(parameter_section)
                    .map(|(owner, kind)| ElementKind::ParameterSection { owner, kind })
                    .unwrap_or_else(|| ElementKind::SectionHeading {
                        label: element_text(element),
                    });
                self.push(kind, scope);
            }
            "tr" => {
                if let Some(row) = listing_row(element) {
                    self.push(row, scope);
                }
            }
            "p" => {
                let text = element_text(element);
                if !text.is_empty() {
                    self.push(ElementKind::Paragraph { text }, scope);
                }
            }
            "details" => {
                let index = self.collapsibles;
                self.collapsibles += 1;
                let global = element
                    .text()
                    .collect::<String>()
                    .to_lowercase()
                    .contains("global");
                self.visit_children(element, Scope::Collapsible { index, global });
            }
            "script" | "style" | "head" => {}
            _ => self.visit_children(element, scope),
        }
    }

    fn visit_children(&mut self, element: ElementRef<'_>, scope: Scope) {
        for child in element.children() {
            if let Some(child) = ElementRef::wrap(child) {
                self.visit(child, scope);
            }
        }
    }
}

fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Visible text of an element with whitespace collapsed and trimmed.
fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
        .trim()
        .to_string()
}

fn parameter_section(id: &str) -> Option<(String, SectionKind)> {
    if let Some(owner) = id.strip_suffix(REQUIRED_SUFFIX) {
        return Some((owner.to_string(), SectionKind::Required));
    }
    id.strip_suffix(OPTIONAL_SUFFIX)
        .map(|owner| (owner.to_string(), SectionKind::Optional))
}

fn listing_row(row: ElementRef<'_>) -> Option<ElementKind> {
    let anchor = row
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "a" && el.value().attr("href").is_some())?;
    let href = anchor.value().attr("href")?.to_string();
    let description = row
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "td")
        .nth(1)
        .map(element_text)
        .unwrap_or_default();

    Some(ElementKind::ListingRow {
        label: element_text(anchor),
        description,
        href,
    })
}
