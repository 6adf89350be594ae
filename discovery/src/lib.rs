//! Rebuilds a command-line tool's command tree from its documentation site.
//!
//! The crawl starts at the tool's reference index, which lists every base
//! command and the global parameters. Each base command's landing page links
//! to its group pages; those hold the command headings and their parameter
//! blocks. The result is one [`CompletionBundle`](command_tree_core::CompletionBundle)
//! per tool version.
//!
//! # Main entry points
//!
//! - [`Crawler`]: resolves the tool version and crawls the whole site
//!   through a [`PageSource`].
//! - [`HttpPageSource`]: the `reqwest`-backed [`PageSource`].
//! - [`page`]: offline extraction from a single saved page.
//!
//! # Example
//!
//! ```
//! use command_tree_discovery::page::{Page, detail::extract_group_page};
//! use url::Url;
//!
//! let url = Url::parse("https://docs.example.com/cli/az/webapp/auth").unwrap();
//! let html = r#"
//!   <h1>az webapp auth</h1>
//!   <p>Manage webapp authentication.</p>
//!   <h2 id="az-webapp-auth-show">az webapp auth show</h2>
//!   <p>Show the authentication settings.</p>
//!   <h3 id="az-webapp-auth-show-optional-parameters">Optional Parameters</h3>
//!   <div class="parameterName">--slot -s</div>
//!   <div class="parameterInfo">The name of the slot.</div>
//! "#;
//!
//! let group = extract_group_page(&Page::parse(&url, html), "az");
//! assert_eq!(group.path, vec!["webapp", "auth"]);
//! assert_eq!(group.leaves[0].name, "show");
//! assert!(group.leaves[0].find_option("-s").is_some());
//! ```

pub mod assemble;
pub mod classify;
pub mod config;
pub mod crawl;
pub mod error;
pub mod fetch;
pub mod groups;
pub mod page;
pub mod schedule;
pub mod text;
pub mod version;

pub use assemble::TreeAssembler;
pub use config::{CrawlConfig, HttpConfig};
pub use crawl::{Crawler, load_spec_ref};
pub use error::{CrawlError, Result};
pub use fetch::{FetchedPage, HttpPageSource, PageSource};
pub use schedule::Scheduler;
