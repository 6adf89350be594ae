//! The crawl pipeline.
//!
//! ```text
//! reference index ─┬─ listing rows ──► base commands (deduplicated)
//!                  └─ global params ─► root options (persistent)
//!
//! per base command, one at a time (subtree pool):
//!   landing page ─► group page links ─► group pages (fetch pool)
//!                                     ─► TreeAssembler, in link order
//! ```
//!
//! Any failure aborts the whole crawl; no partial bundle is returned.

use chrono::Utc;
use command_tree_core::{
    CommandNode, CommandOption, CompletionBundle, dedupe_by_key, merge_node,
};
use futures::future::try_join_all;
use tracing::{debug, info};
use url::Url;

use crate::assemble::TreeAssembler;
use crate::config::CrawlConfig;
use crate::error::{CrawlError, Result};
use crate::fetch::{PageSource, fetch_success};
use crate::groups::discover_group_pages;
use crate::page::Page;
use crate::page::detail::{
    DetailCommand, GroupPage, INDEX_PAGE_PREFIX_TOKENS, extract_commands, extract_group_page,
};
use crate::page::globals::extract_global_options;
use crate::page::listing::{ListingEntry, extract_listing};
use crate::schedule::Scheduler;
use crate::version::resolve_version;

/// `<tool>/<version>/<base>`: where a root stub's full subtree is stored.
pub fn load_spec_ref(tool: &str, version: &str, base: &str) -> String {
    format!("{tool}/{version}/{base}")
}

/// Crawls one documentation site through a [`PageSource`].
pub struct Crawler<S> {
    source: S,
    config: CrawlConfig,
    scheduler: Scheduler,
}

/// The reference index reduced to what the per-base crawl needs.
struct RootIndex {
    page: Page,
    entries: Vec<ListingEntry>,
    globals: Vec<CommandOption>,
    inline: Vec<DetailCommand>,
}

impl<S: PageSource> Crawler<S> {
    pub fn new(source: S, config: CrawlConfig) -> Self {
        let scheduler = Scheduler::new(config.fetch_concurrency, config.subtree_concurrency);
        Self {
            source,
            config,
            scheduler,
        }
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Resolves the current tool version from the release page.
    pub async fn resolve_version(&self) -> Result<String> {
        let release_url = self.config.release_url()?;
        resolve_version(&self.source, &release_url).await
    }

    /// Crawls every base command of the reference index for `version`.
    pub async fn crawl(&self, version: &str) -> Result<CompletionBundle> {
        let tool = self.config.tool.as_str();
        let index = self.fetch_index().await?;
        let total = index.entries.len();
        info!(tool, version, base_commands = total, globals = index.globals.len(), "Crawling reference index");

        let builds = index
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| self.scheduler.subtree(self.build_base(position, total, entry, &index)));
        let commands = try_join_all(builds).await?;

        let mut root = CommandNode::new(tool);
        root.options = index.globals;
        root.subcommands = commands
            .iter()
            .map(|base| base.to_stub(load_spec_ref(tool, version, &base.name)))
            .collect();

        let mut bundle = CompletionBundle::new(version, Utc::now().to_rfc3339(), root);
        bundle.commands = commands;
        info!(tool, version, base_commands = bundle.command_count(), "Crawl complete");
        Ok(bundle)
    }

    async fn fetch_index(&self) -> Result<RootIndex> {
        let root_url = self.config.root_url()?;
        let fetched = self.scheduler.fetch(fetch_success(&self.source, &root_url)).await?;
        let page = Page::parse(&root_url, &fetched.body);

        let listed = extract_listing(&page);
        let listed_count = listed.len();
        let entries = dedupe_by_key(listed, |entry| entry.name.as_str(), self.config.duplicate_policy);
        if entries.len() < listed_count {
            debug!(
                dropped = listed_count - entries.len(),
                policy = ?self.config.duplicate_policy,
                "Dropped duplicate base commands"
            );
        }

        let globals = extract_global_options(&page);
        let inline = extract_commands(&page, &self.config.tool, INDEX_PAGE_PREFIX_TOKENS);
        Ok(RootIndex {
            page,
            entries,
            globals,
            inline,
        })
    }

    async fn build_base(
        &self,
        position: usize,
        total: usize,
        entry: &ListingEntry,
        index: &RootIndex,
    ) -> Result<CommandNode> {
        let mut base = CommandNode::new(entry.name.as_str());
        if !entry.description.is_empty() {
            base.description = Some(entry.description.clone());
        }

        let assembler = match &entry.link {
            Some(link) => self.assemble_groups(base, link).await?,
            None => {
                let inline = index
                    .inline
                    .iter()
                    .find(|command| command.name == entry.name)
                    .ok_or_else(|| CrawlError::MissingBaseCommand {
                        name: entry.name.clone(),
                        url: index.page.url.to_string(),
                    })?;
                merge_node(&mut base, inline.clone().into_node());
                TreeAssembler::new(base)
            }
        };

        let tree = assembler.finish(&index.globals);
        info!(
            base = %tree.name,
            index = position + 1,
            total,
            nodes = tree.node_count(),
            "Built base command"
        );
        Ok(tree)
    }

    async fn assemble_groups(&self, base: CommandNode, landing_url: &Url) -> Result<TreeAssembler> {
        let listing = discover_group_pages(&self.source, &self.scheduler, landing_url).await?;
        let pages = try_join_all(
            listing
                .links
                .iter()
                .map(|link| self.group_page(link, &listing.landing)),
        )
        .await?;

        let mut assembler = TreeAssembler::new(base);
        for page in pages {
            assembler.add_group_page(page);
        }
        Ok(assembler)
    }

    async fn group_page(&self, url: &Url, landing: &Page) -> Result<GroupPage> {
        if *url == landing.url {
            return Ok(extract_group_page(landing, &self.config.tool));
        }
        let fetched = self.scheduler.fetch(fetch_success(&self.source, url)).await?;
        let page = Page::parse(url, &fetched.body);
        Ok(extract_group_page(&page, &self.config.tool))
    }
}
