//! Folding group pages into one base command subtree.
//!
//! A [`TreeAssembler`] is owned by the single task building a base command,
//! so it needs no locking. Pages must be added in discovery order; for a path
//! claimed by several pages the first non-empty summary sticks and leaves are
//! merged by name.

use command_tree_core::{CommandNode, CommandOption, insert_or_merge};
use tracing::{debug, warn};

use crate::page::detail::GroupPage;

#[derive(Debug, Clone)]
pub struct TreeAssembler {
    root: CommandNode,
    pages: usize,
}

impl TreeAssembler {
    /// Starts from the base command node as listed on the reference index.
    pub fn new(base: CommandNode) -> Self {
        Self { root: base, pages: 0 }
    }

    pub fn root(&self) -> &CommandNode {
        &self.root
    }

    /// Number of group pages added so far.
    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Merges one group page at its name path.
    ///
    /// The first path segment names the base command itself and is skipped.
    /// A path starting elsewhere is walked in full from the subtree root.
    pub fn add_group_page(&mut self, page: GroupPage) {
        self.pages += 1;
        let GroupPage {
            url,
            path,
            summary,
            leaves,
        } = page;

        let segments = match path.split_first() {
            Some((first, rest)) if *first == self.root.name => rest,
            Some(_) => {
                warn!(base = %self.root.name, url = %url, path = ?path, "Group path does not start at base command");
                &path[..]
            }
            None => {
                warn!(base = %self.root.name, url = %url, "Group page has no title");
                &path[..]
            }
        };

        debug!(base = %self.root.name, path = ?segments, leaves = leaves.len(), "Merging group page");
        let node = self.root.descend_or_insert(segments);
        if let Some(summary) = summary.filter(|s| !s.is_empty()) {
            if node.description.as_deref().is_none_or(str::is_empty) {
                node.description = Some(summary);
            }
        }

        for leaf in leaves {
            insert_or_merge(&mut node.subcommands, leaf);
        }
    }

    /// Removes re-declared persistent options and returns the subtree.
    pub fn finish(mut self, persistent: &[CommandOption]) -> CommandNode {
        let removed = command_tree_core::strip_persistent(&mut self.root, persistent);
        if removed > 0 {
            debug!(base = %self.root.name, removed, "Stripped re-declared global options");
        }
        self.root
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;

    fn group(path: &[&str], summary: Option<&str>, leaves: &[&str]) -> GroupPage {
        GroupPage {
            url: Url::parse("https://docs.example.com/cli/az/webapp/auth").unwrap(),
            path: path.iter().map(|s| s.to_string()).collect(),
            summary: summary.map(str::to_string),
            leaves: leaves.iter().map(|name| CommandNode::new(*name)).collect(),
        }
    }

    #[test]
    fn test_nested_path_lands_under_base() {
        let mut assembler = TreeAssembler::new(CommandNode::new("webapp"));
        assembler.add_group_page(group(&["webapp", "auth"], Some("Manage auth"), &["apple"]));

        let tree = assembler.finish(&[]);
        let auth = tree.find_path(&["auth"]).unwrap();
        assert_eq!(auth.description.as_deref(), Some("Manage auth"));
        assert_eq!(auth.subcommand_names(), vec!["apple"]);
    }

    #[test]
    fn test_sibling_groups_merge_in_either_order() {
        let auth = group(&["webapp", "auth"], None, &["apple"]);
        let config = group(&["webapp", "config"], None, &["show"]);
        let root = group(&["webapp"], Some("Manage web apps"), &["create"]);

        for pages in [
            vec![root.clone(), auth.clone(), config.clone()],
            vec![auth.clone(), config.clone(), root.clone()],
        ] {
            let mut assembler = TreeAssembler::new(CommandNode::new("webapp"));
            for page in pages {
                assembler.add_group_page(page);
            }
            let tree = assembler.finish(&[]);
            assert!(tree.find_path(&["auth", "apple"]).is_some());
            assert!(tree.find_path(&["config", "show"]).is_some());
            assert!(tree.find_path(&["create"]).is_some());
            assert_eq!(tree.description.as_deref(), Some("Manage web apps"));
        }
    }

    #[test]
    fn test_repeated_path_keeps_first_summary_and_merges_leaves() {
        let mut assembler = TreeAssembler::new(CommandNode::new("webapp"));
        assembler.add_group_page(group(&["webapp", "auth"], Some(""), &["show"]));
        assembler.add_group_page(group(&["webapp", "auth"], Some("First"), &["show", "update"]));
        assembler.add_group_page(group(&["webapp", "auth"], Some("Second"), &["apple"]));

        let tree = assembler.finish(&[]);
        let auth = tree.find_path(&["auth"]).unwrap();
        assert_eq!(auth.description.as_deref(), Some("First"));
        assert_eq!(auth.subcommand_names(), vec!["show", "update", "apple"]);
    }

    #[test]
    fn test_listing_description_is_not_overwritten() {
        let base = CommandNode::new("vm").with_description("Manage Linux or Windows virtual machines");
        let mut assembler = TreeAssembler::new(base);
        assembler.add_group_page(group(&["vm"], Some("Manage VMs"), &["create"]));
        let tree = assembler.finish(&[]);
        assert_eq!(
            tree.description.as_deref(),
            Some("Manage Linux or Windows virtual machines")
        );
    }

    #[test]
    fn test_foreign_path_is_walked_in_full() {
        let mut assembler = TreeAssembler::new(CommandNode::new("ml"));
        assembler.add_group_page(group(&["machinelearning", "job"], None, &["list"]));
        let tree = assembler.finish(&[]);
        assert!(tree.find_path(&["machinelearning", "job", "list"]).is_some());
    }

    #[test]
    fn test_finish_strips_global_options() {
        let global = CommandOption::new(["--output", "-o"]);
        let mut leaf = CommandNode::new("show");
        leaf.options.push(CommandOption::new(["-o"]));
        leaf.options.push(CommandOption::new(["--ids"]));

        let mut page = group(&["webapp", "auth"], None, &[]);
        page.leaves.push(leaf);

        let mut assembler = TreeAssembler::new(CommandNode::new("webapp"));
        assembler.add_group_page(page);
        assert_eq!(assembler.page_count(), 1);

        let tree = assembler.finish(&[global]);
        let show = tree.find_path(&["auth", "show"]).unwrap();
        assert_eq!(show.options.len(), 1);
        assert!(show.find_option("--ids").is_some());
    }
}
