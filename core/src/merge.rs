//! Name-keyed merging of command nodes.
//!
//! Siblings in a command tree are unique by name. When a node arrives whose
//! name is already taken, [`merge_node`] folds it into the existing sibling
//! instead of replacing it. [`dedupe_by_name`] applies a [`DuplicatePolicy`]
//! to a flat list where exactly one occurrence of each name must survive.
//!
//! # Example
//!
//! ```
//! use command_tree_core::*;
//!
//! let mut group = CommandNode::new("auth");
//! insert_or_merge(&mut group.subcommands, CommandNode::new("show"));
//! insert_or_merge(
//!     &mut group.subcommands,
//!     CommandNode::new("show").with_description("Show settings"),
//! );
//!
//! assert_eq!(group.subcommands.len(), 1);
//! assert_eq!(group.subcommands[0].description.as_deref(), Some("Show settings"));
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{CommandNode, CommandOption, types::canonical_alias};

/// Which occurrence survives when a list holds several nodes of one name.
///
/// # Examples
///
/// ```
/// use command_tree_core::*;
///
/// let nodes = vec![
///     CommandNode::new("ml").with_description("v1"),
///     CommandNode::new("ml").with_description("v2"),
/// ];
///
/// let first = dedupe_by_name(nodes.clone(), DuplicatePolicy::KeepFirst);
/// assert_eq!(first[0].description.as_deref(), Some("v1"));
///
/// let last = dedupe_by_name(nodes, DuplicatePolicy::KeepLast);
/// assert_eq!(last[0].description.as_deref(), Some("v2"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum DuplicatePolicy {
    /// Keep the first occurrence (the default).
    #[default]
    KeepFirst,
    /// Keep the last occurrence.
    KeepLast,
}

/// Keeps one node per name according to `policy`.
///
/// Survivors stay at the position of the first occurrence of their name, so
/// the output order does not depend on the policy.
pub fn dedupe_by_name(nodes: Vec<CommandNode>, policy: DuplicatePolicy) -> Vec<CommandNode> {
    dedupe_by_key(nodes, |node| node.name.as_str(), policy)
}

/// Keeps one item per key according to `policy`, like [`dedupe_by_name`]
/// for any item type.
pub fn dedupe_by_key<T, F>(items: Vec<T>, key: F, policy: DuplicatePolicy) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<T> = Vec::with_capacity(items.len());

    for item in items {
        match slots.get(key(&item)) {
            Some(&index) => {
                if policy == DuplicatePolicy::KeepLast {
                    out[index] = item;
                }
            }
            None => {
                slots.insert(key(&item).to_string(), out.len());
                out.push(item);
            }
        }
    }

    out
}

/// Inserts `node` into `siblings`, merging it into an existing sibling of the
/// same name.
pub fn insert_or_merge(siblings: &mut Vec<CommandNode>, node: CommandNode) {
    match siblings.iter_mut().find(|sub| sub.name == node.name) {
        Some(existing) => merge_node(existing, node),
        None => siblings.push(node),
    }
}

/// Folds `incoming` into `existing`.
///
/// The existing node wins wherever both define a value: a missing or empty
/// description is filled, options are unioned by canonical alias, positional
/// arguments are taken only when absent, and children merge recursively.
pub fn merge_node(existing: &mut CommandNode, incoming: CommandNode) {
    let CommandNode {
        description,
        options,
        args,
        subcommands,
        load_spec_ref,
        ..
    } = incoming;

    if existing.description.as_deref().is_none_or(str::is_empty) {
        if let Some(desc) = description.filter(|d| !d.is_empty()) {
            existing.description = Some(desc);
        }
    }

    merge_options(&mut existing.options, options);

    if existing.args.is_none() {
        existing.args = args;
    }
    if existing.load_spec_ref.is_none() {
        existing.load_spec_ref = load_spec_ref;
    }

    for sub in subcommands {
        insert_or_merge(&mut existing.subcommands, sub);
    }
}

fn merge_options(existing: &mut Vec<CommandOption>, incoming: Vec<CommandOption>) {
    for option in incoming {
        let key = canonical_alias(&option.names);
        let taken = existing
            .iter()
            .any(|current| canonical_alias(&current.names) == key);
        if !taken {
            existing.push(option);
        }
    }
}

/// Removes from `node` and all of its descendants the options that share an
/// alias with one of `persistent`.
///
/// Persistent options live on the tool root and are implied everywhere below
/// it, so a base command subtree must not declare them again. Returns the
/// number of options removed.
pub fn strip_persistent(node: &mut CommandNode, persistent: &[CommandOption]) -> usize {
    let before = node.options.len();
    node.options
        .retain(|opt| !persistent.iter().any(|global| global.overlaps(opt)));
    let mut removed = before - node.options.len();
    for sub in &mut node.subcommands {
        removed += strip_persistent(sub, persistent);
    }
    removed
}

#[cfg(test)]
mod tests {
    use crate::{Args, Argument};

    use super::*;

    #[test]
    fn test_dedupe_keep_first_keeps_position_and_value() {
        let nodes = vec![
            CommandNode::new("ml").with_description("v1"),
            CommandNode::new("vm"),
            CommandNode::new("ml").with_description("v2"),
        ];

        let out = dedupe_by_name(nodes, DuplicatePolicy::KeepFirst);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "ml");
        assert_eq!(out[0].description.as_deref(), Some("v1"));
        assert_eq!(out[1].name, "vm");
    }

    #[test]
    fn test_dedupe_keep_last_replaces_in_place() {
        let nodes = vec![
            CommandNode::new("ml").with_description("v1"),
            CommandNode::new("vm"),
            CommandNode::new("ml").with_description("v2"),
        ];

        let out = dedupe_by_name(nodes, DuplicatePolicy::KeepLast);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].description.as_deref(), Some("v2"));
    }

    #[test]
    fn test_dedupe_by_key_on_plain_tuples() {
        let rows = vec![("ml", 1), ("vm", 2), ("ml", 3)];
        let kept = dedupe_by_key(rows, |row| row.0, DuplicatePolicy::KeepLast);
        assert_eq!(kept, vec![("ml", 3), ("vm", 2)]);
    }

    #[test]
    fn test_merge_node_keeps_existing_values() {
        let mut existing = CommandNode::new("create")
            .with_description("Create it")
            .with_option(CommandOption::new(["--name", "-n"]).with_description("old"));
        let incoming = CommandNode {
            name: "create".into(),
            description: Some("Other".into()),
            options: vec![
                CommandOption::new(["-n", "--name"]).with_description("new"),
                CommandOption::new(["--tags"]),
            ],
            args: Args::collapse(vec![Argument::new("x")]),
            ..Default::default()
        };

        merge_node(&mut existing, incoming);
        assert_eq!(existing.description.as_deref(), Some("Create it"));
        assert_eq!(existing.options.len(), 2);
        assert_eq!(existing.options[0].description, "old");
        assert!(existing.args.is_some());
    }

    #[test]
    fn test_merge_node_fills_empty_description() {
        let mut existing = CommandNode::new("auth").with_description("");
        merge_node(&mut existing, CommandNode::new("auth").with_description("Auth"));
        assert_eq!(existing.description.as_deref(), Some("Auth"));
    }

    #[test]
    fn test_insert_or_merge_merges_children_recursively() {
        let mut siblings = vec![CommandNode {
            name: "auth".into(),
            subcommands: vec![CommandNode::new("apple")],
            ..Default::default()
        }];
        insert_or_merge(
            &mut siblings,
            CommandNode {
                name: "auth".into(),
                subcommands: vec![CommandNode::new("apple"), CommandNode::new("google")],
                ..Default::default()
            },
        );

        assert_eq!(siblings.len(), 1);
        assert_eq!(siblings[0].subcommand_names(), vec!["apple", "google"]);
    }

    #[test]
    fn test_strip_persistent_removes_redeclared_globals() {
        let globals = vec![CommandOption::new(["--debug"]), CommandOption::new(["--output", "-o"])];
        let mut root = CommandNode::new("vm");
        root.options.push(CommandOption::new(["--debug"]));
        root.subcommands.push(
            CommandNode::new("create")
                .with_option(CommandOption::new(["-o"]))
                .with_option(CommandOption::new(["--size"])),
        );

        let removed = strip_persistent(&mut root, &globals);
        assert_eq!(removed, 2);
        assert!(root.options.is_empty());
        assert_eq!(root.subcommands[0].options.len(), 1);
        assert!(root.subcommands[0].find_option("--size").is_some());
    }
}
