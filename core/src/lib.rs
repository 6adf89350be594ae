//! Core command tree types shared by the crawler and the artifact store.
//!
//! This crate defines the data model for a documented tool's command
//! hierarchy:
//!
//! - [`CommandNode`]: root, base command, subcommand group or leaf command.
//! - [`CommandOption`]: an option with its aliases, value and scope flags.
//! - [`Argument`] / [`Args`]: positional arguments and option values; a
//!   single argument collapses to a bare value.
//! - [`CompletionBundle`]: everything produced by one crawl run.
//!
//! Merging ([`insert_or_merge`], [`merge_node`], [`dedupe_by_name`]) keeps
//! sibling names unique, and validation ([`validate_tree`],
//! [`validate_bundle`]) checks the tree invariants before output.
//!
//! # Example
//!
//! ```
//! use command_tree_core::*;
//!
//! let mut root = CommandNode::new("az");
//! let mut debug = CommandOption::new(["--debug"]);
//! debug.is_persistent = true;
//! root.options.push(debug);
//!
//! let mut group = CommandNode::new("group").with_description("Manage resource groups");
//! group.subcommands.push(
//!     CommandNode::new("create").with_option(
//!         CommandOption::new(["--name", "-n"]).with_argument(Argument::new("name")),
//!     ),
//! );
//! insert_or_merge(&mut root.subcommands, group);
//!
//! assert!(root.find_path(&["group", "create"]).is_some());
//! assert!(validate_tree(&root, &[]).is_empty());
//! ```

mod bundle;
mod merge;
mod types;
mod validate;

pub use bundle::CompletionBundle;
pub use merge::{DuplicatePolicy, dedupe_by_key, dedupe_by_name, insert_or_merge, merge_node, strip_persistent};
pub use types::*;
pub use validate::{ValidationError, validate_bundle, validate_tree};
