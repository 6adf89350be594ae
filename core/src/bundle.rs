use serde::{Deserialize, Serialize};

use crate::CommandNode;

/// Everything one crawl run produces: the root completion object plus one
/// tree per base command.
///
/// The root lists each base command as a stub (name, description, load
/// reference) and carries the global options; the full subtrees live in
/// `commands`, in the same order.
///
/// # Examples
///
/// ```
/// use command_tree_core::*;
///
/// let mut root = CommandNode::new("az");
/// root.subcommands.push(CommandNode::new("group").to_stub("az/2.53.0/group"));
///
/// let mut bundle = CompletionBundle::new("2.53.0", "2026-01-15T10:30:00Z", root);
/// bundle.commands.push(CommandNode::new("group").with_description("Manage groups"));
///
/// assert_eq!(bundle.command_count(), 1);
/// assert!(bundle.find_command("group").is_some());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionBundle {
    /// Contract version (populated from
    /// [`TREE_CONTRACT_VERSION`](crate::TREE_CONTRACT_VERSION)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_version: Option<String>,
    /// Version of the documented tool this tree was built for.
    pub version: String,
    /// ISO-8601 timestamp of the run.
    pub generated_at: String,
    /// Root completion object.
    pub root: CommandNode,
    /// Base command trees, one per root stub.
    pub commands: Vec<CommandNode>,
}

impl CompletionBundle {
    /// Creates a bundle with no base command trees yet.
    pub fn new(
        version: impl Into<String>,
        generated_at: impl Into<String>,
        root: CommandNode,
    ) -> Self {
        Self {
            contract_version: Some(crate::TREE_CONTRACT_VERSION.to_string()),
            version: version.into(),
            generated_at: generated_at.into(),
            root,
            commands: Vec::new(),
        }
    }

    /// Returns the number of base command trees.
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Finds a base command tree by name.
    pub fn find_command(&self, name: &str) -> Option<&CommandNode> {
        self.commands.iter().find(|c| c.name == name)
    }
}
