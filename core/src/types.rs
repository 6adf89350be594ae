//! Command tree type definitions.
//!
//! This module defines the data model for a reconstructed command hierarchy:
//! a tree of [`CommandNode`]s carrying [`CommandOption`]s and positional
//! [`Argument`]s. The types serialize with camelCase keys and skip empty
//! collections, absent values and `false` flags, which is the shape the
//! completion engine consumes.

use serde::{Deserialize, Serialize};

/// Version of the completion-object contract (semver).
///
/// Embedded in every [`CompletionBundle`](crate::CompletionBundle) to track
/// compatibility across releases of this crate.
pub const TREE_CONTRACT_VERSION: &str = "1.0.0";

/// A positional argument, or the value taken by a valued option.
///
/// # Examples
///
/// ```
/// use command_tree_core::Argument;
///
/// let arg = Argument::new("output").with_suggestions(["json", "table", "json"]);
/// assert_eq!(arg.suggestions, vec!["json", "table"]);
/// assert!(!arg.is_optional);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argument {
    /// Display name (e.g. `resource-group`, `CLI_TERM`).
    pub name: String,
    /// Cleaned description text, possibly empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Whether the argument may be omitted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_optional: bool,
    /// Literal values from an "accepted values" annotation, in declaration
    /// order without duplicates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl Argument {
    /// Creates a required argument with no description or suggestions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Marks the argument as optional.
    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    /// Adds suggestion literals, dropping repeats while keeping first-seen
    /// order.
    pub fn with_suggestions<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            let value = value.into();
            if !self.suggestions.contains(&value) {
                self.suggestions.push(value);
            }
        }
        self
    }
}

/// Positional arguments of a command.
///
/// A single argument serializes as a bare object and several as an array.
/// There is deliberately no "empty" variant: use [`Args::collapse`] to turn a
/// list into `Option<Args>`.
///
/// # Examples
///
/// ```
/// use command_tree_core::{Args, Argument};
///
/// assert_eq!(Args::collapse(Vec::new()), None);
///
/// let one = Args::collapse(vec![Argument::new("name")]).unwrap();
/// assert!(matches!(one, Args::One(_)));
///
/// let many = Args::collapse(vec![Argument::new("a"), Argument::new("b")]).unwrap();
/// assert_eq!(many.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Args {
    One(Argument),
    Many(Vec<Argument>),
}

impl Args {
    /// Collapses a list: empty → `None`, one element → [`Args::One`],
    /// otherwise [`Args::Many`] in the original order.
    pub fn collapse(mut args: Vec<Argument>) -> Option<Self> {
        match args.len() {
            0 => None,
            1 => args.pop().map(Args::One),
            _ => Some(Args::Many(args)),
        }
    }

    /// Returns the arguments as a slice regardless of representation.
    pub fn as_slice(&self) -> &[Argument] {
        match self {
            Args::One(arg) => std::slice::from_ref(arg),
            Args::Many(args) => args,
        }
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// `true` only for a hand-built empty [`Args::Many`], which
    /// [`validate_tree`](crate::validate_tree) rejects.
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Consumes `self` into a plain list.
    pub fn into_vec(self) -> Vec<Argument> {
        match self {
            Args::One(arg) => vec![arg],
            Args::Many(args) => args,
        }
    }
}

/// An option (`--name`, `-n`) accepted by a command.
///
/// `names` keeps the aliases in the order the documentation declared them.
/// The label used for the option's value is derived on demand by
/// [`canonical_arg_name`](CommandOption::canonical_arg_name) and never
/// reorders that list.
///
/// # Examples
///
/// ```
/// use command_tree_core::CommandOption;
///
/// let opt = CommandOption::new(["-g", "--resource-group"]);
/// assert_eq!(opt.canonical_arg_name(), "resource-group");
/// assert_eq!(opt.names, vec!["-g", "--resource-group"]);
/// assert!(opt.matches("-g"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOption {
    /// Alias strings in declaration order; never empty.
    pub names: Vec<String>,
    /// Cleaned description text, possibly empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Value taken by the option, absent for boolean switches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument: Option<Argument>,
    /// Inherited by every descendant command.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_persistent: bool,
    /// Listed under the command's required parameters.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_required: bool,
}

impl CommandOption {
    /// Creates a boolean switch with the given aliases.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            description: String::new(),
            argument: None,
            is_persistent: false,
            is_required: false,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attaches a value argument.
    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.argument = Some(argument);
        self
    }

    /// The longest alias with leading dashes removed.
    ///
    /// Among aliases of equal length the first declared one wins.
    pub fn canonical_arg_name(&self) -> &str {
        canonical_alias(&self.names).trim_start_matches('-')
    }

    /// Checks whether `alias` is one of this option's names.
    pub fn matches(&self, alias: &str) -> bool {
        self.names.iter().any(|name| name == alias)
    }

    /// Checks whether two options share at least one alias.
    pub fn overlaps(&self, other: &CommandOption) -> bool {
        self.names.iter().any(|name| other.matches(name))
    }
}

/// Returns the longest alias, first one winning ties, or `""` for an empty
/// slice.
pub(crate) fn canonical_alias(names: &[String]) -> &str {
    let mut best: Option<&str> = None;
    for name in names {
        if best.is_none_or(|current| name.len() > current.len()) {
            best = Some(name);
        }
    }
    best.unwrap_or_default()
}

/// One node of the command tree: the tool root, a base command, a subcommand
/// group or a leaf command.
///
/// # Examples
///
/// ```
/// use command_tree_core::{CommandNode, CommandOption};
///
/// let mut root = CommandNode::new("az");
/// root.child_or_insert("group").description = Some("Manage resource groups".into());
/// root.child_or_insert("group")
///     .subcommands
///     .push(CommandNode::new("create").with_option(CommandOption::new(["--name", "-n"])));
///
/// assert_eq!(root.subcommands.len(), 1);
/// let create = root.find_path(&["group", "create"]).unwrap();
/// assert_eq!(create.options.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandNode {
    /// Name, unique among siblings.
    pub name: String,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Options declared directly on this command.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
    /// Positional arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Args>,
    /// Nested groups and commands.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<CommandNode>,
    /// Reference to a subtree stored separately; only set on the root's
    /// direct children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_spec_ref: Option<String>,
}

impl CommandNode {
    /// Creates a node with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an option.
    pub fn with_option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    /// Finds a direct child by name.
    pub fn find_subcommand(&self, name: &str) -> Option<&CommandNode> {
        self.subcommands.iter().find(|sub| sub.name == name)
    }

    /// Returns the direct child called `name`, creating a name-only child at
    /// the end of the list when none exists.
    pub fn child_or_insert(&mut self, name: &str) -> &mut CommandNode {
        match self.subcommands.iter().position(|sub| sub.name == name) {
            Some(index) => &mut self.subcommands[index],
            None => {
                self.subcommands.push(CommandNode::new(name));
                let last = self.subcommands.len() - 1;
                &mut self.subcommands[last]
            }
        }
    }

    /// Walks `path` from this node, creating missing nodes along the way, and
    /// returns the innermost one. An empty path returns `self`.
    pub fn descend_or_insert<S: AsRef<str>>(&mut self, path: &[S]) -> &mut CommandNode {
        let mut node = self;
        for segment in path {
            node = node.child_or_insert(segment.as_ref());
        }
        node
    }

    /// Follows `path` through existing children.
    pub fn find_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&CommandNode> {
        let mut node = self;
        for segment in path {
            node = node.find_subcommand(segment.as_ref())?;
        }
        Some(node)
    }

    /// Finds an option on this node by any of its aliases.
    pub fn find_option(&self, alias: &str) -> Option<&CommandOption> {
        self.options.iter().find(|opt| opt.matches(alias))
    }

    /// Gets all direct child names.
    pub fn subcommand_names(&self) -> Vec<&str> {
        self.subcommands.iter().map(|s| s.name.as_str()).collect()
    }

    /// Counts this node and all of its descendants.
    pub fn node_count(&self) -> usize {
        1 + self
            .subcommands
            .iter()
            .map(CommandNode::node_count)
            .sum::<usize>()
    }

    /// Copy of this node reduced to name, description and load reference, as
    /// listed in the root completion object.
    pub fn to_stub(&self, load_spec_ref: impl Into<String>) -> CommandNode {
        CommandNode {
            name: self.name.clone(),
            description: self.description.clone(),
            load_spec_ref: Some(load_spec_ref.into()),
            ..Default::default()
        }
    }
}
