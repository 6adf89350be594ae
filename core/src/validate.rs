//! Command tree and bundle validation.
//!
//! Validates the structural invariants of a command tree, catching empty
//! names, duplicate siblings, alias-less options, empty argument lists and
//! re-declared persistent options before an artifact is written.
//!
//! # Examples
//!
//! ```
//! use command_tree_core::*;
//!
//! let mut root = CommandNode::new("az");
//! root.subcommands.push(CommandNode::new("group"));
//! assert!(validate_tree(&root, &[]).is_empty());
//!
//! // Invalid: two siblings share a name
//! root.subcommands.push(CommandNode::new("group"));
//! assert!(!validate_tree(&root, &[]).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{Args, CommandNode, CommandOption, CompletionBundle};

/// Tree/bundle validation errors.
///
/// Each variant carries the space-separated command path where the problem
/// was found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Bundle version string is empty.
    #[error("bundle version cannot be empty")]
    EmptyVersion,
    /// A command name is empty or whitespace-only.
    #[error("empty command name under: {0}")]
    EmptyCommandName(String),
    /// Two siblings share a name.
    #[error("duplicate subcommand: {0}")]
    DuplicateSubcommand(String),
    /// An option has no aliases.
    #[error("option without names at: {0}")]
    MissingOptionName(String),
    /// Two options on one command share an alias.
    #[error("duplicate option {alias} at: {path}")]
    DuplicateOption { path: String, alias: String },
    /// A positional argument list is present but empty.
    #[error("empty argument list at: {0}")]
    EmptyArgs(String),
    /// A descendant declares an option that is already persistent.
    #[error("persistent option {alias} re-declared at: {path}")]
    RedeclaredPersistent { path: String, alias: String },
}

/// Validates a full completion bundle.
///
/// Checks the version string, the root's own options, and every base command
/// tree against the root's persistent options.
///
/// # Examples
///
/// ```
/// use command_tree_core::*;
///
/// let bundle = CompletionBundle::new("2.53.0", "2026-01-01T00:00:00Z", CommandNode::new("az"));
/// assert!(validate_bundle(&bundle).is_empty());
/// ```
pub fn validate_bundle(bundle: &CompletionBundle) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if bundle.version.trim().is_empty() {
        errors.push(ValidationError::EmptyVersion);
        return errors;
    }

    let persistent: Vec<CommandOption> = bundle
        .root
        .options
        .iter()
        .filter(|opt| opt.is_persistent)
        .cloned()
        .collect();

    errors.extend(validate_tree(&bundle.root, &[]));
    let mut seen: HashSet<&str> = HashSet::new();
    for command in &bundle.commands {
        if !seen.insert(command.name.as_str()) {
            errors.push(ValidationError::DuplicateSubcommand(command.name.clone()));
        }
        errors.extend(validate_tree(command, &persistent));
    }

    errors
}

/// Validates one command tree.
///
/// `persistent` lists options inherited from above `node`; none of them may
/// appear on `node` or its descendants.
pub fn validate_tree(node: &CommandNode, persistent: &[CommandOption]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut path = Vec::new();
    validate_node(node, persistent, &mut path, &mut errors);
    errors
}

fn validate_node<'a>(
    node: &'a CommandNode,
    persistent: &[CommandOption],
    path: &mut Vec<&'a str>,
    errors: &mut Vec<ValidationError>,
) {
    if node.name.trim().is_empty() {
        errors.push(ValidationError::EmptyCommandName(path.join(" ")));
        return;
    }
    path.push(node.name.as_str());
    let here = path.join(" ");

    validate_options(&node.options, persistent, &here, errors);

    if node.args.as_ref().is_some_and(Args::is_empty) {
        errors.push(ValidationError::EmptyArgs(here.clone()));
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for sub in &node.subcommands {
        if !sub.name.is_empty() && !seen.insert(sub.name.as_str()) {
            errors.push(ValidationError::DuplicateSubcommand(format!(
                "{here} {}",
                sub.name
            )));
            continue;
        }
        validate_node(sub, persistent, path, errors);
    }

    path.pop();
}

fn validate_options(
    options: &[CommandOption],
    persistent: &[CommandOption],
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen: HashSet<&str> = HashSet::new();

    for option in options {
        if option.names.is_empty() {
            errors.push(ValidationError::MissingOptionName(path.to_string()));
            continue;
        }
        for alias in &option.names {
            if !seen.insert(alias.as_str()) {
                errors.push(ValidationError::DuplicateOption {
                    path: path.to_string(),
                    alias: alias.clone(),
                });
            }
            if persistent.iter().any(|global| global.matches(alias)) {
                errors.push(ValidationError::RedeclaredPersistent {
                    path: path.to_string(),
                    alias: alias.clone(),
                });
            }
        }
    }
}
