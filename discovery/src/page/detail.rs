//! Detail-mode extraction: commands and their parameters.

use command_tree_core::{Args, CommandNode};
use tracing::debug;
use url::Url;

use crate::classify::{Parameter, RawParameterBlock, classify_block};
use crate::text::label_tokens;

use super::walk::walk_parameters;
use super::{ElementKind, Page, SectionKind};

/// Leading label tokens (`<tool> <group>`) dropped from headings on group
/// pages.
pub const GROUP_PAGE_PREFIX_TOKENS: usize = 2;

/// Leading label tokens (`<tool>`) dropped from inline headings on the
/// reference index.
pub const INDEX_PAGE_PREFIX_TOKENS: usize = 1;

/// A command heading with its description and raw parameter entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailCommand {
    pub name: String,
    pub description: Option<String>,
    pub parameters: Vec<RawParameterBlock>,
}

impl DetailCommand {
    /// Classifies the parameters into a command node.
    ///
    /// Dash-prefixed entries become options, `<...>` entries become
    /// positional arguments in page order; anything else is dropped.
    pub fn into_node(self) -> CommandNode {
        let mut node = CommandNode::new(self.name);
        node.description = self.description;

        let mut args = Vec::new();
        for block in &self.parameters {
            match classify_block(block) {
                Some(Parameter::Option(option)) => node.options.push(option),
                Some(Parameter::Argument(argument)) => args.push(argument),
                None => debug!(command = %node.name, parameter = %block.name, "Skipping unrecognized parameter"),
            }
        }
        node.args = Args::collapse(args);
        node
    }
}

/// What one group page contributes to a base command tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPage {
    pub url: Url,
    /// Group name segments from the page title, tool name excluded
    /// (`az webapp auth` → `["webapp", "auth"]`).
    pub path: Vec<String>,
    /// First paragraph after the title.
    pub summary: Option<String>,
    /// Commands documented on the page.
    pub leaves: Vec<CommandNode>,
}

/// Extracts every command heading of `tool` with its parameters.
///
/// The command name is the last label token once `prefix_tokens` leading
/// tokens are dropped; headings with nothing left after the prefix, or whose
/// label does not start with `tool`, are not commands.
pub fn extract_commands(page: &Page, tool: &str, prefix_tokens: usize) -> Vec<DetailCommand> {
    let elements = &page.elements;
    let mut commands = Vec::new();

    for (index, element) in elements.iter().enumerate() {
        let ElementKind::CommandHeading { id, label } = &element.kind else {
            continue;
        };
        if !element.is_command_scope() {
            continue;
        }
        let tokens = label_tokens(label);
        if tokens.first().map(String::as_str) != Some(tool) {
            continue;
        }
        let Some(name) = tokens.iter().skip(prefix_tokens).last() else {
            continue;
        };

        let section_end = elements[index + 1..]
            .iter()
            .position(|e| matches!(e.kind, ElementKind::CommandHeading { .. }))
            .map_or(elements.len(), |offset| index + 1 + offset);
        let section = &elements[index + 1..section_end];

        let description = section.iter().find_map(|e| match &e.kind {
            ElementKind::Paragraph { text } if e.is_command_scope() => Some(text.clone()),
            _ => None,
        });

        let mut parameters = Vec::new();
        for kind in [SectionKind::Required, SectionKind::Optional] {
            let anchor = section.iter().position(|e| {
                matches!(&e.kind, ElementKind::ParameterSection { owner, kind: k } if owner == id && *k == kind)
            });
            if let Some(offset) = anchor {
                parameters.extend(walk_parameters(elements, index + 1 + offset, id, kind));
            }
        }

        commands.push(DetailCommand {
            name: name.clone(),
            description,
            parameters,
        });
    }

    commands
}

/// Extracts a group page: its name path, summary and leaf commands.
pub fn extract_group_page(page: &Page, tool: &str) -> GroupPage {
    let title = page.elements.iter().position(|e| matches!(e.kind, ElementKind::Title { .. }));

    let (path, summary) = match title {
        Some(index) => {
            let path = match &page.elements[index].kind {
                ElementKind::Title { label } => label_tokens(label).into_iter().skip(1).collect(),
                _ => Vec::new(),
            };
            let summary = page.elements[index + 1..]
                .iter()
                .take_while(|e| !matches!(e.kind, ElementKind::CommandHeading { .. }))
                .find_map(|e| match &e.kind {
                    ElementKind::Paragraph { text } if e.is_command_scope() => Some(text.clone()),
                    _ => None,
                });
            (path, summary)
        }
        None => (Vec::new(), None),
    };

    let leaves = extract_commands(page, tool, GROUP_PAGE_PREFIX_TOKENS)
        .into_iter()
        .map(DetailCommand::into_node)
        .collect();

    GroupPage {
        url: page.url.clone(),
        path,
        summary,
        leaves,
    }
}
