//! Global parameter extraction from the reference index.

use command_tree_core::CommandOption;

use crate::classify::classify_option;

use super::{ElementKind, Page, Scope};

/// Classifies the parameters of the first collapsible section mentioning
/// "global" as persistent options.
///
/// Names and descriptions inside that section are paired positionally; an
/// unmatched trailing name gets an empty description.
pub fn extract_global_options(page: &Page) -> Vec<CommandOption> {
    let Some(section) = page.elements.iter().find_map(|element| match element.scope {
        Scope::Collapsible { index, global: true } => Some(index),
        _ => None,
    }) else {
        return Vec::new();
    };

    let in_section = |scope: Scope| matches!(scope, Scope::Collapsible { index, .. } if index == section);

    let mut names = Vec::new();
    let mut infos = Vec::new();
    for element in page.elements.iter().filter(|e| in_section(e.scope)) {
        match &element.kind {
            ElementKind::ParameterName { text } => names.push(text.as_str()),
            ElementKind::ParameterInfo { text } => infos.push(text.as_str()),
            _ => {}
        }
    }

    names
        .iter()
        .enumerate()
        .map(|(i, name)| classify_option(name, infos.get(i).copied().unwrap_or_default(), true, false))
        .collect()
}
