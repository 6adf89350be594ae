//! Parameter block walk.
//!
//! Starting at a command's required/optional parameter anchor, the walk
//! collects consecutive name/description pairs and stops at the first element
//! that shows the block has ended:
//!
//! - a command heading (the nearest preceding heading is no longer ours),
//! - another parameter anchor or section heading (entries are no longer
//!   attributable to our anchor),
//! - a parameter name outside command scope (e.g. global parameters),
//! - the end of the page (no further name).
//!
//! A name still waiting for its description when the walk ends is kept with
//! an empty description.

use crate::classify::RawParameterBlock;

use super::{ElementKind, PageElement, SectionKind};

/// Position of the walk relative to the parameter block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkState {
    /// The anchor has not been seen yet.
    BeforeBlock,
    /// Inside the block; `pending` holds a name awaiting its description.
    InBlock { pending: Option<String> },
    /// The block has ended; further elements are ignored.
    Terminated,
}

/// State machine over [`PageElement`]s for one parameter anchor.
#[derive(Debug, Clone)]
pub struct ParameterWalk {
    heading_id: String,
    kind: SectionKind,
    state: WalkState,
    blocks: Vec<RawParameterBlock>,
}

impl ParameterWalk {
    pub fn new(heading_id: impl Into<String>, kind: SectionKind) -> Self {
        Self {
            heading_id: heading_id.into(),
            kind,
            state: WalkState::BeforeBlock,
            blocks: Vec::new(),
        }
    }

    pub fn state(&self) -> &WalkState {
        &self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == WalkState::Terminated
    }

    /// Advances the walk by one element.
    pub fn step(&mut self, element: &PageElement) {
        let state = std::mem::replace(&mut self.state, WalkState::Terminated);
        self.state = match state {
            WalkState::BeforeBlock => self.before_block(element),
            WalkState::InBlock { pending } => self.in_block(pending, element),
            WalkState::Terminated => WalkState::Terminated,
        };
    }

    /// Ends the walk and returns the collected blocks.
    pub fn finish(mut self) -> Vec<RawParameterBlock> {
        if let WalkState::InBlock {
            pending: Some(name),
        } = std::mem::replace(&mut self.state, WalkState::Terminated)
        {
            self.emit(name, String::new());
        }
        self.blocks
    }

    fn before_block(&self, element: &PageElement) -> WalkState {
        match &element.kind {
            ElementKind::ParameterSection { owner, kind }
                if *owner == self.heading_id && *kind == self.kind =>
            {
                WalkState::InBlock { pending: None }
            }
            _ => WalkState::BeforeBlock,
        }
    }

    fn in_block(&mut self, pending: Option<String>, element: &PageElement) -> WalkState {
        match &element.kind {
            ElementKind::ParameterName { text } if element.is_command_scope() => {
                if let Some(name) = pending {
                    self.emit(name, String::new());
                }
                WalkState::InBlock {
                    pending: Some(text.clone()),
                }
            }
            ElementKind::ParameterInfo { text } if element.is_command_scope() => {
                if let Some(name) = pending {
                    self.emit(name, text.clone());
                }
                WalkState::InBlock { pending: None }
            }
            ElementKind::ParameterName { .. }
            | ElementKind::ParameterInfo { .. }
            | ElementKind::CommandHeading { .. }
            | ElementKind::ParameterSection { .. }
            | ElementKind::SectionHeading { .. }
            | ElementKind::Title { .. } => {
                if let Some(name) = pending {
                    self.emit(name, String::new());
                }
                WalkState::Terminated
            }
            ElementKind::Paragraph { .. } | ElementKind::ListingRow { .. } => {
                WalkState::InBlock { pending }
            }
        }
    }

    fn emit(&mut self, name: String, description: String) {
        self.blocks.push(RawParameterBlock {
            name,
            description,
            is_required: self.kind.is_required(),
        });
    }
}

/// Runs a [`ParameterWalk`] over `elements` starting at `start`.
pub fn walk_parameters(
    elements: &[PageElement],
    start: usize,
    heading_id: &str,
    kind: SectionKind,
) -> Vec<RawParameterBlock> {
    let mut walk = ParameterWalk::new(heading_id, kind);
    for element in elements.iter().skip(start) {
        walk.step(element);
        if walk.is_terminated() {
            break;
        }
    }
    walk.finish()
}

#[cfg(test)]
mod tests {
    use super::super::Scope;
    use super::*;

    fn anchor(owner: &str, kind: SectionKind) -> PageElement {
        PageElement::command(ElementKind::ParameterSection {
            owner: owner.into(),
            kind,
        })
    }

    fn name(text: &str) -> PageElement {
        PageElement::command(ElementKind::ParameterName { text: text.into() })
    }

    fn info(text: &str) -> PageElement {
        PageElement::command(ElementKind::ParameterInfo { text: text.into() })
    }

    fn names(blocks: &[RawParameterBlock]) -> Vec<&str> {
        blocks.iter().map(|b| b.name.as_str()).collect()
    }

    #[test]
    fn test_walk_collects_until_end_of_page() {
        let elements = vec![
            anchor("az-vm-create", SectionKind::Required),
            name("--name -n"),
            info("Name."),
            name("--resource-group -g"),
            info("Group."),
        ];
        let blocks = walk_parameters(&elements, 0, "az-vm-create", SectionKind::Required);
        assert_eq!(names(&blocks), vec!["--name -n", "--resource-group -g"]);
        assert!(blocks.iter().all(|b| b.is_required));
        assert_eq!(blocks[0].description, "Name.");
    }

    #[test]
    fn test_walk_stops_at_next_command_heading() {
        let elements = vec![
            anchor("az-vm-create", SectionKind::Optional),
            name("--size"),
            info("Size."),
            PageElement::command(ElementKind::CommandHeading {
                id: "az-vm-delete".into(),
                label: "az vm delete".into(),
            }),
            name("--yes -y"),
            info("Confirm."),
        ];
        let blocks = walk_parameters(&elements, 0, "az-vm-create", SectionKind::Optional);
        assert_eq!(names(&blocks), vec!["--size"]);
        assert!(!blocks[0].is_required);
    }

    #[test]
    fn test_walk_stops_at_other_anchor() {
        let elements = vec![
            anchor("az-vm-create", SectionKind::Required),
            name("--name"),
            info("Name."),
            anchor("az-vm-create", SectionKind::Optional),
            name("--size"),
            info("Size."),
        ];
        let blocks = walk_parameters(&elements, 0, "az-vm-create", SectionKind::Required);
        assert_eq!(names(&blocks), vec!["--name"]);
    }

    #[test]
    fn test_walk_stops_at_global_scope() {
        let elements = vec![
            anchor("az-vm-create", SectionKind::Optional),
            name("--size"),
            info("Size."),
            PageElement {
                kind: ElementKind::ParameterName {
                    text: "--debug".into(),
                },
                scope: Scope::Collapsible {
                    index: 0,
                    global: true,
                },
            },
        ];
        let mut walk = ParameterWalk::new("az-vm-create", SectionKind::Optional);
        for element in &elements {
            walk.step(element);
        }
        assert!(walk.is_terminated());
        assert_eq!(names(&walk.finish()), vec!["--size"]);
    }

    #[test]
    fn test_walk_ignores_anchor_of_other_heading() {
        let elements = vec![
            anchor("az-vm-delete", SectionKind::Required),
            name("--ids"),
            info("Ids."),
        ];
        let mut walk = ParameterWalk::new("az-vm-create", SectionKind::Required);
        for element in &elements {
            walk.step(element);
        }
        assert_eq!(walk.state(), &WalkState::BeforeBlock);
        assert!(walk.finish().is_empty());
    }

    #[test]
    fn test_walk_keeps_name_without_description() {
        let elements = vec![
            anchor("az-vm-create", SectionKind::Optional),
            name("--no-wait"),
            name("--size"),
            info("Size."),
            name("--tags"),
        ];
        let blocks = walk_parameters(&elements, 0, "az-vm-create", SectionKind::Optional);
        assert_eq!(names(&blocks), vec!["--no-wait", "--size", "--tags"]);
        assert_eq!(blocks[0].description, "");
        assert_eq!(blocks[1].description, "Size.");
        assert_eq!(blocks[2].description, "");
    }

    #[test]
    fn test_walk_skips_interleaved_paragraphs() {
        let elements = vec![
            anchor("az-vm-create", SectionKind::Optional),
            PageElement::command(ElementKind::Paragraph {
                text: "Preview".into(),
            }),
            name("--size"),
            info("Size."),
        ];
        let blocks = walk_parameters(&elements, 0, "az-vm-create", SectionKind::Optional);
        assert_eq!(names(&blocks), vec!["--size"]);
    }
}
