//! Parameter classification: raw documented parameters into options and
//! positional arguments.
//!
//! A parameter entry on a page is a name cell (`--resource-group -g`,
//! `<CLI_TERM>`) plus free description text that may end with
//! `Accepted values: ...` and `Default value: ...` annotations. Names starting
//! with a dash become [`CommandOption`]s, names in angle brackets become
//! positional [`Argument`]s.

use command_tree_core::{Argument, CommandOption};

use crate::text::clean_sentence;

const ACCEPTED_MARKER: &str = "accepted values:";
const DEFAULT_MARKER: &str = "default value:";

/// Global flags documented without a value even though the page gives them
/// no `Default value: False` marker.
pub const NO_ARGUMENT_GLOBAL_FLAGS: &[&str] = &[
    "--debug",
    "--verbose",
    "--help",
    "-h",
    "--only-show-errors",
];

/// Confirmation switches, boolean wherever they appear.
pub const CONFIRM_FLAGS: &[&str] = &["--yes", "-y"];

/// One parameter entry as found on a page, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParameterBlock {
    pub name: String,
    pub description: String,
    pub is_required: bool,
}

impl RawParameterBlock {
    pub fn new(name: impl Into<String>, description: impl Into<String>, is_required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            is_required,
        }
    }
}

/// Result of classifying one [`RawParameterBlock`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    Option(CommandOption),
    Argument(Argument),
}

/// Description text split from its trailing annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotatedText {
    /// Cleaned description with both annotations removed.
    pub text: String,
    /// Values listed after `Accepted values:`.
    pub accepted_values: Vec<String>,
    /// Value given after `Default value:`.
    pub default_value: Option<String>,
}

impl AnnotatedText {
    /// Whether the description explicitly says `Default value: False`.
    pub fn defaults_to_false(&self) -> bool {
        self.default_value
            .as_deref()
            .is_some_and(|value| value.eq_ignore_ascii_case("false"))
    }
}

/// Splits `Accepted values:` / `Default value:` annotations off a
/// description (markers matched case-insensitively).
///
/// Annotations trail the description text, so everything from the first
/// marker onward is annotation.
pub fn split_annotations(description: &str) -> AnnotatedText {
    // ASCII lowercasing keeps byte offsets aligned with `description`.
    let lower = description.to_ascii_lowercase();
    let accepted_at = lower.find(ACCEPTED_MARKER);
    let default_at = lower.find(DEFAULT_MARKER);

    let body_end = [accepted_at, default_at]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(description.len());

    let segment = |start: usize, marker: &str, other: Option<usize>| -> String {
        let from = start + marker.len();
        let to = other.filter(|&o| o > start).unwrap_or(description.len());
        clean_sentence(&description[from..to])
    };

    let accepted_values = accepted_at
        .map(|start| segment(start, ACCEPTED_MARKER, default_at))
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let default_value = default_at
        .map(|start| segment(start, DEFAULT_MARKER, accepted_at))
        .filter(|value| !value.is_empty());

    AnnotatedText {
        text: clean_sentence(&description[..body_end]),
        accepted_values,
        default_value,
    }
}

/// Classifies an option from its name cell and description.
///
/// `names` is split on whitespace into aliases, kept in declaration order.
/// The option takes no value when the description says
/// `Default value: False`, when a persistent option is one of
/// [`NO_ARGUMENT_GLOBAL_FLAGS`], or when it is one of [`CONFIRM_FLAGS`];
/// otherwise its value argument is labelled with the longest alias minus its
/// dashes and suggests the accepted values.
///
/// # Examples
///
/// ```
/// use command_tree_discovery::classify::classify_option;
///
/// let opt = classify_option(
///     "--output -o",
///     "Output format.  Accepted values: json, table, yaml. Default value: json.",
///     true,
///     false,
/// );
/// assert_eq!(opt.names, vec!["--output", "-o"]);
/// assert_eq!(opt.description, "Output format");
/// let arg = opt.argument.unwrap();
/// assert_eq!(arg.name, "output");
/// assert_eq!(arg.suggestions, vec!["json", "table", "yaml"]);
/// ```
pub fn classify_option(
    names: &str,
    description: &str,
    is_persistent: bool,
    is_required: bool,
) -> CommandOption {
    let mut option = CommandOption::new(names.split_whitespace());
    option.is_persistent = is_persistent;
    option.is_required = is_required;

    let annotated = split_annotations(description);
    let is_switch = annotated.defaults_to_false()
        || (is_persistent && NO_ARGUMENT_GLOBAL_FLAGS.iter().any(|f| option.matches(f)))
        || CONFIRM_FLAGS.iter().any(|f| option.matches(f));

    if !is_switch {
        let argument =
            Argument::new(option.canonical_arg_name()).with_suggestions(annotated.accepted_values);
        option.argument = Some(argument);
    }
    option.description = annotated.text;
    option
}

/// Classifies a positional argument from a `<NAME>` name cell.
pub fn classify_argument(name: &str, description: &str, is_required: bool) -> Argument {
    let annotated = split_annotations(description);
    let label = name.trim().trim_start_matches('<').trim_end_matches('>').trim();
    let mut argument = Argument::new(label)
        .with_description(annotated.text)
        .with_suggestions(annotated.accepted_values);
    argument.is_optional = !is_required;
    argument
}

/// Routes a raw block to option or argument classification.
///
/// Returns `None` for names that are neither dash-prefixed nor wrapped in
/// angle brackets.
pub fn classify_block(block: &RawParameterBlock) -> Option<Parameter> {
    let name = block.name.trim();
    if name.starts_with('-') {
        Some(Parameter::Option(classify_option(
            name,
            &block.description,
            false,
            block.is_required,
        )))
    } else if name.starts_with('<') {
        Some(Parameter::Argument(classify_argument(
            name,
            &block.description,
            block.is_required,
        )))
    } else {
        None
    }
}
