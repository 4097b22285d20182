//! Structured view of `@available` / `@_spi_available` arguments.

use crate::tree::node_text;
use tree_sitter::Node;

/// Attribute names that carry platform availability.
const AVAILABILITY_ATTRIBUTES: &[&str] = &["available", "_spi_available"];

/// An attribute such as `@available(iOS 18.1, *)` or `@objc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Name without the `@`.
    pub name: &'a str,
    /// Text between the parentheses, if the attribute has any.
    pub arguments: Option<&'a str>,
}

/// One comma-separated argument of an availability attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityArgument<'a> {
    /// `iOS 18.1`
    Restriction { platform: &'a str, version: &'a str },
    /// `macOS` on its own, or a keyword such as `unavailable`.
    Bare(&'a str),
    /// `*`
    Wildcard,
    /// `introduced: 18.1`, `message: "..."`, `renamed: "..."`.
    Labeled { label: &'a str, value: &'a str },
    /// Anything else, trimmed.
    Other(&'a str),
}

/// Version a platform was introduced in, as written in an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Introduction<'a> {
    /// Platform token as written (`iOS`, `macOSApplicationExtension`).
    pub platform: &'a str,
    pub version: &'a str,
}

impl<'a> Attribute<'a> {
    /// Read an `attribute` node: the name from its `user_type` child, the
    /// arguments from the parenthesized text that follows it.
    pub(crate) fn from_node(node: Node<'_>, source: &'a str) -> Option<Self> {
        let mut cursor = node.walk();
        let name = node
            .children(&mut cursor)
            .find(|child| child.kind() == "user_type")?;
        let rest = source.get(name.end_byte()..node.end_byte())?.trim_start();
        let arguments = rest
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'));
        Some(Self {
            name: node_text(name, source),
            arguments,
        })
    }

    pub fn is_availability(&self) -> bool {
        AVAILABILITY_ATTRIBUTES.contains(&self.name)
    }

    /// Parsed arguments; empty for attributes that are not availability
    /// attributes.
    pub fn availability_arguments(&self) -> Vec<AvailabilityArgument<'a>> {
        match self.arguments {
            Some(arguments) if self.is_availability() => split_arguments(arguments)
                .into_iter()
                .map(str::trim)
                .filter(|argument| !argument.is_empty())
                .map(classify)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Every platform/version pair this attribute introduces.
    ///
    /// Covers the short form `@available(iOS 18.1, macOS 15, *)` and the
    /// long form `@available(iOS, introduced: 18.1, deprecated: 26)`.
    pub fn introductions(&self) -> Vec<Introduction<'a>> {
        let arguments = self.availability_arguments();
        let mut found = Vec::new();
        for argument in &arguments {
            if let AvailabilityArgument::Restriction { platform, version } = *argument {
                found.push(Introduction { platform, version });
            }
        }
        if let Some(AvailabilityArgument::Bare(platform)) = arguments.first() {
            let introduced = arguments.iter().find_map(|argument| match argument {
                AvailabilityArgument::Labeled {
                    label: "introduced",
                    value,
                } => Some(*value),
                _ => None,
            });
            if let Some(version) = introduced {
                found.push(Introduction {
                    platform: *platform,
                    version,
                });
            }
        }
        found
    }
}

/// Split on commas outside brackets and string literals.
fn split_arguments(text: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                groups.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    groups.push(&text[start..]);
    groups
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn is_version(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_digit())
        && text.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn classify(argument: &str) -> AvailabilityArgument<'_> {
    if argument == "*" {
        return AvailabilityArgument::Wildcard;
    }
    if let Some((label, value)) = argument.split_once(':') {
        let label = label.trim();
        if is_identifier(label) {
            return AvailabilityArgument::Labeled {
                label,
                value: value.trim(),
            };
        }
    }
    let mut words = argument.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some(word), None, None) if is_identifier(word) => AvailabilityArgument::Bare(word),
        (Some(platform), Some(version), None) if is_identifier(platform) && is_version(version) => {
            AvailabilityArgument::Restriction { platform, version }
        }
        _ => AvailabilityArgument::Other(argument),
    }
}
