//! Declaration view over the tree-sitter Swift tree.

use crate::availability::Attribute;
use crate::error::{ParseError, ParseErrorKind};
use std::fmt;
use tree_sitter::{Node, Parser, Tree};

// ============================================================================
// Parsing
// ============================================================================

/// Parse a Swift module interface.
///
/// Any `ERROR` or `MISSING` node in the result fails the whole parse; the
/// filter never works on a partially understood file.
pub fn parse(source: &str) -> Result<SyntaxTree<'_>, ParseError> {
    let _span = tracing::debug_span!("parse", bytes = source.len()).entered();

    let mut parser = Parser::new();
    parser
        .set_language(&arborium_swift::language().into())
        .map_err(|err| ParseError::new(ParseErrorKind::Language(err.to_string()), source, 0))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::new(ParseErrorKind::NoTree, source, 0))?;

    let root = tree.root_node();
    if root.has_error() {
        let err = match first_error(root) {
            Some(node) if node.is_missing() => ParseError::new(
                ParseErrorKind::Missing(node.kind().to_string()),
                source,
                node.start_byte(),
            ),
            Some(node) => {
                let text = node_text(node, source).lines().next().unwrap_or("").trim();
                ParseError::new(
                    ParseErrorKind::Unexpected(text.to_string()),
                    source,
                    node.start_byte(),
                )
            }
            None => ParseError::new(ParseErrorKind::Unexpected(String::new()), source, 0),
        };
        tracing::debug!(line = err.line, column = err.column, "syntax error");
        return Err(err);
    }

    Ok(SyntaxTree { source, tree })
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    node.children(&mut cursor).find_map(first_error)
}

pub(crate) fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// A successfully parsed interface and the text it was parsed from.
pub struct SyntaxTree<'s> {
    source: &'s str,
    tree: Tree,
}

impl<'s> SyntaxTree<'s> {
    pub fn source(&self) -> &'s str {
        self.source
    }

    /// Top-level items in source order.
    pub fn items(&self) -> Vec<Item<'_>> {
        items_of(self.tree.root_node(), self.source)
    }
}

impl fmt::Debug for SyntaxTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("root", &self.tree.root_node().to_sexp())
            .finish()
    }
}

fn items_of<'t>(parent: Node<'t>, source: &'t str) -> Vec<Item<'t>> {
    let mut cursor = parent.walk();
    parent
        .named_children(&mut cursor)
        .map(|node| match DeclKind::of(node) {
            Some(kind) => Item::Decl(Decl { kind, node, source }),
            None => Item::Other(node),
        })
        .collect()
}

// ============================================================================
// DeclKind
// ============================================================================

/// Kind of a declaration, decided by its node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Class,
    Struct,
    Enum,
    Actor,
    Protocol,
    Extension,
    Macro,
    Function,
    Initializer,
    Deinitializer,
    Variable,
    Subscript,
    TypeAlias,
    AssociatedType,
    Import,
    EnumCase,
    Operator,
    PrecedenceGroup,
}

/// Keywords a `class_declaration` node may be introduced by.
const TYPE_KEYWORDS: &[&str] = &["class", "struct", "enum", "actor", "extension"];

/// Member containers of type declarations.
const BODY_KINDS: &[&str] = &["class_body", "enum_class_body", "protocol_body"];

impl DeclKind {
    /// Classify a node; `None` for anything that is not a declaration.
    pub(crate) fn of(node: Node<'_>) -> Option<Self> {
        let kind = match node.kind() {
            "class_declaration" => {
                let keyword = node
                    .child_by_field_name("declaration_kind")
                    .map(|keyword| keyword.kind())
                    .or_else(|| {
                        let mut cursor = node.walk();
                        node.children(&mut cursor)
                            .map(|child| child.kind())
                            .find(|kind| TYPE_KEYWORDS.contains(kind))
                    });
                match keyword {
                    Some("struct") => Self::Struct,
                    Some("enum") => Self::Enum,
                    Some("actor") => Self::Actor,
                    Some("extension") => Self::Extension,
                    _ => Self::Class,
                }
            }
            "protocol_declaration" => Self::Protocol,
            "function_declaration" | "protocol_function_declaration" => Self::Function,
            "init_declaration" => Self::Initializer,
            "deinit_declaration" => Self::Deinitializer,
            "property_declaration" | "protocol_property_declaration" => Self::Variable,
            "subscript_declaration" => Self::Subscript,
            "typealias_declaration" => Self::TypeAlias,
            "associatedtype_declaration" => Self::AssociatedType,
            "macro_declaration" => Self::Macro,
            "import_declaration" => Self::Import,
            "enum_entry" => Self::EnumCase,
            "operator_declaration" => Self::Operator,
            "precedence_group_declaration" => Self::PrecedenceGroup,
            _ => return None,
        };
        Some(kind)
    }

    /// Type declarations own a `{ ... }` block of member items.
    pub fn has_member_block(self) -> bool {
        matches!(
            self,
            Self::Class
                | Self::Struct
                | Self::Enum
                | Self::Actor
                | Self::Protocol
                | Self::Extension
        )
    }

    /// Kinds whose availability attributes decide whether they survive
    /// filtering. All other kinds pass through untouched.
    pub fn carries_availability(self) -> bool {
        matches!(
            self,
            Self::Class
                | Self::Struct
                | Self::Enum
                | Self::Actor
                | Self::Protocol
                | Self::Extension
                | Self::Macro
                | Self::Function
                | Self::Initializer
                | Self::Variable
                | Self::Subscript
                | Self::TypeAlias
                | Self::AssociatedType
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Actor => "actor",
            Self::Protocol => "protocol",
            Self::Extension => "extension",
            Self::Macro => "macro",
            Self::Function => "func",
            Self::Initializer => "init",
            Self::Deinitializer => "deinit",
            Self::Variable => "var",
            Self::Subscript => "subscript",
            Self::TypeAlias => "typealias",
            Self::AssociatedType => "associatedtype",
            Self::Import => "import",
            Self::EnumCase => "case",
            Self::Operator => "operator",
            Self::PrecedenceGroup => "precedencegroup",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Items
// ============================================================================

/// One named child of the file or of a member block.
#[derive(Debug, Clone, Copy)]
pub enum Item<'t> {
    Decl(Decl<'t>),
    /// Comments, `#if` directives and anything else that is not a
    /// declaration.
    Other(Node<'t>),
}

/// A declaration node together with the source it spans.
#[derive(Clone, Copy)]
pub struct Decl<'t> {
    pub kind: DeclKind,
    node: Node<'t>,
    source: &'t str,
}

impl<'t> Decl<'t> {
    pub(crate) fn node(&self) -> Node<'t> {
        self.node
    }

    /// Declared name, where the grammar records one.
    pub fn name(&self) -> Option<&'t str> {
        self.node
            .child_by_field_name("name")
            .map(|name| node_text(name, self.source))
    }

    /// Attributes in source order, `#if`-guarded ones included.
    pub fn attributes(&self) -> Vec<Attribute<'t>> {
        let mut found = Vec::new();
        let mut cursor = self.node.walk();
        for child in self.node.children(&mut cursor) {
            match child.kind() {
                "attribute" => found.extend(Attribute::from_node(child, self.source)),
                "modifiers" => {
                    let mut inner = child.walk();
                    found.extend(
                        child
                            .children(&mut inner)
                            .filter(|modifier| modifier.kind() == "attribute")
                            .filter_map(|attr| Attribute::from_node(attr, self.source)),
                    );
                }
                _ => {}
            }
        }
        found
    }

    /// Items of the member block; empty for kinds without one.
    pub fn members(&self) -> Vec<Item<'t>> {
        if !self.kind.has_member_block() {
            return Vec::new();
        }
        let body = self.node.child_by_field_name("body").or_else(|| {
            let mut cursor = self.node.walk();
            self.node
                .children(&mut cursor)
                .find(|child| BODY_KINDS.contains(&child.kind()))
        });
        body.map(|body| items_of(body, self.source))
            .unwrap_or_default()
    }
}

impl fmt::Debug for Decl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decl")
            .field("kind", &self.kind)
            .field("name", &self.name())
            .field("range", &self.node.byte_range())
            .finish()
    }
}
