//! Syntax layer for Swift module interface files.
//!
//! `apisift-syntax` parses a `.swiftinterface` with the tree-sitter Swift
//! grammar and exposes the *declaration layer* of the result: declarations,
//! their attributes and the items of their member blocks. Comments and `#if`
//! directives show up as plain items between declarations.
//!
//! # Architecture
//!
//! ```text
//! source ──> tree-sitter ──> SyntaxTree ──> items / Decl / Attribute
//!   │                                              │
//!   └──────────────> Rewrite (byte-range splices) <┘ ──> text
//! ```
//!
//! Output is always the original text with whole declarations cut out, so an
//! untouched region is reproduced byte for byte.
//!
//! # Example
//!
//! ```ignore
//! use apisift_syntax::{Item, Rewrite, parse};
//!
//! let tree = parse("@available(iOS 18, *)\npublic struct S {}\n")?;
//! let mut rewrite = Rewrite::new(tree.source());
//! if let Item::Decl(decl) = &tree.items()[0] {
//!     assert_eq!(decl.attributes()[0].introductions()[0].version, "18");
//!     rewrite.remove(decl);
//! }
//! assert_eq!(rewrite.render(), "\n");
//! ```

mod availability;
mod edit;
mod error;
mod tree;

pub use availability::{Attribute, AvailabilityArgument, Introduction};
pub use edit::Rewrite;
pub use error::{ParseError, ParseErrorKind};
pub use tree::{Decl, DeclKind, Item, SyntaxTree, parse};
