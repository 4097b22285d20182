//! Splicing declarations out of the source text.
//!
//! A removed declaration takes its trivia with it: the comments and blank
//! lines between it and the previous token, and anything after it on its
//! last line. The newline that ends the previous line stays, so the lines
//! around a removal are left as they were.
//!
//! `#if` directives inside a removed declaration that pair with directives
//! outside it are kept, so the output stays balanced.

use crate::tree::{Decl, node_text};
use std::io;
use std::ops::Range;
use tree_sitter::Node;

/// Pending removals against one source text.
#[derive(Debug, Clone)]
pub struct Rewrite<'s> {
    source: &'s str,
    removed: Vec<Range<usize>>,
}

impl<'s> Rewrite<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            removed: Vec::new(),
        }
    }

    /// Replace `decl` with the empty placeholder.
    pub fn remove(&mut self, decl: &Decl<'_>) {
        let node = decl.node();
        let range = removal_range(node, self.source);
        let mut start = range.start;
        for directive in unbalanced_directives(node, self.source) {
            let line_break = self.source[..directive.start_byte()]
                .rfind('\n')
                .unwrap_or(directive.start_byte());
            if line_break > start {
                self.removed.push(start..line_break);
            }
            start = start.max(directive.end_byte());
        }
        if range.end > start {
            self.removed.push(start..range.end);
        }
    }

    /// Position to [`rollback`](Self::rollback) to.
    pub fn mark(&self) -> usize {
        self.removed.len()
    }

    /// Forget every removal made since `mark`.
    pub fn rollback(&mut self, mark: usize) {
        self.removed.truncate(mark);
    }

    pub fn render(&self) -> String {
        self.pieces().concat()
    }

    pub fn write_to<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        for piece in self.pieces() {
            out.write_all(piece.as_bytes())?;
        }
        Ok(())
    }

    fn pieces(&self) -> Vec<&'s str> {
        let mut removed = self.removed.clone();
        removed.sort_by_key(|range| range.start);

        let mut pieces = Vec::with_capacity(removed.len() + 1);
        let mut pos = 0;
        for range in removed {
            if range.start > pos {
                pieces.push(&self.source[pos..range.start]);
            }
            pos = pos.max(range.end);
        }
        pieces.push(&self.source[pos..]);
        pieces
    }
}

fn is_comment(node: Node<'_>) -> bool {
    matches!(node.kind(), "comment" | "multiline_comment")
}

fn removal_range(node: Node<'_>, source: &str) -> Range<usize> {
    let mut previous = node.prev_sibling();
    while let Some(sibling) = previous.filter(|sibling| is_comment(*sibling)) {
        previous = sibling.prev_sibling();
    }
    let start = match previous {
        Some(token) => {
            let end = token.end_byte();
            end + same_line_trivia(&source[end..node.start_byte()])
        }
        None => 0,
    };
    let end = node.end_byte() + same_line_trivia(&source[node.end_byte()..]);
    start..end
}

/// Directives under `node` whose `#if` or `#endif` lies outside it, in
/// source order.
fn unbalanced_directives<'t>(node: Node<'t>, source: &str) -> Vec<Node<'t>> {
    let mut directives = Vec::new();
    collect_directives(node, &mut directives);

    let mut open = Vec::new();
    let mut unbalanced = Vec::new();
    for directive in directives {
        let text = node_text(directive, source).trim_start();
        if text.starts_with("#if") {
            open.push(directive);
        } else if text.starts_with("#endif") {
            if open.pop().is_none() {
                unbalanced.push(directive);
            }
        } else if open.is_empty() {
            unbalanced.push(directive);
        }
    }
    unbalanced.extend(open);
    unbalanced.sort_by_key(|directive| directive.start_byte());
    unbalanced
}

fn collect_directives<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "directive" {
            out.push(child);
        } else {
            collect_directives(child, out);
        }
    }
}

/// Length of the spaces and comments before the next line break.
fn same_line_trivia(text: &str) -> usize {
    let mut pos = 0;
    while pos < text.len() {
        let rest = &text[pos..];
        if rest.starts_with([' ', '\t']) {
            pos += 1;
        } else if rest.starts_with("//") {
            pos += rest.find(['\r', '\n']).unwrap_or(rest.len());
        } else if rest.starts_with("/*") {
            match rest.find("*/") {
                Some(close) if !rest[..close].contains('\n') => pos += close + 2,
                _ => break,
            }
        } else {
            break;
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use crate::tree::Item;

    fn remove_where(source: &str, remove: impl Fn(&str) -> bool) -> String {
        let tree = parse(source).unwrap();
        let mut rewrite = Rewrite::new(tree.source());
        for item in tree.items() {
            if let Item::Decl(decl) = item {
                if decl.name().is_some_and(&remove) {
                    rewrite.remove(&decl);
                }
            }
        }
        rewrite.render()
    }

    #[test]
    fn untouched_source_renders_verbatim() {
        let source = "// header\nimport A\n\n/* note */ public struct S {}\n";
        let tree = parse(source).unwrap();
        assert_eq!(Rewrite::new(tree.source()).render(), source);
    }

    #[test]
    fn removal_takes_leading_comments_and_trailing_comment() {
        let source = "import A\n\n/// Docs.\npublic struct Old {} // old\npublic struct New {}\n";
        assert_eq!(
            remove_where(source, |name| name == "Old"),
            "import A\npublic struct New {}\n"
        );
    }

    #[test]
    fn adjacent_removals_do_not_overlap() {
        let source = "import A\npublic struct B {}\npublic struct C {}\npublic struct D {}\n";
        assert_eq!(
            remove_where(source, |name| name != "D"),
            "import A\npublic struct D {}\n"
        );
    }

    #[test]
    fn first_declaration_takes_everything_before_it() {
        let source = "// header\npublic struct S {}\npublic struct T {}\n";
        assert_eq!(remove_where(source, |name| name == "S"), "\npublic struct T {}\n");
    }

    #[test]
    fn rollback_forgets_later_removals() {
        let source = "public struct S {}\npublic struct T {}\n";
        let tree = parse(source).unwrap();
        let mut rewrite = Rewrite::new(tree.source());
        let items = tree.items();
        let mark = rewrite.mark();
        for item in &items {
            if let Item::Decl(decl) = item {
                rewrite.remove(decl);
            }
        }
        assert_eq!(rewrite.render(), "\n");
        rewrite.rollback(mark);
        assert_eq!(rewrite.render(), source);
    }

    #[test]
    fn streaming_matches_render() {
        let source = "import A\npublic struct S {}\n";
        let tree = parse(source).unwrap();
        let mut rewrite = Rewrite::new(tree.source());
        if let Some(Item::Decl(decl)) = tree.items().get(1) {
            rewrite.remove(decl);
        }
        let mut out = Vec::new();
        rewrite.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), rewrite.render());
        assert_eq!(rewrite.render(), "import A\n");
    }

    #[test]
    fn same_line_trivia_stops_at_line_break() {
        assert_eq!(same_line_trivia("  // c\nx"), 6);
        assert_eq!(same_line_trivia(" /* a */ /* b\n */"), 9);
        assert_eq!(same_line_trivia("\n  "), 0);
    }
}
