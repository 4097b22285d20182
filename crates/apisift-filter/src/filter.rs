//! The availability rewrite.
//!
//! A walk visits every item of the tree depth first. Declarations of the
//! kinds that carry availability are decided one by one:
//!
//! - a declaration whose own `@available` introduces a version inside a
//!   requested range is *satisfied* and kept verbatim;
//! - inside a satisfied declaration everything is kept;
//! - any other declaration is kept only if a satisfied declaration was found
//!   somewhere below it, with its members filtered in turn. Otherwise it is
//!   replaced by an empty placeholder, taking its comments and attributes
//!   with it.
//!
//! Everything else (imports, enum cases, operators, comments, `#if`
//! directives) passes through untouched. Directives are flat items in the
//! tree, so declarations between `#if` and `#endif` are decided like any
//! other member of the enclosing scope.

use crate::conditions::Conditions;
use apisift_syntax::{Decl, Item, ParseError, Rewrite, SyntaxTree, parse};
use serde::Serialize;
use std::fmt;
use std::io;
use std::ops::{Deref, DerefMut};

/// Errors from [`AvailabilityFilter::apply`] and friends.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("failed to parse interface: {0}")]
    Parse(#[from] ParseError),

    #[error("failed to write filtered interface: {0}")]
    Render(#[from] io::Error),
}

/// Counts of the decisions made during one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    /// Declarations of availability-carrying kinds that were visited.
    pub inspected: usize,
    /// Declarations whose own attributes matched.
    pub satisfied: usize,
    /// Declarations kept without matching themselves.
    pub retained: usize,
    /// Declarations replaced by a placeholder.
    pub replaced: usize,
}

impl fmt::Display for FilterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} declarations inspected: {} matched, {} kept, {} removed",
            self.inspected, self.satisfied, self.retained, self.replaced
        )
    }
}

/// Rewrites interface trees against a set of [`Conditions`].
#[derive(Debug, Clone)]
pub struct AvailabilityFilter {
    conditions: Conditions,
}

impl AvailabilityFilter {
    /// Returns `None` for empty conditions: nothing would be constrained, so
    /// callers should pass the source through unchanged.
    pub fn new(conditions: Conditions) -> Option<Self> {
        if conditions.is_empty() {
            return None;
        }
        Some(Self { conditions })
    }

    /// Decide every declaration of a parsed file.
    pub fn rewrite<'s>(&self, tree: &SyntaxTree<'s>) -> (Rewrite<'s>, FilterStats) {
        let items = tree.items();
        let _span = tracing::debug_span!("rewrite", items = items.len()).entered();
        let mut walk = Walk {
            conditions: &self.conditions,
            depth: 0,
            satisfied: 0,
            stats: FilterStats::default(),
            rewrite: Rewrite::new(tree.source()),
        };
        walk.visit_items(&items);
        tracing::debug!(
            inspected = walk.stats.inspected,
            satisfied = walk.stats.satisfied,
            retained = walk.stats.retained,
            replaced = walk.stats.replaced,
            "rewrite finished"
        );
        (walk.rewrite, walk.stats)
    }

    /// Parse, rewrite and render `source`.
    pub fn apply(&self, source: &str) -> Result<String, FilterError> {
        let tree = parse(source)?;
        let (rewrite, _) = self.rewrite(&tree);
        Ok(rewrite.render())
    }

    /// Like [`apply`](Self::apply), streaming the result into `out`.
    pub fn apply_to<W: io::Write>(&self, source: &str, out: &mut W) -> Result<FilterStats, FilterError> {
        let tree = parse(source)?;
        let (rewrite, stats) = self.rewrite(&tree);
        rewrite.write_to(out)?;
        Ok(stats)
    }
}

struct Walk<'f, 's> {
    conditions: &'f Conditions,
    /// Number of satisfied declarations enclosing the current item.
    depth: usize,
    /// Satisfied declarations seen so far; only ever grows.
    satisfied: usize,
    stats: FilterStats,
    rewrite: Rewrite<'s>,
}

/// Holds the walk one level deeper until dropped.
struct DepthGuard<'w, 'f, 's> {
    walk: &'w mut Walk<'f, 's>,
}

impl<'f, 's> Deref for DepthGuard<'_, 'f, 's> {
    type Target = Walk<'f, 's>;

    fn deref(&self) -> &Self::Target {
        self.walk
    }
}

impl DerefMut for DepthGuard<'_, '_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.walk
    }
}

impl Drop for DepthGuard<'_, '_, '_> {
    fn drop(&mut self) {
        self.walk.depth -= 1;
    }
}

impl<'f, 's> Walk<'f, 's> {
    fn enter(&mut self) -> DepthGuard<'_, 'f, 's> {
        self.depth += 1;
        DepthGuard { walk: self }
    }

    fn visit_items(&mut self, items: &[Item<'_>]) {
        for item in items {
            match item {
                Item::Decl(decl) if decl.kind.carries_availability() => self.visit_decl(decl),
                Item::Decl(_) | Item::Other(_) => {}
            }
        }
    }

    fn visit_decl(&mut self, decl: &Decl<'_>) {
        self.stats.inspected += 1;

        if self.is_satisfied(decl) {
            self.stats.satisfied += 1;
            self.satisfied += 1;
            tracing::trace!(kind = %decl.kind, name = decl.name(), "matched");
            let mut walk = self.enter();
            walk.visit_items(&decl.members());
            return;
        }

        if self.depth > 0 {
            self.stats.retained += 1;
            self.visit_items(&decl.members());
            return;
        }

        let before = self.satisfied;
        let mark = self.rewrite.mark();
        self.visit_items(&decl.members());
        if self.satisfied > before {
            self.stats.retained += 1;
            tracing::trace!(kind = %decl.kind, name = decl.name(), "kept for its members");
        } else {
            self.stats.replaced += 1;
            tracing::debug!(kind = %decl.kind, name = decl.name(), "removed");
            self.rewrite.rollback(mark);
            self.rewrite.remove(decl);
        }
    }

    fn is_satisfied(&self, decl: &Decl<'_>) -> bool {
        decl.attributes()
            .iter()
            .filter(|attr| attr.is_availability())
            .flat_map(|attr| attr.introductions())
            .any(|intro| self.conditions.admits(intro.platform, intro.version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Platform, VersionRange};

    fn ios(range: VersionRange) -> AvailabilityFilter {
        AvailabilityFilter::new([(Platform::Ios, range)].into_iter().collect()).unwrap()
    }

    #[test]
    fn empty_conditions_build_no_filter() {
        assert!(AvailabilityFilter::new(Conditions::new()).is_none());
    }

    #[test]
    fn satisfied_declaration_is_kept_verbatim() {
        let source = "import A\n@available(iOS 18.1, *)\npublic struct S {\n  public func f() {}\n  // note\n  public var x: Int\n}\n";
        let filter = ios(VersionRange::from("18"..));
        assert_eq!(filter.apply(source).unwrap(), source);
    }

    #[test]
    fn unmatched_declarations_vanish_with_their_trivia() {
        let source = "import A\n\n/// Docs.\n@available(iOS 17, *)\npublic func old() {} // trailing\n@available(iOS 26, *)\npublic func new() {}\n";
        let filter = ios(VersionRange::from("26"..));
        assert_eq!(
            filter.apply(source).unwrap(),
            "import A\n@available(iOS 26, *)\npublic func new() {}\n"
        );
    }

    #[test]
    fn declarations_without_attributes_are_removed_at_top_level() {
        let source = "import A\npublic func plain() {}\npublic typealias T = Int\n";
        let filter = ios(VersionRange::from("26"..));
        assert_eq!(filter.apply(source).unwrap(), "import A\n");
    }

    #[test]
    fn matching_member_keeps_container() {
        let source = "extension S {\n  @available(iOS 26, *)\n  public func new() {}\n  @available(iOS 15, *)\n  public func old() {}\n  public var plain: Int\n}\n";
        let filter = ios(VersionRange::from("26"..));
        assert_eq!(
            filter.apply(source).unwrap(),
            "extension S {\n  @available(iOS 26, *)\n  public func new() {}\n}\n"
        );
    }

    #[test]
    fn deeply_nested_match_keeps_every_ancestor() {
        let source = "public enum Outer {\n  public struct Inner {\n    @available(iOS 26.1, *)\n    public init() {}\n  }\n  public struct Other {\n    public init() {}\n  }\n}\n";
        let filter = ios(VersionRange::from("26"..));
        assert_eq!(
            filter.apply(source).unwrap(),
            "public enum Outer {\n  public struct Inner {\n    @available(iOS 26.1, *)\n    public init() {}\n  }\n}\n"
        );
    }

    #[test]
    fn long_form_introduced_matches() {
        let source = "@available(iOS, introduced: 26.0, deprecated: 27.0)\npublic func f() {}\n";
        let filter = ios(VersionRange::from("26"..));
        assert_eq!(filter.apply(source).unwrap(), source);
    }

    #[test]
    fn other_platforms_and_unavailable_never_match() {
        let source = "@available(macOS 26, *)\n@available(iOS, unavailable)\npublic func f() {}\n";
        let filter = ios(VersionRange::from("26"..));
        assert_eq!(filter.apply(source).unwrap(), "\n");
    }

    #[test]
    fn space_before_attribute_arguments() {
        let source = "import A\n@available (iOS 26.0, *)\npublic func f() {}\n@available (iOS 17.0, *)\npublic func g() {}\n";
        let filter = ios(VersionRange::from("26"..));
        assert_eq!(
            filter.apply(source).unwrap(),
            "import A\n@available (iOS 26.0, *)\npublic func f() {}\n"
        );
    }

    #[test]
    fn if_config_around_attributes() {
        let source = "#if compiler(>=5.3) && $X\n@available(iOS 26.0, *)\n#endif\npublic func f() {}\n";
        let filter = ios(VersionRange::from("26"..));
        let mut out = Vec::new();
        let stats = filter.apply_to(source, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), source);
        assert_eq!(stats.satisfied, 1);
    }

    #[test]
    fn removal_keeps_directives_balanced() {
        let source = "import A\n#if compiler(>=5.3) && $X\n@available(iOS 17.0, *)\n#endif\npublic func f() {}\n";
        let filter = ios(VersionRange::from("26"..));
        assert_eq!(
            filter.apply(source).unwrap(),
            "import A\n#if compiler(>=5.3) && $X\n#endif\n"
        );
    }

    #[test]
    fn if_config_members_count_for_container() {
        let source = "public struct S {\n#if compiler(>=5.3)\n  @available(iOS 26, *)\n  public var x: Int\n#endif\n  public var y: Int\n}\n";
        let filter = ios(VersionRange::from("26"..));
        assert_eq!(
            filter.apply(source).unwrap(),
            "public struct S {\n#if compiler(>=5.3)\n  @available(iOS 26, *)\n  public var x: Int\n#endif\n}\n"
        );
    }

    #[test]
    fn pass_through_items_survive_in_kept_containers_only() {
        let source = "public enum E {\n  case a\n  @available(iOS 26, *)\n  public static var b: E\n}\npublic enum F {\n  case c\n}\n";
        let filter = ios(VersionRange::from("26"..));
        assert_eq!(
            filter.apply(source).unwrap(),
            "public enum E {\n  case a\n  @available(iOS 26, *)\n  public static var b: E\n}\n"
        );
    }

    #[test]
    fn stats_count_every_decision() {
        let source = "public struct S {\n  @available(iOS 26, *)\n  public struct T {\n    public var f: Int\n  }\n  public var g: Int\n}\npublic var h: Int\n";
        let filter = ios(VersionRange::from("26"..));
        let mut out = Vec::new();
        let stats = filter.apply_to(source, &mut out).unwrap();
        assert_eq!(
            stats,
            FilterStats {
                inspected: 5,
                satisfied: 1,
                retained: 2,
                replaced: 2,
            }
        );
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "public struct S {\n  @available(iOS 26, *)\n  public struct T {\n    public var f: Int\n  }\n}\n"
        );
    }

    #[test]
    fn removed_container_drops_nested_removals() {
        let source = "public struct S {\n  public var a: Int\n  public var b: Int\n}\n@available(iOS 26, *)\npublic struct T {}\n";
        let filter = ios(VersionRange::from("26"..));
        assert_eq!(
            filter.apply(source).unwrap(),
            "\n@available(iOS 26, *)\npublic struct T {}\n"
        );
    }

    #[test]
    fn parse_errors_surface() {
        let filter = ios(VersionRange::from("26"..));
        let err = filter.apply("public struct S {\n").unwrap_err();
        assert!(matches!(err, FilterError::Parse(_)));
    }

    #[test]
    fn writer_errors_surface() {
        struct Broken;
        impl io::Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("disk full"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let filter = ios(VersionRange::from("26"..));
        let err = filter.apply_to("import A\n", &mut Broken).unwrap_err();
        assert!(matches!(err, FilterError::Render(_)));
    }
}
