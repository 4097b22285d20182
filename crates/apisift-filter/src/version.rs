//! Version strings and half-open version ranges.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Range, RangeFrom, RangeTo};
use std::str::FromStr;

/// Compare two dotted version strings component by component.
///
/// Missing trailing components count as `0`, so `26` equals `26.0`.
/// Components made of ASCII digits compare numerically (of any length);
/// anything else compares as text. The result is a total order for any
/// input.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (l, r) => {
                let order = compare_component(l.unwrap_or("0"), r.unwrap_or("0"));
                if order != Ordering::Equal {
                    return order;
                }
            }
        }
    }
}

fn compare_component(a: &str, b: &str) -> Ordering {
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|c| c.is_ascii_digit());
    if numeric(a) && numeric(b) {
        let a = trim_zeros(a);
        let b = trim_zeros(b);
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    } else {
        a.cmp(b)
    }
}

fn trim_zeros(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() { "0" } else { trimmed }
}

/// Half-open version interval `[lower, upper)`; either side may be open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRange {
    lower: Option<String>,
    upper: Option<String>,
}

impl VersionRange {
    /// `lower..upper`
    pub fn new(lower: impl Into<String>, upper: impl Into<String>) -> Self {
        Self {
            lower: Some(lower.into()),
            upper: Some(upper.into()),
        }
    }

    /// `lower..`
    pub fn at_least(lower: impl Into<String>) -> Self {
        Self {
            lower: Some(lower.into()),
            upper: None,
        }
    }

    /// `..upper`
    pub fn below(upper: impl Into<String>) -> Self {
        Self {
            lower: None,
            upper: Some(upper.into()),
        }
    }

    /// Build a range from two text fields where an empty field is an open
    /// side. Returns `None` when both are empty.
    pub fn from_bounds(min: &str, max: &str) -> Option<Self> {
        let side = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        match (side(min), side(max)) {
            (None, None) => None,
            (lower, upper) => Some(Self { lower, upper }),
        }
    }

    /// `lower <= version < upper`, skipping absent bounds.
    pub fn contains(&self, version: &str) -> bool {
        let above_lower = self
            .lower
            .as_deref()
            .is_none_or(|lower| compare_versions(lower, version) != Ordering::Greater);
        let below_upper = self
            .upper
            .as_deref()
            .is_none_or(|upper| compare_versions(version, upper) == Ordering::Less);
        above_lower && below_upper
    }
}

impl From<Range<&str>> for VersionRange {
    fn from(range: Range<&str>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<RangeFrom<&str>> for VersionRange {
    fn from(range: RangeFrom<&str>) -> Self {
        Self::at_least(range.start)
    }
}

impl From<RangeTo<&str>> for VersionRange {
    fn from(range: RangeTo<&str>) -> Self {
        Self::below(range.end)
    }
}

/// Error parsing a [`VersionRange`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version range `{0}`: expected `MIN..MAX`, `MIN..`, `..MAX` or `MIN`")]
pub struct ParseRangeError(String);

impl FromStr for VersionRange {
    type Err = ParseRangeError;

    /// Accepts `a..b`, `a..`, `..b`, and a bare `a` meaning `a..`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseRangeError(s.to_string());
        let (min, max) = s.split_once("..").unwrap_or((s, ""));
        if max.starts_with('.') || max.contains("..") {
            return Err(invalid());
        }
        Self::from_bounds(min, max).ok_or_else(invalid)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.lower.as_deref().unwrap_or(""),
            self.upper.as_deref().unwrap_or("")
        )
    }
}

impl TryFrom<String> for VersionRange {
    type Error = ParseRangeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersionRange> for String {
    fn from(range: VersionRange) -> Self {
        range.to_string()
    }
}
