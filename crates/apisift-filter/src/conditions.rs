//! Per-platform version constraints.

use crate::platform::Platform;
use crate::version::VersionRange;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One version range per platform. Platforms without an entry are
/// unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conditions {
    ranges: BTreeMap<Platform, VersionRange>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, platform: Platform) -> Option<&VersionRange> {
        self.ranges.get(&platform)
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Platform, &VersionRange)> {
        self.ranges.iter().map(|(platform, range)| (*platform, range))
    }

    /// Whether an attribute introducing `version` on the platform written as
    /// `token` falls inside a requested range.
    pub fn admits(&self, token: &str, version: &str) -> bool {
        self.iter()
            .any(|(platform, range)| platform.attribute_name() == token && range.contains(version))
    }
}

impl FromIterator<(Platform, VersionRange)> for Conditions {
    fn from_iter<I: IntoIterator<Item = (Platform, VersionRange)>>(iter: I) -> Self {
        Self {
            ranges: iter.into_iter().collect(),
        }
    }
}

impl Extend<(Platform, VersionRange)> for Conditions {
    fn extend<I: IntoIterator<Item = (Platform, VersionRange)>>(&mut self, iter: I) {
        self.ranges.extend(iter);
    }
}
