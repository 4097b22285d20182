//! Availability filtering for Swift module interfaces.
//!
//! Given per-platform version windows, [`filter`] removes every declaration
//! that was not introduced inside a requested window, keeping containers
//! whose members were, and leaves all other text byte for byte as it was.
//!
//! ```ignore
//! use apisift_filter::{Conditions, Platform, VersionRange, filter};
//!
//! let conditions: Conditions = [(Platform::Ios, VersionRange::from("26"..))]
//!     .into_iter()
//!     .collect();
//! let text = filter(&conditions, &std::fs::read_to_string("Foo.swiftinterface")?)?;
//! ```

mod conditions;
mod filter;
mod platform;
mod version;

pub use conditions::Conditions;
pub use filter::{AvailabilityFilter, FilterError, FilterStats};
pub use platform::{Platform, UnknownPlatform};
pub use version::{ParseRangeError, VersionRange, compare_versions};

use std::io;

/// Filter `source`, returning it unchanged when `conditions` is empty.
pub fn filter(conditions: &Conditions, source: &str) -> Result<String, FilterError> {
    match AvailabilityFilter::new(conditions.clone()) {
        Some(filter) => filter.apply(source),
        None => Ok(source.to_string()),
    }
}

/// Streaming form of [`filter`]. With empty conditions the source is copied
/// as-is and the returned stats are all zero.
pub fn filter_to<W: io::Write>(
    conditions: &Conditions,
    source: &str,
    out: &mut W,
) -> Result<FilterStats, FilterError> {
    match AvailabilityFilter::new(conditions.clone()) {
        Some(filter) => filter.apply_to(source, out),
        None => {
            out.write_all(source.as_bytes())?;
            Ok(FilterStats::default())
        }
    }
}
