//! Host side of apisift: configuration, SDK discovery and batch filtering
//! around [`apisift_filter`].

pub mod batch;
pub mod commands;
pub mod config;
pub mod sdk;

pub use apisift_filter::{Conditions, Platform, VersionRange};
