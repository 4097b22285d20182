//! Framework discovery inside an SDK or an Xcode bundle.

use apisift_filter::Platform;
use serde::Serialize;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A `.framework` bundle and its textual interface, if it ships one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Framework {
    pub name: String,
    pub framework_path: PathBuf,
    pub swiftinterface_path: Option<PathBuf>,
}

/// SDK directory name for a platform (`iPhoneOS` for `iPhoneOS.sdk`).
pub fn sdk_name(platform: Platform) -> &'static str {
    match platform {
        Platform::Ios => "iPhoneOS",
        Platform::Macos | Platform::Maccatalyst => "MacOSX",
        Platform::Tvos => "AppleTVOS",
        Platform::Watchos => "WatchOS",
        Platform::Visionos => "XROS",
    }
}

/// Directory holding the frameworks for `path`.
///
/// An Xcode bundle (any final component containing `Xcode`) resolves to the
/// platform SDK's `System/Library/Frameworks`; anything else is used as-is.
pub fn frameworks_dir(path: &Path, platform: Platform) -> PathBuf {
    let is_xcode = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().contains("Xcode"));
    if !is_xcode {
        return path.to_path_buf();
    }
    let sdk = sdk_name(platform);
    path.join("Contents/Developer/Platforms")
        .join(format!("{sdk}.platform"))
        .join("Developer/SDKs")
        .join(format!("{sdk}.sdk"))
        .join("System/Library/Frameworks")
}

/// List the frameworks under `path`, sorted by name in natural order.
///
/// A missing or non-directory target yields an empty list.
pub fn discover(path: &Path, platform: Platform) -> Vec<Framework> {
    let dir = frameworks_dir(path, platform);
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "no frameworks directory");
        return Vec::new();
    }

    let mut frameworks: Vec<Framework> = list_dir(&dir)
        .into_iter()
        .filter(|p| p.extension().is_some_and(|ext| ext == "framework"))
        .filter_map(|framework_path| {
            let file_name = framework_path.file_name()?.to_string_lossy().into_owned();
            let name = file_name.split('.').next().unwrap_or_default().to_string();
            let swiftinterface_path = find_swiftinterface(&framework_path, &name);
            Some(Framework {
                name,
                framework_path,
                swiftinterface_path,
            })
        })
        .collect();

    frameworks.sort_by(|a, b| natural_cmp(&a.name, &b.name));
    tracing::debug!(dir = %dir.display(), count = frameworks.len(), "discovered frameworks");
    frameworks
}

/// Immediate children of `dir`, in file name order.
fn list_dir(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .collect()
}

/// First `*.swiftinterface` in `Modules/<name>.swiftmodule/`, preferring
/// public interfaces over `.private.swiftinterface` ones.
fn find_swiftinterface(framework_path: &Path, name: &str) -> Option<PathBuf> {
    let module_dir = framework_path
        .join("Modules")
        .join(format!("{name}.swiftmodule"));
    if !module_dir.is_dir() {
        return None;
    }
    let interfaces: Vec<PathBuf> = list_dir(&module_dir)
        .into_iter()
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "swiftinterface"))
        .collect();
    let is_private = |p: &PathBuf| {
        p.file_name()
            .is_some_and(|n| n.to_string_lossy().ends_with(".private.swiftinterface"))
    };
    interfaces
        .iter()
        .find(|p| !is_private(p))
        .or_else(|| interfaces.first())
        .cloned()
}

/// Compare names the way a file browser does: digit runs by value, other
/// text case-insensitively (`Foo2` < `Foo10`, `a` < `B`).
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Chunks(a);
    let mut right = Chunks(b);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let order = compare_chunk(l, r);
                if order != Ordering::Equal {
                    return order;
                }
            }
        }
    }
}

fn compare_chunk(a: &str, b: &str) -> Ordering {
    let digits = |s: &str| s.as_bytes().first().is_some_and(u8::is_ascii_digit);
    match (digits(a), digits(b)) {
        (true, true) => {
            let a = a.trim_start_matches('0');
            let b = b.trim_start_matches('0');
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        }
        _ => a
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(b.chars().flat_map(char::to_lowercase)),
    }
}

/// Splits a string into alternating runs of ASCII digits and other text.
struct Chunks<'a>(&'a str);

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let first = self.0.as_bytes().first()?;
        let is_digit = first.is_ascii_digit();
        let end = self
            .0
            .bytes()
            .position(|c| c.is_ascii_digit() != is_digit)
            .unwrap_or(self.0.len());
        let (chunk, rest) = self.0.split_at(end);
        self.0 = rest;
        Some(chunk)
    }
}
