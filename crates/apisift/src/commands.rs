//! Command implementations behind the `apisift` binary.

use crate::batch::BatchReport;
use crate::config::ApisiftConfig;
use crate::sdk::{self, Framework};
use anyhow::{Context, bail};
use apisift_filter::{Conditions, FilterStats, Platform, VersionRange, filter_to};
use std::io::{self, Write};
use std::path::Path;

/// Parse a `PLATFORM=RANGE` command line condition such as `ios=26..`.
pub fn parse_condition(s: &str) -> Result<(Platform, VersionRange), String> {
    let (platform, range) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PLATFORM=RANGE, got `{s}`"))?;
    let platform = platform.parse::<Platform>().map_err(|e| e.to_string())?;
    let range = range.parse::<VersionRange>().map_err(|e| e.to_string())?;
    Ok((platform, range))
}

/// Conditions requested on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConditionArgs {
    /// `-c PLATFORM=RANGE`, repeatable.
    pub conditions: Vec<(Platform, VersionRange)>,
    /// Single-platform form: `--platform P --min A --max B`.
    pub platform: Option<Platform>,
    pub min: Option<String>,
    pub max: Option<String>,
}

impl ConditionArgs {
    fn is_empty(&self) -> bool {
        self.conditions.is_empty()
            && self.platform.is_none()
            && self.min.is_none()
            && self.max.is_none()
    }

    /// Conditions from the flags, or the configured defaults when no flag
    /// was given.
    pub fn resolve(&self, config: &ApisiftConfig) -> Conditions {
        if self.is_empty() {
            return config.conditions();
        }
        let mut conditions: Conditions = self.conditions.iter().cloned().collect();
        if self.platform.is_some() || self.min.is_some() || self.max.is_some() {
            let platform = self.platform.unwrap_or(Platform::Ios);
            let range = VersionRange::from_bounds(
                self.min.as_deref().unwrap_or(""),
                self.max.as_deref().unwrap_or(""),
            );
            conditions.extend(range.map(|range| (platform, range)));
        }
        conditions
    }
}

/// Filter one file into `out`.
pub fn filter_file_to<W: Write>(
    path: &Path,
    conditions: &Conditions,
    out: &mut W,
) -> anyhow::Result<FilterStats> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    filter_to(conditions, &source, out).with_context(|| format!("failed to filter {}", path.display()))
}

/// `apisift filter`
pub fn filter(
    path: &Path,
    conditions: &Conditions,
    output: Option<&Path>,
    show_stats: bool,
) -> anyhow::Result<()> {
    if conditions.is_empty() {
        tracing::info!("no conditions given; output is the input unchanged");
    }
    let stats = match output {
        Some(output) => {
            let mut buffer = Vec::new();
            let stats = filter_file_to(path, conditions, &mut buffer)?;
            std::fs::write(output, buffer)
                .with_context(|| format!("failed to write {}", output.display()))?;
            stats
        }
        None => {
            let stdout = io::stdout();
            let mut lock = io::BufWriter::new(stdout.lock());
            let stats = filter_file_to(path, conditions, &mut lock)?;
            lock.flush().context("failed to write to stdout")?;
            stats
        }
    };
    if show_stats {
        eprintln!("{stats}");
    }
    Ok(())
}

/// `apisift frameworks`
pub fn format_frameworks(frameworks: &[Framework], json: bool) -> anyhow::Result<String> {
    if json {
        return serde_json::to_string_pretty(frameworks).context("failed to serialize frameworks");
    }
    if frameworks.is_empty() {
        return Ok("No frameworks found".to_string());
    }
    let lines: Vec<String> = frameworks
        .iter()
        .map(|f| match &f.swiftinterface_path {
            Some(path) => format!("{}\t{}", f.name, path.display()),
            None => format!("{}\t-", f.name),
        })
        .collect();
    Ok(lines.join("\n"))
}

/// `apisift sdk`
pub fn filter_sdk(
    path: &Path,
    platform: Platform,
    conditions: &Conditions,
    out_dir: &Path,
) -> anyhow::Result<BatchReport> {
    let frameworks = sdk::discover(path, platform);
    if frameworks.is_empty() {
        bail!("no frameworks found under {}", path.display());
    }
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    tracing::info!(count = frameworks.len(), out = %out_dir.display(), "filtering frameworks");
    Ok(BatchReport::run(&frameworks, conditions, out_dir))
}
