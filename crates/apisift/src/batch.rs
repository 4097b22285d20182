//! Filtering every interface of an SDK in parallel.

use crate::sdk::Framework;
use anyhow::Context;
use apisift_filter::{Conditions, FilterStats, filter_to};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Outcome for one framework.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    Written { output: PathBuf, stats: FilterStats },
    /// The framework ships no textual interface.
    Skipped,
    Failed { message: String },
}

#[derive(Debug, Serialize)]
pub struct BatchEntry {
    pub name: String,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    /// Filter each framework's interface into `out_dir/<name>.swiftinterface`.
    pub fn run(frameworks: &[Framework], conditions: &Conditions, out_dir: &Path) -> Self {
        let entries = frameworks
            .par_iter()
            .map(|framework| {
                let outcome = match &framework.swiftinterface_path {
                    None => BatchOutcome::Skipped,
                    Some(input) => match filter_one(input, &framework.name, conditions, out_dir) {
                        Ok((output, stats)) => BatchOutcome::Written { output, stats },
                        Err(e) => {
                            tracing::warn!(framework = %framework.name, "{e:#}");
                            BatchOutcome::Failed {
                                message: format!("{e:#}"),
                            }
                        }
                    },
                };
                BatchEntry {
                    name: framework.name.clone(),
                    outcome,
                }
            })
            .collect();
        Self { entries }
    }

    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, BatchOutcome::Written { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, BatchOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, BatchOutcome::Failed { .. }))
    }

    /// Returns true if any framework failed.
    pub fn has_errors(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&BatchOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }

    pub fn format_text(&self) -> String {
        let mut lines = Vec::new();
        for entry in &self.entries {
            match &entry.outcome {
                BatchOutcome::Written { output, stats } => {
                    lines.push(format!("{}: {} -> {}", entry.name, stats, output.display()))
                }
                BatchOutcome::Skipped => lines.push(format!("{}: no swiftinterface", entry.name)),
                BatchOutcome::Failed { message } => {
                    lines.push(format!("{}: error: {}", entry.name, message))
                }
            }
        }
        lines.push(format!(
            "{} written, {} skipped, {} failed",
            self.written(),
            self.skipped(),
            self.failed()
        ));
        lines.join("\n")
    }
}

fn filter_one(
    input: &Path,
    name: &str,
    conditions: &Conditions,
    out_dir: &Path,
) -> anyhow::Result<(PathBuf, FilterStats)> {
    let source = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let mut filtered = Vec::with_capacity(source.len());
    let stats = filter_to(conditions, &source, &mut filtered)
        .with_context(|| format!("failed to filter {}", input.display()))?;
    let output = out_dir.join(format!("{name}.swiftinterface"));
    std::fs::write(&output, filtered)
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok((output, stats))
}
