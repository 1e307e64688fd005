//! Git command - API diff of every changed Python file between two revisions
//!
//! A file that does not exist at one of the revisions is compared against an
//! empty module, so new files show up as additions and deleted files as
//! removals.

use std::time::Instant;

use anyhow::Context;
use difflog_core::{diff_modules_parallel, MemberPath, ModulePair};
use tracing::{debug, warn};

use super::report::{DiffReport, FileReport};
use super::DiffOptions;
use crate::output::{Output, OutputConfig};
use crate::vcs;

/// Fetch both sides of every changed Python file.
fn collect_pairs(
    base_ref: &str,
    head_ref: &str,
    paths: &[String],
) -> anyhow::Result<Vec<ModulePair>> {
    let files = vcs::changed_python_files(base_ref, head_ref, paths).with_context(|| {
        format!("Failed to list changes between {} and {}", base_ref, head_ref)
    })?;
    debug!(files = files.len(), "Changed Python files");

    files
        .into_iter()
        .map(|file| -> anyhow::Result<ModulePair> {
            let old = vcs::file_at_ref(base_ref, &file)?.unwrap_or_default();
            let new = vcs::file_at_ref(head_ref, &file)?.unwrap_or_default();
            Ok(ModulePair::new(file, old, new))
        })
        .collect()
}

/// Diff already-fetched module pairs into a report.
///
/// Files that fail to diff are kept in the report with their error.
pub fn compare_pairs(
    base_ref: &str,
    head_ref: &str,
    pairs: &[ModulePair],
    options: &DiffOptions,
) -> DiffReport {
    let filter = |path: &MemberPath, name: &str| options.filter.allows(path, name);
    let results = diff_modules_parallel(pairs, &filter, None);

    let files = pairs
        .iter()
        .zip(results)
        .map(|(pair, result)| match result {
            Ok(diff) => FileReport::from_diff(pair.name.clone(), diff, options.breaking_only),
            Err(e) => {
                debug!(module = %pair.name, error = %e, "Module failed to diff");
                FileReport::failed(pair.name.clone(), e.to_string())
            }
        })
        .collect();

    DiffReport::new(base_ref, head_ref, files)
}

/// Run the git command. Returns whether a breaking change was reported.
pub fn run(
    base_ref: &str,
    head_ref: &str,
    paths: &[String],
    options: &DiffOptions,
    config: OutputConfig,
) -> anyhow::Result<bool> {
    let start = Instant::now();

    let pairs = collect_pairs(base_ref, head_ref, paths)?;
    let report = compare_pairs(base_ref, head_ref, &pairs, options)
        .with_duration(start.elapsed().as_millis() as u64);

    if report.has_errors() {
        let failed = report.files.iter().filter(|f| f.error.is_some()).count();
        warn!("{} of {} files could not be diffed", failed, report.files.len());
    }

    let breaking = report.has_breaking_changes();
    Output::with_config(report, config).render()?;
    Ok(breaking)
}
