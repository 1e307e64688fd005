//! Diff command - API diff between two Python files on disk

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use difflog_core::{diff_sources_with, MemberPath};
use tracing::debug;

use super::report::{DiffReport, FileReport};
use super::DiffOptions;
use crate::output::{Output, OutputConfig};

fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Build the report for two files without printing it.
pub fn compare(
    old_file: &Path,
    new_file: &Path,
    options: &DiffOptions,
) -> anyhow::Result<DiffReport> {
    let start = Instant::now();

    let old = read_source(old_file)?;
    let new = read_source(new_file)?;

    let filter = |path: &MemberPath, name: &str| options.filter.allows(path, name);
    let diff = diff_sources_with(&old, &new, &filter).with_context(|| {
        format!(
            "Failed to diff {} against {}",
            old_file.display(),
            new_file.display()
        )
    })?;
    debug!(changes = diff.changes.len(), "Diffed files");

    let file = FileReport::from_diff(new_file.display().to_string(), diff, options.breaking_only);
    Ok(DiffReport::new(
        old_file.display().to_string(),
        new_file.display().to_string(),
        vec![file],
    )
    .with_duration(start.elapsed().as_millis() as u64))
}

/// Run the diff command. Returns whether a breaking change was reported.
pub fn run(
    old_file: &Path,
    new_file: &Path,
    options: &DiffOptions,
    config: OutputConfig,
) -> anyhow::Result<bool> {
    let report = compare(old_file, new_file, options)?;
    let breaking = report.has_breaking_changes();
    Output::with_config(report, config).render()?;
    Ok(breaking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DifflogConfig;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_compare_files() {
        let dir = TempDir::new().unwrap();
        let old = write(&dir, "old.py", "def f(a):\n    pass\n");
        let new = write(&dir, "new.py", "async def f(a):\n    pass\n");

        let report = compare(&old, &new, &DiffOptions::default()).unwrap();
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].changes[0].kind.as_str(), "asyncness_modified");
        assert!(report.has_breaking_changes());
    }

    #[test]
    fn test_compare_uses_visibility_filter() {
        let dir = TempDir::new().unwrap();
        let old = write(&dir, "old.py", "_x = 1\n");
        let new = write(&dir, "new.py", "_x = 2\n");

        let report = compare(&old, &new, &DiffOptions::default()).unwrap();
        assert_eq!(report.summary.total(), 0);

        let options = DiffOptions {
            filter: DifflogConfig::default().visibility_filter(true),
            breaking_only: false,
        };
        let report = compare(&old, &new, &options).unwrap();
        assert_eq!(report.summary.modified, 1);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let new = write(&dir, "new.py", "");
        let err = compare(&dir.path().join("absent.py"), &new, &DiffOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("absent.py"));
    }

    #[test]
    fn test_syntax_error_is_an_error() {
        let dir = TempDir::new().unwrap();
        let old = write(&dir, "old.py", "x = 1\n");
        let new = write(&dir, "new.py", "def (:\n");
        let err = compare(&old, &new, &DiffOptions::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("Syntax error"));
    }
}
