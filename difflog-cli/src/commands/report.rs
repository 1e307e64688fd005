//! Report shared by the `diff` and `git` commands.

use colored::Colorize;
use difflog_core::{ApiChange, ApiDiff, ChangeCategory, DiffSummary, ElementaryEdit};
use serde::Serialize;

use crate::output::{Column, CsvOutput, OutputConfig, Outputter};

/// Changes found in one module.
#[derive(Debug, Default, Serialize)]
pub struct FileReport {
    pub path: String,
    pub changes: Vec<ApiChange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unclassified: Vec<ElementaryEdit>,
    pub summary: DiffSummary,
    /// Set when the module could not be diffed, e.g. a syntax error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn from_diff(path: impl Into<String>, mut diff: ApiDiff, breaking_only: bool) -> Self {
        if breaking_only {
            diff.retain_breaking();
        }
        Self {
            path: path.into(),
            changes: diff.changes,
            unclassified: diff.unclassified,
            summary: diff.summary,
            error: None,
        }
    }

    pub fn failed(path: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Result of a diff run across one or more modules.
#[derive(Debug, Serialize)]
pub struct DiffReport {
    pub base: String,
    pub head: String,
    pub files: Vec<FileReport>,
    pub summary: DiffSummary,
    pub duration_ms: u64,
}

impl DiffReport {
    pub fn new(base: impl Into<String>, head: impl Into<String>, files: Vec<FileReport>) -> Self {
        let mut summary = DiffSummary::default();
        for file in &files {
            summary.merge(&file.summary);
        }
        Self {
            base: base.into(),
            head: head.into(),
            files,
            summary,
            duration_ms: 0,
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn has_breaking_changes(&self) -> bool {
        self.summary.breaking > 0
    }

    pub fn has_errors(&self) -> bool {
        self.files.iter().any(|f| f.error.is_some())
    }

    fn rows(&self) -> Vec<ChangeRow> {
        self.files
            .iter()
            .flat_map(|file| {
                file.changes.iter().map(move |change| ChangeRow {
                    file: file.path.clone(),
                    member: change.full_name(),
                    change: change.kind.as_str(),
                    category: change.kind.category().as_str(),
                    breaking: change.is_breaking(),
                    description: change.to_string(),
                })
            })
            .collect()
    }
}

/// Flat view of one change for CSV export.
#[derive(Debug, Serialize)]
struct ChangeRow {
    file: String,
    member: String,
    change: &'static str,
    category: &'static str,
    breaking: bool,
    description: String,
}

fn format_change(change: &ApiChange) -> String {
    let line = change.to_string();
    let (marker, line) = match change.kind.category() {
        ChangeCategory::Added => ("+".green(), line.green()),
        ChangeCategory::Removed => ("-".red(), line.red()),
        ChangeCategory::Modified => ("~".yellow(), line.yellow()),
    };
    if change.is_breaking() {
        format!("  {} {} {}\n", marker, line, "[breaking]".red().bold())
    } else {
        format!("  {} {}\n", marker, line)
    }
}

impl Outputter for DiffReport {
    fn to_table(&self, _config: &OutputConfig) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {} -> {}\n",
            "DIFF:".cyan().bold(),
            self.base.yellow(),
            self.head.green()
        ));

        let files_with_output: Vec<&FileReport> = self
            .files
            .iter()
            .filter(|f| !f.changes.is_empty() || f.error.is_some())
            .collect();

        if files_with_output.is_empty() {
            output.push_str(&format!("\n{}\n", "No API changes detected.".dimmed()));
            return output;
        }

        for file in files_with_output {
            output.push_str(&format!("\n{}\n", file.path.bold()));
            if let Some(ref error) = file.error {
                output.push_str(&format!("  {} {}\n", "!".red().bold(), error.red()));
                continue;
            }
            for change in &file.changes {
                output.push_str(&format_change(change));
            }
            if !file.unclassified.is_empty() {
                output.push_str(&format!(
                    "  {}\n",
                    format!("{} unclassified edits", file.unclassified.len()).dimmed()
                ));
            }
        }

        output.push_str(&format!(
            "\n{} {} in {} file(s) ({}ms)",
            "Summary:".cyan().bold(),
            self.summary.text(),
            self.files.len(),
            self.duration_ms
        ));
        output
    }

    fn to_csv(&self, config: &OutputConfig) -> String {
        let columns = [
            Column::new("file", "file"),
            Column::new("member", "member"),
            Column::new("change", "change"),
            Column::new("category", "category"),
            Column::new("breaking", "breaking"),
            Column::new("description", "description"),
        ];
        CsvOutput::format_with_columns(&self.rows(), &columns, config)
    }
}
