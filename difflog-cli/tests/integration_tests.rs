//! Integration tests for difflog CLI
//!
//! Runs the built binary against temporary directories.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

fn difflog_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_difflog"))
}

/// Run difflog with the given args in the specified directory
fn run_difflog(dir: &Path, args: &[&str]) -> Output {
    difflog_binary()
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute difflog command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(&path, content).expect("Failed to write file");
    path
}

const OLD_API: &str = r#"
"""Calculator module."""

VERSION = "1.0"


class Calculator:
    def add(self, a: int, b: int) -> int:
        return a + b

    def _cache(self):
        pass


def greet(name: str) -> str:
    return f"Hello, {name}!"
"#;

const NEW_API: &str = r#"
"""Calculator module."""

VERSION = "1.1"


class Calculator(Base):
    def add(self, a: int, b: int = 0) -> int:
        return a + b

    def _cache(self, size=128):
        pass


def shout(name: str) -> str:
    return name.upper()
"#;

/// Write the old and new versions of the sample module.
fn setup_versions(dir: &Path) {
    write_file(dir, "old.py", OLD_API);
    write_file(dir, "new.py", NEW_API);
}

fn parse_json(output: &Output) -> serde_json::Value {
    serde_json::from_str(&stdout(output)).expect("stdout should be valid JSON")
}

// ============================================================================
// Diff Command Tests
// ============================================================================

#[test]
fn test_diff_identical_files() {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "a.py", OLD_API);
    write_file(temp_dir.path(), "b.py", OLD_API);

    let output = run_difflog(temp_dir.path(), &["diff", "a.py", "b.py"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("No API changes detected."));
}

#[test]
fn test_diff_table_output() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(temp_dir.path());

    let output = run_difflog(temp_dir.path(), &["diff", "old.py", "new.py"]);
    let stdout_str = stdout(&output);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout_str.contains("DIFF: old.py -> new.py"));
    assert!(stdout_str.contains("+ Added function `shout`"));
    assert!(stdout_str.contains("- Removed function `greet` [breaking]"));
    assert!(stdout_str.contains("+ Added base class `Base` to `Calculator` at position 0"));
    assert!(stdout_str
        .contains("~ Changed default of argument `b` of `Calculator.add` from `(none)` to `0`"));
    assert!(stdout_str.contains("~ Changed value of `VERSION` from `'1.0'` to `'1.1'`"));
    assert!(!stdout_str.contains("_cache"), "private members are hidden by default");
}

#[test]
fn test_diff_json_output() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(temp_dir.path());

    let output = run_difflog(
        temp_dir.path(),
        &["diff", "old.py", "new.py", "--format", "json"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json = parse_json(&output);
    assert_eq!(json["base"], "old.py");
    assert_eq!(json["files"][0]["path"], "new.py");
    assert_eq!(json["summary"]["added"], 2);
    assert_eq!(json["summary"]["removed"], 1);
    assert_eq!(json["summary"]["modified"], 2);
    assert_eq!(json["summary"]["breaking"], 1);

    let changes = json["files"][0]["changes"].as_array().unwrap();
    let removed = changes
        .iter()
        .find(|c| c["change"] == "member_removed")
        .expect("greet should be removed");
    assert_eq!(removed["name"], "greet");
    assert_eq!(removed["path"], "");
    assert_eq!(removed["kind"], "function");
}

#[test]
fn test_diff_csv_output() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(temp_dir.path());

    let output = run_difflog(
        temp_dir.path(),
        &["diff", "old.py", "new.py", "--format", "csv"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let stdout_str = stdout(&output);
    let lines: Vec<_> = stdout_str.lines().collect();
    assert_eq!(lines[0], "file,member,change,category,breaking,description");
    assert_eq!(lines.len(), 6);
    assert!(lines.iter().any(|l| l.starts_with("new.py,greet,member_removed,removed,true,")));
}

#[test]
fn test_diff_breaking_only() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(temp_dir.path());

    let output = run_difflog(
        temp_dir.path(),
        &["diff", "old.py", "new.py", "--breaking-only", "--format", "json"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json = parse_json(&output);
    let changes = json["files"][0]["changes"].as_array().unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0]["name"], "greet");
}

#[test]
fn test_fail_on_breaking_sets_exit_code() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(temp_dir.path());

    let output = run_difflog(
        temp_dir.path(),
        &["diff", "old.py", "new.py", "--fail-on-breaking"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Removed function `greet`"));

    // Additions alone are not breaking
    write_file(temp_dir.path(), "grown.py", &format!("{}\nEXTRA = 1\n", OLD_API));
    let output = run_difflog(
        temp_dir.path(),
        &["diff", "old.py", "grown.py", "--fail-on-breaking"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
}

#[test]
fn test_include_private() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(temp_dir.path());

    let output = run_difflog(
        temp_dir.path(),
        &["diff", "old.py", "new.py", "--include-private"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Added positional or keyword argument `Calculator._cache.size`"));
}

#[test]
fn test_diff_syntax_error() {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "old.py", "x = 1\n");
    write_file(temp_dir.path(), "new.py", "def broken(:\n    pass\n");

    let output = run_difflog(temp_dir.path(), &["diff", "old.py", "new.py"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Syntax error"), "stderr: {}", stderr(&output));
}

#[test]
fn test_diff_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), "old.py", "x = 1\n");

    let output = run_difflog(temp_dir.path(), &["diff", "old.py", "nope.py"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("nope.py"));
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_config_sets_default_format() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(temp_dir.path());
    write_file(temp_dir.path(), ".difflogrc.toml", "[output]\nformat = \"json\"\n");

    let output = run_difflog(temp_dir.path(), &["diff", "old.py", "new.py"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(parse_json(&output)["summary"].is_object());

    // The flag still wins over the config file
    let output = run_difflog(
        temp_dir.path(),
        &["diff", "old.py", "new.py", "--format", "csv"],
    );
    assert!(stdout(&output).starts_with("file,member,change"));
}

#[test]
fn test_config_ignore_patterns() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(temp_dir.path());
    write_file(
        temp_dir.path(),
        ".difflogrc.toml",
        "[visibility]\nignore = [\"^Calculator\", \"^VERSION$\"]\n",
    );

    let output = run_difflog(
        temp_dir.path(),
        &["diff", "old.py", "new.py", "--format", "json"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json = parse_json(&output);
    let names: Vec<_> = json["files"][0]["changes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["greet", "shout"]);
}

#[test]
fn test_invalid_config_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    setup_versions(temp_dir.path());
    write_file(temp_dir.path(), ".difflogrc.toml", "[output\nformat = ");

    let output = run_difflog(temp_dir.path(), &["diff", "old.py", "new.py"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("DIFF:"));
    assert!(stderr(&output).contains("Failed to parse .difflogrc.toml"));
}

// ============================================================================
// Git Command Tests
// ============================================================================

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .current_dir(dir)
        .args([
            "-c",
            "user.name=difflog",
            "-c",
            "user.email=difflog@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .output()
        .expect("Failed to run git")
        .status;
    assert!(status.success(), "git {:?} failed", args);
}

#[test]
fn test_git_between_commits() {
    if !git_available() {
        return;
    }
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    git(dir, &["init", "-q"]);
    write_file(dir, "pkg/api.py", OLD_API);
    write_file(dir, "pkg/gone.py", "def legacy():\n    pass\n");
    write_file(dir, "README.md", "docs\n");
    git(dir, &["add", "."]);
    git(dir, &["commit", "-q", "-m", "initial"]);

    write_file(dir, "pkg/api.py", NEW_API);
    write_file(dir, "pkg/fresh.py", "def hello():\n    pass\n");
    write_file(dir, "README.md", "more docs\n");
    fs::remove_file(dir.join("pkg/gone.py")).unwrap();
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-q", "-m", "update"]);

    let output = run_difflog(dir, &["git", "HEAD~1", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json = parse_json(&output);
    let paths: Vec<_> = json["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["path"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(paths, vec!["pkg/api.py", "pkg/fresh.py", "pkg/gone.py"]);
    assert_eq!(json["files"][1]["changes"][0]["change"], "member_added");
    assert_eq!(json["files"][2]["changes"][0]["change"], "member_removed");

    let output = run_difflog(dir, &["git", "HEAD~1", "HEAD", "--path", "pkg/fresh.py"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout_str = stdout(&output);
    assert!(stdout_str.contains("pkg/fresh.py"));
    assert!(!stdout_str.contains("pkg/api.py"));
}

#[test]
fn test_git_outside_repository_fails() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_difflog(temp_dir.path(), &["git", "HEAD~1"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to list changes between HEAD~1 and HEAD"));
}

// ============================================================================
// Completions and Help
// ============================================================================

#[test]
fn test_completions_bash() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_difflog(temp_dir.path(), &["completions", "bash"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("difflog"));
}

#[test]
fn test_completions_instructions_json() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_difflog(
        temp_dir.path(),
        &["completions", "zsh", "--instructions", "--format", "json"],
    );

    assert!(output.status.success());
    let json = parse_json(&output);
    assert_eq!(json["shell"], "zsh");
}

#[test]
fn test_help_lists_commands() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_difflog(temp_dir.path(), &["--help"]);

    assert!(output.status.success());
    let stdout_str = stdout(&output);
    for command in ["diff", "git", "completions"] {
        assert!(stdout_str.contains(command), "missing {}", command);
    }
}
