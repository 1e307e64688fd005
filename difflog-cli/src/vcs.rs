//! Reading Python sources out of git revisions.

use std::path::Path;
use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Errors raised while talking to git.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to run git: {0}")]
    Unavailable(#[from] std::io::Error),

    #[error("`git {command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },
}

fn git(args: &[&str]) -> Result<std::process::Output, GitError> {
    debug!(?args, "Running git");
    // Untranslated messages, so missing paths can be told apart from failures.
    Ok(Command::new("git")
        .args(args)
        .env("LC_ALL", "C")
        .env("LANGUAGE", "C")
        .output()?)
}

pub fn is_python_file(path: &str) -> bool {
    Path::new(path).extension().and_then(|ext| ext.to_str()) == Some("py")
}

/// List Python files changed between `base_ref` and `head_ref`.
///
/// Uses the merge base of the two refs, like `git diff base...head`. When
/// `paths` is non-empty only files under those pathspecs are listed.
pub fn changed_python_files(
    base_ref: &str,
    head_ref: &str,
    paths: &[String],
) -> Result<Vec<String>, GitError> {
    let range = format!("{}...{}", base_ref, head_ref);
    let mut args = vec!["diff", "--name-only", range.as_str()];
    if !paths.is_empty() {
        args.push("--");
        args.extend(paths.iter().map(String::as_str));
    }

    let output = git(&args)?;
    if !output.status.success() {
        return Err(GitError::CommandFailed {
            command: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|line| is_python_file(line))
        .map(str::to_string)
        .collect())
}

/// Whether `git show` failed because the path is absent at that revision.
fn is_missing_path(stderr: &str) -> bool {
    stderr.contains("does not exist in") || stderr.contains("exists on disk, but not in")
}

/// Read a file as it exists at `git_ref`.
///
/// Returns `None` when the file does not exist at that revision. Any other
/// git failure, such as an unknown ref, is an error.
pub fn file_at_ref(git_ref: &str, file_path: &str) -> Result<Option<String>, GitError> {
    let spec = format!("{}:{}", git_ref, file_path);
    let output = git(&["show", &spec])?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if is_missing_path(&stderr) {
            debug!(%spec, "File missing at revision");
            return Ok(None);
        }
        return Err(GitError::CommandFailed {
            command: format!("show {}", spec),
            stderr,
        });
    }

    Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
}
