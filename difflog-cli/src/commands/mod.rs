//! Command implementations for difflog CLI
//!
//! Each command module provides a `run` function that executes the command logic.

pub mod completions;
pub mod diff;
pub mod git;
pub mod report;

use crate::config::VisibilityFilter;

/// Settings shared by the diffing commands.
#[derive(Debug, Default)]
pub struct DiffOptions {
    pub filter: VisibilityFilter,
    /// Report only changes that may break callers.
    pub breaking_only: bool,
}
