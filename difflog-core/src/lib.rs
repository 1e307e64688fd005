//! difflog core - Python API surface diffing.
//!
//! This crate builds an addressable model of a Python module's public API and
//! classifies the differences between two versions of it into typed change
//! events, flagging the ones likely to break callers.
//!
//! # Features
//!
//! - **Member model**: Classes, functions, attributes and arguments with stable paths
//! - **Structural diff**: Generic, bidirectional tree diff over the projected model
//! - **Classification**: Added/removed/modified events with breaking-change detection
//! - **Parallel processing**: Diffs many module pairs concurrently via Rayon
//! - **Python bindings**: Optional PyO3 module behind the `python` feature
//!
//! # Example
//!
//! ```
//! use difflog_core::{diff_sources, ChangeKind};
//!
//! let result = diff_sources("class Foo:\n    pass\n", "class Foo(Base):\n    pass\n").unwrap();
//! assert!(matches!(result.changes[0].kind, ChangeKind::BaseClassAdded { .. }));
//! ```

pub mod differ;
pub mod error;
pub mod members;
pub mod parser;

#[cfg(feature = "python")]
mod python;

pub use differ::{
    diff_modules_parallel, diff_sources, diff_sources_with, diff_trees, ApiChange, ApiDiff,
    ChangeCategory, ChangeKind, DiffSummary, ElementaryEdit, ModulePair, Scalar,
};
pub use error::{DiffError, Result};
pub use members::{
    build_from_source, build_module, build_module_with, include_all, is_public, Argument,
    ArgumentKind, AttributeMember, FunctionMember, LineRange, Member, MemberKind, MemberPath,
    Namespace, NamespaceKind,
};
pub use parser::{PythonParser, SourceParser};

/// Get the version of difflog-core.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
