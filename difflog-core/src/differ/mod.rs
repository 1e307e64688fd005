//! API diff engine for member trees.
//!
//! The pipeline has three stages:
//!
//! - **Projection** ([`tree`]): member trees become generic value trees
//! - **Structural diff** ([`structural`]): path-addressed elementary edits
//! - **Classification** ([`classifier`]): edits become typed [`ApiChange`]s
//!
//! # Example
//!
//! ```
//! use difflog_core::differ::diff_sources;
//!
//! let result = diff_sources("def f(a, b=1):\n    pass\n", "def f(a, b=2):\n    pass\n").unwrap();
//! for change in &result.changes {
//!     println!("{}", change);
//! }
//! assert_eq!(result.changes.len(), 1);
//! ```

pub mod changes;
pub mod classifier;
pub mod comparator;
pub mod structural;
pub mod tree;

pub use changes::{ApiChange, ApiDiff, ChangeCategory, ChangeKind, DiffSummary, Scalar};
pub use comparator::{
    diff_modules_parallel, diff_sources, diff_sources_with, diff_trees, ModulePair,
};
pub use structural::{EditAction, ElementaryEdit, PathSegment};
