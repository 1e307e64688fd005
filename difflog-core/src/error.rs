//! Error types for difflog-core.

use thiserror::Error;

/// Result type alias for difflog-core operations.
pub type Result<T> = std::result::Result<T, DiffError>;

/// Errors that can occur while building or diffing member trees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiffError {
    /// The source text is not valid Python.
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        /// 1-indexed line of the first invalid node.
        line: u32,
        /// 1-indexed column of the first invalid node.
        column: u32,
        /// Description of the invalid construct.
        message: String,
    },

    /// The grammar could not be loaded into the parser.
    #[error("Failed to load grammar: {0}")]
    Language(String),

    /// An edit path did not resolve against the tree it was produced from.
    ///
    /// Both trees come from the same builder, so this indicates a bug rather
    /// than bad input.
    #[error("Internal error: path `{path}` does not resolve in the member tree")]
    PathResolution {
        /// The unresolvable path, rendered with `/` separators.
        path: String,
    },
}
