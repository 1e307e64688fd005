//! Source parsing boundary.
//!
//! The member builder only sees the owned [`syntax`] model. Concrete parsers
//! implement [`SourceParser`] and lower their own trees into it, rendering
//! every expression to canonical text on the way.

pub mod python;
pub mod syntax;

mod helpers;

use crate::error::Result;

pub use python::PythonParser;

/// A parser that turns source text into the syntax model.
pub trait SourceParser {
    /// Parse a whole module.
    ///
    /// Fails with [`DiffError::Syntax`](crate::DiffError::Syntax) on invalid
    /// source; no partial module is returned.
    fn parse(&self, source: &str) -> Result<syntax::Module>;
}

/// Parse source code for a specific language.
pub fn parse_source(source: &str, language: &str) -> Result<syntax::Module> {
    match language.to_lowercase().as_str() {
        "python" | "py" => PythonParser.parse(source),
        _ => Err(crate::DiffError::Language(format!(
            "Unsupported language: {}",
            language
        ))),
    }
}

/// Get supported languages.
pub fn supported_languages() -> &'static [&'static str] {
    &["python", "py"]
}
