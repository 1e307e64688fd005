//! Python bindings.

use pyo3::exceptions::{PyRuntimeError, PySyntaxError, PyValueError};
use pyo3::prelude::*;

use crate::differ::{diff_sources_with, ApiDiff};
use crate::error::DiffError;
use crate::members::{include_all, is_public};

fn to_py_err(err: DiffError) -> PyErr {
    match err {
        DiffError::Syntax { .. } => PySyntaxError::new_err(err.to_string()),
        DiffError::Language(_) => PyValueError::new_err(err.to_string()),
        DiffError::PathResolution { .. } => PyRuntimeError::new_err(err.to_string()),
    }
}

fn run(py: Python<'_>, old: &str, new: &str, include_private: bool) -> PyResult<ApiDiff> {
    // Release GIL during computation
    py.allow_threads(|| {
        if include_private {
            diff_sources_with(old, new, &include_all)
        } else {
            diff_sources_with(old, new, &is_public)
        }
    })
    .map_err(to_py_err)
}

/// Diff two module sources.
///
/// # Returns
///
/// One description per change, sorted.
#[pyfunction]
#[pyo3(signature = (old, new, include_private=false))]
fn diff(py: Python<'_>, old: &str, new: &str, include_private: bool) -> PyResult<Vec<String>> {
    let result = run(py, old, new, include_private)?;
    Ok(result.changes.iter().map(ToString::to_string).collect())
}

/// Diff two module sources and return the full report as JSON.
#[pyfunction]
#[pyo3(signature = (old, new, include_private=false))]
fn diff_json(py: Python<'_>, old: &str, new: &str, include_private: bool) -> PyResult<String> {
    let result = run(py, old, new, include_private)?;
    serde_json::to_string_pretty(&result).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Get the version of difflog-core.
#[pyfunction]
fn version() -> &'static str {
    crate::version()
}

/// Python module definition.
#[pymodule]
fn _difflog(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(diff, m)?)?;
    m.add_function(wrap_pyfunction!(diff_json, m)?)?;
    m.add_function(wrap_pyfunction!(version, m)?)?;
    Ok(())
}
