//! Type conversion utilities for FFI boundary
//!
//! Records cross the boundary as plain Python dicts and lists. They are
//! bridged through JSON so that the same lenient decoding applies as for
//! any other caller: a malformed number in a dict becomes 0, not an error.

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyModule};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::config::PayrollConfig;

/// Convert a Python object (dict, list, scalar) into a Rust record
///
/// # Errors
/// Returns PyValueError if the object is not JSON-serializable or does not
/// have the record's shape (e.g. a list where a dict is expected).
pub fn from_py<T: DeserializeOwned>(obj: &Bound<'_, PyAny>, what: &str) -> PyResult<T> {
    let py = obj.py();
    let json = PyModule::import_bound(py, "json")?;
    let builtins = PyModule::import_bound(py, "builtins")?;

    // Dates and other non-JSON values are passed on as their str()
    let kwargs = PyDict::new_bound(py);
    kwargs.set_item("default", builtins.getattr("str")?)?;

    let text: String = json
        .call_method("dumps", (obj.clone(),), Some(&kwargs))?
        .extract()?;

    serde_json::from_str(&text).map_err(|e| {
        PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Invalid {}: {}", what, e))
    })
}

/// Convert a Rust record into plain Python dicts and lists
pub fn to_py<T: Serialize>(py: Python<'_>, value: &T) -> PyResult<PyObject> {
    let text = serde_json::to_string(value).map_err(|e| {
        PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("Serialization failed: {}", e))
    })?;
    let json = PyModule::import_bound(py, "json")?;
    Ok(json.call_method1("loads", (text,))?.unbind())
}

/// Parse an optional config dict, falling back to the defaults
///
/// # Errors
/// Returns PyValueError if the config does not validate.
pub fn parse_payroll_config(config: Option<&Bound<'_, PyAny>>) -> PyResult<PayrollConfig> {
    let config: PayrollConfig = match config {
        Some(obj) if !obj.is_none() => from_py(obj, "config")?,
        _ => PayrollConfig::default(),
    };
    config.validate().map_err(|e| {
        PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Invalid config: {}", e))
    })?;
    Ok(config)
}
