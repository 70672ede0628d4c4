//! Python bindings (enabled with the `pyo3` feature)

pub mod payroll;
pub mod types;

use pyo3::prelude::*;

/// Register all functions on the extension module
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(payroll::requested_fiat_for_symbol, m)?)?;
    m.add_function(wrap_pyfunction!(payroll::resolve_net_salary, m)?)?;
    m.add_function(wrap_pyfunction!(payroll::transactions_for_employee, m)?)?;
    m.add_function(wrap_pyfunction!(payroll::plan_payroll_run, m)?)?;
    Ok(())
}
