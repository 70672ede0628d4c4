//! PyO3 functions for the payroll core
//!
//! Exposes the allocation, reconciliation and planning entry points to the
//! Python backend so it computes the same figures as every other caller.
//!
//! # Example (from Python)
//!
//! ```python
//! from crypto_payroll_core_rs import requested_fiat_for_symbol, plan_payroll_run
//!
//! emp = {"user_id": "marie.roy", "net_salary": 4000, "percent_to_crypto": 10,
//!        "crypto_split": {"BTC": 50}, "receiving_addresses": {"BTC": "bc1q..."}}
//! requested_fiat_for_symbol(emp, "BTC", needs_address=True)  # 200.0
//!
//! plan = plan_payroll_run([emp], {"custody": False}, "BTC", 50000.0)
//! plan["fiat_total"]  # 200.0
//! ```

use pyo3::prelude::*;
use serde_json::Value;

use super::types::{from_py, parse_payroll_config, to_py};
use crate::allocation::{self, AllocationOptions};
use crate::models::{CompanySettings, Employee, TransactionBatch};
use crate::payroll::PayrollPlanner;
use crate::reconcile::{self, prices_from_value};

fn parse_employee(employee: Option<&Bound<'_, PyAny>>) -> PyResult<Option<Employee>> {
    match employee {
        Some(obj) if !obj.is_none() => Ok(Some(from_py(obj, "employee")?)),
        _ => Ok(None),
    }
}

/// Fiat an employee requests to convert into `symbol` this cycle
#[pyfunction]
#[pyo3(signature = (employee, symbol, needs_address = false))]
pub fn requested_fiat_for_symbol(
    employee: Option<&Bound<'_, PyAny>>,
    symbol: Option<String>,
    needs_address: bool,
) -> PyResult<f64> {
    let employee = parse_employee(employee)?;
    Ok(allocation::requested_fiat_for_symbol(
        employee.as_ref(),
        symbol.as_deref(),
        AllocationOptions { needs_address },
    ))
}

/// Net salary, estimated from gross when net is not recorded
#[pyfunction]
pub fn resolve_net_salary(employee: &Bound<'_, PyAny>) -> PyResult<f64> {
    let employee: Employee = from_py(employee, "employee")?;
    Ok(allocation::resolve_net_salary(&employee))
}

/// Payouts attributable to an employee, as a list of dicts
#[pyfunction]
#[pyo3(signature = (employee, transactions, prices = None))]
pub fn transactions_for_employee(
    py: Python<'_>,
    employee: Option<&Bound<'_, PyAny>>,
    transactions: &Bound<'_, PyAny>,
    prices: Option<&Bound<'_, PyAny>>,
) -> PyResult<PyObject> {
    let employee = parse_employee(employee)?;
    let transactions: Vec<TransactionBatch> = from_py(transactions, "transactions")?;
    let prices = match prices {
        Some(obj) if !obj.is_none() => prices_from_value(&from_py::<Value>(obj, "prices")?),
        _ => reconcile::Prices::new(),
    };

    let records = reconcile::transactions_for_employee(employee.as_ref(), &transactions, &prices);
    to_py(py, &records)
}

/// Plan a payroll run, as a dict
///
/// Raises ValueError with a user-facing message when the run cannot go
/// ahead.
#[pyfunction]
#[pyo3(signature = (employees, company, symbol, price, config = None))]
pub fn plan_payroll_run(
    py: Python<'_>,
    employees: &Bound<'_, PyAny>,
    company: &Bound<'_, PyAny>,
    symbol: &str,
    price: f64,
    config: Option<&Bound<'_, PyAny>>,
) -> PyResult<PyObject> {
    let employees: Vec<Employee> = from_py(employees, "employees")?;
    let company: CompanySettings = from_py(company, "company")?;
    let config = parse_payroll_config(config)?;

    let plan = PayrollPlanner::new(config)
        .plan(&employees, &company, symbol, price)
        .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;

    to_py(py, &plan)
}
