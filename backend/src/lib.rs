//! Crypto Payroll Core - Rust Engine
//!
//! Allocation and reconciliation logic for paying part of each employee's
//! salary in crypto.
//!
//! # Architecture
//!
//! - **core**: Numeric coercion, lenient decoding and configuration
//! - **models**: Domain records (Employee, TransactionBatch, CompanySettings)
//! - **allocation**: Per-employee requested fiat for a crypto symbol
//! - **reconcile**: Per-employee payout history valued at current prices
//! - **payroll**: Run totals, pre-run validation and run planning
//! - **ledger**: Company-wide batch figures and listing
//!
//! # Critical Invariants
//!
//! 1. Computations never fail on malformed input (bad numbers read as 0)
//! 2. Every requested-fiat figure comes from one calculator
//! 3. Reconciled figures say whether they are exact or estimated
//! 4. FFI boundary is minimal and safe

// Module declarations
pub mod allocation;
pub mod core;
pub mod ledger;
pub mod models;
pub mod payroll;
pub mod reconcile;

// Re-exports for convenience
pub use allocation::{
    requested_fiat_for_symbol, resolve_gross_salary, resolve_net_salary, AllocationCalculator,
    AllocationOptions, FlatRateEstimator, NetPayEstimator,
};
pub use crate::core::{ConfigError, PayrollConfig};
pub use ledger::{BatchFilter, LedgerSummary};
pub use models::{
    company::CompanySettings,
    employee::{ConvertMode, Employee, EmployeeError},
    transaction::{BatchStatus, BreakdownEntry, TransactionBatch},
};
pub use payroll::{
    apply_accumulations, plan_payroll_run, validate_run, PayrollError, PayrollPlan,
    PayrollPlanner, PayrollTotals,
};
pub use reconcile::{
    history_fingerprint, transactions_for_employee, HistoryTotals, Prices, ReconciledTransaction,
    ShareBasis,
};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn crypto_payroll_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    ffi::register(m)
}
