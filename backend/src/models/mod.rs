//! Domain models for the payroll core

pub mod company;
pub mod employee;
pub mod transaction;

// Re-exports
pub use company::CompanySettings;
pub use employee::{normalize_addresses, ConvertMode, Employee, EmployeeError};
pub use transaction::{BatchStatus, BreakdownEntry, TransactionBatch};
