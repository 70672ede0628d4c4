//! Payroll run preparation
//!
//! Everything that happens between "how much would this run convert?" and
//! "record the batch":
//!
//! - [`PayrollTotals`]: the estimated total shown before a run
//! - [`validate_run`]: pre-run checks surfaced as user-facing messages
//! - [`PayrollPlanner`]: per-recipient breakdown, crypto amounts and
//!   destination addresses for a run at a given price
//! - [`apply_accumulations`]: fold a recorded batch into employee totals
//!
//! All per-employee amounts come from [`crate::allocation`].

pub mod plan;

pub use plan::{plan_payroll_run, PayrollPlan, PayrollPlanner};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::allocation::{AllocationCalculator, AllocationOptions, NetPayEstimator};
use crate::core::numeric::finite_or_zero;
use crate::models::{CompanySettings, Employee, TransactionBatch};

/// Reasons a payroll run cannot go ahead
#[derive(Debug, Error, PartialEq)]
pub enum PayrollError {
    #[error("Unsupported crypto symbol '{0}'")]
    UnsupportedSymbol(String),

    #[error("Price not available for {0}")]
    PriceUnavailable(String),

    #[error("Company custody enabled but wallet missing for {0}")]
    CustodyWalletMissing(String),

    #[error("Company benefit requires a company wallet for {0}")]
    CompanyWalletMissing(String),

    #[error("No eligible employee requests for {symbol}{}", eligibility_hint(.custody))]
    NoEligibleRequests { symbol: String, custody: bool },
}

fn eligibility_hint(custody: &bool) -> &'static str {
    if *custody {
        ""
    } else {
        " with valid addresses"
    }
}

/// Estimated fiat a run would convert for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollTotals {
    pub symbol: String,

    /// Sum of employee requests
    pub employee_total: f64,

    /// Employees with a positive request
    pub eligible_employees: usize,

    /// Company benefit contribution (0 when not configured)
    pub company_benefit: f64,

    /// `employee_total + company_benefit`
    pub total: f64,
}

impl PayrollTotals {
    /// Totals for `symbol` under the company's custody mode
    ///
    /// # Example
    /// ```
    /// use crypto_payroll_core_rs::allocation::AllocationCalculator;
    /// use crypto_payroll_core_rs::payroll::PayrollTotals;
    /// use crypto_payroll_core_rs::{CompanySettings, Employee};
    ///
    /// let employees = vec![
    ///     Employee::new("u1").with_fixed_amount(250.0).with_split("ETH", 100.0),
    /// ];
    /// let company = CompanySettings::default().with_custody(true).with_benefit(50.0);
    ///
    /// let totals = PayrollTotals::compute(&AllocationCalculator::flat_rate(), &employees, &company, "ETH");
    /// assert_eq!(totals.employee_total, 250.0);
    /// assert_eq!(totals.total, 300.0);
    /// ```
    pub fn compute<E: NetPayEstimator>(
        calculator: &AllocationCalculator<E>,
        employees: &[Employee],
        company: &CompanySettings,
        symbol: &str,
    ) -> Self {
        let options = AllocationOptions::for_company(company);
        let requests: Vec<f64> = employees
            .iter()
            .map(|e| calculator.requested_fiat_for_symbol(Some(e), Some(symbol), options))
            .collect();

        let employee_total: f64 = requests.iter().sum();
        let company_benefit = company.benefit();

        Self {
            symbol: symbol.to_string(),
            employee_total,
            eligible_employees: requests.iter().filter(|r| **r > 0.0).count(),
            company_benefit,
            total: employee_total + company_benefit,
        }
    }
}

/// Pre-run checks on computed totals
///
/// - Nothing to convert: [`PayrollError::NoEligibleRequests`]
/// - A company benefit on direct payouts with no company wallet for the
///   symbol: [`PayrollError::CompanyWalletMissing`]
pub fn validate_run(totals: &PayrollTotals, company: &CompanySettings) -> Result<(), PayrollError> {
    if !(finite_or_zero(totals.total) > 0.0) {
        warn!(symbol = %totals.symbol, "payroll run has nothing to convert");
        return Err(PayrollError::NoEligibleRequests {
            symbol: totals.symbol.clone(),
            custody: company.custody,
        });
    }

    if totals.company_benefit > 0.0
        && !company.custody
        && company.wallet_for(&totals.symbol).is_none()
    {
        warn!(symbol = %totals.symbol, "company benefit configured without a company wallet");
        return Err(PayrollError::CompanyWalletMissing(totals.symbol.clone()));
    }

    Ok(())
}

/// Add each breakdown share of `batch` to the matching employee's totals
///
/// Returns the number of employees updated. Company entries and entries for
/// unknown employees are ignored.
pub fn apply_accumulations(employees: &mut [Employee], batch: &TransactionBatch) -> usize {
    let mut updated = 0;
    for entry in batch.per_employee_breakdown.as_deref().unwrap_or_default() {
        if entry.is_company {
            continue;
        }
        let user_id = match entry.user_id.as_deref() {
            Some(id) => id,
            None => continue,
        };
        let employee = match employees.iter_mut().find(|e| e.user_id == user_id) {
            Some(e) => e,
            None => {
                debug!(user_id, batch_id = %batch.id, "breakdown entry for unknown employee");
                continue;
            }
        };

        employee.accumulated_fiat += finite_or_zero(entry.fiat_amount);
        *employee
            .accumulated_crypto
            .entry(batch.crypto_symbol.clone())
            .or_insert(0.0) += finite_or_zero(entry.crypto_amount);
        updated += 1;
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let direct = PayrollError::NoEligibleRequests {
            symbol: "BTC".to_string(),
            custody: false,
        };
        assert_eq!(
            direct.to_string(),
            "No eligible employee requests for BTC with valid addresses"
        );

        let custody = PayrollError::NoEligibleRequests {
            symbol: "BTC".to_string(),
            custody: true,
        };
        assert_eq!(custody.to_string(), "No eligible employee requests for BTC");
    }

    #[test]
    fn test_eligible_employee_count() {
        let employees = vec![
            Employee::new("u1").with_fixed_amount(100.0).with_split("BTC", 100.0),
            Employee::new("u2").with_fixed_amount(100.0),
        ];
        let company = CompanySettings::default().with_custody(true);
        let totals =
            PayrollTotals::compute(&AllocationCalculator::flat_rate(), &employees, &company, "BTC");
        assert_eq!(totals.eligible_employees, 1);
        assert_eq!(totals.total, 100.0);
    }
}
