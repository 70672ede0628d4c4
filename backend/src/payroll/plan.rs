//! Payroll run planning
//!
//! Turns the employee roster, company settings and a purchase price into
//! the breakdown a run records: one entry per eligible employee (plus the
//! company benefit, when configured), crypto amounts per entry, and the
//! destination address list.
//!
//! # Rounding
//!
//! - Entry fiat amounts are rounded to cents
//! - The run's fiat total is the rounded sum of entry amounts
//! - Entry crypto amounts are `fiat / price` rounded to the configured
//!   crypto precision; the run's crypto total is `fiat_total / price`

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::PayrollError;
use crate::allocation::{AllocationCalculator, AllocationOptions, FlatRateEstimator, NetPayEstimator};
use crate::core::config::PayrollConfig;
use crate::core::numeric::{round_dp, round_to_cents};
use crate::models::{BatchStatus, BreakdownEntry, CompanySettings, Employee, TransactionBatch};

/// A payroll run ready to be executed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollPlan {
    pub crypto_symbol: String,
    pub fiat_currency: String,

    /// Purchase price (fiat per 1 unit of crypto)
    pub price: f64,

    pub fiat_total: f64,
    pub crypto_total: f64,

    /// Whether the company keeps custody of the purchase
    pub custody: bool,

    /// Destination addresses in payout order
    pub addresses: Vec<String>,

    /// Per-recipient shares
    pub breakdown: Vec<BreakdownEntry>,
}

impl PayrollPlan {
    /// Employee entries (the company benefit entry is not counted)
    pub fn employee_count(&self) -> usize {
        self.breakdown.iter().filter(|e| !e.is_company).count()
    }

    /// Record the plan as a pending batch
    pub fn into_batch(
        self,
        id: impl Into<String>,
        date: DateTime<Utc>,
        tx_hash: Option<String>,
    ) -> TransactionBatch {
        let num_employees = self.employee_count();
        TransactionBatch {
            id: id.into(),
            date: date.to_rfc3339_opts(SecondsFormat::Micros, true),
            status: BatchStatus::Pending,
            tx_hash,
            crypto_symbol: self.crypto_symbol,
            crypto_amount: self.crypto_total,
            fiat_amount: self.fiat_total,
            price_at_tx: self.price,
            fiat_currency: self.fiat_currency,
            num_employees,
            addresses: self.addresses,
            per_employee_breakdown: Some(self.breakdown),
        }
    }

    /// [`PayrollPlan::into_batch`] with a fresh UUID
    pub fn into_new_batch(self, date: DateTime<Utc>, tx_hash: Option<String>) -> TransactionBatch {
        self.into_batch(uuid::Uuid::new_v4().to_string(), date, tx_hash)
    }
}

/// Builds [`PayrollPlan`]s with a given configuration and net-pay estimator
pub struct PayrollPlanner<E = FlatRateEstimator> {
    config: PayrollConfig,
    calculator: AllocationCalculator<E>,
}

impl PayrollPlanner<FlatRateEstimator> {
    /// Planner using the configured flat net-pay ratio
    pub fn new(config: PayrollConfig) -> Self {
        let calculator = AllocationCalculator::from_config(&config);
        Self { config, calculator }
    }
}

impl<E: NetPayEstimator> PayrollPlanner<E> {
    pub fn with_estimator(config: PayrollConfig, estimator: E) -> Self {
        Self {
            config,
            calculator: AllocationCalculator::new(estimator),
        }
    }

    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    pub fn calculator(&self) -> &AllocationCalculator<E> {
        &self.calculator
    }

    /// Plan a run converting into `symbol` at `price`
    ///
    /// # Errors
    ///
    /// - [`PayrollError::UnsupportedSymbol`]: `symbol` is not configured
    /// - [`PayrollError::PriceUnavailable`]: `price` is not a positive number
    /// - [`PayrollError::CustodyWalletMissing`]: custody mode without a
    ///   company wallet for `symbol`
    /// - [`PayrollError::CompanyWalletMissing`]: company benefit on direct
    ///   payouts without a company wallet for `symbol`
    /// - [`PayrollError::NoEligibleRequests`]: nothing to convert
    pub fn plan(
        &self,
        employees: &[Employee],
        company: &CompanySettings,
        symbol: &str,
        price: f64,
    ) -> Result<PayrollPlan, PayrollError> {
        if !self.config.is_supported_crypto(symbol) {
            return Err(PayrollError::UnsupportedSymbol(symbol.to_string()));
        }
        if !(price.is_finite() && price > 0.0) {
            return Err(PayrollError::PriceUnavailable(symbol.to_string()));
        }

        let custody = company.custody;
        let company_wallet = company.wallet_for(symbol);
        if custody && company_wallet.is_none() {
            return Err(PayrollError::CustodyWalletMissing(symbol.to_string()));
        }

        let options = AllocationOptions::for_company(company);
        let mut breakdown: Vec<BreakdownEntry> = Vec::new();

        for employee in employees {
            let fiat = self
                .calculator
                .requested_fiat_for_symbol(Some(employee), Some(symbol), options);
            if fiat <= 0.0 {
                continue;
            }
            let mut entry = BreakdownEntry::for_employee(employee.user_id.clone(), round_to_cents(fiat));
            if !custody {
                match employee.address_for(symbol) {
                    Some(address) => entry.address = Some(address.to_string()),
                    None => continue,
                }
            }
            breakdown.push(entry);
        }

        let benefit = round_to_cents(company.benefit());
        if benefit > 0.0 {
            let mut entry = BreakdownEntry::for_company(benefit);
            if !custody {
                match company_wallet {
                    Some(wallet) => entry.address = Some(wallet.to_string()),
                    None => {
                        warn!(symbol, "company benefit configured without a company wallet");
                        return Err(PayrollError::CompanyWalletMissing(symbol.to_string()));
                    }
                }
            }
            breakdown.push(entry);
        }

        let fiat_total = round_to_cents(breakdown.iter().map(|e| e.fiat_amount).sum());
        if breakdown.is_empty() || fiat_total <= 0.0 {
            warn!(symbol, custody, "no eligible requests for payroll run");
            return Err(PayrollError::NoEligibleRequests {
                symbol: symbol.to_string(),
                custody,
            });
        }

        for entry in &mut breakdown {
            entry.crypto_amount = round_dp(entry.fiat_amount / price, self.config.crypto_decimals);
        }

        let addresses: Vec<String> = match company_wallet {
            Some(wallet) if custody => vec![wallet.to_string()],
            _ => breakdown.iter().filter_map(|e| e.address.clone()).collect(),
        };

        debug!(
            symbol,
            fiat_total,
            recipients = breakdown.len(),
            "planned payroll run"
        );

        Ok(PayrollPlan {
            crypto_symbol: symbol.to_string(),
            fiat_currency: self.config.resolve_fiat(&company.base_fiat).to_string(),
            price,
            fiat_total,
            crypto_total: fiat_total / price,
            custody,
            addresses,
            breakdown,
        })
    }
}

/// [`PayrollPlanner::plan`] with the configured flat net-pay ratio
pub fn plan_payroll_run(
    employees: &[Employee],
    company: &CompanySettings,
    symbol: &str,
    price: f64,
    config: &PayrollConfig,
) -> Result<PayrollPlan, PayrollError> {
    PayrollPlanner::new(config.clone()).plan(employees, company, symbol, price)
}
