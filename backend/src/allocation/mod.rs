//! Allocation calculator
//!
//! Computes how much fiat one employee asks to convert into a given crypto
//! symbol this payroll cycle. Every caller (the estimated total, pre-run
//! validation, the payroll planner) goes through this one implementation.
//!
//! # Algorithm
//!
//! 1. No employee or no symbol: 0
//! 2. Split for the symbol is not positive: 0
//! 3. An address is required but the employee has none for the symbol: 0
//! 4. Base amount:
//!    - fixed mode: `fixed_amount_fiat`
//!    - percent mode: `net_salary * percent_to_crypto / 100`, where net
//!      salary may be estimated from gross (see [`NetPayEstimator`])
//! 5. Base is not positive: 0
//! 6. Result: `base * split / 100`
//!
//! The calculator never fails. Malformed inputs have already been coerced
//! to 0 at decode time, and any non-finite intermediate is treated as 0.

pub mod estimator;

pub use estimator::{FlatRateEstimator, NetPayEstimator};

use crate::core::config::PayrollConfig;
use crate::core::numeric::finite_or_zero;
use crate::models::{CompanySettings, ConvertMode, Employee};

/// Options for [`AllocationCalculator::requested_fiat_for_symbol`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocationOptions {
    /// Payouts are direct, so a receiving address is required
    pub needs_address: bool,
}

impl AllocationOptions {
    /// Options matching a company's custody mode
    pub fn for_company(company: &CompanySettings) -> Self {
        Self {
            needs_address: company.needs_employee_address(),
        }
    }
}

/// Per-employee requested-fiat calculator
///
/// # Example
/// ```
/// use crypto_payroll_core_rs::allocation::{AllocationCalculator, AllocationOptions};
/// use crypto_payroll_core_rs::Employee;
///
/// let calc = AllocationCalculator::flat_rate();
/// let emp = Employee::new("u1")
///     .with_net_salary(4000.0)
///     .with_percent_to_crypto(10.0)
///     .with_split("BTC", 50.0)
///     .with_address("BTC", "bc1q");
///
/// let opts = AllocationOptions { needs_address: true };
/// assert_eq!(calc.requested_fiat_for_symbol(Some(&emp), Some("BTC"), opts), 200.0);
/// ```
#[derive(Debug, Clone)]
pub struct AllocationCalculator<E = FlatRateEstimator> {
    estimator: E,
}

impl Default for AllocationCalculator<FlatRateEstimator> {
    fn default() -> Self {
        Self::flat_rate()
    }
}

impl AllocationCalculator<FlatRateEstimator> {
    /// Calculator using the default 0.82 net-pay ratio
    pub fn flat_rate() -> Self {
        Self::new(FlatRateEstimator::default())
    }

    /// Calculator using the configured flat net-pay ratio
    pub fn from_config(config: &PayrollConfig) -> Self {
        Self::new(FlatRateEstimator::from_config(config))
    }
}

impl<E: NetPayEstimator> AllocationCalculator<E> {
    pub fn new(estimator: E) -> Self {
        Self { estimator }
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Net salary, estimated from gross when net is not recorded
    ///
    /// Returns `net_salary` if positive, otherwise the estimate for a
    /// positive `gross_salary`, otherwise 0.
    pub fn resolve_net_salary(&self, employee: &Employee) -> f64 {
        let net = finite_or_zero(employee.net_salary);
        if net > 0.0 {
            return net;
        }
        let gross = resolve_gross_salary(employee);
        if gross > 0.0 {
            return finite_or_zero(self.estimator.estimate_net(gross)).max(0.0);
        }
        0.0
    }

    /// Fiat `employee` requests to convert into `symbol` this cycle
    ///
    /// An empty `symbol` counts as absent.
    pub fn requested_fiat_for_symbol(
        &self,
        employee: Option<&Employee>,
        symbol: Option<&str>,
        options: AllocationOptions,
    ) -> f64 {
        let (employee, symbol) = match (employee, symbol) {
            (Some(e), Some(s)) if !s.is_empty() => (e, s),
            _ => return 0.0,
        };

        let split_pct = employee.split_for(symbol);
        if split_pct <= 0.0 {
            return 0.0;
        }

        if options.needs_address && employee.address_for(symbol).is_none() {
            return 0.0;
        }

        let base = match employee.convert_mode {
            ConvertMode::Fixed => finite_or_zero(employee.fixed_amount_fiat),
            ConvertMode::Percent => {
                let percent_to_crypto = finite_or_zero(employee.percent_to_crypto);
                if percent_to_crypto <= 0.0 {
                    return 0.0;
                }
                let net_salary = self.resolve_net_salary(employee);
                if net_salary <= 0.0 {
                    return 0.0;
                }
                net_salary * percent_to_crypto / 100.0
            }
        };

        if base <= 0.0 {
            return 0.0;
        }

        finite_or_zero(base * split_pct / 100.0)
    }

    /// Sum of requested fiat over `employees` for `symbol`
    pub fn total_requested_fiat(
        &self,
        employees: &[Employee],
        symbol: &str,
        options: AllocationOptions,
    ) -> f64 {
        employees
            .iter()
            .map(|e| self.requested_fiat_for_symbol(Some(e), Some(symbol), options))
            .sum()
    }
}

/// Recorded gross salary (0 if missing or malformed)
pub fn resolve_gross_salary(employee: &Employee) -> f64 {
    finite_or_zero(employee.gross_salary)
}

/// [`AllocationCalculator::resolve_net_salary`] with the default estimator
///
/// # Example
/// ```
/// use crypto_payroll_core_rs::{resolve_net_salary, Employee};
///
/// assert_eq!(resolve_net_salary(&Employee::new("u1").with_net_salary(3000.0)), 3000.0);
/// assert_eq!(resolve_net_salary(&Employee::new("u2").with_gross_salary(5000.0)), 4100.0);
/// assert_eq!(resolve_net_salary(&Employee::new("u3")), 0.0);
/// ```
pub fn resolve_net_salary(employee: &Employee) -> f64 {
    AllocationCalculator::flat_rate().resolve_net_salary(employee)
}

/// [`AllocationCalculator::requested_fiat_for_symbol`] with the default estimator
pub fn requested_fiat_for_symbol(
    employee: Option<&Employee>,
    symbol: Option<&str>,
    options: AllocationOptions,
) -> f64 {
    AllocationCalculator::flat_rate().requested_fiat_for_symbol(employee, symbol, options)
}
