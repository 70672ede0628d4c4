//! Net-pay estimation
//!
//! When an employee record only carries gross salary, a net figure has to
//! be estimated. The estimate sits behind [`NetPayEstimator`] so a real tax
//! engine can replace the flat ratio without touching allocation code.

use crate::core::config::PayrollConfig;
use crate::core::numeric::{finite_or_zero, round_to_cents};

/// Derives net pay from gross pay
pub trait NetPayEstimator {
    /// Estimated net pay for a positive `gross` amount
    fn estimate_net(&self, gross: f64) -> f64;
}

impl<F> NetPayEstimator for F
where
    F: Fn(f64) -> f64,
{
    fn estimate_net(&self, gross: f64) -> f64 {
        self(gross)
    }
}

/// Flat-rate estimate: `gross * ratio`, rounded to cents
///
/// The default ratio of 0.82 is a placeholder, not a tax rule for any
/// particular jurisdiction.
///
/// # Example
/// ```
/// use crypto_payroll_core_rs::allocation::{FlatRateEstimator, NetPayEstimator};
///
/// let estimator = FlatRateEstimator::default();
/// assert_eq!(estimator.estimate_net(5000.0), 4100.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatRateEstimator {
    ratio: f64,
}

impl FlatRateEstimator {
    pub const DEFAULT_RATIO: f64 = 0.82;

    /// Create an estimator with the given net/gross ratio
    ///
    /// Non-finite ratios are treated as 0.
    pub fn new(ratio: f64) -> Self {
        Self {
            ratio: finite_or_zero(ratio),
        }
    }

    pub fn from_config(config: &PayrollConfig) -> Self {
        Self::new(config.net_pay_ratio)
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }
}

impl Default for FlatRateEstimator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RATIO)
    }
}

impl NetPayEstimator for FlatRateEstimator {
    fn estimate_net(&self, gross: f64) -> f64 {
        round_to_cents(gross * self.ratio)
    }
}
