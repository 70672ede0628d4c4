//! Employee model
//!
//! One person enrolled in the payroll-conversion program. Each employee has:
//! - A conversion mode (percent of net pay, or a fixed fiat amount)
//! - A split of the converted amount across crypto symbols
//! - Optional receiving addresses per symbol
//! - Running totals of what has been paid out so far
//!
//! Records are decoded leniently: malformed numeric fields become 0.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::core::lenient::{
    lenient_address_map, lenient_f64, lenient_f64_map, lenient_opt_string, lenient_string,
};
use crate::core::numeric::finite_or_zero;

/// Tolerance when checking that split percentages total 100
const SPLIT_TOTAL_TOLERANCE: f64 = 1e-9;

/// Errors raised when validating an employee profile
#[derive(Debug, Error, PartialEq)]
pub enum EmployeeError {
    #[error("Employee user_id is required")]
    MissingUserId,

    #[error("crypto_split for provided addresses must sum to 100, got {total}")]
    SplitMustTotal100 { total: f64 },
}

/// How the base fiat amount to convert is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvertMode {
    /// `percent_to_crypto` percent of net salary
    #[default]
    Percent,

    /// `fixed_amount_fiat` every cycle
    Fixed,
}

impl<'de> Deserialize<'de> for ConvertMode {
    // Only an exact "fixed" selects fixed mode; anything else means percent
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value.as_str() {
            Some("fixed") => ConvertMode::Fixed,
            _ => ConvertMode::Percent,
        })
    }
}

/// An employee's payroll-conversion profile
///
/// # Example
/// ```
/// use crypto_payroll_core_rs::{ConvertMode, Employee};
///
/// let emp = Employee::new("marie.roy")
///     .with_net_salary(4000.0)
///     .with_percent_to_crypto(10.0)
///     .with_split("BTC", 50.0)
///     .with_address("BTC", "bc1qexample");
///
/// assert_eq!(emp.convert_mode, ConvertMode::Percent);
/// assert_eq!(emp.split_for("BTC"), 50.0);
/// assert_eq!(emp.address_for("BTC"), Some("bc1qexample"));
/// assert_eq!(emp.address_for("ETH"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Employee {
    /// Stable identifier, matched against batch breakdowns
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_id: String,

    #[serde(default)]
    pub convert_mode: ConvertMode,

    /// Percentage of net salary to convert (0-100)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub percent_to_crypto: f64,

    /// Fiat amount to convert in fixed mode
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fixed_amount_fiat: f64,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub gross_salary: f64,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub net_salary: f64,

    /// Share of the converted amount per symbol (0-100)
    #[serde(default, deserialize_with = "lenient_f64_map")]
    pub crypto_split: BTreeMap<String, f64>,

    /// Wallet address per symbol
    #[serde(default, deserialize_with = "lenient_address_map")]
    pub receiving_addresses: BTreeMap<String, Option<String>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub first_name: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub last_name: Option<String>,

    /// Postal address from the payroll system
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub address: Option<String>,

    /// Fiat paid out across all runs
    #[serde(default, deserialize_with = "lenient_f64")]
    pub accumulated_fiat: f64,

    /// Crypto received across all runs, per symbol
    #[serde(default, deserialize_with = "lenient_f64_map")]
    pub accumulated_crypto: BTreeMap<String, f64>,
}

impl Employee {
    /// Create an employee with no allocation configured
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    /// Switch to fixed mode with the given amount (builder pattern)
    pub fn with_fixed_amount(mut self, amount: f64) -> Self {
        self.convert_mode = ConvertMode::Fixed;
        self.fixed_amount_fiat = amount;
        self
    }

    /// Switch to percent mode with the given percentage (builder pattern)
    pub fn with_percent_to_crypto(mut self, percent: f64) -> Self {
        self.convert_mode = ConvertMode::Percent;
        self.percent_to_crypto = percent;
        self
    }

    pub fn with_gross_salary(mut self, gross: f64) -> Self {
        self.gross_salary = gross;
        self
    }

    pub fn with_net_salary(mut self, net: f64) -> Self {
        self.net_salary = net;
        self
    }

    pub fn with_split(mut self, symbol: &str, percent: f64) -> Self {
        self.crypto_split.insert(symbol.to_string(), percent);
        self
    }

    pub fn with_address(mut self, symbol: &str, address: &str) -> Self {
        self.receiving_addresses
            .insert(symbol.to_string(), Some(address.to_string()));
        self
    }

    /// Split percentage for `symbol`, 0 if unset
    pub fn split_for(&self, symbol: &str) -> f64 {
        self.crypto_split
            .get(symbol)
            .copied()
            .map(finite_or_zero)
            .unwrap_or(0.0)
    }

    /// Receiving address for `symbol`, `None` if absent or blank
    ///
    /// The address is returned untrimmed so it can be compared against
    /// recorded batch addresses as-is.
    pub fn address_for(&self, symbol: &str) -> Option<&str> {
        self.receiving_addresses
            .get(symbol)
            .and_then(|addr| addr.as_deref())
            .filter(|addr| !addr.trim().is_empty())
    }

    /// Display name from first/last name metadata
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.trim().is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Validate the profile before it is saved
    ///
    /// When any receiving address is set, the split over the symbols that
    /// have an address must total exactly 100.
    ///
    /// # Example
    /// ```
    /// use crypto_payroll_core_rs::{Employee, EmployeeError};
    ///
    /// let ok = Employee::new("u1")
    ///     .with_split("BTC", 60.0)
    ///     .with_split("ETH", 40.0)
    ///     .with_address("BTC", "bc1q")
    ///     .with_address("ETH", "0xabc");
    /// assert!(ok.validate().is_ok());
    ///
    /// let bad = Employee::new("u2").with_split("BTC", 60.0).with_address("BTC", "bc1q");
    /// assert_eq!(bad.validate(), Err(EmployeeError::SplitMustTotal100 { total: 60.0 }));
    /// ```
    pub fn validate(&self) -> Result<(), EmployeeError> {
        if self.user_id.trim().is_empty() {
            return Err(EmployeeError::MissingUserId);
        }
        self.validate_crypto_split()
    }

    /// Split-only part of [`Employee::validate`]
    pub fn validate_crypto_split(&self) -> Result<(), EmployeeError> {
        let symbols_with_address: Vec<&str> = self
            .receiving_addresses
            .keys()
            .map(String::as_str)
            .filter(|symbol| self.address_for(symbol).is_some())
            .collect();

        if symbols_with_address.is_empty() {
            return Ok(());
        }

        let total: f64 = symbols_with_address
            .iter()
            .map(|symbol| self.split_for(symbol))
            .sum();

        if (total - 100.0).abs() > SPLIT_TOTAL_TOLERANCE {
            return Err(EmployeeError::SplitMustTotal100 { total });
        }
        Ok(())
    }
}

/// Normalize a receiving-address map before it is stored
///
/// Keeps one entry per supported symbol (in the supported order), trims each
/// address and turns blank addresses into `None`. Unsupported symbols are
/// dropped.
pub fn normalize_addresses(
    addresses: &BTreeMap<String, Option<String>>,
    supported: &[String],
) -> BTreeMap<String, Option<String>> {
    supported
        .iter()
        .map(|symbol| {
            let normalized = addresses
                .get(symbol)
                .and_then(|addr| addr.as_deref())
                .map(str::trim)
                .filter(|addr| !addr.is_empty())
                .map(str::to_string);
            (symbol.clone(), normalized)
        })
        .collect()
}
