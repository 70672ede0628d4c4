//! Company settings model
//!
//! Custody mode decides where purchased crypto goes:
//! - `custody = false`: straight to each employee's receiving address, so
//!   employees without an address for the symbol are not eligible
//! - `custody = true`: to the company wallet for the symbol

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::config::PayrollConfig;
use crate::core::lenient::{lenient_address_map, lenient_bool, lenient_f64, lenient_string};
use crate::core::numeric::finite_or_zero;
use crate::models::employee::normalize_addresses;

fn default_base_fiat() -> String {
    PayrollConfig::default().default_fiat
}

/// Company-wide payroll settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySettings {
    /// Company holds the purchased crypto
    #[serde(default, deserialize_with = "lenient_bool")]
    pub custody: bool,

    /// Treasury wallet per symbol
    #[serde(default, deserialize_with = "lenient_address_map")]
    pub company_wallets: BTreeMap<String, Option<String>>,

    #[serde(default = "default_base_fiat", deserialize_with = "lenient_string")]
    pub base_fiat: String,

    /// Flat fiat amount the company adds to every run
    #[serde(default, deserialize_with = "lenient_f64")]
    pub company_benefit_amount: f64,
}

impl Default for CompanySettings {
    fn default() -> Self {
        Self {
            custody: false,
            company_wallets: BTreeMap::new(),
            base_fiat: default_base_fiat(),
            company_benefit_amount: 0.0,
        }
    }
}

impl CompanySettings {
    pub fn with_custody(mut self, custody: bool) -> Self {
        self.custody = custody;
        self
    }

    pub fn with_wallet(mut self, symbol: &str, address: &str) -> Self {
        self.company_wallets
            .insert(symbol.to_string(), Some(address.to_string()));
        self
    }

    pub fn with_benefit(mut self, amount: f64) -> Self {
        self.company_benefit_amount = amount;
        self
    }

    /// Company wallet for `symbol`, `None` if absent or blank
    pub fn wallet_for(&self, symbol: &str) -> Option<&str> {
        self.company_wallets
            .get(symbol)
            .and_then(|addr| addr.as_deref())
            .filter(|addr| !addr.trim().is_empty())
    }

    /// Whether employees need their own address to be paid
    pub fn needs_employee_address(&self) -> bool {
        !self.custody
    }

    /// Company benefit contribution; 0 unless strictly positive
    pub fn benefit(&self) -> f64 {
        finite_or_zero(self.company_benefit_amount).max(0.0)
    }

    /// Copy with wallets limited to supported symbols and a known base fiat
    pub fn sanitized(&self, config: &PayrollConfig) -> Self {
        Self {
            custody: self.custody,
            company_wallets: normalize_addresses(&self.company_wallets, &config.supported_cryptos),
            base_fiat: config.resolve_fiat(&self.base_fiat).to_string(),
            company_benefit_amount: self.benefit(),
        }
    }
}
