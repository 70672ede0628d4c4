//! Payroll configuration
//!
//! Static knobs shared by every calculation: which crypto symbols and fiat
//! currencies the product supports, the fallback fiat, the net-pay ratio
//! used when only gross salary is known, and crypto rounding precision.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest precision accepted for crypto amounts
pub const MAX_CRYPTO_DECIMALS: u32 = 18;

/// Errors raised while loading or validating a [`PayrollConfig`]
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("At least one supported crypto symbol is required")]
    NoSupportedCryptos,

    #[error("Default fiat '{0}' is not in the fiat currency list")]
    DefaultFiatNotListed(String),

    #[error("Net pay ratio must be in (0, 1], got {0}")]
    InvalidNetPayRatio(f64),

    #[error("Crypto decimals must be at most {max}, got {value}")]
    CryptoDecimalsOutOfRange { value: u32, max: u32 },
}

/// Configuration for payroll calculations
///
/// Missing fields fall back to [`PayrollConfig::default`].
///
/// # Example
/// ```
/// use crypto_payroll_core_rs::PayrollConfig;
///
/// let config = PayrollConfig::from_json_str(r#"{ "default_fiat": "CAD" }"#).unwrap();
/// assert_eq!(config.default_fiat, "CAD");
/// assert_eq!(config.net_pay_ratio, 0.82);
/// assert!(config.is_supported_crypto("BTC"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollConfig {
    /// Crypto symbols a payroll run may purchase
    pub supported_cryptos: Vec<String>,

    /// Fiat currencies a company may use as base
    pub fiat_currencies: Vec<String>,

    /// Base fiat used when a company's setting is not recognised
    pub default_fiat: String,

    /// Net / gross ratio applied when only gross salary is known
    pub net_pay_ratio: f64,

    /// Decimal places kept on per-recipient crypto amounts
    pub crypto_decimals: u32,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            supported_cryptos: ["BTC", "ETH", "USDT", "USDC"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fiat_currencies: ["USD", "CAD", "EUR"].iter().map(|s| s.to_string()).collect(),
            default_fiat: "USD".to_string(),
            net_pay_ratio: 0.82,
            crypto_decimals: 12,
        }
    }
}

impl PayrollConfig {
    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PayrollConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.supported_cryptos.is_empty() {
            return Err(ConfigError::NoSupportedCryptos);
        }
        if !self.fiat_currencies.iter().any(|f| f == &self.default_fiat) {
            return Err(ConfigError::DefaultFiatNotListed(self.default_fiat.clone()));
        }
        if !(self.net_pay_ratio > 0.0 && self.net_pay_ratio <= 1.0) {
            return Err(ConfigError::InvalidNetPayRatio(self.net_pay_ratio));
        }
        if self.crypto_decimals > MAX_CRYPTO_DECIMALS {
            return Err(ConfigError::CryptoDecimalsOutOfRange {
                value: self.crypto_decimals,
                max: MAX_CRYPTO_DECIMALS,
            });
        }
        Ok(())
    }

    /// Whether `symbol` may be purchased by a payroll run
    pub fn is_supported_crypto(&self, symbol: &str) -> bool {
        self.supported_cryptos.iter().any(|s| s == symbol)
    }

    /// `fiat` if it is a known currency, otherwise the default fiat
    pub fn resolve_fiat<'a>(&'a self, fiat: &'a str) -> &'a str {
        if self.fiat_currencies.iter().any(|f| f == fiat) {
            fiat
        } else {
            &self.default_fiat
        }
    }
}
