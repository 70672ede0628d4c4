//! Numeric coercion and rounding
//!
//! Records reach this crate as loosely typed JSON snapshots. Every numeric
//! field is coerced through [`numeric`], so a malformed value degrades to
//! zero instead of producing an error.
//!
//! Rounding goes through `rust_decimal` starting from the exact binary
//! value of the `f64`. A product such as `1226.25 * 0.82`, stored as
//! `1005.52499999..`, rounds down to `1005.52` rather than up.

use rust_decimal::prelude::*;
use serde_json::Value;

/// Decimal places used for fiat amounts
pub const FIAT_DECIMAL_PLACES: u32 = 2;

/// Coerce a JSON value to a finite number
///
/// - numbers pass through
/// - strings are trimmed and parsed (blank strings are 0)
/// - booleans map to 1 / 0
/// - `null`, arrays and objects are 0
///
/// Any non-finite result is 0.
///
/// # Example
/// ```
/// use crypto_payroll_core_rs::core::numeric::numeric;
/// use serde_json::json;
///
/// assert_eq!(numeric(&json!(12.5)), 12.5);
/// assert_eq!(numeric(&json!("40")), 40.0);
/// assert_eq!(numeric(&json!("abc")), 0.0);
/// assert_eq!(numeric(&json!(null)), 0.0);
/// ```
pub fn numeric(value: &Value) -> f64 {
    let number = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(true) => 1.0,
        Value::Bool(false) => 0.0,
        Value::Null | Value::Array(_) | Value::Object(_) => 0.0,
    };
    finite_or_zero(number)
}

/// Return `value` if finite, otherwise 0
#[inline]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Round to `dp` decimal places, midpoint away from zero
///
/// The midpoint rule applies to the exact stored value, not to its shortest
/// decimal rendering, so `1.005` (stored just below) rounds to `1.0`.
/// Non-finite input rounds to 0. Values outside the range `Decimal` can
/// represent are returned unchanged.
pub fn round_dp(value: f64, dp: u32) -> f64 {
    let value = finite_or_zero(value);
    match Decimal::from_f64_retain(value) {
        Some(decimal) => decimal
            .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
            .to_f64()
            .unwrap_or(value),
        None => value,
    }
}

/// Round a fiat amount to cents
///
/// # Example
/// ```
/// use crypto_payroll_core_rs::core::numeric::round_to_cents;
///
/// assert_eq!(round_to_cents(4099.999999), 4100.0);
/// assert_eq!(round_to_cents(10.375), 10.38);
/// assert_eq!(round_to_cents(2.675), 2.67);
/// ```
#[inline]
pub fn round_to_cents(value: f64) -> f64 {
    round_dp(value, FIAT_DECIMAL_PLACES)
}
