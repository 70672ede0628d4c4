//! Transaction batch model
//!
//! One completed payroll conversion run. Each batch has:
//! - The single crypto symbol purchased and the batch totals
//! - The ordered destination addresses (direct payouts only)
//! - An optional per-recipient breakdown (newer batches)
//! - Status (Pending, Confirmed)

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::lenient::{
    lenient_bool, lenient_count, lenient_f64, lenient_opt_string, lenient_string,
    lenient_string_list,
};

/// Batch status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    /// Submitted, awaiting confirmation
    #[default]
    Pending,

    /// Confirmed on chain
    Confirmed,
}

impl<'de> Deserialize<'de> for BatchStatus {
    // Anything other than "confirmed" is still awaiting confirmation
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value.as_str() {
            Some("confirmed") => BatchStatus::Confirmed,
            _ => BatchStatus::Pending,
        })
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Exact share of one recipient in a batch
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BreakdownEntry {
    /// Employee the share belongs to (absent for the company entry)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub user_id: Option<String>,

    /// Company benefit contribution rather than an employee share
    #[serde(default, skip_serializing_if = "is_false", deserialize_with = "lenient_bool")]
    pub is_company: bool,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub fiat_amount: f64,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub crypto_amount: f64,

    /// Destination address (direct payouts only)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub address: Option<String>,
}

impl BreakdownEntry {
    /// Share for one employee
    pub fn for_employee(user_id: impl Into<String>, fiat_amount: f64) -> Self {
        Self {
            user_id: Some(user_id.into()),
            fiat_amount,
            ..Self::default()
        }
    }

    /// Company benefit contribution
    pub fn for_company(fiat_amount: f64) -> Self {
        Self {
            is_company: true,
            fiat_amount,
            ..Self::default()
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_crypto_amount(mut self, crypto_amount: f64) -> Self {
        self.crypto_amount = crypto_amount;
        self
    }

    /// Whether this entry is `user_id`'s share
    ///
    /// Company entries and an empty `user_id` never match.
    pub fn belongs_to(&self, user_id: &str) -> bool {
        !user_id.is_empty() && !self.is_company && self.user_id.as_deref() == Some(user_id)
    }
}

fn lenient_breakdown<'de, D>(deserializer: D) -> Result<Option<Vec<BreakdownEntry>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        // Entries that are not objects carry no usable share
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

/// A completed payroll conversion run
///
/// # Example
/// ```
/// use crypto_payroll_core_rs::{BatchStatus, TransactionBatch};
/// use serde_json::json;
///
/// let batch: TransactionBatch = serde_json::from_value(json!({
///     "id": "b1",
///     "date": "2025-01-31T12:00:00",
///     "status": "confirmed",
///     "crypto_symbol": "BTC",
///     "crypto_amount": "0.02",
///     "fiat_amount": 1000,
///     "price_at_tx": 50000,
///     "fiat_currency": "USD",
///     "addresses": ["A", "B"]
/// })).unwrap();
///
/// assert_eq!(batch.status, BatchStatus::Confirmed);
/// assert_eq!(batch.crypto_amount, 0.02);
/// assert!(batch.per_employee_breakdown.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransactionBatch {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,

    /// ISO-8601 timestamp as recorded by the backend
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,

    #[serde(default)]
    pub status: BatchStatus,

    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub tx_hash: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub crypto_symbol: String,

    /// Total crypto purchased
    #[serde(default, deserialize_with = "lenient_f64")]
    pub crypto_amount: f64,

    /// Total fiat converted
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fiat_amount: f64,

    /// Fiat per 1 unit of crypto at purchase time
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_at_tx: f64,

    #[serde(default, deserialize_with = "lenient_string")]
    pub fiat_currency: String,

    /// Number of recipients in the run
    #[serde(default, deserialize_with = "lenient_count")]
    pub num_employees: usize,

    /// Destination addresses in payout order
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub addresses: Vec<String>,

    /// Exact per-recipient shares, when recorded
    #[serde(default, deserialize_with = "lenient_breakdown")]
    pub per_employee_breakdown: Option<Vec<BreakdownEntry>>,
}

impl TransactionBatch {
    /// Check if the batch is confirmed
    pub fn is_confirmed(&self) -> bool {
        self.status == BatchStatus::Confirmed
    }

    /// Exact breakdown entry for `user_id`, if one was recorded
    pub fn breakdown_for(&self, user_id: &str) -> Option<&BreakdownEntry> {
        self.per_employee_breakdown
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|entry| entry.belongs_to(user_id))
    }

    /// Parse `date` as UTC
    ///
    /// Accepts RFC 3339 timestamps and naive ISO-8601 timestamps (treated as
    /// UTC). Returns `None` for anything else.
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        let raw = self.date.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }
}
