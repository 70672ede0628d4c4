//! Payout reconciler
//!
//! Rebuilds, from the batch history, the list of payouts attributable to a
//! single employee, valued both at payout time and at current prices.
//!
//! # Two Attribution Paths
//!
//! - **Exact share**: the batch recorded a per-employee breakdown containing
//!   the employee. Its amounts are used as-is.
//! - **Proportional estimate**: older batches only recorded the destination
//!   addresses. If the employee's address for the batch symbol is listed,
//!   they are credited `crypto_amount / addresses.len()`.
//!
//! The proportional path counts addresses, not employees. Two employees
//! sharing one address would each be credited a full share. Records carry a
//! [`ShareBasis`] so consumers can tell the two kinds of figure apart.
//!
//! Output order always follows input order.

pub mod fingerprint;

pub use fingerprint::history_fingerprint;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, trace};

use crate::core::numeric::{finite_or_zero, numeric};
use crate::models::{BatchStatus, Employee, TransactionBatch};

/// Current fiat rate per crypto symbol
pub type Prices = BTreeMap<String, f64>;

/// Current rate for `symbol`, 0 if missing or not finite
pub fn price_for(prices: &Prices, symbol: &str) -> f64 {
    prices.get(symbol).copied().map(finite_or_zero).unwrap_or(0.0)
}

/// Prices from a loosely-typed JSON object
///
/// Non-numeric rates read as 0. Anything other than an object yields no
/// prices.
pub fn prices_from_value(value: &Value) -> Prices {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), numeric(v))).collect(),
        _ => Prices::new(),
    }
}

/// How a reconciled amount was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareBasis {
    /// Taken from the batch's per-employee breakdown
    ExactShare,

    /// Equal split of the batch across its destination addresses
    ProportionalEstimate,
}

/// One payout attributed to an employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledTransaction {
    pub id: String,
    pub date: String,
    pub status: BatchStatus,
    pub tx_hash: Option<String>,
    pub fiat_currency: String,
    pub crypto_symbol: String,

    /// Crypto attributed to the employee
    pub crypto_amount: f64,

    /// Batch purchase price
    pub price_at_tx: f64,

    /// Fiat value at payout time
    pub value_at_tx: f64,

    /// Fiat value at current prices
    pub current_value: f64,

    pub basis: ShareBasis,
}

impl ReconciledTransaction {
    fn from_batch(
        batch: &TransactionBatch,
        crypto_amount: f64,
        value_at_tx: f64,
        current_rate: f64,
        basis: ShareBasis,
    ) -> Self {
        Self {
            id: batch.id.clone(),
            date: batch.date.clone(),
            status: batch.status,
            tx_hash: batch.tx_hash.clone(),
            fiat_currency: batch.fiat_currency.clone(),
            crypto_symbol: batch.crypto_symbol.clone(),
            crypto_amount,
            price_at_tx: finite_or_zero(batch.price_at_tx),
            value_at_tx,
            current_value: finite_or_zero(crypto_amount * current_rate),
            basis,
        }
    }

    pub fn is_estimate(&self) -> bool {
        self.basis == ShareBasis::ProportionalEstimate
    }
}

/// Payouts attributable to `employee`, in input order
///
/// Returns an empty list when `employee` is absent. Batches in which the
/// employee had no stake contribute nothing.
///
/// # Example
/// ```
/// use crypto_payroll_core_rs::reconcile::{transactions_for_employee, Prices, ShareBasis};
/// use crypto_payroll_core_rs::{BreakdownEntry, Employee, TransactionBatch};
///
/// let emp = Employee::new("u1");
/// let batch = TransactionBatch {
///     id: "b1".to_string(),
///     crypto_symbol: "BTC".to_string(),
///     per_employee_breakdown: Some(vec![
///         BreakdownEntry::for_employee("u1", 500.0).with_crypto_amount(0.01),
///     ]),
///     ..TransactionBatch::default()
/// };
/// let prices = Prices::from([("BTC".to_string(), 60000.0)]);
///
/// let records = transactions_for_employee(Some(&emp), &[batch], &prices);
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].value_at_tx, 500.0);
/// assert_eq!(records[0].current_value, 600.0);
/// assert_eq!(records[0].basis, ShareBasis::ExactShare);
/// ```
pub fn transactions_for_employee(
    employee: Option<&Employee>,
    transactions: &[TransactionBatch],
    prices: &Prices,
) -> Vec<ReconciledTransaction> {
    let employee = match employee {
        Some(e) => e,
        None => return Vec::new(),
    };

    transactions
        .iter()
        .filter_map(|batch| reconcile_batch(employee, batch, prices))
        .collect()
}

fn reconcile_batch(
    employee: &Employee,
    batch: &TransactionBatch,
    prices: &Prices,
) -> Option<ReconciledTransaction> {
    let symbol = batch.crypto_symbol.as_str();
    let current_rate = price_for(prices, symbol);

    if let Some(entry) = batch.breakdown_for(&employee.user_id) {
        let crypto_amount = finite_or_zero(entry.crypto_amount);
        let fiat_amount = finite_or_zero(entry.fiat_amount);
        return Some(ReconciledTransaction::from_batch(
            batch,
            crypto_amount,
            fiat_amount,
            current_rate,
            ShareBasis::ExactShare,
        ));
    }

    let address = employee.address_for(symbol)?;
    if batch.addresses.is_empty() || !batch.addresses.iter().any(|a| a == address) {
        trace!(batch_id = %batch.id, user_id = %employee.user_id, "no stake in batch");
        return None;
    }

    let per_share = finite_or_zero(batch.crypto_amount / batch.addresses.len() as f64);
    let value_at_tx = finite_or_zero(per_share * finite_or_zero(batch.price_at_tx));
    debug!(
        batch_id = %batch.id,
        user_id = %employee.user_id,
        recipients = batch.addresses.len(),
        "attributing batch by address count"
    );

    Some(ReconciledTransaction::from_batch(
        batch,
        per_share,
        value_at_tx,
        current_rate,
        ShareBasis::ProportionalEstimate,
    ))
}

/// Totals over an employee's reconciled history
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryTotals {
    /// Number of records
    pub records: usize,

    /// Records obtained by proportional estimate
    pub estimated_records: usize,

    /// Sum of fiat value at payout time
    pub value_at_tx: f64,

    /// Sum of fiat value at current prices
    pub current_value: f64,

    /// `current_value - value_at_tx`
    pub gain: f64,
}

impl HistoryTotals {
    pub fn from_records(records: &[ReconciledTransaction]) -> Self {
        let value_at_tx: f64 = records.iter().map(|r| r.value_at_tx).sum();
        let current_value: f64 = records.iter().map(|r| r.current_value).sum();
        Self {
            records: records.len(),
            estimated_records: records.iter().filter(|r| r.is_estimate()).count(),
            value_at_tx,
            current_value,
            gain: current_value - value_at_tx,
        }
    }

    /// Whether any figure in the totals is an estimate
    pub fn includes_estimates(&self) -> bool {
        self.estimated_records > 0
    }
}
