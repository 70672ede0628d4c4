//! Batch ledger
//!
//! Company-wide figures over the payout history: volumes, custody holdings
//! and their current value, plus newest-first listing and filtering.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::core::numeric::finite_or_zero;
use crate::models::{BatchStatus, TransactionBatch};
use crate::reconcile::{price_for, Prices};

/// Summary figures over all batches
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub batches: usize,

    /// Fiat converted across all batches
    pub total_volume: f64,

    /// Fiat in batches not yet confirmed
    pub pending_volume: f64,

    /// Batches not yet confirmed
    pub pending_batches: usize,

    /// Average recipients per run (0 with no batches)
    pub avg_recipients: f64,
}

impl LedgerSummary {
    pub fn from_batches(batches: &[TransactionBatch]) -> Self {
        let pending: Vec<&TransactionBatch> = batches.iter().filter(|b| !b.is_confirmed()).collect();
        let avg_recipients = if batches.is_empty() {
            0.0
        } else {
            batches.iter().map(|b| b.num_employees as f64).sum::<f64>() / batches.len() as f64
        };

        Self {
            batches: batches.len(),
            total_volume: batches.iter().map(|b| finite_or_zero(b.fiat_amount)).sum(),
            pending_volume: pending.iter().map(|b| finite_or_zero(b.fiat_amount)).sum(),
            pending_batches: pending.len(),
            avg_recipients,
        }
    }
}

/// Crypto held by the company per symbol
///
/// Under custody every batch's crypto stays with the company. With direct
/// payouts nothing is held, and every supported symbol maps to 0.
pub fn custody_holdings(
    batches: &[TransactionBatch],
    custody: bool,
    supported: &[String],
) -> BTreeMap<String, f64> {
    let mut holdings: BTreeMap<String, f64> =
        supported.iter().map(|symbol| (symbol.clone(), 0.0)).collect();
    if custody {
        for batch in batches {
            *holdings.entry(batch.crypto_symbol.clone()).or_insert(0.0) +=
                finite_or_zero(batch.crypto_amount);
        }
    }
    holdings
}

/// Current fiat value of `holdings`, over the symbols that have a price
pub fn portfolio_value(holdings: &BTreeMap<String, f64>, prices: &Prices) -> f64 {
    prices
        .keys()
        .map(|symbol| {
            let held = holdings.get(symbol).copied().map(finite_or_zero).unwrap_or(0.0);
            held * price_for(prices, symbol)
        })
        .sum()
}

/// Batches ordered newest first
///
/// Batches with unparseable dates sort last; ties keep input order.
pub fn sorted_newest_first(batches: &[TransactionBatch]) -> Vec<&TransactionBatch> {
    let mut keyed: Vec<_> = batches.iter().map(|b| (b.parsed_date(), b)).collect();
    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    keyed.into_iter().map(|(_, b)| b).collect()
}

/// Most recent unconfirmed batch
pub fn next_payout(batches: &[TransactionBatch]) -> Option<&TransactionBatch> {
    sorted_newest_first(batches)
        .into_iter()
        .find(|b| !b.is_confirmed())
}

/// Most recent batch
pub fn last_run(batches: &[TransactionBatch]) -> Option<&TransactionBatch> {
    sorted_newest_first(batches).into_iter().next()
}

/// Symbols present in the history, sorted
pub fn assets(batches: &[TransactionBatch]) -> Vec<String> {
    let mut symbols: Vec<String> = batches.iter().map(|b| b.crypto_symbol.clone()).collect();
    symbols.sort();
    symbols.dedup();
    symbols
}

/// Filter for the transactions view
///
/// # Example
/// ```
/// use crypto_payroll_core_rs::ledger::BatchFilter;
/// use crypto_payroll_core_rs::{BatchStatus, TransactionBatch};
///
/// let batches = vec![
///     TransactionBatch { id: "1".into(), crypto_symbol: "BTC".into(), ..Default::default() },
///     TransactionBatch {
///         id: "2".into(),
///         crypto_symbol: "ETH".into(),
///         status: BatchStatus::Confirmed,
///         ..Default::default()
///     },
/// ];
///
/// let filter = BatchFilter { status: Some(BatchStatus::Pending), ..Default::default() };
/// let hits = filter.apply(&batches);
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].id, "1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchFilter {
    /// Keep only this status
    pub status: Option<BatchStatus>,

    /// Keep only this crypto symbol
    pub asset: Option<String>,

    /// Case-insensitive search over hash, symbol and fiat currency
    #[serde(default)]
    pub search: String,
}

impl BatchFilter {
    pub fn matches(&self, batch: &TransactionBatch) -> bool {
        if let Some(status) = self.status {
            if batch.status != status {
                return false;
            }
        }
        if let Some(asset) = self.asset.as_deref() {
            if batch.crypto_symbol != asset {
                return false;
            }
        }

        let query = self.search.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        let haystack = format!(
            "{} {} {}",
            batch.tx_hash.as_deref().unwrap_or_default(),
            batch.crypto_symbol,
            batch.fiat_currency
        )
        .to_lowercase();
        haystack.contains(&query)
    }

    /// Matching batches, newest first
    pub fn apply<'a>(&self, batches: &'a [TransactionBatch]) -> Vec<&'a TransactionBatch> {
        sorted_newest_first(batches)
            .into_iter()
            .filter(|b| self.matches(b))
            .collect()
    }
}
