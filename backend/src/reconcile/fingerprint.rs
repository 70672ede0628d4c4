//! Memoization keys for reconciled histories
//!
//! Reconciliation is pure, so a caller may cache the result keyed on
//! `(user_id, transactions, prices)`. The key is a SHA-256 over the
//! canonical JSON of those inputs: object keys sorted, batches in order.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::Prices;
use crate::models::TransactionBatch;

#[derive(Serialize)]
struct HistoryKey<'a> {
    user_id: &'a str,
    transactions: &'a [TransactionBatch],
    prices: &'a Prices,
}

/// Stable hex key for a reconciliation input set
///
/// # Example
/// ```
/// use crypto_payroll_core_rs::reconcile::{history_fingerprint, Prices};
///
/// let prices = Prices::from([("BTC".to_string(), 50000.0)]);
/// let a = history_fingerprint("u1", &[], &prices);
/// let b = history_fingerprint("u1", &[], &prices);
/// let c = history_fingerprint("u2", &[], &prices);
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// assert_eq!(a.len(), 64);
/// ```
pub fn history_fingerprint(user_id: &str, transactions: &[TransactionBatch], prices: &Prices) -> String {
    let key = HistoryKey {
        user_id,
        transactions,
        prices,
    };

    // Non-finite floats serialize as null, so this cannot fail on our types
    let value = serde_json::to_value(&key).unwrap_or_default();
    let json = canonicalize(value).to_string();

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            // Sorted explicitly so the key stays stable if serde_json's
            // `preserve_order` feature gets enabled anywhere in the build
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
