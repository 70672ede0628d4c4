//! Tests for the payout reconciler
//!
//! Covers both attribution paths (exact breakdown share and the
//! address-count estimate), exclusion, ordering and garbage tolerance.

use crypto_payroll_core_rs::reconcile::{prices_from_value, HistoryTotals, Prices};
use crypto_payroll_core_rs::{
    history_fingerprint, transactions_for_employee, BatchStatus, BreakdownEntry, Employee,
    ShareBasis, TransactionBatch,
};
use serde_json::json;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn btc_prices(rate: f64) -> Prices {
    Prices::from([("BTC".to_string(), rate)])
}

fn exact_batch() -> TransactionBatch {
    TransactionBatch {
        id: "batch-exact".to_string(),
        date: "2025-03-31T17:00:00Z".to_string(),
        status: BatchStatus::Confirmed,
        tx_hash: Some("0xexact".to_string()),
        crypto_symbol: "BTC".to_string(),
        crypto_amount: 0.03,
        fiat_amount: 1500.0,
        price_at_tx: 50000.0,
        fiat_currency: "USD".to_string(),
        num_employees: 2,
        addresses: vec!["A".to_string(), "B".to_string()],
        per_employee_breakdown: Some(vec![
            BreakdownEntry::for_employee("u1", 500.0)
                .with_crypto_amount(0.01)
                .with_address("A"),
            BreakdownEntry::for_employee("u2", 1000.0)
                .with_crypto_amount(0.02)
                .with_address("B"),
        ]),
    }
}

fn legacy_batch() -> TransactionBatch {
    TransactionBatch {
        id: "batch-legacy".to_string(),
        date: "2025-01-31T17:00:00".to_string(),
        status: BatchStatus::Confirmed,
        crypto_symbol: "BTC".to_string(),
        crypto_amount: 0.02,
        fiat_amount: 800.0,
        price_at_tx: 40000.0,
        fiat_currency: "USD".to_string(),
        num_employees: 2,
        addresses: vec!["A".to_string(), "B".to_string()],
        ..TransactionBatch::default()
    }
}

#[test]
fn test_exact_breakdown_share() {
    let emp = Employee::new("u1");
    let records = transactions_for_employee(Some(&emp), &[exact_batch()], &btc_prices(50000.0));

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.id, "batch-exact");
    assert_eq!(record.crypto_amount, 0.01);
    assert_eq!(record.value_at_tx, 500.0);
    assert!(approx_eq(record.current_value, 500.0));
    assert_eq!(record.price_at_tx, 50000.0);
    assert_eq!(record.tx_hash.as_deref(), Some("0xexact"));
    assert_eq!(record.basis, ShareBasis::ExactShare);
    assert!(!record.is_estimate());
}

#[test]
fn test_breakdown_wins_over_address_list() {
    // u1's address is B, but the breakdown says u1 got 0.01
    let emp = Employee::new("u1").with_address("BTC", "B");
    let records = transactions_for_employee(Some(&emp), &[exact_batch()], &btc_prices(50000.0));

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].crypto_amount, 0.01);
    assert_eq!(records[0].basis, ShareBasis::ExactShare);
}

#[test]
fn test_proportional_estimate() {
    let emp = Employee::new("u1").with_address("BTC", "B");
    let records = transactions_for_employee(Some(&emp), &[legacy_batch()], &btc_prices(60000.0));

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert!(approx_eq(record.crypto_amount, 0.01));
    assert!(approx_eq(record.value_at_tx, 0.01 * 40000.0));
    assert!(approx_eq(record.current_value, 0.01 * 60000.0));
    assert_eq!(record.basis, ShareBasis::ProportionalEstimate);
    assert!(record.is_estimate());
}

#[test]
fn test_proportional_estimate_without_breakdown_entry() {
    // Breakdown exists but does not list u3; fall back to the address list
    let mut batch = exact_batch();
    batch.addresses.push("C".to_string());
    let emp = Employee::new("u3").with_address("BTC", "C");

    let records = transactions_for_employee(Some(&emp), &[batch], &btc_prices(50000.0));
    assert_eq!(records.len(), 1);
    assert!(approx_eq(records[0].crypto_amount, 0.01));
    assert_eq!(records[0].basis, ShareBasis::ProportionalEstimate);
}

#[test]
fn test_shared_address_is_credited_to_each_holder() {
    let alice = Employee::new("alice").with_address("BTC", "A");
    let bob = Employee::new("bob").with_address("BTC", "A");
    let batches = [legacy_batch()];
    let prices = btc_prices(40000.0);

    let a = transactions_for_employee(Some(&alice), &batches, &prices);
    let b = transactions_for_employee(Some(&bob), &batches, &prices);

    // Each holder gets a full address share; flagged as an estimate
    assert!(approx_eq(a[0].crypto_amount, 0.01));
    assert!(approx_eq(b[0].crypto_amount, 0.01));
    assert!(a[0].is_estimate() && b[0].is_estimate());
}

#[test]
fn test_unrelated_batch_is_excluded() {
    let emp = Employee::new("u9").with_address("BTC", "Z");
    let batches = vec![exact_batch(), legacy_batch()];
    let records = transactions_for_employee(Some(&emp), &batches, &btc_prices(50000.0));
    assert!(records.is_empty());
}

#[test]
fn test_exclusion_does_not_affect_other_records() {
    let emp = Employee::new("u1").with_address("BTC", "A");
    let unrelated = TransactionBatch {
        id: "batch-eth".to_string(),
        crypto_symbol: "ETH".to_string(),
        crypto_amount: 1.0,
        addresses: vec!["0xother".to_string()],
        ..TransactionBatch::default()
    };
    let batches = vec![exact_batch(), unrelated, legacy_batch()];

    let records = transactions_for_employee(Some(&emp), &batches, &btc_prices(50000.0));
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["batch-exact", "batch-legacy"]);
}

#[test]
fn test_address_for_other_symbol_does_not_match() {
    let emp = Employee::new("u1").with_address("ETH", "A");
    let records = transactions_for_employee(Some(&emp), &[legacy_batch()], &btc_prices(50000.0));
    assert!(records.is_empty());
}

#[test]
fn test_empty_address_list_is_excluded() {
    let emp = Employee::new("u1").with_address("BTC", "A");
    let batch = TransactionBatch {
        addresses: Vec::new(),
        ..legacy_batch()
    };
    let records = transactions_for_employee(Some(&emp), &[batch], &btc_prices(50000.0));
    assert!(records.is_empty());
}

#[test]
fn test_company_entry_never_matches() {
    let emp = Employee::new("u1");
    let mut company_entry = BreakdownEntry::for_company(250.0).with_crypto_amount(0.005);
    company_entry.user_id = Some("u1".to_string());
    let batch = TransactionBatch {
        per_employee_breakdown: Some(vec![company_entry]),
        ..exact_batch()
    };
    let records = transactions_for_employee(Some(&emp), &[batch], &btc_prices(50000.0));
    assert!(records.is_empty());
}

#[test]
fn test_employee_without_user_id_never_matches_breakdown() {
    let emp: Employee = serde_json::from_value(json!({})).unwrap();
    let batch: TransactionBatch = serde_json::from_value(json!({
        "id": "b1",
        "crypto_symbol": "BTC",
        "per_employee_breakdown": [
            { "user_id": "", "fiat_amount": 100, "crypto_amount": 0.002 }
        ]
    }))
    .unwrap();

    let records = transactions_for_employee(Some(&emp), &[batch], &btc_prices(50000.0));
    assert!(records.is_empty());
}

#[test]
fn test_absent_employee() {
    let records = transactions_for_employee(None, &[exact_batch()], &btc_prices(50000.0));
    assert!(records.is_empty());
}

#[test]
fn test_missing_price_values_at_zero() {
    let emp = Employee::new("u1");
    let records = transactions_for_employee(Some(&emp), &[exact_batch()], &Prices::new());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].current_value, 0.0);
    assert_eq!(records[0].value_at_tx, 500.0);
}

#[test]
fn test_garbage_prices_and_fields() {
    let prices = prices_from_value(&json!({ "BTC": "abc", "ETH": null, "USDC": "1.0" }));
    assert_eq!(prices.get("BTC"), Some(&0.0));
    assert_eq!(prices.get("USDC"), Some(&1.0));

    let batch: TransactionBatch = serde_json::from_value(json!({
        "id": "b1",
        "crypto_symbol": "BTC",
        "crypto_amount": "not a number",
        "price_at_tx": null,
        "addresses": ["A", 7, null],
        "per_employee_breakdown": "corrupted"
    }))
    .unwrap();
    assert!(batch.per_employee_breakdown.is_none());
    assert_eq!(batch.addresses.len(), 3);

    let emp = Employee::new("u1").with_address("BTC", "A");
    let records = transactions_for_employee(Some(&emp), &[batch], &prices);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].crypto_amount, 0.0);
    assert_eq!(records[0].value_at_tx, 0.0);
    assert_eq!(records[0].current_value, 0.0);
}

#[test]
fn test_non_object_prices() {
    assert!(prices_from_value(&json!([1, 2, 3])).is_empty());
    assert!(prices_from_value(&json!(null)).is_empty());
}

#[test]
fn test_reconcile_is_idempotent() {
    let emp = Employee::new("u1").with_address("BTC", "A");
    let batches = vec![exact_batch(), legacy_batch()];
    let prices = btc_prices(55000.0);

    let first = transactions_for_employee(Some(&emp), &batches, &prices);
    let second = transactions_for_employee(Some(&emp), &batches, &prices);
    assert_eq!(first, second);
    assert_eq!(batches, vec![exact_batch(), legacy_batch()]);
}

#[test]
fn test_history_totals() {
    let emp = Employee::new("u1").with_address("BTC", "A");
    let batches = vec![exact_batch(), legacy_batch()];
    let records = transactions_for_employee(Some(&emp), &batches, &btc_prices(60000.0));

    let totals = HistoryTotals::from_records(&records);
    assert_eq!(totals.records, 2);
    assert_eq!(totals.estimated_records, 1);
    assert!(totals.includes_estimates());
    assert!(approx_eq(totals.value_at_tx, 500.0 + 400.0));
    assert!(approx_eq(totals.current_value, 600.0 + 600.0));
    assert!(approx_eq(totals.gain, 300.0));
}

#[test]
fn test_records_serialize_basis_in_snake_case() {
    let emp = Employee::new("u1");
    let records = transactions_for_employee(Some(&emp), &[exact_batch()], &btc_prices(50000.0));
    let value = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(value["basis"], json!("exact_share"));
    assert_eq!(value["status"], json!("confirmed"));
}

#[test]
fn test_fingerprint_ignores_price_insertion_order() {
    let mut a = Prices::new();
    a.insert("BTC".to_string(), 50000.0);
    a.insert("ETH".to_string(), 3000.0);
    let mut b = Prices::new();
    b.insert("ETH".to_string(), 3000.0);
    b.insert("BTC".to_string(), 50000.0);

    let batches = vec![exact_batch()];
    assert_eq!(
        history_fingerprint("u1", &batches, &a),
        history_fingerprint("u1", &batches, &b)
    );
}

#[test]
fn test_fingerprint_tracks_data() {
    let prices = btc_prices(50000.0);
    let base = history_fingerprint("u1", &[exact_batch()], &prices);

    let mut confirmed_later = exact_batch();
    confirmed_later.status = BatchStatus::Pending;
    assert_ne!(base, history_fingerprint("u1", &[confirmed_later], &prices));
    assert_ne!(base, history_fingerprint("u1", &[exact_batch()], &btc_prices(51000.0)));
    assert_ne!(
        base,
        history_fingerprint("u1", &[exact_batch(), legacy_batch()], &prices)
    );
}
