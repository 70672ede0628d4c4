//! Tests for the batch ledger
//!
//! Company-wide figures over the payout history.

use crypto_payroll_core_rs::ledger::{
    assets, custody_holdings, last_run, next_payout, portfolio_value, sorted_newest_first,
};
use crypto_payroll_core_rs::reconcile::Prices;
use crypto_payroll_core_rs::{BatchFilter, BatchStatus, LedgerSummary, TransactionBatch};

fn batch(id: &str, date: &str, symbol: &str, status: BatchStatus) -> TransactionBatch {
    TransactionBatch {
        id: id.to_string(),
        date: date.to_string(),
        status,
        crypto_symbol: symbol.to_string(),
        fiat_currency: "USD".to_string(),
        ..TransactionBatch::default()
    }
}

fn history() -> Vec<TransactionBatch> {
    vec![
        TransactionBatch {
            crypto_amount: 0.02,
            fiat_amount: 1000.0,
            num_employees: 3,
            tx_hash: Some("0xAAA111".to_string()),
            ..batch("jan", "2025-01-31T17:00:00", "BTC", BatchStatus::Confirmed)
        },
        TransactionBatch {
            crypto_amount: 0.5,
            fiat_amount: 1500.0,
            num_employees: 2,
            tx_hash: Some("0xbbb222".to_string()),
            ..batch("mar", "2025-03-31T17:00:00Z", "ETH", BatchStatus::Pending)
        },
        TransactionBatch {
            crypto_amount: 0.01,
            fiat_amount: 500.0,
            num_employees: 1,
            ..batch("feb", "2025-02-28 17:00:00", "BTC", BatchStatus::Pending)
        },
    ]
}

fn ids(batches: &[&TransactionBatch]) -> Vec<String> {
    batches.iter().map(|b| b.id.clone()).collect()
}

#[test]
fn test_summary() {
    let summary = LedgerSummary::from_batches(&history());
    assert_eq!(summary.batches, 3);
    assert_eq!(summary.total_volume, 3000.0);
    assert_eq!(summary.pending_volume, 2000.0);
    assert_eq!(summary.pending_batches, 2);
    assert_eq!(summary.avg_recipients, 2.0);
}

#[test]
fn test_sorted_newest_first() {
    let batches = history();
    assert_eq!(
        ids(&sorted_newest_first(&batches)),
        vec!["mar", "feb", "jan"]
    );
}

#[test]
fn test_unparseable_dates_sort_last_and_stay_stable() {
    let mut batches = history();
    batches.insert(0, batch("bad-1", "not a date", "BTC", BatchStatus::Pending));
    batches.push(batch("bad-2", "", "BTC", BatchStatus::Pending));

    assert_eq!(
        ids(&sorted_newest_first(&batches)),
        vec!["mar", "feb", "jan", "bad-1", "bad-2"]
    );
}

#[test]
fn test_next_payout_and_last_run() {
    let batches = history();
    assert_eq!(next_payout(&batches).map(|b| b.id.as_str()), Some("mar"));
    assert_eq!(last_run(&batches).map(|b| b.id.as_str()), Some("mar"));

    let all_confirmed: Vec<TransactionBatch> = history()
        .into_iter()
        .map(|b| TransactionBatch {
            status: BatchStatus::Confirmed,
            ..b
        })
        .collect();
    assert!(next_payout(&all_confirmed).is_none());
    assert!(last_run(&[]).is_none());
}

#[test]
fn test_custody_holdings() {
    let supported = vec!["BTC".to_string(), "ETH".to_string(), "USDC".to_string()];
    let holdings = custody_holdings(&history(), true, &supported);

    assert!((holdings["BTC"] - 0.03).abs() < 1e-12);
    assert_eq!(holdings["ETH"], 0.5);
    assert_eq!(holdings["USDC"], 0.0);

    let direct = custody_holdings(&history(), false, &supported);
    assert!(direct.values().all(|v| *v == 0.0));
    assert_eq!(direct.len(), 3);
}

#[test]
fn test_portfolio_value() {
    let supported = vec!["BTC".to_string(), "ETH".to_string()];
    let holdings = custody_holdings(&history(), true, &supported);
    let prices = Prices::from([
        ("BTC".to_string(), 60000.0),
        ("ETH".to_string(), 3000.0),
        ("SOL".to_string(), 150.0),
    ]);

    let value = portfolio_value(&holdings, &prices);
    assert!((value - (0.03 * 60000.0 + 0.5 * 3000.0)).abs() < 1e-6);
}

#[test]
fn test_filter_by_status_and_asset() {
    let batches = history();

    let pending = BatchFilter {
        status: Some(BatchStatus::Pending),
        ..BatchFilter::default()
    };
    assert_eq!(ids(&pending.apply(&batches)), vec!["mar", "feb"]);

    let pending_btc = BatchFilter {
        status: Some(BatchStatus::Pending),
        asset: Some("BTC".to_string()),
        ..BatchFilter::default()
    };
    assert_eq!(ids(&pending_btc.apply(&batches)), vec!["feb"]);
}

#[test]
fn test_filter_search_is_case_insensitive() {
    let batches = history();

    let by_hash = BatchFilter {
        search: "aaa1".to_string(),
        ..BatchFilter::default()
    };
    assert_eq!(ids(&by_hash.apply(&batches)), vec!["jan"]);

    let by_symbol = BatchFilter {
        search: " eth ".to_string(),
        ..BatchFilter::default()
    };
    assert_eq!(ids(&by_symbol.apply(&batches)), vec!["mar"]);

    let by_fiat = BatchFilter {
        search: "usd".to_string(),
        ..BatchFilter::default()
    };
    assert_eq!(by_fiat.apply(&batches).len(), 3);
}

#[test]
fn test_empty_filter_matches_everything() {
    let batches = history();
    assert_eq!(BatchFilter::default().apply(&batches).len(), batches.len());
}

#[test]
fn test_assets() {
    assert_eq!(assets(&history()), vec!["BTC".to_string(), "ETH".to_string()]);
}
