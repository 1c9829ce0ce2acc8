//! Dispatcher-level flows against the in-memory doubles.

use std::sync::Arc;

use exchanger::dispatcher::Dispatcher;
use exchanger::engine::{ExchangeEngine, FixedPointConversion, MissingBalancePolicy};
use exchanger::types::{OracleError, Response};

use crate::mock_ledger::{MockLedger, MockOracle};

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn dispatcher(oracle: &MockOracle, ledger: &MockLedger) -> Dispatcher {
    let engine = ExchangeEngine::new(Arc::new(oracle.clone()), Arc::new(ledger.clone()));
    Dispatcher::new(Arc::new(engine))
}

#[tokio::test]
async fn exchange_writes_truncated_rate_times_quantity() {
    let oracle = MockOracle::with_rates(&[("USD", 2.7), ("EUR", 7055.574)]);
    let ledger = MockLedger::seeded(&[("alice", "100")]);
    let d = dispatcher(&oracle, &ledger);

    let resp = d.dispatch("exchange", &args(&["alice", "USD", "5"])).await;
    assert_eq!(resp, Response::success("balance: 10"));
    assert_eq!(ledger.value("alice").as_deref(), Some("10"));

    let resp = d.dispatch("exchange", &args(&["alice", "EUR", "3"])).await;
    assert_eq!(resp, Response::success("balance: 21165"));
    assert_eq!(oracle.calls(), 2, "every exchange re-fetches");
}

#[tokio::test]
async fn init_then_exchange() {
    let oracle = MockOracle::with_rates(&[("USD", 4.0)]);
    let ledger = MockLedger::default();
    let d = dispatcher(&oracle, &ledger);

    assert!(d.init(&args(&["alice", "100"])).is_success());
    assert_eq!(oracle.calls(), 0);

    let resp = d.dispatch("exchange", &args(&["alice", "USD", "2"])).await;
    assert_eq!(resp, Response::success("balance: 8"));
}

#[tokio::test]
async fn get_reads_without_writing() {
    let oracle = MockOracle::with_rates(&[]);
    let ledger = MockLedger::seeded(&[("alice", "77")]);
    let d = dispatcher(&oracle, &ledger);

    for _ in 0..3 {
        assert_eq!(d.dispatch("get", &args(&["alice"])).await, Response::success("balance: 77"));
    }
    assert_eq!(ledger.reads(), 3);
    assert_eq!(ledger.writes(), 0);
    assert_eq!(oracle.calls(), 0);
}

#[tokio::test]
async fn malformed_invocations_touch_nothing() {
    let oracle = MockOracle::with_rates(&[("USD", 2.7)]);
    let ledger = MockLedger::seeded(&[("alice", "100")]);
    let d = dispatcher(&oracle, &ledger);

    let cases: Vec<(&str, Vec<String>, &str)> = vec![
        ("exchange", args(&["alice", "USD"]), "INVALID_ARGUMENT"),
        ("exchange", args(&["alice", "USD", "5", "extra"]), "INVALID_ARGUMENT"),
        ("exchange", args(&["alice", "USD", "five"]), "INVALID_ARGUMENT"),
        ("get", args(&[]), "INVALID_ARGUMENT"),
        ("get", args(&["alice", "bob"]), "INVALID_ARGUMENT"),
        ("burn", args(&["alice"]), "UNKNOWN_COMMAND"),
        ("", args(&[]), "UNKNOWN_COMMAND"),
    ];

    for (command, a, code) in cases {
        let resp = d.dispatch(command, &a).await;
        assert_eq!(resp.code(), Some(code), "{command} {a:?}");
    }

    assert_eq!(oracle.calls(), 0);
    assert_eq!(ledger.reads(), 0);
    assert_eq!(ledger.writes(), 0);
}

#[tokio::test]
async fn unknown_currency_performs_no_write() {
    let oracle = MockOracle::with_rates(&[("USD", 2.7)]);
    let ledger = MockLedger::seeded(&[("alice", "100")]);
    let d = dispatcher(&oracle, &ledger);

    let resp = d.dispatch("exchange", &args(&["alice", "JPY", "5"])).await;
    assert_eq!(resp.code(), Some("UNKNOWN_CURRENCY"));
    assert_eq!(ledger.writes(), 0);
    assert_eq!(ledger.value("alice").as_deref(), Some("100"));
}

#[tokio::test]
async fn oracle_failures_perform_no_write() {
    let oracle = MockOracle::with_rates(&[("USD", 2.7)]);
    let ledger = MockLedger::seeded(&[("alice", "100")]);
    let d = dispatcher(&oracle, &ledger);

    oracle.set_error(OracleError::FetchFailed("operation timed out".into()));
    let resp = d.dispatch("exchange", &args(&["alice", "USD", "5"])).await;
    assert_eq!(resp.code(), Some("FETCH_FAILED"));

    oracle.set_error(OracleError::DecodeFailed("expected value at line 1 column 1".into()));
    let resp = d.dispatch("exchange", &args(&["alice", "USD", "5"])).await;
    assert_eq!(resp.code(), Some("DECODE_FAILED"));

    assert_eq!(ledger.writes(), 0);

    oracle.clear_error();
    let resp = d.dispatch("exchange", &args(&["alice", "USD", "5"])).await;
    assert_eq!(resp, Response::success("balance: 10"));
}

#[tokio::test]
async fn empty_value_counts_as_missing() {
    let oracle = MockOracle::with_rates(&[("USD", 2.7)]);
    let ledger = MockLedger::default();

    let strict = dispatcher(&oracle, &ledger);
    assert_eq!(strict.dispatch("get", &args(&["bob"])).await.code(), Some("CORRUPT_STATE"));
    let resp = strict.dispatch("exchange", &args(&["bob", "USD", "1"])).await;
    assert_eq!(resp.code(), Some("CORRUPT_STATE"));
    assert_eq!(ledger.writes(), 0);

    let lenient = Dispatcher::new(Arc::new(
        ExchangeEngine::new(Arc::new(oracle.clone()), Arc::new(ledger.clone()))
            .with_missing_balance_policy(MissingBalancePolicy::ZeroDefault),
    ));
    assert_eq!(lenient.dispatch("get", &args(&["bob"])).await, Response::success("balance: 0"));
    let resp = lenient.dispatch("exchange", &args(&["bob", "USD", "1"])).await;
    assert_eq!(resp, Response::success("balance: 2"));
}

#[tokio::test]
async fn rejected_write_is_store_failed() {
    let oracle = MockOracle::with_rates(&[("USD", 2.7)]);
    let ledger = MockLedger::seeded(&[("alice", "100")]);
    let d = dispatcher(&oracle, &ledger);

    ledger.reject_writes(true);
    let resp = d.dispatch("exchange", &args(&["alice", "USD", "5"])).await;
    assert_eq!(resp.code(), Some("STORE_FAILED"));
    assert_eq!(ledger.value("alice").as_deref(), Some("100"));

    assert_eq!(d.init(&args(&["bob", "1"])).code(), Some("STORE_FAILED"));
}

#[tokio::test]
async fn rate_changes_between_calls_are_picked_up() {
    let oracle = MockOracle::with_rates(&[("USD", 2.7)]);
    let ledger = MockLedger::seeded(&[("alice", "100")]);
    let d = dispatcher(&oracle, &ledger);

    assert_eq!(d.dispatch("exchange", &args(&["alice", "USD", "10"])).await, Response::success("balance: 20"));
    oracle.set_rate("USD", 0.9);
    assert_eq!(d.dispatch("exchange", &args(&["alice", "USD", "10"])).await, Response::success("balance: 0"));
}

#[tokio::test]
async fn fixed_point_conversion_through_dispatch() {
    let oracle = MockOracle::with_rates(&[("USD", 0.9)]);
    let ledger = MockLedger::seeded(&[("alice", "100")]);
    let d = Dispatcher::new(Arc::new(
        ExchangeEngine::new(Arc::new(oracle.clone()), Arc::new(ledger.clone()))
            .with_conversion(Box::new(FixedPointConversion)),
    ));

    assert_eq!(d.dispatch("exchange", &args(&["alice", "USD", "10"])).await, Response::success("balance: 9"));
}

#[tokio::test]
async fn written_values_round_trip() {
    let oracle = MockOracle::with_rates(&[("USD", 3.0)]);
    let ledger = MockLedger::seeded(&[("alice", "0")]);
    let d = dispatcher(&oracle, &ledger);

    for quantity in [0u64, 1, 7, 1_000, 6_148_914_691_236_517_205] {
        let expected = 3 * quantity;
        let q = quantity.to_string();
        let resp = d.dispatch("exchange", &args(&["alice", "USD", q.as_str()])).await;
        assert_eq!(resp, Response::success(format!("balance: {expected}")));
        assert_eq!(d.dispatch("get", &args(&["alice"])).await, Response::success(format!("balance: {expected}")));
        assert_eq!(ledger.value("alice"), Some(expected.to_string()));
    }
}
