//! Integration tests for the admission path

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use trade_gate::config::Config;
use trade_gate::execution::{Fill, OrderBackend, OrderSpec, PaperEngine};
use trade_gate::feed::PriceTick;
use trade_gate::gate::{AdmissionOutcome, TradeGate, TradeRejection};
use trade_gate::journal::MemoryJournal;
use trade_gate::proposal::{Confidence, Decision, ProposalRecord};
use trade_gate::risk::AdmissionDenied;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

fn long(confidence: Confidence, entry: f64, stop: f64, target: f64) -> ProposalRecord {
    ProposalRecord {
        symbol: "BTCUSDT".to_string(),
        decision: Decision::Trade,
        confidence,
        reason_code: Some("CLEAN_SETUP".to_string()),
        entry_price: Some(entry),
        stop_loss: Some(stop),
        take_profit: Some(target),
        side: Some("buy".to_string()),
    }
}

fn scenario_a() -> ProposalRecord {
    long(Confidence::High, 50000.0, 49000.0, 52000.0)
}

fn gate_with(config: Config) -> (TradeGate, Arc<MemoryJournal>) {
    let journal = Arc::new(MemoryJournal::new());
    let gate = TradeGate::new(&config, Arc::new(PaperEngine::default()), journal.clone());
    (gate, journal)
}

async fn stop_out(gate: &TradeGate, at: DateTime<Utc>) {
    let closed = gate
        .monitor()
        .on_tick(PriceTick {
            symbol: "BTCUSDT".to_string(),
            price: dec!(49000),
            timestamp: at,
        })
        .await;
    assert_eq!(closed.len(), 1);
}

/// Fills after a delay so concurrent admissions overlap
struct SlowBackend {
    inner: PaperEngine,
}

#[async_trait]
impl OrderBackend for SlowBackend {
    async fn place_order(&self, order: OrderSpec) -> anyhow::Result<Fill> {
        tokio::time::sleep(StdDuration::from_millis(5)).await;
        self.inner.place_order(order).await
    }

    async fn get_fills(&self) -> anyhow::Result<Vec<Fill>> {
        self.inner.get_fills().await
    }
}

#[tokio::test]
async fn test_scenario_a_sizing() {
    let (gate, _) = gate_with(Config::default());
    let outcome = gate.submit(&scenario_a(), dec!(50000), t0()).await.unwrap();

    let AdmissionOutcome::Opened(position) = outcome else {
        panic!("expected an opened position");
    };
    assert_eq!(position.risk_amount, dec!(200));
    assert_eq!(position.quantity, dec!(0.2));
}

#[tokio::test]
async fn test_scenario_b_max_trades_per_day() {
    let (gate, journal) = gate_with(Config::default());
    for _ in 0..5 {
        gate.submit(&long(Confidence::Low, 50000.0, 49000.0, 52000.0), dec!(50000), t0())
            .await
            .unwrap();
    }

    let rejection = gate.submit(&scenario_a(), dec!(50000), t0()).await.unwrap_err();
    assert_eq!(
        rejection,
        TradeRejection::AdmissionDenied(AdmissionDenied::MaxTradesPerDay { opened: 5, max: 5 })
    );
    assert_eq!(rejection.code(), "max_trades_per_day");
    assert_eq!(journal.names().last(), Some(&"admission_denied"));

    // Counters untouched by the denial
    let snap = gate.snapshot().await;
    assert_eq!(snap.trades_opened_today, 5);
    assert_eq!(snap.risk_used_today, dec!(250));
}

#[tokio::test]
async fn test_scenario_c_cooldown_after_losses() {
    let (gate, journal) = gate_with(Config::default());
    let closed_at = t0() + Duration::minutes(10);

    for _ in 0..3 {
        gate.submit(&long(Confidence::Low, 50000.0, 49000.0, 52000.0), dec!(50000), t0())
            .await
            .unwrap();
        stop_out(&gate, closed_at).await;
    }

    let until = closed_at + Duration::hours(4);
    assert_eq!(gate.snapshot().await.cooldown_until, Some(until));
    assert!(journal.names().contains(&"cooldown_started"));

    let rejection = gate
        .submit(&scenario_a(), dec!(50000), until - Duration::seconds(1))
        .await
        .unwrap_err();
    assert_eq!(
        rejection,
        TradeRejection::AdmissionDenied(AdmissionDenied::Cooldown { until })
    );

    let outcome = gate.submit(&scenario_a(), dec!(50000), until).await.unwrap();
    assert!(matches!(outcome, AdmissionOutcome::Opened(_)));
}

#[tokio::test]
async fn test_scenario_d_halt_until_reset() {
    let mut config = Config::default();
    config.risk.max_drawdown_pct = dec!(5);
    config.risk.max_daily_risk_pct = dec!(100);
    config.risk.consecutive_loss_threshold = 0;
    let (gate, journal) = gate_with(config);

    // 200 + 196 + 192.08 lost = 5.88% drawdown
    for _ in 0..3 {
        gate.submit(&scenario_a(), dec!(50000), t0()).await.unwrap();
        stop_out(&gate, t0()).await;
    }
    let snap = gate.snapshot().await;
    assert!(snap.halted);
    assert_eq!(snap.current_equity, dec!(9411.92));
    assert!(journal.names().contains(&"halted"));

    let rejection = gate.submit(&scenario_a(), dec!(50000), t0()).await.unwrap_err();
    assert_eq!(rejection.code(), "halted");
    assert!(matches!(rejection, TradeRejection::HaltedState { .. }));

    // Even an invalid proposal reports the halt
    let invalid = long(Confidence::High, 50000.0, 51000.0, 52000.0);
    let rejection = gate.submit(&invalid, dec!(50000), t0()).await.unwrap_err();
    assert_eq!(rejection.code(), "halted");

    // A new day does not clear it
    gate.reset_day(t0() + Duration::days(1)).await;
    let rejection = gate
        .submit(&scenario_a(), dec!(50000), t0() + Duration::days(1))
        .await
        .unwrap_err();
    assert_eq!(rejection.code(), "halted");

    gate.reset_halt().await;
    let outcome = gate
        .submit(&scenario_a(), dec!(50000), t0() + Duration::days(1))
        .await
        .unwrap();
    assert!(matches!(outcome, AdmissionOutcome::Opened(_)));
}

#[tokio::test]
async fn test_validation_rejection_leaves_ledger_untouched() {
    let (gate, journal) = gate_with(Config::default());
    let cases = [
        (long(Confidence::High, 50000.0, 51000.0, 52000.0), "invalid_direction"),
        (long(Confidence::High, 50000.0, 49990.0, 52000.0), "stop_too_tight"),
        (long(Confidence::High, 50000.0, 40000.0, 70000.0), "stop_too_wide"),
        (long(Confidence::High, 50000.0, 49000.0, 50500.0), "poor_risk_reward"),
        (long(Confidence::High, f64::NAN, 49000.0, 52000.0), "non_finite_price"),
    ];

    for (record, code) in cases {
        let rejection = gate.submit(&record, dec!(50000), t0()).await.unwrap_err();
        assert_eq!(rejection.code(), code);
    }

    let snap = gate.snapshot().await;
    assert_eq!(snap.trades_opened_today, 0);
    assert_eq!(snap.risk_used_today, Decimal::ZERO);
    assert_eq!(journal.len(), 5);
}

#[tokio::test]
async fn test_extreme_prices_are_rejected_with_codes() {
    let (gate, journal) = gate_with(Config::default());

    // Valid 1% stop at 1e-25, but 200 / 1e-27 units does not fit
    let tiny = long(Confidence::High, 1e-25, 0.99e-25, 1.1e-25);
    let rejection = gate.submit(&tiny, dec!(1), t0()).await.unwrap_err();
    assert_eq!(rejection.code(), "quantity_overflow");

    let mut huge = long(Confidence::High, 1.0, 7e28, 0.5);
    huge.side = Some("sell".to_string());
    let rejection = gate.submit(&huge, dec!(1), t0()).await.unwrap_err();
    assert_eq!(rejection.code(), "stop_too_wide");

    assert_eq!(journal.names(), vec!["sizing_rejected", "validation_rejected"]);
    let snap = gate.snapshot().await;
    assert_eq!(snap.trades_opened_today, 0);
    assert_eq!(snap.risk_used_today, Decimal::ZERO);

    // The ledger lock was released
    gate.submit(&scenario_a(), dec!(50000), t0()).await.unwrap();
}

#[tokio::test]
async fn test_concurrent_submits_respect_daily_budget() {
    let mut config = Config::default();
    config.risk.max_trades_per_day = 100;
    let journal = Arc::new(MemoryJournal::new());
    let backend = Arc::new(SlowBackend {
        inner: PaperEngine::default(),
    });
    let gate = Arc::new(TradeGate::new(&config, backend.clone(), journal.clone()));

    // 200 risk each against a 1000 budget
    let mut handles = Vec::new();
    for _ in 0..20 {
        let gate = gate.clone();
        handles.push(tokio::spawn(async move {
            gate.submit(&scenario_a(), dec!(50000), t0()).await
        }));
    }

    let mut opened = 0;
    let mut denied = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(AdmissionOutcome::Opened(_)) => opened += 1,
            Err(rejection) => {
                assert_eq!(rejection.code(), "max_daily_risk");
                denied += 1;
            }
            Ok(other) => panic!("unexpected outcome {other:?}"),
        }
    }

    assert_eq!(opened, 5);
    assert_eq!(denied, 15);
    let snap = gate.snapshot().await;
    assert_eq!(snap.risk_used_today, dec!(1000));
    assert_eq!(backend.get_fills().await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_backend_failure_then_recovery() {
    let journal = Arc::new(MemoryJournal::new());
    let backend = Arc::new(PaperEngine::default());
    let gate = TradeGate::new(&Config::default(), backend.clone(), journal.clone());

    backend.fail_next_order("venue timeout").await;
    let rejection = gate.submit(&scenario_a(), dec!(50000), t0()).await.unwrap_err();
    assert!(matches!(rejection, TradeRejection::BackendFailure(_)));
    assert_eq!(gate.snapshot().await.trades_opened_today, 0);

    gate.submit(&scenario_a(), dec!(50000), t0()).await.unwrap();
    let snap = gate.snapshot().await;
    assert_eq!(snap.trades_opened_today, 1);
    assert_eq!(snap.risk_used_today, dec!(200));
    assert_eq!(journal.names(), vec!["order_failed", "trade_opened"]);
}
