//! Integration tests for position lifecycle

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::mpsc;
use trade_gate::config::Config;
use trade_gate::execution::PaperEngine;
use trade_gate::feed::{Bar, PriceObservation, PriceTick};
use trade_gate::gate::TradeGate;
use trade_gate::journal::{JournalEvent, MemoryJournal};
use trade_gate::proposal::{Confidence, Decision, ProposalRecord};
use trade_gate::risk::{CloseReason, LedgerError, PositionStatus};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

fn record(symbol: &str, side: &str, entry: f64, stop: f64, target: f64) -> ProposalRecord {
    ProposalRecord {
        symbol: symbol.to_string(),
        decision: Decision::Trade,
        confidence: Confidence::Mid,
        reason_code: None,
        entry_price: Some(entry),
        stop_loss: Some(stop),
        take_profit: Some(target),
        side: Some(side.to_string()),
    }
}

fn tick(symbol: &str, price: Decimal) -> PriceObservation {
    PriceTick {
        symbol: symbol.to_string(),
        price,
        timestamp: t0(),
    }
    .into()
}

fn setup() -> (TradeGate, Arc<MemoryJournal>) {
    let journal = Arc::new(MemoryJournal::new());
    let gate = TradeGate::new(
        &Config::default(),
        Arc::new(PaperEngine::default()),
        journal.clone(),
    );
    (gate, journal)
}

#[tokio::test]
async fn test_push_stream_closes_positions() {
    let (gate, journal) = setup();
    gate.submit(&record("BTCUSDT", "buy", 50000.0, 49500.0, 51000.0), dec!(50000), t0())
        .await
        .unwrap();
    gate.submit(&record("ETHUSDT", "sell", 3000.0, 3025.0, 2950.0), dec!(3000), t0())
        .await
        .unwrap();

    let monitor = gate.monitor();
    let (tx, rx) = mpsc::channel(16);
    let driver = tokio::spawn({
        let monitor = monitor.clone();
        async move { monitor.run_push(rx).await }
    });

    tx.send(tick("BTCUSDT", dec!(50400))).await.unwrap();
    tx.send(tick("ETHUSDT", dec!(2990))).await.unwrap();
    tx.send(tick("BTCUSDT", dec!(51000))).await.unwrap();
    tx.send(tick("ETHUSDT", dec!(3031))).await.unwrap();
    drop(tx);

    assert_eq!(driver.await.unwrap(), 2);
    assert_eq!(monitor.open_count().await, 0);

    // +2R on BTC, -1R on ETH, 100 risk each
    let stats = gate.stats().await;
    assert_eq!(stats.closed_trades, 2);
    assert_eq!(stats.total_pnl, dec!(100));
    assert_eq!(stats.average_r, dec!(0.5));

    let closes: Vec<CloseReason> = journal
        .events()
        .into_iter()
        .filter_map(|event| match event {
            JournalEvent::TradeClosed { closed, .. } => Some(closed.close_reason),
            _ => None,
        })
        .collect();
    assert_eq!(closes, vec![CloseReason::Target, CloseReason::Stop]);
}

#[tokio::test]
async fn test_pull_sweep_uses_marks() {
    let (gate, _) = setup();
    gate.submit(&record("BTCUSDT", "buy", 50000.0, 49500.0, 51000.0), dec!(50000), t0())
        .await
        .unwrap();

    let source = PaperEngine::default();
    let monitor = gate.monitor();
    let symbols = monitor.symbols().await;
    assert_eq!(symbols, vec!["BTCUSDT".to_string()]);

    source.set_mark("BTCUSDT", dec!(50200)).await;
    assert!(monitor.sweep(&source, &symbols).await.is_empty());

    source.set_mark("BTCUSDT", dec!(49400)).await;
    let closed = monitor.sweep(&source, &symbols).await;
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].close_price, dec!(49500));
    assert_eq!(closed[0].realized_r, dec!(-1));
    assert!(monitor.symbols().await.is_empty());
}

#[tokio::test]
async fn test_closed_position_is_terminal() {
    let (gate, _) = setup();
    let outcome = gate
        .submit(&record("BTCUSDT", "buy", 50000.0, 49500.0, 51000.0), dec!(50000), t0())
        .await
        .unwrap();
    let id = outcome.position().unwrap().id;

    let monitor = gate.monitor();
    let closed = monitor.on_observation(&tick("BTCUSDT", dec!(51500))).await;
    assert_eq!(closed[0].position.status, PositionStatus::Closed);

    // Later crossings and manual closes change nothing
    assert!(monitor.on_observation(&tick("BTCUSDT", dec!(49000))).await.is_empty());
    assert_eq!(
        gate.close_manual(id, dec!(49000), t0()).await.unwrap_err(),
        LedgerError::AlreadyClosed(id)
    );

    let ledger = gate.ledger();
    let ledger = ledger.lock().await;
    assert_eq!(ledger.closed_positions().len(), 1);
    assert_eq!(ledger.equity(), dec!(10200));
    assert_eq!(ledger.consecutive_losses(), 0);
}

#[tokio::test]
async fn test_bar_spanning_stop_and_target() {
    let (gate, _) = setup();
    gate.submit(&record("ETHUSDT", "sell", 3000.0, 3025.0, 2950.0), dec!(3000), t0())
        .await
        .unwrap();

    let bar = Bar {
        symbol: "ETHUSDT".to_string(),
        open: dec!(3000),
        high: dec!(3040),
        low: dec!(2930),
        close: dec!(2950),
        timestamp: t0(),
    };
    let closed = gate.monitor().on_observation(&bar.into()).await;
    assert_eq!(closed[0].close_reason, CloseReason::Stop);
    assert_eq!(closed[0].close_price, dec!(3025));
    assert_eq!(closed[0].realized_pnl, dec!(-100));
}
