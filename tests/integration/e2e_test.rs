//! End-to-end integration tests

use std::io::Write;
use std::sync::Arc;

use rust_decimal_macros::dec;
use trade_gate::cli::Session;
use trade_gate::config::{Config, ExecutionMode};
use trade_gate::journal::{FanoutJournal, JsonlJournal, MemoryJournal};
use trade_gate::telemetry::LogFormat;

#[test]
fn test_config_example_loads() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.account.initial_equity, dec!(10000));
    assert_eq!(config.risk.max_trades_per_day, 5);
    assert_eq!(config.risk.max_daily_risk_pct, dec!(10));
    assert_eq!(config.risk.max_drawdown_pct, dec!(20));
    assert_eq!(config.risk.consecutive_loss_threshold, 3);
    assert_eq!(config.risk.cooldown_secs, 14400);
    assert_eq!(config.sizing.risk_mapping.high, dec!(2));
    assert_eq!(config.execution.mode, ExecutionMode::Paper);
    assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
    assert!(config.journal.path.is_none());
}

#[test]
fn test_config_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[risk]
max_trades_per_day = 2

[telemetry]
log_format = "json"
"#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.risk.max_trades_per_day, 2);
    // Unspecified sections keep their defaults
    assert_eq!(config.risk.max_drawdown_pct, dec!(20));
    assert_eq!(config.validation.min_rr, dec!(1));
    assert_eq!(config.telemetry.log_format, LogFormat::Json);
}

#[test]
fn test_config_load_rejects_bad_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[risk]\nmax_trades_per_day = \"many\"").unwrap();
    assert!(Config::load(file.path()).is_err());
}

const SESSION: &str = r#"
{"type":"tick","symbol":"BTCUSDT","price":50000,"timestamp":"2026-03-02T09:00:00Z"}
{"type":"proposal","at":"2026-03-02T09:00:00Z","proposal":{"symbol":"BTCUSDT","decision":"TRADE","confidence":"HIGH","stop_loss":49000.0,"take_profit":52000.0,"side":"buy"}}
{"type":"tick","symbol":"BTCUSDT","price":48900,"timestamp":"2026-03-02T09:30:00Z"}
{"type":"proposal","at":"2026-03-02T10:00:00Z","proposal":{"symbol":"BTCUSDT","decision":"NO_TRADE","confidence":"LOW","reason_code":"CHOPPY"}}
{"type":"proposal","at":"2026-03-02T10:00:00Z","current_price":48900,"proposal":{"symbol":"BTCUSDT","decision":"TRADE","confidence":"MID","entry_price":48900.0,"stop_loss":49400.0,"take_profit":47900.0,"side":"sell"}}
{"type":"bar","symbol":"BTCUSDT","open":48900,"high":48950,"low":47800,"close":47850,"timestamp":"2026-03-02T11:00:00Z"}
{"type":"day_reset","at":"2026-03-03T00:00:00Z"}
"#;

#[tokio::test]
async fn test_session_writes_journal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.jsonl");

    let file_journal = Arc::new(JsonlJournal::open(&path).await.unwrap());
    let memory = Arc::new(MemoryJournal::new());
    let journal = FanoutJournal::new()
        .with(file_journal.clone())
        .with(memory.clone());

    let mut session = Session::new(&Config::default(), Arc::new(journal));
    session.replay(SESSION).await;
    file_journal.shutdown().await.unwrap();

    let summary = session.summary();
    assert_eq!(summary.opened, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.closed, 2);

    // -200 on the long, then 1% of 9800 = 98 risked on the short at 2R
    let snap = session.gate().snapshot().await;
    assert_eq!(snap.current_equity, dec!(9996));
    assert_eq!(snap.peak_equity, dec!(10000));
    assert_eq!(snap.trades_opened_today, 0);

    let content = std::fs::read_to_string(&path).unwrap();
    let events: Vec<String> = content
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            value["event"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(
        events,
        vec!["trade_opened", "trade_closed", "trade_opened", "trade_closed", "day_reset"]
    );
    assert_eq!(memory.len(), 5);
}
