//! Prometheus metrics

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::risk::{CloseReason, LedgerSnapshot};

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Full admission pipeline, validation through record_open
    Admission,
    /// Backend order submission
    OrderSubmission,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Current equity
    Equity,
    /// Current drawdown percentage
    DrawdownPct,
    /// Risk committed since the last day boundary
    RiskUsedToday,
    /// Open position count
    OpenPositions,
}

/// Start the Prometheus scrape endpoint on `port`
pub fn init_metrics_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let metric_name = match metric {
        LatencyMetric::Admission => "tradegate_admission_latency_ms",
        LatencyMetric::OrderSubmission => "tradegate_order_submission_latency_ms",
    };

    metrics::histogram!(metric_name).record(duration.as_secs_f64() * 1000.0);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let metric_name = match metric {
        GaugeMetric::Equity => "tradegate_equity",
        GaugeMetric::DrawdownPct => "tradegate_drawdown_pct",
        GaugeMetric::RiskUsedToday => "tradegate_risk_used_today",
        GaugeMetric::OpenPositions => "tradegate_open_positions",
    };

    metrics::gauge!(metric_name).set(value);
}

/// Count an admission decision by outcome code
pub fn record_admission(outcome: &'static str) {
    metrics::counter!("tradegate_admissions_total", "outcome" => outcome).increment(1);
}

/// Count a closed trade by reason
pub fn record_close(reason: CloseReason) {
    metrics::counter!("tradegate_trades_closed_total", "reason" => reason.as_str()).increment(1);
}

/// Publish the ledger gauges
pub fn record_ledger(snapshot: &LedgerSnapshot) {
    set_gauge(GaugeMetric::Equity, as_f64(snapshot.current_equity));
    set_gauge(GaugeMetric::DrawdownPct, as_f64(snapshot.drawdown_pct));
    set_gauge(GaugeMetric::RiskUsedToday, as_f64(snapshot.risk_used_today));
}

fn as_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}
