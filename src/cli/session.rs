//! Paper session replay
//!
//! A session file is JSON lines, one event per line, tagged by `type`:
//!
//! ```text
//! {"type":"proposal","at":"2026-03-02T09:00:00Z","current_price":50000,"proposal":{...}}
//! {"type":"tick","symbol":"BTCUSDT","price":50250,"timestamp":"2026-03-02T09:01:00Z"}
//! {"type":"bar","symbol":"BTCUSDT","open":..,"high":..,"low":..,"close":..,"timestamp":".."}
//! {"type":"close","symbol":"BTCUSDT","price":50100,"at":".."}
//! {"type":"day_reset","at":"2026-03-03T00:00:00Z"}
//! {"type":"reset_halt"}
//! {"type":"clear_cooldown"}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::execution::PaperEngine;
use crate::feed::{Bar, PriceObservation, PriceSource, PriceTick};
use crate::gate::{AdmissionOutcome, TradeGate};
use crate::journal::JournalSink;
use crate::proposal::ProposalRecord;

/// One line of a session file
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Proposal from the advisory step; `current_price` falls back to the last mark
    Proposal {
        at: DateTime<Utc>,
        #[serde(default)]
        current_price: Option<Decimal>,
        proposal: ProposalRecord,
    },
    Tick(PriceTick),
    Bar(Bar),
    /// Manually close every open position on `symbol`
    Close {
        at: DateTime<Utc>,
        symbol: String,
        price: Decimal,
    },
    DayReset {
        at: DateTime<Utc>,
    },
    ResetHalt,
    ClearCooldown,
}

/// Counts collected while replaying
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSummary {
    pub events: usize,
    pub invalid_lines: usize,
    pub opened: usize,
    pub skipped: usize,
    pub closed: usize,
    /// Rejections by reason code
    pub rejections: BTreeMap<&'static str, usize>,
}

impl SessionSummary {
    pub fn rejected(&self) -> usize {
        self.rejections.values().sum()
    }

    fn reject(&mut self, code: &'static str) {
        *self.rejections.entry(code).or_default() += 1;
    }
}

/// Paper trading session driven by recorded events
pub struct Session {
    gate: TradeGate,
    engine: Arc<PaperEngine>,
    summary: SessionSummary,
}

impl Session {
    pub fn new(config: &Config, journal: Arc<dyn JournalSink>) -> Self {
        let engine = Arc::new(
            PaperEngine::new(config.execution.fee_rate)
                .with_slippage_pct(config.execution.slippage_pct),
        );
        let gate = TradeGate::new(config, engine.clone(), journal);
        Self {
            gate,
            engine,
            summary: SessionSummary::default(),
        }
    }

    pub fn gate(&self) -> &TradeGate {
        &self.gate
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    /// Parse and apply every line of a session file
    pub async fn replay(&mut self, content: &str) {
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match serde_json::from_str::<SessionEvent>(line) {
                Ok(event) => self.apply(event).await,
                Err(e) => {
                    tracing::warn!(line = index + 1, error = %e, "Skipping invalid session line");
                    self.summary.invalid_lines += 1;
                }
            }
        }
    }

    /// Apply a single event
    pub async fn apply(&mut self, event: SessionEvent) {
        self.summary.events += 1;
        match event {
            SessionEvent::Proposal {
                at,
                current_price,
                proposal,
            } => self.submit(proposal, current_price, at).await,
            SessionEvent::Tick(tick) => {
                self.engine.set_mark(&tick.symbol, tick.price).await;
                self.observe(tick.into()).await;
            }
            SessionEvent::Bar(bar) => {
                self.engine.set_mark(&bar.symbol, bar.close).await;
                self.observe(bar.into()).await;
            }
            SessionEvent::Close { at, symbol, price } => {
                let monitor = self.gate.monitor();
                for position in monitor.open_positions().await {
                    if position.symbol != symbol {
                        continue;
                    }
                    match self.gate.close_manual(position.id, price, at).await {
                        Ok(_) => self.summary.closed += 1,
                        Err(e) => tracing::warn!(position_id = %position.id, error = %e, "Manual close failed"),
                    }
                }
            }
            SessionEvent::DayReset { at } => self.gate.reset_day(at).await,
            SessionEvent::ResetHalt => self.gate.reset_halt().await,
            SessionEvent::ClearCooldown => self.gate.clear_cooldown().await,
        }
    }

    async fn submit(
        &mut self,
        proposal: ProposalRecord,
        current_price: Option<Decimal>,
        at: DateTime<Utc>,
    ) {
        let price = match current_price {
            Some(price) => price,
            None => match self.engine.current_price(&proposal.symbol).await {
                Ok(price) => price,
                Err(e) => {
                    tracing::warn!(symbol = %proposal.symbol, error = %e, "No price for proposal");
                    self.summary.reject("no_price");
                    return;
                }
            },
        };

        match self.gate.submit(&proposal, price, at).await {
            Ok(AdmissionOutcome::Opened(_)) => self.summary.opened += 1,
            Ok(AdmissionOutcome::Skipped(_)) => self.summary.skipped += 1,
            Err(rejection) => self.summary.reject(rejection.code()),
        }
    }

    async fn observe(&mut self, observation: PriceObservation) {
        let closed = self.gate.monitor().on_observation(&observation).await;
        self.summary.closed += closed.len();
    }
}
