//! Journal event types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::execution::Fill;
use crate::risk::{ClosedPosition, Position};

/// Structured record of every admission and lifecycle decision
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JournalEvent {
    ValidationRejected {
        at: DateTime<Utc>,
        symbol: String,
        code: &'static str,
        message: String,
    },
    SizingRejected {
        at: DateTime<Utc>,
        symbol: String,
        code: &'static str,
        message: String,
    },
    AdmissionDenied {
        at: DateTime<Utc>,
        symbol: String,
        code: &'static str,
        message: String,
        risk_amount: Decimal,
    },
    OrderFailed {
        at: DateTime<Utc>,
        position: Position,
        message: String,
    },
    TradeOpened {
        at: DateTime<Utc>,
        position: Position,
        fill: Fill,
    },
    TradeClosed {
        at: DateTime<Utc>,
        closed: ClosedPosition,
        equity: Decimal,
        drawdown_pct: Decimal,
    },
    CooldownStarted {
        at: DateTime<Utc>,
        until: DateTime<Utc>,
    },
    Halted {
        at: DateTime<Utc>,
        drawdown_pct: Decimal,
        equity: Decimal,
    },
    DayReset {
        at: DateTime<Utc>,
        equity: Decimal,
    },
}

impl JournalEvent {
    /// Event name as written to the journal
    pub fn name(&self) -> &'static str {
        match self {
            JournalEvent::ValidationRejected { .. } => "validation_rejected",
            JournalEvent::SizingRejected { .. } => "sizing_rejected",
            JournalEvent::AdmissionDenied { .. } => "admission_denied",
            JournalEvent::OrderFailed { .. } => "order_failed",
            JournalEvent::TradeOpened { .. } => "trade_opened",
            JournalEvent::TradeClosed { .. } => "trade_closed",
            JournalEvent::CooldownStarted { .. } => "cooldown_started",
            JournalEvent::Halted { .. } => "halted",
            JournalEvent::DayReset { .. } => "day_reset",
        }
    }
}
