//! Risk management types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Sizing failures
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SizingError {
    /// Entry and stop coincide
    #[error("Degenerate stop: entry {entry} equals stop {stop}")]
    DegenerateStop { entry: Decimal, stop: Decimal },
    /// Equity or tier percent leaves nothing to risk
    #[error("Non-positive risk amount {risk_amount} (equity {equity}, risk {risk_pct}%)")]
    NonPositiveRisk {
        risk_amount: Decimal,
        equity: Decimal,
        risk_pct: Decimal,
    },
    /// Risk amount or quantity does not fit in a decimal
    #[error("Quantity overflow: risking {risk_amount} over a stop distance of {stop_distance}")]
    QuantityOverflow {
        risk_amount: Decimal,
        stop_distance: Decimal,
    },
}

impl SizingError {
    /// Stable reason code
    pub fn code(&self) -> &'static str {
        match self {
            SizingError::DegenerateStop { .. } => "degenerate_stop",
            SizingError::NonPositiveRisk { .. } => "non_positive_risk",
            SizingError::QuantityOverflow { .. } => "quantity_overflow",
        }
    }
}

/// Reasons the ledger refuses a new position
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AdmissionDenied {
    /// Drawdown breach; cleared only by an operator
    #[error("Trading halted at {drawdown_pct}% drawdown")]
    Halted { drawdown_pct: Decimal },
    /// Losing-streak cooldown still running
    #[error("Cooldown active until {until}")]
    Cooldown { until: DateTime<Utc> },
    /// Daily trade count exhausted
    #[error("Maximum trades per day reached: {opened} >= {max}")]
    MaxTradesPerDay { opened: u32, max: u32 },
    /// Daily risk budget would be exceeded
    #[error("Daily risk budget exceeded: {used} + {requested} > {max}")]
    MaxDailyRisk {
        used: Decimal,
        requested: Decimal,
        max: Decimal,
    },
}

impl AdmissionDenied {
    /// Stable reason code
    pub fn code(&self) -> &'static str {
        match self {
            AdmissionDenied::Halted { .. } => "halted",
            AdmissionDenied::Cooldown { .. } => "cooldown",
            AdmissionDenied::MaxTradesPerDay { .. } => "max_trades_per_day",
            AdmissionDenied::MaxDailyRisk { .. } => "max_daily_risk",
        }
    }
}

/// Ledger bookkeeping errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Close already recorded; nothing changed
    #[error("Position {0} already closed")]
    AlreadyClosed(Uuid),
    /// Close for a position the ledger never opened
    #[error("Unknown position {0}")]
    UnknownPosition(Uuid),
    /// Open recorded twice
    #[error("Position {0} already open")]
    AlreadyOpen(Uuid),
    /// Open recorded before the fill was confirmed
    #[error("Position {0} is not filled")]
    NotFilled(Uuid),
}

impl LedgerError {
    /// Stable reason code
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::AlreadyClosed(_) => "already_closed",
            LedgerError::UnknownPosition(_) => "unknown_position",
            LedgerError::AlreadyOpen(_) => "already_open",
            LedgerError::NotFilled(_) => "not_filled",
        }
    }
}
