//! Admission outcomes

use rust_decimal::Decimal;
use thiserror::Error;

use crate::proposal::{Decision, ValidationError};
use crate::risk::{AdmissionDenied, Position, SizingError};

/// Result of a proposal that was not rejected
#[derive(Debug, Clone, PartialEq)]
pub enum AdmissionOutcome {
    /// Producer did not ask for a trade
    Skipped(Decision),
    /// Position filled and now monitored
    Opened(Position),
}

impl AdmissionOutcome {
    pub fn code(&self) -> &'static str {
        match self {
            AdmissionOutcome::Skipped(_) => "skipped",
            AdmissionOutcome::Opened(_) => "opened",
        }
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            AdmissionOutcome::Opened(position) => Some(position),
            AdmissionOutcome::Skipped(_) => None,
        }
    }
}

/// Why a proposal did not become a position
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TradeRejection {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Sizing failed: {0}")]
    Sizing(#[from] SizingError),

    #[error("Admission denied: {0}")]
    AdmissionDenied(AdmissionDenied),

    /// Drawdown halt; only an operator reset clears it
    #[error("Trading halted at {drawdown_pct}% drawdown")]
    HaltedState { drawdown_pct: Decimal },

    /// Order placement failed; nothing was committed
    #[error("Order backend failure: {0}")]
    BackendFailure(String),
}

impl TradeRejection {
    /// Stable reason code
    pub fn code(&self) -> &'static str {
        match self {
            TradeRejection::Validation(e) => e.code(),
            TradeRejection::Sizing(e) => e.code(),
            TradeRejection::AdmissionDenied(d) => d.code(),
            TradeRejection::HaltedState { .. } => "halted",
            TradeRejection::BackendFailure(_) => "backend_failure",
        }
    }
}

impl From<AdmissionDenied> for TradeRejection {
    fn from(denied: AdmissionDenied) -> Self {
        match denied {
            AdmissionDenied::Halted { drawdown_pct } => TradeRejection::HaltedState { drawdown_pct },
            other => TradeRejection::AdmissionDenied(other),
        }
    }
}
