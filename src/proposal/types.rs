//! Proposal types

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Profit when price rises
    Long,
    /// Profit when price falls
    Short,
}

impl Side {
    /// +1 for Long, -1 for Short
    pub fn sign(self) -> Decimal {
        match self {
            Side::Long => Decimal::ONE,
            Side::Short => Decimal::NEGATIVE_ONE,
        }
    }

    /// Parse an exchange-style side string ("buy"/"sell", "long"/"short")
    pub fn from_order_side(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "buy" | "long" => Some(Side::Long),
            "sell" | "short" => Some(Side::Short),
            _ => None,
        }
    }
}

/// Confidence tier attached to a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    Low,
    Mid,
    High,
}

impl std::str::FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Confidence::Low),
            "mid" | "medium" => Ok(Confidence::Mid),
            "high" => Ok(Confidence::High),
            other => Err(format!("unknown confidence tier: {other}")),
        }
    }
}

/// Advisory decision carried by a proposal record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Trade,
    NoTrade,
    Wait,
}

/// Structured record produced by the advisory step
///
/// Prices are plain floats because that is what the producer emits; they are
/// converted to decimals (and checked for finiteness) by [`ProposalRecord::to_proposal`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalRecord {
    /// Instrument symbol
    pub symbol: String,
    pub decision: Decision,
    pub confidence: Confidence,
    /// Producer's own reason code (e.g. "CLEAN_SETUP")
    #[serde(default)]
    pub reason_code: Option<String>,
    /// Suggested entry; absent means enter at the current price
    #[serde(default)]
    pub entry_price: Option<f64>,
    #[serde(default)]
    pub stop_loss: Option<f64>,
    #[serde(default)]
    pub take_profit: Option<f64>,
    /// "buy"/"sell" or "long"/"short"
    #[serde(default)]
    pub side: Option<String>,
}

impl ProposalRecord {
    /// Convert into a typed proposal
    ///
    /// Returns `Ok(None)` when the decision is not `TRADE`.
    pub fn to_proposal(&self) -> Result<Option<TradeProposal>, ValidationError> {
        if self.decision != Decision::Trade {
            return Ok(None);
        }

        let raw_side = self
            .side
            .as_deref()
            .ok_or(ValidationError::MissingField("side"))?;
        let side = Side::from_order_side(raw_side)
            .ok_or_else(|| ValidationError::UnknownSide(raw_side.to_string()))?;

        let entry = self
            .entry_price
            .map(|p| to_decimal("entry_price", p))
            .transpose()?;
        let stop = self
            .stop_loss
            .ok_or(ValidationError::MissingField("stop_loss"))
            .and_then(|p| to_decimal("stop_loss", p))?;
        let target = self
            .take_profit
            .ok_or(ValidationError::MissingField("take_profit"))
            .and_then(|p| to_decimal("take_profit", p))?;

        Ok(Some(TradeProposal {
            symbol: self.symbol.clone(),
            side,
            entry,
            stop,
            target,
            confidence: self.confidence,
        }))
    }
}

fn to_decimal(field: &'static str, value: f64) -> Result<Decimal, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinitePrice(field));
    }
    Decimal::from_f64(value).ok_or(ValidationError::NonFinitePrice(field))
}

/// A typed trade proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeProposal {
    pub symbol: String,
    pub side: Side,
    /// `None` means market entry
    pub entry: Option<Decimal>,
    pub stop: Decimal,
    pub target: Decimal,
    pub confidence: Confidence,
}

/// Reasons a proposal is rejected before sizing
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("unknown side: {0:?}")]
    UnknownSide(String),

    #[error("{0} is not a finite number")]
    NonFinitePrice(&'static str),

    #[error("{0} must be positive")]
    NonPositivePrice(&'static str),

    #[error("invalid direction for {side:?}: entry={entry} stop={stop} target={target}")]
    InvalidDirection {
        side: Side,
        entry: Decimal,
        stop: Decimal,
        target: Decimal,
    },

    #[error("stop too tight: {distance_pct}% < {min_pct}%")]
    StopTooTight {
        distance_pct: Decimal,
        min_pct: Decimal,
    },

    #[error("stop too wide: {distance_pct}% > {max_pct}%")]
    StopTooWide {
        distance_pct: Decimal,
        max_pct: Decimal,
    },

    #[error("poor risk/reward: {ratio} < {min_rr}")]
    PoorRiskReward { ratio: Decimal, min_rr: Decimal },

    #[error("{0} does not fit in a decimal")]
    Unrepresentable(&'static str),
}

impl ValidationError {
    /// Stable reason code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) => "missing_field",
            ValidationError::UnknownSide(_) => "unknown_side",
            ValidationError::NonFinitePrice(_) => "non_finite_price",
            ValidationError::NonPositivePrice(_) => "non_positive_price",
            ValidationError::InvalidDirection { .. } => "invalid_direction",
            ValidationError::StopTooTight { .. } => "stop_too_tight",
            ValidationError::StopTooWide { .. } => "stop_too_wide",
            ValidationError::PoorRiskReward { .. } => "poor_risk_reward",
            ValidationError::Unrepresentable(_) => "unrepresentable",
        }
    }
}
