//! Position records

use crate::execution::{Fill, OrderSpec};
use crate::proposal::{Side, ValidatedProposal};
use crate::risk::SizedOrder;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionStatus {
    /// Admitted, waiting for the backend fill
    Pending,
    /// Filled and monitored
    Open,
    /// Terminal
    Closed,
}

/// Why a position was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloseReason {
    Stop,
    Target,
    Manual,
}

impl CloseReason {
    pub fn as_str(self) -> &'static str {
        match self {
            CloseReason::Stop => "stop",
            CloseReason::Target => "target",
            CloseReason::Manual => "manual",
        }
    }
}

/// A bracketed position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Position identifier
    pub id: Uuid,
    /// Instrument symbol
    pub symbol: String,
    pub side: Side,
    /// Fill price once open; requested entry while pending
    pub entry_price: Decimal,
    pub quantity: Decimal,
    pub stop_price: Decimal,
    pub target_price: Decimal,
    /// Amount admitted against the daily risk budget
    pub risk_amount: Decimal,
    pub status: PositionStatus,
    /// Fill timestamp
    pub opened_at: Option<DateTime<Utc>>,
}

impl Position {
    /// Create a pending position from an admitted proposal
    pub fn pending(validated: &ValidatedProposal, sized: &SizedOrder) -> Self {
        let proposal = &validated.proposal;
        Self {
            id: Uuid::new_v4(),
            symbol: proposal.symbol.clone(),
            side: proposal.side,
            entry_price: validated.entry,
            quantity: sized.quantity,
            stop_price: proposal.stop,
            target_price: proposal.target,
            risk_amount: sized.risk_amount,
            status: PositionStatus::Pending,
            opened_at: None,
        }
    }

    /// Order sent to the backend for this position
    pub fn order_spec(&self) -> OrderSpec {
        OrderSpec {
            client_order_id: self.id,
            symbol: self.symbol.clone(),
            side: self.side,
            quantity: self.quantity,
            entry_price: self.entry_price,
            stop: self.stop_price,
            target: self.target_price,
        }
    }

    /// Apply a confirmed fill: actual price and quantity, status Open
    pub fn mark_filled(&mut self, fill: &Fill) {
        self.entry_price = fill.price;
        self.quantity = fill.quantity;
        self.opened_at = Some(fill.timestamp);
        self.status = PositionStatus::Open;
    }

    /// stop < entry < target for Long, mirrored for Short
    pub fn brackets_hold(&self) -> bool {
        match self.side {
            Side::Long => self.stop_price < self.entry_price && self.entry_price < self.target_price,
            Side::Short => self.target_price < self.entry_price && self.entry_price < self.stop_price,
        }
    }

    /// P&L if closed at `price`, saturating at the decimal range
    pub fn pnl_at(&self, price: Decimal) -> Decimal {
        price
            .saturating_sub(self.entry_price)
            .saturating_mul(self.quantity)
            .saturating_mul(self.side.sign())
    }
}

/// Immutable record of a closed position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedPosition {
    /// Position as it was when closed (status `Closed`)
    pub position: Position,
    pub close_reason: CloseReason,
    pub close_price: Decimal,
    pub closed_at: DateTime<Utc>,
    pub realized_pnl: Decimal,
    /// realized_pnl / risk_amount
    pub realized_r: Decimal,
}

impl ClosedPosition {
    /// Close `position` at `close_price`
    pub fn new(
        mut position: Position,
        close_reason: CloseReason,
        close_price: Decimal,
        closed_at: DateTime<Utc>,
    ) -> Self {
        let realized_pnl = position.pnl_at(close_price);
        let realized_r = if position.risk_amount.is_zero() {
            Decimal::ZERO
        } else {
            realized_pnl
                .checked_div(position.risk_amount)
                .unwrap_or(if realized_pnl.is_sign_negative() {
                    Decimal::MIN
                } else {
                    Decimal::MAX
                })
        };
        position.status = PositionStatus::Closed;

        Self {
            position,
            close_reason,
            close_price,
            closed_at,
            realized_pnl,
            realized_r,
        }
    }

    pub fn id(&self) -> Uuid {
        self.position.id
    }

    pub fn is_loss(&self) -> bool {
        self.realized_pnl < Decimal::ZERO
    }
}
