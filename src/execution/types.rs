//! Execution types

use crate::proposal::Side;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order identifier
pub type OrderId = Uuid;

/// Finalized bracket order handed to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSpec {
    /// Position id, echoed back on the fill
    pub client_order_id: Uuid,
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    /// Requested entry price
    pub entry_price: Decimal,
    /// Stop-loss price
    pub stop: Decimal,
    /// Take-profit price
    pub target: Decimal,
}

/// A confirmed fill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Backend order ID
    pub order_id: OrderId,
    /// Position id from the order
    pub client_order_id: Uuid,
    pub symbol: String,
    pub side: Side,
    /// Actual entry price
    pub price: Decimal,
    /// Actual filled quantity
    pub quantity: Decimal,
    pub timestamp: DateTime<Utc>,
    /// Fees paid
    pub fees: Decimal,
}
