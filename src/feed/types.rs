//! Price feed types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single price tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTick {
    /// Trading symbol (e.g., "BTCUSDT")
    pub symbol: String,
    /// Trade price
    pub price: Decimal,
    /// Observation time
    pub timestamp: DateTime<Utc>,
}

/// An aggregated OHLC bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// Bar close time
    pub timestamp: DateTime<Utc>,
}

/// Anything the monitor can evaluate exits against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PriceObservation {
    Tick(PriceTick),
    Bar(Bar),
}

impl PriceObservation {
    pub fn symbol(&self) -> &str {
        match self {
            PriceObservation::Tick(t) => &t.symbol,
            PriceObservation::Bar(b) => &b.symbol,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            PriceObservation::Tick(t) => t.timestamp,
            PriceObservation::Bar(b) => b.timestamp,
        }
    }

    /// Lowest price seen
    pub fn low(&self) -> Decimal {
        match self {
            PriceObservation::Tick(t) => t.price,
            PriceObservation::Bar(b) => b.low,
        }
    }

    /// Highest price seen
    pub fn high(&self) -> Decimal {
        match self {
            PriceObservation::Tick(t) => t.price,
            PriceObservation::Bar(b) => b.high,
        }
    }

    /// Last price seen
    pub fn last(&self) -> Decimal {
        match self {
            PriceObservation::Tick(t) => t.price,
            PriceObservation::Bar(b) => b.close,
        }
    }
}

impl From<PriceTick> for PriceObservation {
    fn from(tick: PriceTick) -> Self {
        PriceObservation::Tick(tick)
    }
}

impl From<Bar> for PriceObservation {
    fn from(bar: Bar) -> Self {
        PriceObservation::Bar(bar)
    }
}
