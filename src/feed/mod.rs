//! Price feed module
//!
//! Price observations consumed by the trade monitor. Market-data acquisition
//! lives outside this crate; it either pushes observations over a channel or
//! answers pull queries through [`PriceSource`].

mod types;

pub use types::{Bar, PriceObservation, PriceTick};

use async_trait::async_trait;
use rust_decimal::Decimal;

/// Pull-mode price lookup
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Latest price for `symbol`
    async fn current_price(&self, symbol: &str) -> anyhow::Result<Decimal>;
}
