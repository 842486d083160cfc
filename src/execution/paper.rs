//! Paper trading execution engine

use super::{Fill, OrderBackend, OrderId, OrderSpec};
use crate::feed::PriceSource;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Paper trading execution engine with simulated fills
///
/// Orders fill immediately at the requested entry, moved against the trader by
/// the configured slippage. The engine also keeps the last marked price per
/// symbol so it can answer pull-mode price queries.
pub struct PaperEngine {
    fee_rate: Decimal,
    slippage_pct: Decimal,
    fills: Arc<RwLock<Vec<Fill>>>,
    marks: Arc<RwLock<HashMap<String, Decimal>>>,
    fail_next: Mutex<Option<String>>,
}

impl PaperEngine {
    /// Create a new paper trading engine
    pub fn new(fee_rate: Decimal) -> Self {
        Self {
            fee_rate,
            slippage_pct: Decimal::ZERO,
            fills: Arc::new(RwLock::new(vec![])),
            marks: Arc::new(RwLock::new(HashMap::new())),
            fail_next: Mutex::new(None),
        }
    }

    /// Fill longs above and shorts below the requested entry by `pct` percent
    pub fn with_slippage_pct(mut self, pct: Decimal) -> Self {
        self.slippage_pct = pct;
        self
    }

    /// Record the latest price for a symbol
    pub async fn set_mark(&self, symbol: &str, price: Decimal) {
        self.marks.write().await.insert(symbol.to_string(), price);
    }

    /// Make the next order fail with `reason`
    pub async fn fail_next_order(&self, reason: impl Into<String>) {
        *self.fail_next.lock().await = Some(reason.into());
    }
}

impl Default for PaperEngine {
    fn default() -> Self {
        Self::new(Decimal::ZERO)
    }
}

#[async_trait]
impl OrderBackend for PaperEngine {
    async fn place_order(&self, order: OrderSpec) -> anyhow::Result<Fill> {
        if let Some(reason) = self.fail_next.lock().await.take() {
            tracing::warn!(client_order_id = %order.client_order_id, %reason, "Paper order rejected");
            anyhow::bail!("paper order rejected: {reason}");
        }

        let slippage = Decimal::ONE + order.side.sign() * self.slippage_pct / dec!(100);
        let price = order
            .entry_price
            .checked_mul(slippage)
            .ok_or_else(|| anyhow::anyhow!("fill price overflow for {}", order.symbol))?;
        let fees = order
            .quantity
            .checked_mul(price)
            .and_then(|notional| notional.checked_mul(self.fee_rate))
            .ok_or_else(|| anyhow::anyhow!("fee overflow for {}", order.symbol))?;

        let order_id = OrderId::new_v4();
        let fill = Fill {
            order_id,
            client_order_id: order.client_order_id,
            symbol: order.symbol,
            side: order.side,
            price,
            quantity: order.quantity,
            timestamp: Utc::now(),
            fees,
        };

        self.fills.write().await.push(fill.clone());

        tracing::info!(?order_id, symbol = %fill.symbol, price = %fill.price, "Paper order filled");
        Ok(fill)
    }

    async fn get_fills(&self) -> anyhow::Result<Vec<Fill>> {
        let fills = self.fills.read().await;
        Ok(fills.clone())
    }
}

#[async_trait]
impl PriceSource for PaperEngine {
    async fn current_price(&self, symbol: &str) -> anyhow::Result<Decimal> {
        self.marks
            .read()
            .await
            .get(symbol)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("no price marked for {symbol}"))
    }
}
