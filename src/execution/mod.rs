//! Execution engine module
//!
//! The order backend is a black box that either confirms a fill or fails.
//! Nothing downstream treats an order as filled before `place_order` returns.

mod paper;
mod types;

pub use paper::PaperEngine;
pub use types::{Fill, OrderId, OrderSpec};

use async_trait::async_trait;

/// Trait for order backends
#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// Place a bracket order and wait for the fill confirmation
    async fn place_order(&self, order: OrderSpec) -> anyhow::Result<Fill>;
    /// Get all fills
    async fn get_fills(&self) -> anyhow::Result<Vec<Fill>>;
}
