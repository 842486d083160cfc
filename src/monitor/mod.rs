//! Trade lifecycle monitor
//!
//! Closes open positions when an observed price crosses their stop or target
//! and feeds the result back into the risk ledger.

mod exits;
mod tracker;

pub use exits::check_exit;
pub use tracker::TradeMonitor;
