//! Risk management module
//!
//! Position sizing, ledger limits, and position records

mod ledger;
mod limits;
mod position;
mod sizing;
mod types;

pub use ledger::{CloseUpdate, LedgerSnapshot, RiskLedger, TradeStats};
pub use limits::{DrawdownMonitor, RiskLimits};
pub use position::{ClosedPosition, CloseReason, Position, PositionStatus};
pub use sizing::{size, SizedOrder};
pub use types::{AdmissionDenied, LedgerError, SizingError};
