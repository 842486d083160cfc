//! Trade gate
//!
//! Ties the validator, sizer, ledger, order backend and monitor together.

mod pipeline;
mod types;

pub use pipeline::TradeGate;
pub use types::{AdmissionOutcome, TradeRejection};
