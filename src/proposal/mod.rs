//! Trade proposals
//!
//! Typed view of the records produced by the advisory step, plus the pure
//! parameter validator that runs before any sizing or ledger access.

mod types;
mod validator;

pub use types::{Confidence, Decision, ProposalRecord, Side, TradeProposal, ValidationError};
pub use validator::{validate, ValidatedProposal};
