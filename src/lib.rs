//! trade-gate: admission control for algorithmic trade proposals
//!
//! This library provides the core components for:
//! - Proposal parsing and parameter validation
//! - Fixed-fractional position sizing by confidence tier
//! - A risk ledger with daily limits, losing-streak cooldown and drawdown halt
//! - Bracket position lifecycle monitoring on ticks or OHLC bars
//! - Paper execution behind a pluggable order backend
//! - A structured decision journal
//! - Logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod execution;
pub mod feed;
pub mod gate;
pub mod journal;
pub mod monitor;
pub mod proposal;
pub mod risk;
pub mod telemetry;
