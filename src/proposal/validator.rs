//! Proposal parameter validation
//!
//! Checks run in a fixed order and the first failure is reported, so the same
//! proposal always yields the same reason code.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::{Side, TradeProposal, ValidationError};
use crate::config::ValidationConfig;

/// A proposal that passed every sanity check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedProposal {
    pub proposal: TradeProposal,
    /// Entry after resolving market entries to the current price
    pub entry: Decimal,
    /// |entry - stop| / entry, in percent
    pub stop_distance_pct: Decimal,
    /// |target - entry| / |entry - stop|
    pub reward_risk: Decimal,
}

/// Validate a proposal against the current price and configured thresholds
pub fn validate(
    proposal: &TradeProposal,
    current_price: Decimal,
    config: &ValidationConfig,
) -> Result<ValidatedProposal, ValidationError> {
    let entry = proposal.entry.unwrap_or(current_price);

    let prices = [
        ("entry_price", entry),
        ("stop_loss", proposal.stop),
        ("take_profit", proposal.target),
        ("current_price", current_price),
    ];
    for (field, price) in prices {
        if price <= Decimal::ZERO {
            return Err(ValidationError::NonPositivePrice(field));
        }
    }

    let ordered = match proposal.side {
        Side::Long => proposal.stop < entry && entry < proposal.target,
        Side::Short => proposal.target < entry && entry < proposal.stop,
    };
    if !ordered {
        return Err(ValidationError::InvalidDirection {
            side: proposal.side,
            entry,
            stop: proposal.stop,
            target: proposal.target,
        });
    }

    // Non-zero after the ordering check. Differences of two positive decimals
    // cannot overflow, ratios can.
    let risk = (entry - proposal.stop).abs();
    let Some(stop_distance_pct) = risk
        .checked_div(entry)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
    else {
        return Err(ValidationError::StopTooWide {
            distance_pct: Decimal::MAX,
            max_pct: config.max_stop_pct,
        });
    };

    if stop_distance_pct < config.min_stop_pct {
        return Err(ValidationError::StopTooTight {
            distance_pct: stop_distance_pct,
            min_pct: config.min_stop_pct,
        });
    }
    if stop_distance_pct > config.max_stop_pct {
        return Err(ValidationError::StopTooWide {
            distance_pct: stop_distance_pct,
            max_pct: config.max_stop_pct,
        });
    }

    let reward_risk = (proposal.target - entry)
        .abs()
        .checked_div(risk)
        .ok_or(ValidationError::Unrepresentable("reward_risk"))?;
    if reward_risk < config.min_rr {
        return Err(ValidationError::PoorRiskReward {
            ratio: reward_risk,
            min_rr: config.min_rr,
        });
    }

    Ok(ValidatedProposal {
        proposal: proposal.clone(),
        entry,
        stop_distance_pct,
        reward_risk,
    })
}
