//! Fixed-fractional position sizing
//!
//! Risk per trade is a fixed percent of equity chosen by confidence tier; the
//! quantity follows from the stop distance. The daily budget check belongs to
//! the ledger and is not repeated here.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::SizingError;
use crate::config::SizingConfig;
use crate::proposal::Confidence;

/// Sizing result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizedOrder {
    /// Units to trade
    pub quantity: Decimal,
    /// Account currency lost if the stop is hit
    pub risk_amount: Decimal,
    /// Tier percent used
    pub risk_pct: Decimal,
}

/// Size a position for the given tier, equity and bracket
pub fn size(
    confidence: Confidence,
    account_equity: Decimal,
    entry: Decimal,
    stop: Decimal,
    config: &SizingConfig,
) -> Result<SizedOrder, SizingError> {
    let risk_pct = config.risk_mapping.pct(confidence);
    let stop_distance = (entry - stop).abs();
    if stop_distance.is_zero() {
        return Err(SizingError::DegenerateStop { entry, stop });
    }

    let risk_amount = account_equity
        .checked_mul(risk_pct)
        .map(|amount| amount / dec!(100))
        .ok_or(SizingError::QuantityOverflow {
            risk_amount: Decimal::MAX,
            stop_distance,
        })?;
    if risk_amount <= Decimal::ZERO {
        return Err(SizingError::NonPositiveRisk {
            risk_amount,
            equity: account_equity,
            risk_pct,
        });
    }

    let quantity = risk_amount
        .checked_div(stop_distance)
        .ok_or(SizingError::QuantityOverflow {
            risk_amount,
            stop_distance,
        })?;

    Ok(SizedOrder {
        quantity,
        risk_amount,
        risk_pct,
    })
}
