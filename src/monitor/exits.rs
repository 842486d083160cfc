//! Stop and target crossing rules

use rust_decimal::Decimal;

use crate::feed::PriceObservation;
use crate::proposal::Side;
use crate::risk::{CloseReason, Position};

/// Exit triggered by `observation`, with the level the position closes at
///
/// A bar that spans both levels closes at the stop; the intra-bar order of
/// the two crossings is unknown.
pub fn check_exit(
    position: &Position,
    observation: &PriceObservation,
) -> Option<(CloseReason, Decimal)> {
    let low = observation.low();
    let high = observation.high();

    match position.side {
        Side::Long => {
            if low <= position.stop_price {
                Some((CloseReason::Stop, position.stop_price))
            } else if high >= position.target_price {
                Some((CloseReason::Target, position.target_price))
            } else {
                None
            }
        }
        Side::Short => {
            if high >= position.stop_price {
                Some((CloseReason::Stop, position.stop_price))
            } else if low <= position.target_price {
                Some((CloseReason::Target, position.target_price))
            } else {
                None
            }
        }
    }
}
