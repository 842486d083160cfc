//! Ledger limits and drawdown tracking

use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::config::RiskConfig;

/// Admission limits enforced by the ledger
#[derive(Debug, Clone)]
pub struct RiskLimits {
    /// Maximum positions opened per trading day
    pub max_trades_per_day: u32,
    /// Daily risk budget as percent of day-start equity
    pub max_daily_risk_pct: Decimal,
    /// Drawdown from peak (percent) that halts trading
    pub max_drawdown_pct: Decimal,
    /// Losing closes in a row that start a cooldown
    pub consecutive_loss_threshold: u32,
    /// Cooldown length
    pub cooldown_duration: Duration,
}

impl RiskLimits {
    /// Build from the `[risk]` config section
    pub fn from_config(config: &RiskConfig) -> Self {
        Self {
            max_trades_per_day: config.max_trades_per_day,
            max_daily_risk_pct: config.max_daily_risk_pct,
            max_drawdown_pct: config.max_drawdown_pct,
            consecutive_loss_threshold: config.consecutive_loss_threshold,
            cooldown_duration: cooldown_duration(config.cooldown_secs),
        }
    }
}

/// Clamp to the largest representable duration
fn cooldown_duration(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self::from_config(&RiskConfig::default())
    }
}

/// Tracks equity against its peak and the start of the trading day
#[derive(Debug, Clone, Serialize)]
pub struct DrawdownMonitor {
    /// Peak equity value
    pub peak_equity: Decimal,
    /// Current equity value
    pub current_equity: Decimal,
    /// Equity at start of day
    pub daily_start_equity: Decimal,
}

impl DrawdownMonitor {
    /// Create a new drawdown monitor
    pub fn new(initial_equity: Decimal) -> Self {
        Self {
            peak_equity: initial_equity,
            current_equity: initial_equity,
            daily_start_equity: initial_equity,
        }
    }

    /// Apply realized P&L
    pub fn apply_pnl(&mut self, pnl: Decimal) {
        self.current_equity = self.current_equity.saturating_add(pnl);
        self.peak_equity = self.peak_equity.max(self.current_equity);
    }

    /// Drawdown from peak in percent, saturating at `Decimal::MAX`
    pub fn drawdown_pct(&self) -> Decimal {
        if self.peak_equity <= dec!(0) {
            return dec!(0);
        }
        self.peak_equity
            .saturating_sub(self.current_equity)
            .checked_div(self.peak_equity)
            .and_then(|ratio| ratio.checked_mul(dec!(100)))
            .unwrap_or(Decimal::MAX)
    }

    /// Today's P&L
    pub fn daily_pnl(&self) -> Decimal {
        self.current_equity.saturating_sub(self.daily_start_equity)
    }

    /// Reset for new trading day
    pub fn reset_daily(&mut self) {
        self.daily_start_equity = self.current_equity;
    }

    /// Forget the old peak; drawdown is measured from current equity onwards
    pub fn rebase_peak(&mut self) {
        self.peak_equity = self.current_equity;
    }
}
