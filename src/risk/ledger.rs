//! Risk ledger
//!
//! Holds every piece of mutable risk state: equity and drawdown, the daily
//! trade and risk counters, the losing streak, cooldown and the halt flag.
//! All mutation goes through the methods below. Callers that admit positions
//! must hold the ledger lock from [`RiskLedger::can_open`] until
//! [`RiskLedger::record_open`] so no other admission slips in between.
//!
//! The ledger never reads the wall clock; time-dependent operations take `now`.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use uuid::Uuid;

use super::{
    AdmissionDenied, ClosedPosition, DrawdownMonitor, LedgerError, Position, PositionStatus,
    RiskLimits,
};

/// Effects of recording a close
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloseUpdate {
    pub equity: Decimal,
    pub drawdown_pct: Decimal,
    pub consecutive_losses: u32,
    /// Set when this close started a cooldown
    pub cooldown_until: Option<DateTime<Utc>>,
    /// Set when this close tripped the halt
    pub halted: bool,
}

/// Point-in-time view of ledger state
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSnapshot {
    pub current_equity: Decimal,
    pub peak_equity: Decimal,
    pub day_start_equity: Decimal,
    pub drawdown_pct: Decimal,
    pub trades_opened_today: u32,
    pub risk_used_today: Decimal,
    pub max_daily_risk: Decimal,
    pub consecutive_losses: u32,
    pub cooldown_until: Option<DateTime<Utc>>,
    pub halted: bool,
    pub open_positions: usize,
    pub closed_positions: usize,
}

/// Aggregate results over closed positions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TradeStats {
    pub closed_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Fraction of closed trades that won
    pub win_rate: Decimal,
    pub total_pnl: Decimal,
    pub average_r: Decimal,
}

impl TradeStats {
    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        format!(
            r#"
══════════════════════════════════════════════════════
               SESSION RESULTS
══════════════════════════════════════════════════════
Closed Trades:    {}
Winners:          {}
Losers:           {}
Win Rate:         {:.1}%
Total P&L:        {:+.2}
Average R:        {:+.2}
══════════════════════════════════════════════════════
"#,
            self.closed_trades,
            self.winning_trades,
            self.losing_trades,
            self.win_rate * dec!(100),
            self.total_pnl,
            self.average_r,
        )
    }
}

/// Process-wide risk state and admission gate
#[derive(Debug)]
pub struct RiskLedger {
    limits: RiskLimits,
    equity: DrawdownMonitor,
    trades_opened_today: u32,
    risk_used_today: Decimal,
    consecutive_losses: u32,
    cooldown_until: Option<DateTime<Utc>>,
    halted: bool,
    open: HashMap<Uuid, Position>,
    closed: Vec<ClosedPosition>,
    closed_ids: HashSet<Uuid>,
}

impl RiskLedger {
    /// Create a ledger with the given starting equity
    pub fn new(initial_equity: Decimal, limits: RiskLimits) -> Self {
        Self {
            limits,
            equity: DrawdownMonitor::new(initial_equity),
            trades_opened_today: 0,
            risk_used_today: Decimal::ZERO,
            consecutive_losses: 0,
            cooldown_until: None,
            halted: false,
            open: HashMap::new(),
            closed: Vec::new(),
            closed_ids: HashSet::new(),
        }
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// Current account equity
    pub fn equity(&self) -> Decimal {
        self.equity.current_equity
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn cooldown_until(&self) -> Option<DateTime<Utc>> {
        self.cooldown_until
    }

    pub fn trades_opened_today(&self) -> u32 {
        self.trades_opened_today
    }

    pub fn risk_used_today(&self) -> Decimal {
        self.risk_used_today
    }

    pub fn consecutive_losses(&self) -> u32 {
        self.consecutive_losses
    }

    /// Daily risk budget in account currency
    pub fn max_daily_risk(&self) -> Decimal {
        self.equity
            .daily_start_equity
            .saturating_mul(self.limits.max_daily_risk_pct)
            / dec!(100)
    }

    /// Budget left for today
    pub fn remaining_daily_risk(&self) -> Decimal {
        self.max_daily_risk()
            .saturating_sub(self.risk_used_today)
            .max(Decimal::ZERO)
    }

    /// Check whether a position risking `proposed_risk` may be opened
    ///
    /// Checks run in order: halt, cooldown, trade count, risk budget.
    pub fn can_open(
        &self,
        proposed_risk: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(), AdmissionDenied> {
        if self.halted {
            return Err(AdmissionDenied::Halted {
                drawdown_pct: self.equity.drawdown_pct(),
            });
        }

        if let Some(until) = self.cooldown_until {
            if now < until {
                return Err(AdmissionDenied::Cooldown { until });
            }
        }

        if self.trades_opened_today >= self.limits.max_trades_per_day {
            return Err(AdmissionDenied::MaxTradesPerDay {
                opened: self.trades_opened_today,
                max: self.limits.max_trades_per_day,
            });
        }

        let max = self.max_daily_risk();
        if self.risk_used_today.saturating_add(proposed_risk) > max {
            return Err(AdmissionDenied::MaxDailyRisk {
                used: self.risk_used_today,
                requested: proposed_risk,
                max,
            });
        }

        Ok(())
    }

    /// Commit a filled position against today's counters
    pub fn record_open(&mut self, position: &Position) -> Result<(), LedgerError> {
        if position.status != PositionStatus::Open {
            return Err(LedgerError::NotFilled(position.id));
        }
        if self.open.contains_key(&position.id) || self.closed_ids.contains(&position.id) {
            return Err(LedgerError::AlreadyOpen(position.id));
        }

        self.trades_opened_today += 1;
        self.risk_used_today = self.risk_used_today.saturating_add(position.risk_amount);
        self.open.insert(position.id, position.clone());

        tracing::debug!(
            position_id = %position.id,
            trades_opened_today = self.trades_opened_today,
            risk_used_today = %self.risk_used_today,
            "Position recorded"
        );
        Ok(())
    }

    /// Apply a close: equity, drawdown, losing streak, cooldown, halt
    ///
    /// A second close for the same position returns `AlreadyClosed` and changes nothing.
    pub fn record_close(
        &mut self,
        closed: ClosedPosition,
        now: DateTime<Utc>,
    ) -> Result<CloseUpdate, LedgerError> {
        let id = closed.id();
        if self.closed_ids.contains(&id) {
            return Err(LedgerError::AlreadyClosed(id));
        }
        if self.open.remove(&id).is_none() {
            return Err(LedgerError::UnknownPosition(id));
        }

        self.equity.apply_pnl(closed.realized_pnl);
        let drawdown_pct = self.equity.drawdown_pct();

        if closed.is_loss() {
            self.consecutive_losses += 1;
        } else {
            self.consecutive_losses = 0;
        }

        let mut cooldown_until = None;
        if self.limits.consecutive_loss_threshold > 0
            && self.consecutive_losses >= self.limits.consecutive_loss_threshold
        {
            let until = now
                .checked_add_signed(self.limits.cooldown_duration)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            tracing::warn!(
                consecutive_losses = self.consecutive_losses,
                %until,
                "Cooldown activated"
            );
            self.cooldown_until = Some(until);
            self.consecutive_losses = 0;
            cooldown_until = Some(until);
        }

        let mut halted = false;
        if !self.halted && drawdown_pct >= self.limits.max_drawdown_pct {
            tracing::error!(
                %drawdown_pct,
                max_drawdown_pct = %self.limits.max_drawdown_pct,
                "Drawdown limit breached, trading halted"
            );
            self.halted = true;
            halted = true;
        }

        self.closed_ids.insert(id);
        self.closed.push(closed);

        Ok(CloseUpdate {
            equity: self.equity.current_equity,
            drawdown_pct,
            consecutive_losses: self.consecutive_losses,
            cooldown_until,
            halted,
        })
    }

    /// External day boundary: zero the daily counters
    pub fn reset_day(&mut self) {
        self.trades_opened_today = 0;
        self.risk_used_today = Decimal::ZERO;
        self.equity.reset_daily();
        tracing::info!(equity = %self.equity.current_equity, "Daily limits reset");
    }

    /// Operator action: clear a drawdown halt
    ///
    /// Peak equity is rebased to current equity so the acknowledged loss does
    /// not re-trigger the halt on the next close.
    pub fn reset_halt(&mut self) {
        self.halted = false;
        self.equity.rebase_peak();
        tracing::warn!(equity = %self.equity.current_equity, "Halt cleared by operator");
    }

    /// Operator action: end a cooldown early
    pub fn clear_cooldown(&mut self) {
        self.cooldown_until = None;
        self.consecutive_losses = 0;
        tracing::info!("Cooldown cleared");
    }

    /// Open positions committed to the ledger
    pub fn open_positions(&self) -> impl Iterator<Item = &Position> {
        self.open.values()
    }

    /// Audit trail of closed positions, in close order
    pub fn closed_positions(&self) -> &[ClosedPosition] {
        &self.closed
    }

    pub fn is_closed(&self, id: &Uuid) -> bool {
        self.closed_ids.contains(id)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            current_equity: self.equity.current_equity,
            peak_equity: self.equity.peak_equity,
            day_start_equity: self.equity.daily_start_equity,
            drawdown_pct: self.equity.drawdown_pct(),
            trades_opened_today: self.trades_opened_today,
            risk_used_today: self.risk_used_today,
            max_daily_risk: self.max_daily_risk(),
            consecutive_losses: self.consecutive_losses,
            cooldown_until: self.cooldown_until,
            halted: self.halted,
            open_positions: self.open.len(),
            closed_positions: self.closed.len(),
        }
    }

    pub fn stats(&self) -> TradeStats {
        let closed_trades = self.closed.len();
        if closed_trades == 0 {
            return TradeStats::default();
        }

        let winning_trades = self
            .closed
            .iter()
            .filter(|c| c.realized_pnl > Decimal::ZERO)
            .count();
        let losing_trades = self.closed.iter().filter(|c| c.is_loss()).count();
        let total_pnl = self
            .closed
            .iter()
            .fold(Decimal::ZERO, |acc, c| acc.saturating_add(c.realized_pnl));
        let total_r = self
            .closed
            .iter()
            .fold(Decimal::ZERO, |acc, c| acc.saturating_add(c.realized_r));
        let count = Decimal::from(closed_trades);

        TradeStats {
            closed_trades,
            winning_trades,
            losing_trades,
            win_rate: Decimal::from(winning_trades) / count,
            total_pnl,
            average_r: total_r / count,
        }
    }
}
