//! Admission pipeline
//!
//! record -> validate -> size -> can_open -> backend fill -> record_open -> track
//!
//! The ledger lock is taken before sizing and held until the position is
//! committed, so two proposals can never both pass `can_open` against the same
//! unused budget. Validation runs before the lock.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{AdmissionOutcome, TradeRejection};
use crate::config::{Config, SizingConfig, ValidationConfig};
use crate::execution::OrderBackend;
use crate::journal::{JournalEvent, JournalSink};
use crate::monitor::TradeMonitor;
use crate::proposal::{validate, Decision, ProposalRecord, ValidationError};
use crate::risk::{
    size, ClosedPosition, LedgerError, LedgerSnapshot, Position, RiskLedger, RiskLimits,
    TradeStats,
};
use crate::telemetry::{self, LatencyMetric};

/// Entry point for trade proposals and operator actions
pub struct TradeGate {
    validation: ValidationConfig,
    sizing: SizingConfig,
    ledger: Arc<Mutex<RiskLedger>>,
    monitor: Arc<TradeMonitor>,
    backend: Arc<dyn OrderBackend>,
    journal: Arc<dyn JournalSink>,
}

impl TradeGate {
    pub fn new(
        config: &Config,
        backend: Arc<dyn OrderBackend>,
        journal: Arc<dyn JournalSink>,
    ) -> Self {
        let ledger = Arc::new(Mutex::new(RiskLedger::new(
            config.account.initial_equity,
            RiskLimits::from_config(&config.risk),
        )));
        let monitor = Arc::new(TradeMonitor::new(ledger.clone(), journal.clone()));

        Self {
            validation: config.validation.clone(),
            sizing: config.sizing.clone(),
            ledger,
            monitor,
            backend,
            journal,
        }
    }

    /// Monitor fed with price observations
    pub fn monitor(&self) -> Arc<TradeMonitor> {
        self.monitor.clone()
    }

    /// Shared ledger handle
    pub fn ledger(&self) -> Arc<Mutex<RiskLedger>> {
        self.ledger.clone()
    }

    /// Run a proposal through admission
    pub async fn submit(
        &self,
        record: &ProposalRecord,
        current_price: Decimal,
        now: DateTime<Utc>,
    ) -> Result<AdmissionOutcome, TradeRejection> {
        let started = Instant::now();
        let result = self.admit(record, current_price, now).await;
        telemetry::record_latency(LatencyMetric::Admission, started.elapsed());

        match &result {
            Ok(outcome) => telemetry::record_admission(outcome.code()),
            Err(rejection) => telemetry::record_admission(rejection.code()),
        }
        result
    }

    async fn admit(
        &self,
        record: &ProposalRecord,
        current_price: Decimal,
        now: DateTime<Utc>,
    ) -> Result<AdmissionOutcome, TradeRejection> {
        if record.decision != Decision::Trade {
            tracing::info!(
                symbol = %record.symbol,
                decision = ?record.decision,
                reason_code = record.reason_code.as_deref().unwrap_or(""),
                "Proposal skipped"
            );
            return Ok(AdmissionOutcome::Skipped(record.decision));
        }

        // A halted ledger turns every proposal away, valid or not
        if let Some(drawdown_pct) = self.halted_at().await {
            let rejection = TradeRejection::HaltedState { drawdown_pct };
            tracing::info!(symbol = %record.symbol, %drawdown_pct, "Admission denied, trading halted");
            self.journal_denied(&record.symbol, &rejection, Decimal::ZERO, now);
            return Err(rejection);
        }

        let proposal = match record.to_proposal() {
            Ok(Some(proposal)) => proposal,
            Ok(None) => return Ok(AdmissionOutcome::Skipped(record.decision)),
            Err(e) => return Err(self.reject_invalid(&record.symbol, e, now)),
        };

        let validated = validate(&proposal, current_price, &self.validation)
            .map_err(|e| self.reject_invalid(&proposal.symbol, e, now))?;

        let mut ledger = self.ledger.lock().await;

        let sized = size(
            proposal.confidence,
            ledger.equity(),
            validated.entry,
            proposal.stop,
            &self.sizing,
        )
        .map_err(|e| {
            tracing::info!(symbol = %proposal.symbol, code = e.code(), error = %e, "Sizing rejected");
            self.journal.record(JournalEvent::SizingRejected {
                at: now,
                symbol: proposal.symbol.clone(),
                code: e.code(),
                message: e.to_string(),
            });
            TradeRejection::from(e)
        })?;

        if let Err(denied) = ledger.can_open(sized.risk_amount, now) {
            let rejection = TradeRejection::from(denied);
            tracing::info!(
                symbol = %proposal.symbol,
                code = rejection.code(),
                risk_amount = %sized.risk_amount,
                "Admission denied"
            );
            self.journal_denied(&proposal.symbol, &rejection, sized.risk_amount, now);
            return Err(rejection);
        }

        let mut position = Position::pending(&validated, &sized);

        let order_started = Instant::now();
        let placed = self.backend.place_order(position.order_spec()).await;
        telemetry::record_latency(LatencyMetric::OrderSubmission, order_started.elapsed());

        let fill = match placed {
            Ok(fill) => fill,
            Err(e) => {
                tracing::warn!(position_id = %position.id, symbol = %position.symbol, error = %e, "Order failed");
                self.journal.record(JournalEvent::OrderFailed {
                    at: now,
                    position,
                    message: e.to_string(),
                });
                return Err(TradeRejection::BackendFailure(e.to_string()));
            }
        };

        position.mark_filled(&fill);
        if !position.brackets_hold() {
            tracing::warn!(
                position_id = %position.id,
                fill_price = %fill.price,
                stop = %position.stop_price,
                target = %position.target_price,
                "Fill outside brackets, position will close on the next observation"
            );
        }

        if let Err(e) = ledger.record_open(&position) {
            tracing::error!(position_id = %position.id, code = e.code(), error = %e, "Open not recorded");
            return Err(TradeRejection::BackendFailure(e.to_string()));
        }
        self.monitor.track(position.clone()).await;
        let snapshot = ledger.snapshot();
        drop(ledger);

        tracing::info!(
            position_id = %position.id,
            symbol = %position.symbol,
            side = ?position.side,
            entry = %position.entry_price,
            quantity = %position.quantity,
            stop = %position.stop_price,
            target = %position.target_price,
            risk_amount = %position.risk_amount,
            "Position opened"
        );
        telemetry::record_ledger(&snapshot);
        self.journal.record(JournalEvent::TradeOpened {
            at: now,
            position: position.clone(),
            fill,
        });

        Ok(AdmissionOutcome::Opened(position))
    }

    async fn halted_at(&self) -> Option<Decimal> {
        let ledger = self.ledger.lock().await;
        ledger.is_halted().then(|| ledger.snapshot().drawdown_pct)
    }

    fn reject_invalid(
        &self,
        symbol: &str,
        error: ValidationError,
        now: DateTime<Utc>,
    ) -> TradeRejection {
        tracing::info!(%symbol, code = error.code(), error = %error, "Proposal rejected");
        self.journal.record(JournalEvent::ValidationRejected {
            at: now,
            symbol: symbol.to_string(),
            code: error.code(),
            message: error.to_string(),
        });
        TradeRejection::Validation(error)
    }

    fn journal_denied(
        &self,
        symbol: &str,
        rejection: &TradeRejection,
        risk_amount: Decimal,
        now: DateTime<Utc>,
    ) {
        self.journal.record(JournalEvent::AdmissionDenied {
            at: now,
            symbol: symbol.to_string(),
            code: rejection.code(),
            message: rejection.to_string(),
            risk_amount,
        });
    }

    /// Close an open position at `price` on operator request
    pub async fn close_manual(
        &self,
        id: Uuid,
        price: Decimal,
        now: DateTime<Utc>,
    ) -> Result<ClosedPosition, LedgerError> {
        self.monitor.close_manual(id, price, now).await
    }

    /// Day boundary: zero the daily counters
    pub async fn reset_day(&self, now: DateTime<Utc>) {
        let snapshot = {
            let mut ledger = self.ledger.lock().await;
            ledger.reset_day();
            ledger.snapshot()
        };
        telemetry::record_ledger(&snapshot);
        self.journal.record(JournalEvent::DayReset {
            at: now,
            equity: snapshot.current_equity,
        });
    }

    /// Operator: clear a drawdown halt
    pub async fn reset_halt(&self) {
        let snapshot = {
            let mut ledger = self.ledger.lock().await;
            ledger.reset_halt();
            ledger.snapshot()
        };
        telemetry::record_ledger(&snapshot);
    }

    /// Operator: end a cooldown early
    pub async fn clear_cooldown(&self) {
        self.ledger.lock().await.clear_cooldown();
    }

    pub async fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.lock().await.snapshot()
    }

    pub async fn stats(&self) -> TradeStats {
        self.ledger.lock().await.stats()
    }
}
