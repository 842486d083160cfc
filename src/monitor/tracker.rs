//! Open position tracking
//!
//! Positions are kept in one book per symbol, each behind its own mutex, so
//! observations for different symbols are evaluated independently. A position
//! leaves its book under the book lock before anything is written to the
//! ledger, which is what guarantees a single close per position. Until the
//! ledger has the close, the id stays in a closing set so a concurrent manual
//! close can tell "being closed" from "never existed".

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::{mpsc, Mutex, RwLock};
use uuid::Uuid;

use super::check_exit;
use crate::feed::{PriceObservation, PriceSource, PriceTick};
use crate::journal::{JournalEvent, JournalSink};
use crate::risk::{ClosedPosition, CloseReason, LedgerError, Position, RiskLedger};
use crate::telemetry::{self, GaugeMetric};

type SymbolBook = Arc<Mutex<HashMap<Uuid, Position>>>;

/// Watches open positions and closes them on stop or target
pub struct TradeMonitor {
    books: RwLock<HashMap<String, SymbolBook>>,
    closing: std::sync::Mutex<HashSet<Uuid>>,
    ledger: Arc<Mutex<RiskLedger>>,
    journal: Arc<dyn JournalSink>,
}

impl TradeMonitor {
    pub fn new(ledger: Arc<Mutex<RiskLedger>>, journal: Arc<dyn JournalSink>) -> Self {
        Self {
            books: RwLock::new(HashMap::new()),
            closing: std::sync::Mutex::new(HashSet::new()),
            ledger,
            journal,
        }
    }

    fn closing(&self) -> std::sync::MutexGuard<'_, HashSet<Uuid>> {
        self.closing
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Take a position out of its book, marking it as closing under the book lock
    fn take(&self, book: &mut HashMap<Uuid, Position>, id: &Uuid) -> Option<Position> {
        let position = book.remove(id)?;
        self.closing().insert(*id);
        Some(position)
    }

    async fn book(&self, symbol: &str) -> Option<SymbolBook> {
        self.books.read().await.get(symbol).cloned()
    }

    async fn book_or_insert(&self, symbol: &str) -> SymbolBook {
        if let Some(book) = self.book(symbol).await {
            return book;
        }
        self.books
            .write()
            .await
            .entry(symbol.to_string())
            .or_default()
            .clone()
    }

    /// Start watching an open position
    pub async fn track(&self, position: Position) {
        let book = self.book_or_insert(&position.symbol).await;
        let mut book = book.lock().await;
        tracing::debug!(
            position_id = %position.id,
            symbol = %position.symbol,
            stop = %position.stop_price,
            target = %position.target_price,
            "Tracking position"
        );
        book.insert(position.id, position);
        drop(book);
        self.publish_open_count().await;
    }

    /// Evaluate every open position on the observation's symbol
    ///
    /// Returns the positions this observation closed.
    pub async fn on_observation(&self, observation: &PriceObservation) -> Vec<ClosedPosition> {
        let Some(book) = self.book(observation.symbol()).await else {
            return Vec::new();
        };

        let exits: Vec<(Position, CloseReason, Decimal)> = {
            let mut book = book.lock().await;
            let hits: Vec<(Uuid, CloseReason, Decimal)> = book
                .values()
                .filter_map(|pos| check_exit(pos, observation).map(|(r, p)| (pos.id, r, p)))
                .collect();
            hits.into_iter()
                .filter_map(|(id, reason, price)| {
                    self.take(&mut book, &id).map(|pos| (pos, reason, price))
                })
                .collect()
        };

        let at = observation.timestamp();
        let mut closed = Vec::with_capacity(exits.len());
        for (position, reason, price) in exits {
            match self.settle(position, reason, price, at).await {
                Ok(record) => closed.push(record),
                Err(e) => tracing::warn!(error = %e, code = e.code(), "Close not applied"),
            }
        }

        if !closed.is_empty() {
            self.publish_open_count().await;
        }
        closed
    }

    pub async fn on_tick(&self, tick: PriceTick) -> Vec<ClosedPosition> {
        self.on_observation(&PriceObservation::Tick(tick)).await
    }

    /// Close a position at `price` on external request
    pub async fn close_manual(
        &self,
        id: Uuid,
        price: Decimal,
        now: DateTime<Utc>,
    ) -> Result<ClosedPosition, LedgerError> {
        let books: Vec<SymbolBook> = self.books.read().await.values().cloned().collect();

        let mut found = None;
        for book in books {
            if let Some(pos) = self.take(&mut *book.lock().await, &id) {
                found = Some(pos);
                break;
            }
        }

        let Some(position) = found else {
            if self.closing().contains(&id) {
                return Err(LedgerError::AlreadyClosed(id));
            }
            let ledger = self.ledger.lock().await;
            return Err(if ledger.is_closed(&id) {
                LedgerError::AlreadyClosed(id)
            } else {
                LedgerError::UnknownPosition(id)
            });
        };

        let closed = self.settle(position, CloseReason::Manual, price, now).await?;
        self.publish_open_count().await;
        Ok(closed)
    }

    /// Positions currently watched
    pub async fn open_positions(&self) -> Vec<Position> {
        let books: Vec<SymbolBook> = self.books.read().await.values().cloned().collect();
        let mut positions = Vec::new();
        for book in books {
            positions.extend(book.lock().await.values().cloned());
        }
        positions
    }

    pub async fn open_count(&self) -> usize {
        let books: Vec<SymbolBook> = self.books.read().await.values().cloned().collect();
        let mut count = 0;
        for book in books {
            count += book.lock().await.len();
        }
        count
    }

    /// Symbols with at least one open position
    pub async fn symbols(&self) -> Vec<String> {
        let books: Vec<(String, SymbolBook)> = self
            .books
            .read()
            .await
            .iter()
            .map(|(s, b)| (s.clone(), b.clone()))
            .collect();
        let mut symbols = Vec::new();
        for (symbol, book) in books {
            if !book.lock().await.is_empty() {
                symbols.push(symbol);
            }
        }
        symbols.sort();
        symbols
    }

    /// Push-mode driver: evaluate observations until the channel closes
    pub async fn run_push(&self, mut rx: mpsc::Receiver<PriceObservation>) -> usize {
        let mut closed = 0;
        while let Some(observation) = rx.recv().await {
            closed += self.on_observation(&observation).await.len();
        }
        tracing::info!(closed, "Observation stream ended");
        closed
    }

    /// Pull-mode driver: one pass over `symbols` using `source` prices
    pub async fn sweep(
        &self,
        source: &dyn PriceSource,
        symbols: &[String],
    ) -> Vec<ClosedPosition> {
        let mut closed = Vec::new();
        for symbol in symbols {
            match source.current_price(symbol).await {
                Ok(price) => {
                    let tick = PriceTick {
                        symbol: symbol.clone(),
                        price,
                        timestamp: Utc::now(),
                    };
                    closed.extend(self.on_tick(tick).await);
                }
                Err(e) => tracing::warn!(%symbol, error = %e, "Price lookup failed, symbol skipped"),
            }
        }
        closed
    }

    /// Record a removed position's close in the ledger and report it
    async fn settle(
        &self,
        position: Position,
        reason: CloseReason,
        price: Decimal,
        at: DateTime<Utc>,
    ) -> Result<ClosedPosition, LedgerError> {
        let id = position.id;
        let result = self.settle_inner(position, reason, price, at).await;
        self.closing().remove(&id);
        result
    }

    async fn settle_inner(
        &self,
        position: Position,
        reason: CloseReason,
        price: Decimal,
        at: DateTime<Utc>,
    ) -> Result<ClosedPosition, LedgerError> {
        let closed = ClosedPosition::new(position, reason, price, at);

        let (update, snapshot) = {
            let mut ledger = self.ledger.lock().await;
            let update = ledger.record_close(closed.clone(), at)?;
            (update, ledger.snapshot())
        };

        tracing::info!(
            position_id = %closed.id(),
            symbol = %closed.position.symbol,
            reason = reason.as_str(),
            close_price = %closed.close_price,
            realized_pnl = %closed.realized_pnl,
            realized_r = %closed.realized_r,
            equity = %update.equity,
            "Position closed"
        );

        telemetry::record_close(reason);
        telemetry::record_ledger(&snapshot);

        self.journal.record(JournalEvent::TradeClosed {
            at,
            closed: closed.clone(),
            equity: update.equity,
            drawdown_pct: update.drawdown_pct,
        });
        if let Some(until) = update.cooldown_until {
            self.journal.record(JournalEvent::CooldownStarted { at, until });
        }
        if update.halted {
            self.journal.record(JournalEvent::Halted {
                at,
                drawdown_pct: update.drawdown_pct,
                equity: update.equity,
            });
        }

        Ok(closed)
    }

    async fn publish_open_count(&self) {
        let count = self.open_count().await;
        telemetry::set_gauge(GaugeMetric::OpenPositions, count as f64);
    }
}
