//! Journal sinks
//!
//! Recording is fire-and-forget: a sink that cannot write logs the failure and
//! carries on, it never fails the trading decision that produced the event.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

use super::JournalEvent;

/// Events buffered ahead of the file writer
const JOURNAL_QUEUE_CAPACITY: usize = 10_000;

/// Destination for journal events
pub trait JournalSink: Send + Sync {
    fn record(&self, event: JournalEvent);
}

/// Emits every event as a structured tracing event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingJournal;

impl JournalSink for TracingJournal {
    fn record(&self, event: JournalEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => tracing::info!(
                target: "journal",
                event = event.name(),
                %payload,
                "Journal event"
            ),
            Err(e) => tracing::warn!(event = event.name(), error = %e, "Failed to encode journal event"),
        }
    }
}

/// Keeps events in memory
#[derive(Debug, Default)]
pub struct MemoryJournal {
    events: Mutex<Vec<JournalEvent>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<JournalEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Names of recorded events, in order
    pub fn names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(JournalEvent::name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl JournalSink for MemoryJournal {
    fn record(&self, event: JournalEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

/// Sends each event to several sinks
#[derive(Default)]
pub struct FanoutJournal {
    sinks: Vec<Arc<dyn JournalSink>>,
}

impl FanoutJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn JournalSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl JournalSink for FanoutJournal {
    fn record(&self, event: JournalEvent) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.record(event.clone());
            }
            last.record(event);
        }
    }
}

/// Appends events as JSON lines from a background writer task
pub struct JsonlJournal {
    path: PathBuf,
    tx: Mutex<Option<mpsc::Sender<JournalEvent>>>,
    writer: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl JsonlJournal {
    /// Open (or create) `path` for appending and start the writer task
    ///
    /// Must be called from within a tokio runtime.
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Self::open_with_capacity(path, JOURNAL_QUEUE_CAPACITY).await
    }

    /// Like [`JsonlJournal::open`] with a custom queue size; a full queue drops events
    pub async fn open_with_capacity(
        path: impl AsRef<Path>,
        capacity: usize,
    ) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        let (tx, rx) = mpsc::channel(capacity.max(1));
        let writer_path = path.clone();
        let writer = tokio::spawn(async move {
            Self::run_writer(rx, file, writer_path).await;
        });

        tracing::info!(path = %path.display(), "Journal file opened");
        Ok(Self {
            path,
            tx: Mutex::new(Some(tx)),
            writer: tokio::sync::Mutex::new(Some(writer)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stop accepting events and wait until everything queued is on disk
    ///
    /// Events recorded after shutdown are dropped with a warning.
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        drop(
            self.tx
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .take(),
        );
        if let Some(writer) = self.writer.lock().await.take() {
            writer.await?;
        }
        Ok(())
    }

    async fn run_writer(
        mut rx: mpsc::Receiver<JournalEvent>,
        mut file: tokio::fs::File,
        path: PathBuf,
    ) {
        while let Some(event) = rx.recv().await {
            let mut line = match serde_json::to_vec(&event) {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!(event = event.name(), error = %e, "Failed to encode journal event");
                    continue;
                }
            };
            line.push(b'\n');

            if let Err(e) = file.write_all(&line).await {
                tracing::error!(path = %path.display(), error = %e, "Failed to write journal event");
            }
        }

        if let Err(e) = file.flush().await {
            tracing::error!(path = %path.display(), error = %e, "Failed to flush journal");
        }
    }
}

impl JournalSink for JsonlJournal {
    fn record(&self, event: JournalEvent) {
        let tx = self.tx.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(tx) = tx.as_ref() else {
            tracing::warn!(event = event.name(), "Journal writer stopped, event dropped");
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(event = event.name(), "Journal queue full, event dropped");
            }
            Err(TrySendError::Closed(event)) => {
                tracing::warn!(event = event.name(), "Journal writer stopped, event dropped");
            }
        }
    }
}
