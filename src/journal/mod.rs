//! Decision journal
//!
//! Every accept or reject decision, and every lifecycle transition, is
//! reported here with its reason code.

mod events;
mod sink;

pub use events::JournalEvent;
pub use sink::{FanoutJournal, JournalSink, JsonlJournal, MemoryJournal, TracingJournal};
