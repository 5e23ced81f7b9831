//! In-memory conversation history for one thread

mod schema;

pub use schema::*;

use crate::api::Report;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("A turn is already in progress")]
    Busy,
    #[error("Turn not found: {0}")]
    TurnNotFound(usize),
    #[error("Turn {0} has no report metadata")]
    NoMetadata(usize),
    #[error("Report {report} not found in turn {turn}")]
    ReportNotFound { turn: usize, report: usize },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Opaque identifier scoping a sequence of turns
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append-only turn history with a single-flight guard
#[derive(Debug, Default)]
pub struct ConversationStore {
    turns: Mutex<Vec<Turn>>,
    processing: AtomicBool,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Turn>> {
        self.turns.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the guard for one turn.
    ///
    /// Returns `None` if another turn already holds it. The guard is released
    /// when the returned handle is dropped.
    pub fn try_begin_turn(&self) -> Option<TurnGuard<'_>> {
        self.processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TurnGuard {
                flag: &self.processing,
            })
    }

    #[cfg(test)]
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    /// Append a turn, returning its index
    pub fn append(&self, turn: Turn) -> usize {
        let mut turns = self.lock();
        turns.push(turn);
        turns.len() - 1
    }

    #[must_use]
    pub fn turns(&self) -> Vec<Turn> {
        self.lock().clone()
    }

    #[cfg(test)]
    pub fn get(&self, index: usize) -> Option<Turn> {
        self.lock().get(index).cloned()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Look up a report snapshot stored in a committed turn
    pub fn report(&self, turn: usize, report: usize) -> StoreResult<Report> {
        let turns = self.lock();
        let metadata = turns
            .get(turn)
            .ok_or(StoreError::TurnNotFound(turn))?
            .metadata
            .as_ref()
            .ok_or(StoreError::NoMetadata(turn))?;
        metadata
            .reports_executed
            .get(report)
            .cloned()
            .ok_or(StoreError::ReportNotFound { turn, report })
    }

    /// Overwrite a committed report snapshot in place.
    ///
    /// This is the only mutation allowed on a committed turn.
    pub fn replace_report(&self, turn: usize, report: usize, snapshot: Report) -> StoreResult<()> {
        let mut turns = self.lock();
        let metadata = turns
            .get_mut(turn)
            .ok_or(StoreError::TurnNotFound(turn))?
            .metadata
            .as_mut()
            .ok_or(StoreError::NoMetadata(turn))?;
        let slot = metadata
            .reports_executed
            .get_mut(report)
            .ok_or(StoreError::ReportNotFound { turn, report })?;
        *slot = snapshot;
        Ok(())
    }
}

/// Held for the duration of one turn; releases the guard on drop
#[derive(Debug)]
pub struct TurnGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// One conversation session: a thread id plus its history
#[derive(Debug)]
pub struct Session {
    thread_id: ThreadId,
    store: ConversationStore,
}

impl Session {
    pub fn new() -> Self {
        Self {
            thread_id: ThreadId::generate(),
            store: ConversationStore::new(),
        }
    }

    /// Start a new conversation: fresh thread id, empty history
    pub fn reset(&mut self) {
        self.thread_id = ThreadId::generate();
        self.store = ConversationStore::new();
    }

    /// Drop the visible history but keep talking in the same thread
    pub fn clear_view(&self) {
        self.store.clear();
    }

    #[must_use]
    pub fn thread_id(&self) -> &ThreadId {
        &self.thread_id
    }

    #[must_use]
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
