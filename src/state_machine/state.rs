//! Turn state types

use crate::api::Report;
use crate::config::SchoolContext;
use crate::store::ThreadId;

/// State of the turn in flight
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TurnState {
    /// No prompt accepted yet
    #[default]
    Idle,

    /// Query request in flight
    Sending,

    /// Resolving report handles one at a time, in response order
    Resolving {
        /// Assistant text before any report links
        message: String,
        queries_executed: Vec<String>,
        tools_executed: Vec<String>,
        /// The report being resolved
        current: Report,
        /// Reports still to resolve after `current`
        remaining: Vec<Report>,
        /// Snapshots of reports already resolved, in order
        resolved: Vec<Report>,
        /// Presentable text of each resolved report
        links: Vec<String>,
    },

    /// Assistant turn committed (terminal)
    Committed,
}

impl TurnState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TurnState::Idle => "idle",
            TurnState::Sending => "sending",
            TurnState::Resolving { .. } => "resolving",
            TurnState::Committed => "committed",
        }
    }

    #[cfg(test)]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnState::Committed)
    }
}

/// Context for a turn (immutable for its duration)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnContext {
    pub thread_id: String,
    /// Pass-through values; the client never interprets them
    pub school: SchoolContext,
}

impl TurnContext {
    pub fn new(thread_id: &ThreadId, school: SchoolContext) -> Self {
        Self {
            thread_id: thread_id.to_string(),
            school,
        }
    }
}
