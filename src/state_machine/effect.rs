//! Effects produced by state transitions

use crate::api::{QueryRequest, Report};
use crate::store::Metadata;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Record the user's prompt in history
    AppendUserTurn { text: String },

    /// Submit the turn to the service
    SendQuery { request: QueryRequest },

    /// Resolve one deduplicated report handle
    ResolveReport { report: Report },

    /// Commit the assistant turn; always the last effect of a turn
    CommitAssistantTurn {
        content: String,
        metadata: Option<Metadata>,
    },
}

impl Effect {
    pub fn commit_error(content: String) -> Self {
        Effect::CommitAssistantTurn {
            content,
            metadata: None,
        }
    }

    pub fn commit_answer(content: String, metadata: Metadata) -> Self {
        Effect::CommitAssistantTurn {
            content,
            metadata: Some(metadata),
        }
    }

    #[cfg(test)]
    pub fn is_commit(&self) -> bool {
        matches!(self, Effect::CommitAssistantTurn { .. })
    }
}
