//! Conversation history types

use crate::api::Report;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Details attached to an answered assistant turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub success: bool,
    pub queries_executed: Vec<String>,
    pub tools_executed: Vec<String>,
    /// Deduplicated by `report_id`, in first-seen order
    pub reports_executed: Vec<Report>,
}

impl Metadata {
    /// Compact view of the metadata for display.
    ///
    /// Reports are reduced to their identifying fields; any payload the
    /// server attached is left out.
    pub fn summary(&self) -> Value {
        let mut summary = json!({
            "success": self.success,
            "queries_executed": self.queries_executed,
            "tools_executed": self.tools_executed,
        });

        if !self.reports_executed.is_empty() {
            let reports: Vec<Value> = self
                .reports_executed
                .iter()
                .map(|r| {
                    json!({
                        "report_id": r.report_id,
                        "status": r.status.as_str(),
                        "row_count": r.row_count,
                        "school_id": r.school_id,
                        "thread_id": r.thread_id,
                    })
                })
                .collect();
            summary["reports_executed"] = Value::Array(reports);
        }

        summary
    }
}

/// One committed message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    /// Final display text, with report links already merged in
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
            metadata: None,
            created_at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>, metadata: Option<Metadata>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            metadata,
            created_at: Utc::now(),
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}
