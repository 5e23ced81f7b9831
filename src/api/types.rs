//! Wire schemas for the Ask DB API

use super::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /v1/ask-db/query`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest {
    pub thread_id: String,
    pub message: String,
    pub school_id: String,
    pub school_name: String,
}

/// Lifecycle of a server-side report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Processing,
    Completed,
    Failed,
}

impl ReportStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ReportStatus::Completed | ReportStatus::Failed)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Processing => "processing",
            ReportStatus::Completed => "completed",
            ReportStatus::Failed => "failed",
        }
    }
}

/// Snapshot of one asynchronous report.
///
/// Returned embedded in query responses and on its own by the report status
/// endpoint. Only `report_id`, `status`, `download_url` and `error` are typed;
/// descriptive fields stay raw JSON and anything else lands in `extra`, so an
/// odd value there never fails the decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Report {
    /// The report identifier, if present and non-empty
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.report_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
impl Report {
    pub fn with_status(id: &str, status: ReportStatus) -> Self {
        Self {
            report_id: Some(id.to_string()),
            status,
            download_url: None,
            error: None,
            row_count: None,
            school_id: None,
            thread_id: None,
            extra: Map::new(),
        }
    }

    pub fn processing(id: &str) -> Self {
        Self::with_status(id, ReportStatus::Processing)
    }

    pub fn completed(id: &str, url: &str) -> Self {
        Self {
            download_url: Some(url.to_string()),
            ..Self::with_status(id, ReportStatus::Completed)
        }
    }

    pub fn failed(id: &str, error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::with_status(id, ReportStatus::Failed)
        }
    }
}

/// Raw body of a query response.
///
/// Every field past `success` is optional on the wire because rejected
/// queries carry little more than a message. [`QueryResponse::into_outcome`]
/// enforces the full shape for successful answers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub queries_executed: Option<Vec<String>>,
    #[serde(default)]
    pub tools_executed: Option<Vec<String>>,
    #[serde(default)]
    pub reports_executed: Option<Vec<Report>>,
}

/// A successful answer with every field the turn needs
#[derive(Debug, Clone, PartialEq)]
pub struct AnsweredQuery {
    pub message: String,
    pub queries_executed: Vec<String>,
    pub tools_executed: Vec<String>,
    pub reports_executed: Vec<Report>,
}

/// Validated interpretation of a [`QueryResponse`]
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Answered(AnsweredQuery),
    /// `success: false`, with the server's explanation if it sent one
    Rejected { message: Option<String> },
}

impl QueryResponse {
    /// Validate the response shape.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidResponse` error when a successful response is
    /// missing any of `message`, `queries_executed`, `tools_executed` or
    /// `reports_executed`.
    pub fn into_outcome(self) -> Result<QueryOutcome, ApiError> {
        if !self.success {
            return Ok(QueryOutcome::Rejected {
                message: self.message,
            });
        }

        let missing = |field: &str| {
            ApiError::invalid_response(format!("successful response is missing `{field}`"))
        };

        Ok(QueryOutcome::Answered(AnsweredQuery {
            message: self.message.ok_or_else(|| missing("message"))?,
            queries_executed: self
                .queries_executed
                .ok_or_else(|| missing("queries_executed"))?,
            tools_executed: self
                .tools_executed
                .ok_or_else(|| missing("tools_executed"))?,
            reports_executed: self
                .reports_executed
                .ok_or_else(|| missing("reports_executed"))?,
        }))
    }
}
