//! Ask DB service abstraction
//!
//! Two remote operations back a conversation: submitting a turn and checking
//! the status of a report produced by an earlier submission.

mod client;
mod error;
mod types;

pub use client::HttpAskDbService;
pub use error::ApiError;
#[cfg(test)]
pub use error::ApiErrorKind;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for the remote Ask DB service
#[async_trait]
pub trait AskDbService: Send + Sync {
    /// Submit one user message within a thread
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError>;

    /// Fetch the current snapshot of a report
    async fn report(&self, report_id: &str) -> Result<Report, ApiError>;

    /// Human-readable endpoint, for logs
    fn endpoint(&self) -> &str;
}

/// Logging wrapper for Ask DB services
pub struct LoggingService {
    inner: Arc<dyn AskDbService>,
    endpoint: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn AskDbService>) -> Self {
        let endpoint = inner.endpoint().to_string();
        Self { inner, endpoint }
    }
}

#[async_trait]
impl AskDbService for LoggingService {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
        let start = std::time::Instant::now();
        let result = self.inner.query(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    endpoint = %self.endpoint,
                    thread_id = %request.thread_id,
                    duration_ms = %duration.as_millis(),
                    success = response.success,
                    reports = response.reports_executed.as_ref().map_or(0, Vec::len),
                    "Query completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.endpoint,
                    thread_id = %request.thread_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    "Query failed"
                );
            }
        }

        result
    }

    async fn report(&self, report_id: &str) -> Result<Report, ApiError> {
        let start = std::time::Instant::now();
        let result = self.inner.report(report_id).await;
        let duration = start.elapsed();

        match &result {
            Ok(report) => {
                tracing::debug!(
                    report_id,
                    duration_ms = %duration.as_millis(),
                    status = report.status.as_str(),
                    "Report status fetched"
                );
            }
            Err(e) => {
                tracing::warn!(
                    report_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    "Report status check failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
