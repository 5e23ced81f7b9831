//! Mock implementations for testing
//!
//! These mocks enable orchestrator tests without real I/O or real time.

use super::traits::*;
use crate::api::{ApiError, QueryRequest, QueryResponse, Report};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// ============================================================================
// Mock Ask DB Client
// ============================================================================

/// Mock client that returns queued turn responses and report snapshots
#[derive(Default)]
pub struct MockAskDbClient {
    turn_responses: Mutex<VecDeque<Result<QueryResponse, ApiError>>>,
    report_responses: Mutex<VecDeque<Result<Report, ApiError>>>,
    /// Record of all turn requests made
    pub requests: Mutex<Vec<QueryRequest>>,
    /// Record of all report ids checked
    pub checks: Mutex<Vec<String>>,
}

impl MockAskDbClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful turn response
    pub fn queue_response(&self, response: QueryResponse) {
        self.turn_responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a turn submission error
    pub fn queue_error(&self, error: ApiError) {
        self.turn_responses.lock().unwrap().push_back(Err(error));
    }

    /// Queue the result of the next report status check
    pub fn queue_report(&self, result: Result<Report, ApiError>) {
        self.report_responses.lock().unwrap().push_back(result);
    }

    /// Get recorded turn requests
    pub fn recorded_requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Get recorded report status checks, in order
    pub fn report_checks(&self) -> Vec<String> {
        self.checks.lock().unwrap().clone()
    }

    fn next_turn(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.turn_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::network("No mock response queued")))
    }
}

#[async_trait]
impl TurnClient for MockAskDbClient {
    async fn send_turn(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
        self.next_turn(request)
    }
}

#[async_trait]
impl ReportStatusClient for MockAskDbClient {
    async fn check_report(&self, report_id: &str) -> Result<Report, ApiError> {
        self.checks.lock().unwrap().push(report_id.to_string());
        self.report_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::network("No mock report queued")))
    }
}

// ============================================================================
// Gated Mock Client (for single-flight testing)
// ============================================================================

/// Mock client whose turn submissions block until released
pub struct GatedMockAskDbClient {
    pub inner: MockAskDbClient,
    /// Notified when a turn request starts
    pub request_started: Arc<Notify>,
    /// Notify to let the pending request return
    pub release: Arc<Notify>,
}

impl GatedMockAskDbClient {
    pub fn new() -> Self {
        Self {
            inner: MockAskDbClient::new(),
            request_started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl TurnClient for GatedMockAskDbClient {
    async fn send_turn(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
        self.request_started.notify_one();
        self.release.notified().await;
        self.inner.next_turn(request)
    }
}

#[async_trait]
impl ReportStatusClient for GatedMockAskDbClient {
    async fn check_report(&self, report_id: &str) -> Result<Report, ApiError> {
        self.inner.check_report(report_id).await
    }
}

// ============================================================================
// Mock Sleeper
// ============================================================================

/// Sleeper that returns immediately and accumulates simulated time
#[derive(Default)]
pub struct MockSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl MockSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total simulated time spent waiting
    pub fn elapsed(&self) -> Duration {
        self.sleeps.lock().unwrap().iter().sum()
    }

    pub fn recorded_sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for MockSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;

    fn request() -> QueryRequest {
        QueryRequest {
            thread_id: "t".to_string(),
            message: "hi".to_string(),
            school_id: String::new(),
            school_name: String::new(),
        }
    }

    #[tokio::test]
    async fn test_mock_client_drains_queue_then_fails() {
        let mock = MockAskDbClient::new();
        mock.queue_response(QueryResponse {
            success: false,
            message: Some("nope".to_string()),
            queries_executed: None,
            tools_executed: None,
            reports_executed: None,
        });

        assert!(mock.send_turn(&request()).await.is_ok());
        let err = mock.send_turn(&request()).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Network);
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_sleeper_accumulates() {
        let sleeper = MockSleeper::new();
        sleeper.sleep(Duration::from_secs(3)).await;
        sleeper.sleep(Duration::from_secs(3)).await;
        assert_eq!(sleeper.elapsed(), Duration::from_secs(6));
        assert_eq!(sleeper.recorded_sleeps().len(), 2);
    }
}
