//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the orchestrator with mock implementations.

use crate::api::{ApiError, AskDbService, QueryRequest, QueryResponse, Report};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Client for submitting turns
#[async_trait]
pub trait TurnClient: Send + Sync {
    /// Send one user message and return the raw response
    async fn send_turn(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError>;
}

/// Client for checking report status
#[async_trait]
pub trait ReportStatusClient: Send + Sync {
    /// Fetch the current snapshot of a report
    async fn check_report(&self, report_id: &str) -> Result<Report, ApiError>;
}

/// Suspends the caller between status checks
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Combined client trait for convenience
pub trait AskDbClient: TurnClient + ReportStatusClient {}
impl<T: TurnClient + ReportStatusClient> AskDbClient for T {}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: TurnClient + ?Sized> TurnClient for Arc<T> {
    async fn send_turn(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
        (**self).send_turn(request).await
    }
}

#[async_trait]
impl<T: ReportStatusClient + ?Sized> ReportStatusClient for Arc<T> {
    async fn check_report(&self, report_id: &str) -> Result<Report, ApiError> {
        (**self).check_report(report_id).await
    }
}

#[async_trait]
impl<T: Sleeper + ?Sized> Sleeper for Arc<T> {
    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await;
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use an [`AskDbService`] as the runtime client
#[derive(Clone)]
pub struct ServiceClient {
    service: Arc<dyn AskDbService>,
}

impl ServiceClient {
    pub fn new(service: Arc<dyn AskDbService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl TurnClient for ServiceClient {
    async fn send_turn(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
        self.service.query(request).await
    }
}

#[async_trait]
impl ReportStatusClient for ServiceClient {
    async fn check_report(&self, report_id: &str) -> Result<Report, ApiError> {
        self.service.report(report_id).await
    }
}

/// Real wall-clock waits
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
