//! Ask DB API error types

use thiserror::Error;

/// API error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Auth, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::RateLimit, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::NotFound, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::ServerError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::InvalidRequest, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::InvalidResponse, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unknown, message)
    }

    /// Whether the failure happened at the transport/HTTP layer, as opposed to
    /// a body that arrived but could not be understood.
    pub fn is_transport(&self) -> bool {
        self.kind.is_transport()
    }
}

/// Error classification for turn outcome mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Connection refused, DNS, timeouts
    Network,
    /// Rejected API key (401, 403)
    Auth,
    /// Rate limited (429)
    RateLimit,
    /// Unknown resource (404)
    NotFound,
    /// Server error (5xx)
    ServerError,
    /// Bad request (400, 422)
    InvalidRequest,
    /// Body does not match the expected schema
    InvalidResponse,
    /// Anything else
    Unknown,
}

impl ApiErrorKind {
    pub fn is_transport(self) -> bool {
        !matches!(self, Self::InvalidResponse)
    }
}

/// Classify a non-success HTTP status into an [`ApiError`].
pub fn classify_status(status: u16, body: &str) -> ApiError {
    match status {
        401 | 403 => ApiError::auth(format!("Authentication failed: {body}")),
        404 => ApiError::not_found(format!("Not found: {body}")),
        429 => ApiError::rate_limit(format!("Rate limited: {body}")),
        400 | 422 => ApiError::invalid_request(format!("Invalid request: {body}")),
        500..=599 => ApiError::server_error(format!("Server error ({status}): {body}")),
        _ => ApiError::unknown(format!("HTTP {status}: {body}")),
    }
}
