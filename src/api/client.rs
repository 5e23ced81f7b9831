//! reqwest-backed Ask DB service

use super::error::classify_status;
use super::types::{QueryRequest, QueryResponse, Report};
use super::{ApiError, AskDbService};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

const API_KEY_HEADER: &str = "X-API-Key";

/// HTTP implementation of [`AskDbService`]
pub struct HttpAskDbService {
    client: Client,
    api_key: String,
    query_url: String,
    reports_url: Url,
}

impl HttpAskDbService {
    /// Build a client rooted at `base_url` (e.g. `http://localhost:8010`).
    ///
    /// # Errors
    ///
    /// Fails if `base_url` is not a usable http(s) URL or the underlying HTTP
    /// client cannot be constructed.
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self, ApiError> {
        let base = base_url.trim_end_matches('/');
        let reports_url = Url::parse(&format!("{base}/v1/ask-db/reports"))
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ApiError::invalid_request(format!("Invalid base URL: {base_url}")))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            query_url: format!("{base}/v1/ask-db/query"),
            reports_url,
        })
    }

    /// Status URL for one report. The id is always a single, percent-encoded
    /// path segment.
    fn report_url(&self, report_id: &str) -> Result<Url, ApiError> {
        if matches!(report_id, "" | "." | "..") {
            return Err(ApiError::invalid_request(format!(
                "Invalid report id: '{report_id}'"
            )));
        }

        let mut url = self.reports_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::invalid_request("Base URL cannot carry a path"))?
            .push(report_id);
        Ok(url)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            ApiError::invalid_response(format!("Failed to parse response: {e} - body: {body}"))
        })
    }
}

fn send_error(e: &reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::network(format!("Request timeout: {e}"))
    } else if e.is_connect() {
        ApiError::network(format!("Connection failed: {e}"))
    } else {
        ApiError::unknown(format!("Request failed: {e}"))
    }
}

#[async_trait]
impl AskDbService for HttpAskDbService {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ApiError> {
        let response = self
            .client
            .post(&self.query_url)
            .header("accept", "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| send_error(&e))?;

        Self::read_json(response).await
    }

    async fn report(&self, report_id: &str) -> Result<Report, ApiError> {
        let response = self
            .client
            .get(self.report_url(report_id)?)
            .header("accept", "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| send_error(&e))?;

        Self::read_json(response).await
    }

    fn endpoint(&self) -> &str {
        &self.query_url
    }
}
