//! HTTP client for the ShieldNet backend.
//!
//! [`ApiClient`] wraps one `reqwest::Client` and exposes every backend
//! operation: the streaming invoice analysis (via [`HttpTransport`] and a
//! [`StreamingSession`]) and the plain request/response dashboard endpoints.

use crate::config::ResolvedConfig;
use crate::model::{
    AnalysisResult, ApiError, HealthStatus, SessionError, ThreatAnalytics, ThreatReport,
    ThreatReportReceipt, Transaction, TransactionQuery, UploadRequest, WalletBalance,
};
use crate::stream::{SessionOptions, StreamingSession, UpdateHandler};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

pub mod transport;

pub use transport::HttpTransport;

pub const STREAM_PATH: &str = "/api/invoices/analyze/stream";
pub const ANALYZE_PATH: &str = "/api/invoices/analyze";
pub const ANALYTICS_PATH: &str = "/api/threats/analytics";
pub const REPORT_PATH: &str = "/api/threats/report";
pub const TRANSACTIONS_PATH: &str = "/api/transactions";
pub const BALANCE_PATH: &str = "/api/wallet/balance";
pub const HISTORY_PATH: &str = "/api/invoices/history";
pub const HEALTH_PATH: &str = "/health";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Client for one backend instance.
///
/// Only a connect timeout is set on the underlying client. Streaming responses
/// can legitimately run for minutes, so liveness is enforced by the session's
/// idle timeout instead of a whole-request deadline.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_connect_timeout(base_url, Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
    }

    pub fn from_config(config: &ResolvedConfig) -> Result<Self, ApiError> {
        Self::with_connect_timeout(config.api_base_url.clone(), config.connect_timeout())
    }

    fn with_connect_timeout(
        base_url: impl Into<String>,
        connect_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(concat!("shieldnet/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Request {
                url: base_url.clone(),
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Endpoint of the streaming analysis upload.
    pub fn stream_endpoint(&self) -> String {
        self.url(STREAM_PATH)
    }

    /// Endpoint of the blocking analysis upload.
    pub fn analyze_endpoint(&self) -> String {
        self.url(ANALYZE_PATH)
    }

    /// Transport sharing this client's connection pool.
    pub fn transport(&self) -> HttpTransport {
        HttpTransport::new(self.http.clone())
    }

    /// Upload an invoice and stream the analysis.
    ///
    /// `request` should target [`ApiClient::stream_endpoint`]. Progress and
    /// tokens reach `handler` as they arrive.
    pub async fn analyze_streaming<H>(
        &self,
        request: UploadRequest,
        handler: H,
        options: SessionOptions,
    ) -> Result<AnalysisResult, SessionError>
    where
        H: UpdateHandler,
    {
        StreamingSession::with_options(self.transport(), options)
            .run(request, handler)
            .await
    }

    /// Upload an invoice and wait for the verdict without progress updates.
    ///
    /// `request` should target [`ApiClient::analyze_endpoint`].
    pub async fn analyze(&self, request: UploadRequest) -> Result<AnalysisResult, ApiError> {
        let (endpoint, form) =
            transport::multipart_upload(request).map_err(|e| ApiError::Request {
                url: String::new(),
                reason: e.to_string(),
            })?;

        info!(endpoint = %endpoint, "Submitting invoice for analysis");

        let response = self
            .http
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_error(&endpoint, &e))?;

        let result: AnalysisResult = decode_response(&endpoint, response).await?;
        result.validate().map_err(|reason| ApiError::Decode {
            url: endpoint,
            reason,
        })?;
        Ok(result)
    }

    /// Aggregated threat network statistics.
    pub async fn threat_analytics(&self) -> Result<ThreatAnalytics, ApiError> {
        self.get_json(ANALYTICS_PATH, &[]).await
    }

    /// Treasury ledger, newest first.
    pub async fn transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, ApiError> {
        self.get_json(TRANSACTIONS_PATH, &query.to_pairs()).await
    }

    pub async fn wallet_balance(&self) -> Result<WalletBalance, ApiError> {
        self.get_json(BALANCE_PATH, &[]).await
    }

    /// Share a blocked invoice with the threat network.
    pub async fn report_threat(&self, report: &ThreatReport) -> Result<ThreatReportReceipt, ApiError> {
        let url = self.url(REPORT_PATH);
        info!(url = %url, invoice_id = %report.invoice_id, "Reporting threat");

        let response = self
            .http
            .post(&url)
            .json(report)
            .send()
            .await
            .map_err(|e| request_error(&url, &e))?;

        decode_response(&url, response).await
    }

    /// Every invoice the backend has analyzed.
    pub async fn invoice_history(&self) -> Result<Vec<AnalysisResult>, ApiError> {
        self.get_json(HISTORY_PATH, &[]).await
    }

    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json(HEALTH_PATH, &[]).await
    }

    async fn get_json<T>(&self, path: &str, query: &[(&'static str, String)]) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let raw = self.url(path);
        let url = Url::parse_with_params(&raw, query).map_err(|e| ApiError::Request {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        debug!(url = %url, "GET");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(&raw, &e))?;

        decode_response(&raw, response).await
    }
}

async fn decode_response<T>(url: &str, response: Response) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    if !status.is_success() {
        let detail = error_detail(response).await;
        return Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        });
    }

    let body = response.bytes().await.map_err(|e| request_error(url, &e))?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Extract the human-readable message of an error response.
///
/// The backend answers failures with `{"detail": ...}`; anything else falls
/// back to the status line.
pub(crate) async fn error_detail(response: Response) -> String {
    let status = response.status();
    let fallback = status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string();

    match response.bytes().await {
        Ok(body) => parse_detail(&body).unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn parse_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Null => None,
        // Validation errors carry a list of objects.
        other => Some(other.to_string()),
    }
}

fn request_error(url: &str, error: &reqwest::Error) -> ApiError {
    ApiError::Request {
        url: url.to_string(),
        reason: transport::describe_send_error(error),
    }
}
