use super::models::{ScanRequest, ScanResponse};
use crate::config::ScanLoopConfig;
use crate::error::{Result, ScanLoopError, SubmitError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, trace};

/// Transport to the scan processing endpoint
#[async_trait]
pub trait ScanClient: Send + Sync {
    async fn process_scan(&self, barcode: &str) -> std::result::Result<ScanResponse, SubmitError>;
}

/// `reqwest` client posting JSON to `POST {base_url}/scan/process_scan`
pub struct HttpScanClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpScanClient {
    pub fn new<S: Into<String>>(endpoint: S, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScanLoopError::component("http_client".to_string(), e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &ScanLoopConfig) -> Result<Self> {
        Self::new(
            config.process_scan_url(),
            Duration::from_millis(config.server.request_timeout_ms),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ScanClient for HttpScanClient {
    async fn process_scan(&self, barcode: &str) -> std::result::Result<ScanResponse, SubmitError> {
        debug!("POST {} barcode={}", self.endpoint, barcode);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&ScanRequest {
                barcode: barcode.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let body = response.bytes().await?;
        trace!("Scan response body: {}", String::from_utf8_lossy(&body));

        serde_json::from_slice::<ScanResponse>(&body).map_err(|e| SubmitError::Decode {
            details: e.to_string(),
        })
    }
}
