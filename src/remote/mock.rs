use super::client::ScanClient;
use super::models::ScanResponse;
use crate::error::SubmitError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

enum Reply {
    Response(ScanResponse),
    Status(u16, String),
    Decode(String),
}

/// Scan client that records submissions and replays queued replies
///
/// With no queued reply it answers with a bare success echoing the code.
#[derive(Default)]
pub struct MockScanClient {
    submitted: Mutex<Vec<String>>,
    replies: Mutex<VecDeque<Reply>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl MockScanClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: ScanResponse) -> &Self {
        self.replies.lock().push_back(Reply::Response(response));
        self
    }

    pub fn push_status<S: Into<String>>(&self, status: u16, reason: S) -> &Self {
        self.replies
            .lock()
            .push_back(Reply::Status(status, reason.into()));
        self
    }

    pub fn push_decode_error<S: Into<String>>(&self, details: S) -> &Self {
        self.replies.lock().push_back(Reply::Decode(details.into()));
        self
    }

    /// Hold every subsequent request until the returned handle is notified
    pub fn hold(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock() = Some(Arc::clone(&notify));
        notify
    }

    pub fn release(&self) {
        if let Some(gate) = self.gate.lock().take() {
            gate.notify_waiters();
        }
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().clone()
    }
}

#[async_trait]
impl ScanClient for MockScanClient {
    async fn process_scan(&self, barcode: &str) -> Result<ScanResponse, SubmitError> {
        self.submitted.lock().push(barcode.to_string());

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        match self.replies.lock().pop_front() {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Status(status, reason)) => Err(SubmitError::Status { status, reason }),
            Some(Reply::Decode(details)) => Err(SubmitError::Decode { details }),
            None => Ok(ScanResponse {
                status: Some(ScanResponse::SUCCESS.to_string()),
                message: Some(format!("Scanned {}", barcode)),
                state: None,
            }),
        }
    }
}
