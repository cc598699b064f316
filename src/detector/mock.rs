use super::types::{BarcodeDetector, BarcodeFormat, DetectedBarcode};
use crate::error::DetectorError;
use crate::frame::Frame;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

enum Scripted {
    Codes(Vec<String>),
    Failure(String),
}

/// Detector that replays a queue of scripted results
///
/// Once the script is exhausted every call detects nothing. A gate can hold
/// `detect` open until released, which is how tests observe an in-flight call.
pub struct ScriptedDetector {
    formats: Result<Vec<BarcodeFormat>, String>,
    script: Mutex<VecDeque<Scripted>>,
    calls: AtomicU64,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self {
            formats: Ok(vec![
                BarcodeFormat::Code128,
                BarcodeFormat::QrCode,
                BarcodeFormat::Ean13,
            ]),
            script: Mutex::new(VecDeque::new()),
            calls: AtomicU64::new(0),
            gate: Mutex::new(None),
        }
    }

    /// A detector whose capability probe fails
    pub fn failing_probe<S: Into<String>>(details: S) -> Self {
        Self {
            formats: Err(details.into()),
            ..Self::new()
        }
    }

    /// Queue a frame in which the given code is found
    pub fn push_code<S: Into<String>>(&self, code: S) -> &Self {
        self.script
            .lock()
            .push_back(Scripted::Codes(vec![code.into()]));
        self
    }

    /// Queue a frame in which several codes are found
    pub fn push_codes<I, S>(&self, codes: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.script.lock().push_back(Scripted::Codes(
            codes.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Queue a frame in which nothing is found
    pub fn push_empty(&self) -> &Self {
        self.script.lock().push_back(Scripted::Codes(Vec::new()));
        self
    }

    /// Queue a transient detection failure
    pub fn push_failure<S: Into<String>>(&self, details: S) -> &Self {
        self.script
            .lock()
            .push_back(Scripted::Failure(details.into()));
        self
    }

    /// Hold every subsequent `detect` call until the returned handle is notified
    pub fn hold(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock() = Some(Arc::clone(&notify));
        notify
    }

    /// Stop holding `detect` calls
    pub fn release(&self) {
        if let Some(gate) = self.gate.lock().take() {
            gate.notify_waiters();
        }
    }

    pub fn detect_calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BarcodeDetector for ScriptedDetector {
    async fn supported_formats(&self) -> Result<Vec<BarcodeFormat>, DetectorError> {
        self.formats
            .clone()
            .map_err(|details| DetectorError::Initialization { details })
    }

    async fn detect(&self, _frame: &Frame) -> Result<Vec<DetectedBarcode>, DetectorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        match self.script.lock().pop_front() {
            Some(Scripted::Codes(codes)) => Ok(codes
                .into_iter()
                .map(|code| DetectedBarcode::new(code, BarcodeFormat::Code128))
                .collect()),
            Some(Scripted::Failure(details)) => Err(DetectorError::Decode { details }),
            None => Ok(Vec::new()),
        }
    }
}
