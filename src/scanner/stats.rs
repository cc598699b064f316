use chrono::{DateTime, Utc};
use serde::Serialize;

/// Scan loop counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanStats {
    pub ticks: u64,
    pub skipped_ticks: u64,
    pub detection_failures: u64,
    pub codes_detected: u64,
    pub codes_debounced: u64,
    pub codes_submitted: u64,
    pub submit_failures: u64,
    pub sessions_started: u64,
    pub last_code_at: Option<DateTime<Utc>>,
}

impl ScanStats {
    pub fn record_tick(&mut self) {
        self.ticks += 1;
    }

    pub fn record_skip(&mut self) {
        self.skipped_ticks += 1;
    }

    pub fn record_detection_failure(&mut self) {
        self.detection_failures += 1;
    }

    pub fn record_detected(&mut self) {
        self.codes_detected += 1;
        self.last_code_at = Some(Utc::now());
    }

    pub fn record_debounced(&mut self) {
        self.codes_debounced += 1;
    }

    pub fn record_submitted(&mut self) {
        self.codes_submitted += 1;
    }

    pub fn record_submit_failure(&mut self) {
        self.submit_failures += 1;
    }

    pub fn record_session(&mut self) {
        self.sessions_started += 1;
    }

    pub fn submit_success_rate(&self) -> f64 {
        if self.codes_submitted == 0 {
            0.0
        } else {
            (self.codes_submitted - self.submit_failures) as f64 / self.codes_submitted as f64
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
