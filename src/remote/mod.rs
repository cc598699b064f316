mod client;
mod mock;
mod models;
mod updater;

pub use client::{HttpScanClient, ScanClient};
pub use mock::MockScanClient;
pub use models::{ScanRequest, ScanResponse, ScanState};
pub use updater::{RemoteStateUpdater, SubmitOutcome};
