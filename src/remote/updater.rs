use super::client::ScanClient;
use crate::display::{render, ScanDisplay, StatusLine};
use crate::scanner::SessionToken;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happened to one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Server answered; `success` mirrors its status field
    Rendered { success: bool },
    /// Transport, status or decode failure, shown as an error status
    Failed { error: String },
    /// The session ended before the reply arrived; nothing was shown
    Stale,
}

/// Posts accepted codes and renders the server's reply
pub struct RemoteStateUpdater {
    client: Arc<dyn ScanClient>,
    display: Arc<dyn ScanDisplay>,
    /// Code whose processing notice is showing and still awaits a reply
    pending: Mutex<Option<String>>,
}

impl RemoteStateUpdater {
    pub fn new(client: Arc<dyn ScanClient>, display: Arc<dyn ScanDisplay>) -> Self {
        Self {
            client,
            display,
            pending: Mutex::new(None),
        }
    }

    /// Submit a code; every failure ends up on the status line
    pub async fn submit(&self, code: &str, token: &SessionToken) -> SubmitOutcome {
        if !token.is_current() {
            return SubmitOutcome::Stale;
        }
        self.display.set_status(&StatusLine::processing(code));
        *self.pending.lock() = Some(code.to_string());

        let result = self.client.process_scan(code).await;

        if !token.is_current() {
            debug!("Discarding reply for {} from ended session", code);
            return SubmitOutcome::Stale;
        }
        self.pending.lock().take();

        match result {
            Ok(response) => {
                info!(
                    "Server response for {}: status={:?} message={:?}",
                    code, response.status, response.message
                );
                self.display.apply(&render(&response));
                SubmitOutcome::Rendered {
                    success: response.is_success(),
                }
            }
            Err(e) => {
                warn!("Error sending barcode {} to server: {}", code, e);
                self.display.set_status(&StatusLine::submit_failed(&e));
                SubmitOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Replace a processing notice that will never get its reply
    ///
    /// Returns the abandoned code, if any.
    pub fn cancel_pending(&self) -> Option<String> {
        let code = self.pending.lock().take()?;
        self.display.set_status(&StatusLine::cancelled(&code));
        Some(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{MemoryDisplay, Severity, StateFields};
    use crate::remote::{MockScanClient, ScanResponse, ScanState};
    use crate::scanner::SessionGeneration;

    fn setup() -> (Arc<MockScanClient>, Arc<MemoryDisplay>, RemoteStateUpdater) {
        let client = Arc::new(MockScanClient::new());
        let display = Arc::new(MemoryDisplay::new());
        let updater = RemoteStateUpdater::new(client.clone(), display.clone());
        (client, display, updater)
    }

    #[tokio::test]
    async fn test_submit_renders_success() {
        let (client, display, updater) = setup();
        client.push_response(ScanResponse {
            status: Some("success".to_string()),
            message: Some("Item added: Widget".to_string()),
            state: Some(ScanState {
                buyer_name: Some("Jane".to_string()),
                item_name: Some("Widget".to_string()),
                accumulated_price: Some(4.25),
            }),
        });
        let generation = SessionGeneration::new();

        let outcome = updater.submit("ITEM-1", &generation.token()).await;

        assert_eq!(outcome, SubmitOutcome::Rendered { success: true });
        assert_eq!(client.submitted(), vec!["ITEM-1".to_string()]);
        let snapshot = display.snapshot();
        assert_eq!(snapshot.status.unwrap().text, "Item added: Widget");
        assert_eq!(snapshot.fields.price, "4.25");
        // processing notice, then the reply
        assert_eq!(snapshot.status_updates, 2);
    }

    #[tokio::test]
    async fn test_submit_failure_leaves_fields_unchanged() {
        let (client, display, updater) = setup();
        display.set_fields(&StateFields {
            buyer: "Jane".to_string(),
            item: "Widget".to_string(),
            price: "4.25".to_string(),
        });
        client.push_status(500, "Internal Server Error");
        let generation = SessionGeneration::new();

        let outcome = updater.submit("ITEM-2", &generation.token()).await;

        assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
        let snapshot = display.snapshot();
        let status = snapshot.status.unwrap();
        assert_eq!(status.severity, Severity::Error);
        assert_eq!(
            status.text,
            "Error: Server error: 500 Internal Server Error. Check connection or try again."
        );
        assert_eq!(snapshot.fields.buyer, "Jane");
        assert_eq!(snapshot.fields.price, "4.25");
    }

    #[tokio::test]
    async fn test_submit_decode_failure_is_reported() {
        let (client, display, updater) = setup();
        client.push_decode_error("expected value at line 1 column 1");
        let generation = SessionGeneration::new();

        let outcome = updater.submit("ITEM-3", &generation.token()).await;

        assert!(matches!(outcome, SubmitOutcome::Failed { .. }));
        assert!(display
            .snapshot()
            .status
            .unwrap()
            .text
            .starts_with("Error: Invalid server response"));
    }

    #[tokio::test]
    async fn test_reply_after_session_end_is_discarded() {
        let (client, display, updater) = setup();
        let gate = client.hold();
        let generation = SessionGeneration::new();
        let token = generation.token();

        let submit = tokio::spawn(async move { updater.submit("ITEM-4", &token).await });
        while client.submitted().is_empty() {
            tokio::task::yield_now().await;
        }

        generation.advance();
        gate.notify_waiters();

        assert_eq!(submit.await.unwrap(), SubmitOutcome::Stale);
        let snapshot = display.snapshot();
        assert_eq!(snapshot.status.unwrap().text, "Processing: ITEM-4...");
        assert_eq!(snapshot.fields, StateFields::default());
    }

    #[tokio::test]
    async fn test_cancel_pending_replaces_processing_notice() {
        let (client, display, updater) = setup();
        let updater = Arc::new(updater);
        let gate = client.hold();
        let generation = SessionGeneration::new();
        let token = generation.token();

        let submitting = Arc::clone(&updater);
        let submit = tokio::spawn(async move { submitting.submit("ITEM-6", &token).await });
        while client.submitted().is_empty() {
            tokio::task::yield_now().await;
        }

        generation.advance();
        assert_eq!(updater.cancel_pending().as_deref(), Some("ITEM-6"));
        assert_eq!(updater.cancel_pending(), None);

        gate.notify_waiters();
        assert_eq!(submit.await.unwrap(), SubmitOutcome::Stale);

        let status = display.snapshot().status.unwrap();
        assert_eq!(status.text, "Cancelled: ITEM-6 (camera stopped).");
        assert_eq!(status.severity, Severity::Warning);
    }

    #[tokio::test]
    async fn test_answered_submission_leaves_nothing_to_cancel() {
        let (client, display, updater) = setup();
        client.push_status(500, "Internal Server Error");
        let generation = SessionGeneration::new();

        updater.submit("ITEM-7", &generation.token()).await;

        assert_eq!(updater.cancel_pending(), None);
        assert_eq!(display.snapshot().status.unwrap().severity, Severity::Error);
    }

    #[tokio::test]
    async fn test_stale_token_never_submits() {
        let (client, _display, updater) = setup();
        let generation = SessionGeneration::new();
        let token = generation.token();
        generation.advance();

        assert_eq!(updater.submit("ITEM-5", &token).await, SubmitOutcome::Stale);
        assert!(client.submitted().is_empty());
    }
}
