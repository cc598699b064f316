use super::*;
use crate::remote::{ScanResponse, ScanState};

#[test]
fn test_render_success_response() {
    let response = ScanResponse {
        status: Some("success".to_string()),
        message: Some("OK".to_string()),
        state: Some(ScanState {
            buyer_name: Some("Jane".to_string()),
            item_name: Some("Widget".to_string()),
            accumulated_price: Some(12.5),
        }),
    };

    let rendered = render(&response);

    assert_eq!(rendered.status.text, "OK");
    assert_eq!(rendered.status.severity, Severity::Success);
    assert_eq!(rendered.status.severity.css_class(), "alert alert-success");
    assert_eq!(rendered.fields.buyer, "Jane");
    assert_eq!(rendered.fields.item, "Widget");
    assert_eq!(rendered.fields.price, "12.50");
}

#[test]
fn test_render_error_without_state() {
    let response = ScanResponse {
        status: Some("error".to_string()),
        message: Some("Not found".to_string()),
        state: None,
    };

    let rendered = render(&response);

    assert_eq!(rendered.status.text, "Not found");
    assert_eq!(rendered.status.severity, Severity::Error);
    assert_eq!(rendered.status.severity.css_class(), "alert alert-danger");
    assert_eq!(rendered.fields.buyer, "None");
    assert_eq!(rendered.fields.item, "None");
    assert_eq!(rendered.fields.price, "0.00");
}

#[test]
fn test_render_fallbacks_for_empty_values() {
    let response = ScanResponse {
        status: None,
        message: Some(String::new()),
        state: Some(ScanState {
            buyer_name: Some(String::new()),
            item_name: None,
            accumulated_price: None,
        }),
    };

    let rendered = render(&response);

    assert_eq!(rendered.status.text, DEFAULT_STATUS_MESSAGE);
    assert_eq!(rendered.status.severity, Severity::Error);
    assert_eq!(rendered.fields, StateFields::default());
}

#[test]
fn test_render_unknown_status_is_error() {
    let response = ScanResponse {
        status: Some("warning".to_string()),
        message: Some("Partial".to_string()),
        state: None,
    };
    assert_eq!(render(&response).status.severity, Severity::Error);
}

#[test]
fn test_format_price() {
    assert_eq!(format_price(Some(12.5)), "12.50");
    assert_eq!(format_price(Some(0.0)), "0.00");
    assert_eq!(format_price(Some(-0.0)), "0.00");
    assert_eq!(format_price(Some(3.456)), "3.46");
    assert_eq!(format_price(Some(1234.0)), "1234.00");
    // Exact halves round up
    assert_eq!(format_price(Some(0.125)), "0.13");
    assert_eq!(format_price(Some(0.625)), "0.63");
    assert_eq!(format_price(Some(-0.125)), "-0.13");
    // 1.005 is stored just below the half
    assert_eq!(format_price(Some(1.005)), "1.00");
    assert_eq!(format_price(Some(f64::NAN)), "0.00");
    assert_eq!(format_price(None), "0.00");
}

#[test]
fn test_status_line_helpers() {
    let processing = StatusLine::processing("ITEM-9");
    assert_eq!(processing.text, "Processing: ITEM-9...");
    assert_eq!(processing.severity.css_class(), "alert alert-warning");

    let failed = StatusLine::submit_failed(&"Server error: 500 Internal Server Error");
    assert_eq!(
        failed.text,
        "Error: Server error: 500 Internal Server Error. Check connection or try again."
    );
    assert_eq!(failed.severity, Severity::Error);
}

#[test]
fn test_memory_display_apply() {
    let display = MemoryDisplay::new();
    let initial = display.snapshot();
    assert_eq!(initial.controls, ControlState::Inactive);
    assert_eq!(initial.fields, StateFields::default());

    let response = ScanResponse {
        status: Some("success".to_string()),
        message: Some("Item added".to_string()),
        state: Some(ScanState {
            buyer_name: Some("Jane".to_string()),
            item_name: Some("Widget".to_string()),
            accumulated_price: Some(7.0),
        }),
    };
    display.apply(&render(&response));

    let snapshot = display.snapshot();
    assert_eq!(snapshot.status.unwrap().text, "Item added");
    assert_eq!(snapshot.fields.price, "7.00");
    assert_eq!(snapshot.status_updates, 1);
}

#[test]
fn test_memory_display_preview_and_errors() {
    let display = MemoryDisplay::new();

    display.attach_preview("mock-0");
    display.set_camera_error("Error accessing camera: permission denied.");
    display.set_controls(ControlState::Active);
    assert_eq!(display.snapshot().preview.as_deref(), Some("mock-0"));

    display.detach_preview();
    display.clear_camera_error();
    let snapshot = display.snapshot();
    assert!(snapshot.preview.is_none());
    assert!(snapshot.camera_error.is_empty());
    assert_eq!(snapshot.controls, ControlState::Active);
}

#[test]
fn test_terminal_display_tracks_state() {
    let display = TerminalDisplay::new();
    display.set_start_enabled(false);
    display.set_status(&StatusLine::new("Scan buyer", Severity::Success));

    let snapshot = display.snapshot();
    assert!(!snapshot.start_enabled);
    assert_eq!(snapshot.status.unwrap().text, "Scan buyer");
}
