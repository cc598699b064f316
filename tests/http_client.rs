use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use image::{GrayImage, Luma};
use parking_lot::Mutex;
use scanloop::camera::StillImageCamera;
use scanloop::config::{CameraBackend, ScanLoopConfig};
use scanloop::detector::ImageBarcodeDetector;
use scanloop::display::{MemoryDisplay, Severity};
use scanloop::error::SubmitError;
use scanloop::remote::{HttpScanClient, ScanClient, SubmitOutcome};
use scanloop::scanner::{ScanLoopControllerBuilder, TickOutcome};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

type Seen = Arc<Mutex<Vec<Value>>>;

async fn process_scan(State(seen): State<Seen>, Json(body): Json<Value>) -> Response {
    seen.lock().push(body.clone());

    match body["barcode"].as_str().unwrap_or_default() {
        "EXPLODE" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        "GARBLED" => (StatusCode::OK, "<html>not json</html>").into_response(),
        "UNKNOWN" => Json(json!({
            "status": "error",
            "message": "Not found"
        }))
        .into_response(),
        code => Json(json!({
            "status": "success",
            "message": format!("Added {}", code),
            "state": {
                "buyer_name": "Jane",
                "item_name": "Widget",
                "accumulated_price": 12.5
            }
        }))
        .into_response(),
    }
}

/// Start a fake point-of-sale server and return its base URL
async fn spawn_server() -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/scan/process_scan", post(process_scan))
        .with_state(Arc::clone(&seen));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), seen)
}

fn client_for(base_url: &str) -> HttpScanClient {
    let mut config = ScanLoopConfig::default();
    config.server.base_url = base_url.to_string();
    HttpScanClient::from_config(&config).unwrap()
}

#[tokio::test]
async fn test_posts_barcode_as_json() {
    let (base_url, seen) = spawn_server().await;
    let client = client_for(&base_url);

    let response = client.process_scan("ITEM-1").await.unwrap();

    assert!(response.is_success());
    assert_eq!(response.message.as_deref(), Some("Added ITEM-1"));
    let state = response.state.unwrap();
    assert_eq!(state.buyer_name.as_deref(), Some("Jane"));
    assert_eq!(state.accumulated_price, Some(12.5));
    assert_eq!(seen.lock().as_slice(), &[json!({ "barcode": "ITEM-1" })]);
}

#[tokio::test]
async fn test_error_status_without_state() {
    let (base_url, _seen) = spawn_server().await;
    let client = client_for(&base_url);

    let response = client.process_scan("UNKNOWN").await.unwrap();

    assert!(!response.is_success());
    assert!(response.state.is_none());
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let (base_url, _seen) = spawn_server().await;
    let client = client_for(&base_url);

    let error = client.process_scan("EXPLODE").await.unwrap_err();

    assert!(matches!(error, SubmitError::Status { status: 500, .. }));
    assert_eq!(error.to_string(), "Server error: 500 Internal Server Error");
}

#[tokio::test]
async fn test_undecodable_body_is_an_error() {
    let (base_url, _seen) = spawn_server().await;
    let client = client_for(&base_url);

    let error = client.process_scan("GARBLED").await.unwrap_err();

    assert!(matches!(error, SubmitError::Decode { .. }));
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpScanClient::new(
        format!("http://{}/scan/process_scan", addr),
        Duration::from_secs(2),
    )
    .unwrap();

    let error = client.process_scan("ITEM-2").await.unwrap_err();
    assert!(matches!(error, SubmitError::Network(_)));
}

fn write_qr_image(content: &str, path: &std::path::Path) {
    const MODULE_PX: u32 = 8;
    const QUIET_ZONE: u32 = 4;

    let code = qrencode::QrCode::new(content.as_bytes()).unwrap();
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let size = (modules + QUIET_ZONE * 2) * MODULE_PX;

    GrayImage::from_fn(size, size, |x, y| {
        let mx = (x / MODULE_PX) as i64 - QUIET_ZONE as i64;
        let my = (y / MODULE_PX) as i64 - QUIET_ZONE as i64;
        let inside = mx >= 0 && my >= 0 && mx < modules as i64 && my < modules as i64;
        if inside && colors[(my as u32 * modules + mx as u32) as usize] == qrencode::Color::Dark {
            Luma([0])
        } else {
            Luma([255])
        }
    })
    .save(path)
    .unwrap();
}

#[tokio::test]
async fn test_still_image_scan_reaches_server() {
    let (base_url, seen) = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("label.png");
    write_qr_image("SKU-4711", &path);

    let mut config = ScanLoopConfig::default();
    config.camera.backend = CameraBackend::Still;
    config.camera.still_image = Some(path.to_string_lossy().into_owned());
    config.scanner.poll_interval_ms = 3_600_000;
    config.server.base_url = base_url;

    let display = Arc::new(MemoryDisplay::new());
    let controller = ScanLoopControllerBuilder::new()
        .config(config.clone())
        .camera(Arc::new(StillImageCamera::new(&path)))
        .detector(Arc::new(ImageBarcodeDetector::new(&config.scanner.formats).unwrap()))
        .client(Arc::new(HttpScanClient::from_config(&config).unwrap()))
        .display(display.clone())
        .build()
        .unwrap();

    assert!(controller.initialize().await);
    controller.start().await.unwrap();

    assert_eq!(
        controller.tick().await,
        TickOutcome::Submitted {
            code: "SKU-4711".to_string(),
            outcome: SubmitOutcome::Rendered { success: true },
        }
    );
    // Same label still in view
    assert!(matches!(
        controller.tick().await,
        TickOutcome::Debounced { .. }
    ));

    let snapshot = display.snapshot();
    let status = snapshot.status.unwrap();
    assert_eq!(status.text, "Added SKU-4711");
    assert_eq!(status.severity, Severity::Success);
    assert_eq!(snapshot.fields.buyer, "Jane");
    assert_eq!(snapshot.fields.item, "Widget");
    assert_eq!(snapshot.fields.price, "12.50");
    assert_eq!(seen.lock().len(), 1);

    controller.dispose().await;
}
