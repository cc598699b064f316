use super::*;
use crate::camera::{MockCamera, MockCameraHandle};
use crate::config::{CameraBackend, ScanLoopConfig};
use crate::detector::ScriptedDetector;
use crate::display::MemoryDisplay;
use crate::events::{EventBus, ScanEvent};
use crate::remote::MockScanClient;
use crate::scanner::ScanLoopControllerBuilder;
use std::sync::Arc;
use std::time::SystemTime;

fn create_test_config() -> ScanLoopConfig {
    let mut config = ScanLoopConfig::default();
    config.scanner.poll_interval_ms = 3_600_000;
    config
}

fn create_test_app() -> (ScanLoopApp, MockCameraHandle, Arc<MemoryDisplay>) {
    let config = create_test_config();
    let (camera, camera_handle) = MockCamera::new();
    let display = Arc::new(MemoryDisplay::new());
    let event_bus = Arc::new(EventBus::new(config.system.event_bus_capacity));

    let controller = ScanLoopControllerBuilder::new()
        .config(config.clone())
        .camera(Arc::new(camera))
        .detector(Arc::new(ScriptedDetector::new()))
        .client(Arc::new(MockScanClient::new()))
        .display(display.clone())
        .event_bus(Arc::clone(&event_bus))
        .build()
        .unwrap();

    (
        ScanLoopApp::with_controller(config, controller, event_bus),
        camera_handle,
        display,
    )
}

#[tokio::test]
async fn test_initialize_registers_components() {
    let (mut app, _camera, display) = create_test_app();

    app.initialize().await.unwrap();

    assert_eq!(
        app.get_component_state("scanner").await,
        Some(ComponentState::Stopped)
    );
    assert_eq!(app.get_component_state("keyboard").await, None);
    assert!(app.controller().is_detector_ready());
    assert!(display.snapshot().start_enabled);
}

#[tokio::test]
async fn test_autostart_and_shutdown() {
    let (mut app, camera, _display) = create_test_app();
    app.set_autostart(true);

    app.initialize().await.unwrap();
    app.start().await.unwrap();

    assert!(app.controller().is_camera_active());
    assert_eq!(
        app.get_component_state("scanner").await,
        Some(ComponentState::Running)
    );

    assert_eq!(app.shutdown().await.unwrap(), 0);
    assert!(!app.controller().is_camera_active());
    assert_eq!(camera.tracks_stopped(), 1);
    assert_eq!(
        app.get_component_state("scanner").await,
        Some(ComponentState::Stopped)
    );
}

#[tokio::test]
async fn test_autostart_camera_failure_is_not_fatal() {
    let (mut app, camera, display) = create_test_app();
    app.set_autostart(true);
    camera.fail_next_open(crate::error::CameraError::DeviceNotFound {
        device: "/dev/video0".to_string(),
    });

    app.initialize().await.unwrap();
    app.start().await.unwrap();

    assert_eq!(
        app.get_component_state("scanner").await,
        Some(ComponentState::Failed)
    );
    assert!(display
        .snapshot()
        .camera_error
        .starts_with("Error accessing camera: device not found"));
}

#[tokio::test]
async fn test_run_routes_operator_commands() {
    let (mut app, camera, _display) = create_test_app();
    app.initialize().await.unwrap();
    app.start().await.unwrap();

    let event_bus = app.event_bus();
    let controller = app.controller();
    let running = tokio::spawn(async move { app.run().await });

    while event_bus.subscriber_count() == 0 {
        tokio::task::yield_now().await;
    }

    event_bus
        .publish(ScanEvent::StartRequested {
            timestamp: SystemTime::now(),
        })
        .unwrap();
    while !controller.is_camera_active() {
        tokio::task::yield_now().await;
    }

    event_bus
        .publish(ScanEvent::ShutdownRequested {
            timestamp: SystemTime::now(),
            reason: "test".to_string(),
        })
        .unwrap();

    assert_eq!(running.await.unwrap().unwrap(), 0);
    assert!(!controller.is_camera_active());
    assert_eq!(camera.tracks_stopped(), 1);
}

#[tokio::test]
async fn test_run_twice_fails() {
    let (mut app, _camera, _display) = create_test_app();
    app.shutdown_sender.take();

    assert!(app.run().await.is_err());
}

#[tokio::test]
async fn test_new_with_missing_still_image_fails() {
    let mut config = ScanLoopConfig::default();
    config.camera.backend = CameraBackend::Still;
    config.camera.still_image = None;

    assert!(ScanLoopApp::new(config).await.is_err());
}

#[tokio::test]
async fn test_new_without_decodable_format_reports_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blank.png");
    image::GrayImage::from_pixel(8, 8, image::Luma([255]))
        .save(&path)
        .unwrap();

    let mut config = ScanLoopConfig::default();
    config.camera.backend = CameraBackend::Still;
    config.camera.still_image = Some(path.to_string_lossy().into_owned());
    config.scanner.formats = vec![crate::detector::BarcodeFormat::Pdf417];

    let mut app = ScanLoopApp::new(config).await.unwrap();
    app.initialize().await.unwrap();

    assert!(!app.controller().is_detector_ready());
    assert!(app.controller().start().await.is_err());
}
