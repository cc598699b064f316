use super::session::{Session, SessionGeneration, SessionToken};
use super::state::ControllerState;
use super::stats::ScanStats;
use crate::camera::{CameraSource, StreamRequest};
use crate::config::ScanLoopConfig;
use crate::detector::{BarcodeDetector, BarcodeFormat};
use crate::display::{ControlState, ScanDisplay};
use crate::error::{CameraError, Result, ScanLoopError};
use crate::events::{EventBus, ScanEvent};
use crate::remote::{RemoteStateUpdater, SubmitOutcome};

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

pub const UNSUPPORTED_MESSAGE: &str = "Barcode scanning not supported on this system.";
pub const DETECTOR_INIT_FAILED_MESSAGE: &str = "Error initializing barcode scanner.";

const POLL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Camera error text shown to the operator
pub fn camera_error_message(error: &CameraError) -> String {
    format!(
        "Error accessing camera: {}. Ensure permission is granted.",
        error.kind()
    )
}

/// Why a tick did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    DetectorUnavailable,
    NoStream,
    NotReady,
    Busy,
    /// The session ended while the detector was running
    SessionEnded,
}

/// Result of one detection tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Skipped(SkipReason),
    NoCode,
    DetectionFailed,
    Debounced { code: String },
    Submitted { code: String, outcome: SubmitOutcome },
}

pub(super) struct ControllerSettings {
    pub poll_interval: Duration,
    pub debounce_window: Duration,
    pub request: StreamRequest,
    pub formats: Vec<BarcodeFormat>,
}

impl ControllerSettings {
    pub fn from_config(config: &ScanLoopConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.scanner.poll_interval_ms),
            debounce_window: Duration::from_millis(config.scanner.debounce_ms),
            request: StreamRequest {
                facing: config.camera.facing,
                resolution: config.camera.resolution,
                fps: config.camera.fps,
            },
            formats: config.scanner.formats.clone(),
        }
    }
}

struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub(super) struct ControllerInner {
    settings: ControllerSettings,
    camera: Arc<dyn CameraSource>,
    detector: Option<Arc<dyn BarcodeDetector>>,
    updater: RemoteStateUpdater,
    display: Arc<dyn ScanDisplay>,
    event_bus: Arc<EventBus>,
    detector_ready: AtomicBool,
    detecting: AtomicBool,
    /// Held by `stop` for its whole teardown and by `start` around its state changes
    lifecycle: tokio::sync::Mutex<()>,
    state: Mutex<ControllerState>,
    session: Mutex<Session>,
    generation: SessionGeneration,
    poll: Mutex<Option<PollTask>>,
    stats: Mutex<ScanStats>,
}

/// Resets the in-flight flag when a detection attempt ends, however it ends
struct DetectionGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> DetectionGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for DetectionGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Owns the camera session and drives detection ticks
///
/// Lifecycle is `new → initialize → start → stop → dispose`; `start` and
/// `stop` may alternate any number of times.
pub struct ScanLoopController {
    inner: Arc<ControllerInner>,
}

impl ScanLoopController {
    pub(super) fn new(
        settings: ControllerSettings,
        camera: Arc<dyn CameraSource>,
        detector: Option<Arc<dyn BarcodeDetector>>,
        updater: RemoteStateUpdater,
        display: Arc<dyn ScanDisplay>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let session = Session::new(settings.debounce_window);
        Self {
            inner: Arc::new(ControllerInner {
                settings,
                camera,
                detector,
                updater,
                display,
                event_bus,
                detector_ready: AtomicBool::new(false),
                detecting: AtomicBool::new(false),
                lifecycle: tokio::sync::Mutex::new(()),
                state: Mutex::new(ControllerState::Idle),
                session: Mutex::new(session),
                generation: SessionGeneration::new(),
                poll: Mutex::new(None),
                stats: Mutex::new(ScanStats::default()),
            }),
        }
    }

    /// Probe the detector once and enable or disable the start control
    ///
    /// Returns whether barcode scanning is available.
    pub async fn initialize(&self) -> bool {
        let inner = &self.inner;
        inner.display.set_controls(ControlState::Inactive);

        let Some(detector) = inner.detector.as_ref() else {
            warn!("No barcode detector available, scanning disabled");
            inner.display.set_camera_error(UNSUPPORTED_MESSAGE);
            inner.display.set_start_enabled(false);
            return false;
        };

        match detector.supported_formats().await {
            Ok(supported) => {
                let names: Vec<&str> = supported.iter().map(|f| f.as_str()).collect();
                info!("Supported barcode formats: {:?}", names);

                for format in &inner.settings.formats {
                    if !supported.contains(format) {
                        warn!("Configured barcode format {} is not supported by the detector", format);
                    }
                }

                inner.detector_ready.store(true, Ordering::SeqCst);
                inner.display.clear_camera_error();
                inner.display.set_start_enabled(true);
                true
            }
            Err(e) => {
                error!("Error initializing barcode detector: {}", e);
                inner.display.set_camera_error(DETECTOR_INIT_FAILED_MESSAGE);
                inner.display.set_start_enabled(false);
                false
            }
        }
    }

    /// Acquire the camera and begin polling
    pub async fn start(&self) -> Result<()> {
        let inner = &self.inner;

        if !inner.detector_ready.load(Ordering::SeqCst) {
            return Err(ScanLoopError::unsupported(UNSUPPORTED_MESSAGE));
        }

        // Waits out a stop that is still tearing down
        let token = {
            let _lifecycle = inner.lifecycle.lock().await;
            let mut state = inner.state.lock();
            if state.is_running() {
                debug!("Camera already {}, ignoring start", *state);
                return Ok(());
            }
            *state = ControllerState::Starting;
            inner.generation.token()
        };

        info!("Starting camera");
        inner.display.clear_camera_error();

        let mut stream = match inner.camera.open(&inner.settings.request).await {
            Ok(stream) => stream,
            Err(e) => {
                error!("Error accessing camera: {}", e);
                inner
                    .display
                    .set_camera_error(&camera_error_message(&e));
                inner.publish(ScanEvent::CameraFailed {
                    error: e.to_string(),
                    timestamp: SystemTime::now(),
                });
                if token.is_current() {
                    self.stop().await;
                }
                return Err(e.into());
            }
        };

        let label = stream.label();
        let _lifecycle = inner.lifecycle.lock().await;
        if !token.is_current() {
            info!("Camera stopped while starting, releasing {}", label);
            stream.stop_tracks();
            return Ok(());
        }

        let session_id = inner.session.lock().begin(stream);
        inner.display.attach_preview(&label);
        inner.display.set_controls(ControlState::Active);
        *inner.state.lock() = ControllerState::Active;

        inner.stats.lock().record_session();
        let poll = ControllerInner::spawn_poll_loop(Arc::clone(inner), token);
        if let Some(previous) = inner.poll.lock().replace(poll) {
            previous.cancel.cancel();
        }

        info!("Camera started on {} (session {})", label, session_id);
        inner.publish(ScanEvent::CameraStarted {
            session_id: session_id.to_string(),
            stream: label,
            timestamp: SystemTime::now(),
        });

        Ok(())
    }

    /// Cancel polling and release the camera; safe to call at any time
    pub async fn stop(&self) {
        let inner = &self.inner;
        let _lifecycle = inner.lifecycle.lock().await;

        let previous = {
            let mut state = inner.state.lock();
            let previous = *state;
            if previous != ControllerState::Idle {
                *state = ControllerState::Stopping;
            }
            previous
        };

        inner.generation.advance();

        let poll = inner.poll.lock().take();
        if let Some(poll) = poll {
            poll.cancel.cancel();
            let abort = poll.handle.abort_handle();
            match tokio::time::timeout(POLL_SHUTDOWN_TIMEOUT, poll.handle).await {
                Ok(Ok(())) => debug!("Poll loop finished"),
                Ok(Err(e)) => warn!("Poll loop ended abnormally: {}", e),
                Err(_) => {
                    warn!("Poll loop did not stop in time, aborting");
                    abort.abort();
                }
            }
        }

        let ended = inner.session.lock().end();
        inner.detecting.store(false, Ordering::SeqCst);
        if let Some(code) = inner.updater.cancel_pending() {
            debug!("Submission of {} abandoned by stop", code);
        }

        inner.display.detach_preview();
        inner.display.set_controls(ControlState::Inactive);

        *inner.state.lock() = ControllerState::Idle;

        if previous != ControllerState::Idle || ended.is_some() {
            info!("Camera stopped");
            inner.publish(ScanEvent::CameraStopped {
                session_id: ended.map(|id| id.to_string()),
                timestamp: SystemTime::now(),
            });
        }
    }

    /// Run one detection tick immediately
    pub async fn tick(&self) -> TickOutcome {
        self.inner.tick().await
    }

    /// Stop and consume the controller
    pub async fn dispose(self) {
        self.stop().await;
        debug!("Scan loop controller disposed");
    }

    pub fn state(&self) -> ControllerState {
        *self.inner.state.lock()
    }

    pub fn is_camera_active(&self) -> bool {
        self.state() == ControllerState::Active && self.inner.session.lock().has_stream()
    }

    pub fn is_detector_ready(&self) -> bool {
        self.inner.detector_ready.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> ScanStats {
        self.inner.stats.lock().clone()
    }

    /// Snapshot of the current session generation
    pub fn session_token(&self) -> SessionToken {
        self.inner.generation.token()
    }
}

impl ControllerInner {
    fn spawn_poll_loop(inner: Arc<Self>, token: SessionToken) -> PollTask {
        let cancel = CancellationToken::new();
        let cancelled = cancel.clone();
        let period = inner.settings.poll_interval;

        let handle = tokio::spawn(async move {
            debug!("Poll loop started ({:?} period)", period);
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = interval.tick() => {}
                }

                if !token.is_current() {
                    break;
                }

                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    outcome = inner.tick() => trace!("Tick outcome: {:?}", outcome),
                }
            }

            debug!("Poll loop ended");
        });

        PollTask { cancel, handle }
    }

    fn ready_detector(&self) -> Option<Arc<dyn BarcodeDetector>> {
        if self.detector_ready.load(Ordering::SeqCst) {
            self.detector.clone()
        } else {
            None
        }
    }

    fn skip(&self, reason: SkipReason) -> TickOutcome {
        self.stats.lock().record_skip();
        TickOutcome::Skipped(reason)
    }

    async fn tick(&self) -> TickOutcome {
        self.stats.lock().record_tick();

        let Some(detector) = self.ready_detector() else {
            return self.skip(SkipReason::DetectorUnavailable);
        };

        let readiness = {
            let session = self.session.lock();
            match session.stream.as_ref() {
                None => Err(SkipReason::NoStream),
                Some(stream) if !stream.has_enough_data() => Err(SkipReason::NotReady),
                Some(_) => Ok(()),
            }
        };
        if let Err(reason) = readiness {
            return self.skip(reason);
        }

        let Some(_guard) = DetectionGuard::acquire(&self.detecting) else {
            return self.skip(SkipReason::Busy);
        };

        let token = self.generation.token();
        let frame = self
            .session
            .lock()
            .stream
            .as_ref()
            .and_then(|stream| stream.current_frame());
        let Some(frame) = frame else {
            return self.skip(SkipReason::NotReady);
        };

        let detected = match detector.detect(&frame).await {
            Ok(detected) => detected,
            Err(e) => {
                warn!("Barcode detection error: {}", e);
                self.stats.lock().record_detection_failure();
                return TickOutcome::DetectionFailed;
            }
        };

        let Some(first) = detected.into_iter().next() else {
            return TickOutcome::NoCode;
        };
        let code = first.raw_value;
        self.stats.lock().record_detected();

        if !token.is_current() {
            return self.skip(SkipReason::SessionEnded);
        }

        let accepted = self.session.lock().debounce.accept(&code, Instant::now());
        if !accepted {
            debug!("Ignoring repeated code {} inside debounce window", code);
            self.stats.lock().record_debounced();
            self.publish(ScanEvent::CodeDebounced {
                code: code.clone(),
                timestamp: SystemTime::now(),
            });
            return TickOutcome::Debounced { code };
        }

        info!("Barcode detected: {} ({})", code, first.format);
        self.stats.lock().record_submitted();
        self.publish(ScanEvent::CodeAccepted {
            code: code.clone(),
            timestamp: SystemTime::now(),
        });

        let outcome = self.updater.submit(&code, &token).await;
        match &outcome {
            SubmitOutcome::Rendered { success } => {
                self.publish(ScanEvent::SubmissionCompleted {
                    code: code.clone(),
                    success: *success,
                });
            }
            SubmitOutcome::Failed { error } => {
                self.stats.lock().record_submit_failure();
                self.publish(ScanEvent::SubmissionFailed {
                    code: code.clone(),
                    error: error.clone(),
                });
            }
            SubmitOutcome::Stale => debug!("Submission of {} outlived its session", code),
        }

        TickOutcome::Submitted { code, outcome }
    }

    fn publish(&self, event: ScanEvent) {
        if let Err(e) = self.event_bus.publish(event) {
            trace!("Scan event not delivered: {}", e);
        }
    }
}
