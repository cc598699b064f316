use super::debounce::DebounceFilter;
use crate::camera::VideoStream;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Monotonic counter bumped every time a camera session ends
#[derive(Debug, Clone, Default)]
pub struct SessionGeneration {
    current: Arc<AtomicU64>,
}

impl SessionGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current generation
    pub fn token(&self) -> SessionToken {
        SessionToken {
            generation: self.current.load(Ordering::SeqCst),
            current: Arc::clone(&self.current),
        }
    }

    /// Invalidate every outstanding token
    pub fn advance(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}

/// Proof that work was started in a particular session
#[derive(Debug, Clone)]
pub struct SessionToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl SessionToken {
    /// True until the session this token was taken in ends
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Everything owned by one camera session
pub struct Session {
    pub stream: Option<Box<dyn VideoStream>>,
    pub debounce: DebounceFilter,
    pub session_id: Option<Uuid>,
}

impl Session {
    pub fn new(debounce_window: Duration) -> Self {
        Self {
            stream: None,
            debounce: DebounceFilter::new(debounce_window),
            session_id: None,
        }
    }

    /// Bind a freshly opened stream and start from empty debounce memory
    pub fn begin(&mut self, stream: Box<dyn VideoStream>) -> Uuid {
        let id = Uuid::new_v4();
        self.stream = Some(stream);
        self.debounce.reset();
        self.session_id = Some(id);
        id
    }

    /// Release the stream and forget the session; returns the ended session id
    pub fn end(&mut self) -> Option<Uuid> {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_tracks();
        }
        self.debounce.reset();
        self.session_id.take()
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{CameraSource, MockCamera, StreamRequest};
    use crate::config::FacingMode;

    #[test]
    fn test_token_expires_on_advance() {
        let generation = SessionGeneration::new();
        let token = generation.token();
        assert!(token.is_current());

        assert_eq!(generation.advance(), 1);
        assert!(!token.is_current());
        assert!(generation.token().is_current());
        assert_eq!(generation.current(), 1);
    }

    #[tokio::test]
    async fn test_session_end_releases_stream_once() {
        let (camera, handle) = MockCamera::new();
        let stream = camera
            .open(&StreamRequest {
                facing: FacingMode::Environment,
                resolution: (640, 480),
                fps: 30,
            })
            .await
            .unwrap();

        let mut session = Session::new(Duration::from_millis(1500));
        let id = session.begin(stream);
        assert!(session.has_stream());

        assert_eq!(session.end(), Some(id));
        assert_eq!(session.end(), None);
        assert!(!session.has_stream());
        assert_eq!(handle.tracks_stopped(), 1);
    }
}
