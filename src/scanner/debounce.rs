use std::time::Duration;
use tokio::time::Instant;

/// Drops re-reads of the last accepted code inside a time window
#[derive(Debug, Clone)]
pub struct DebounceFilter {
    window: Duration,
    last_code: Option<String>,
    last_accepted_at: Option<Instant>,
}

impl DebounceFilter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_code: None,
            last_accepted_at: None,
        }
    }

    /// Decide whether `code` read at `now` should be submitted, recording it if so
    pub fn accept(&mut self, code: &str, now: Instant) -> bool {
        if let (Some(last), Some(at)) = (self.last_code.as_deref(), self.last_accepted_at) {
            if last == code && now.saturating_duration_since(at) < self.window {
                return false;
            }
        }

        self.last_code = Some(code.to_string());
        self.last_accepted_at = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last_code = None;
        self.last_accepted_at = None;
    }

    pub fn last_code(&self) -> Option<&str> {
        self.last_code.as_deref()
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(1500);

    #[test]
    fn test_same_code_inside_window_is_dropped() {
        let mut filter = DebounceFilter::new(WINDOW);
        let t0 = Instant::now();

        assert!(filter.accept("A", t0));
        assert!(!filter.accept("A", t0 + Duration::from_millis(1)));
        assert!(!filter.accept("A", t0 + Duration::from_millis(1499)));
    }

    #[test]
    fn test_same_code_at_window_edge_is_accepted() {
        let mut filter = DebounceFilter::new(WINDOW);
        let t0 = Instant::now();

        assert!(filter.accept("A", t0));
        assert!(filter.accept("A", t0 + WINDOW));
        assert!(!filter.accept("A", t0 + WINDOW + Duration::from_millis(10)));
    }

    #[test]
    fn test_different_codes_always_accepted() {
        let mut filter = DebounceFilter::new(WINDOW);
        let t0 = Instant::now();

        assert!(filter.accept("A", t0));
        assert!(filter.accept("B", t0));
        assert!(filter.accept("A", t0 + Duration::from_millis(1)));
        assert_eq!(filter.last_code(), Some("A"));
    }

    #[test]
    fn test_dropped_read_does_not_extend_window() {
        let mut filter = DebounceFilter::new(WINDOW);
        let t0 = Instant::now();

        assert!(filter.accept("A", t0));
        assert!(!filter.accept("A", t0 + Duration::from_millis(1000)));
        assert!(filter.accept("A", t0 + Duration::from_millis(1600)));
    }

    #[test]
    fn test_reset_forgets_last_code() {
        let mut filter = DebounceFilter::new(WINDOW);
        let t0 = Instant::now();

        assert!(filter.accept("A", t0));
        filter.reset();
        assert_eq!(filter.last_code(), None);
        assert!(filter.accept("A", t0 + Duration::from_millis(10)));
    }
}
