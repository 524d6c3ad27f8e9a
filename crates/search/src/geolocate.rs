use foundation::math::GeoCoordinate;
use foundation::time::Time;
use runtime::Frame;

pub const DEFAULT_GEOLOCATION_TIMEOUT_S: f64 = 10.0;

/// Monotonically increasing request identity. Callbacks carrying a stale
/// token are ignored, so a late success can never override an
/// already-applied timeout fallback (or vice versa).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestToken(u64);

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LocationState {
    Idle,
    Pending { token: RequestToken, deadline: Time },
    Available(GeoCoordinate),
    /// Terminal state for denied, unsupported, and timed-out lookups
    /// alike; the caller falls back to manual origin entry.
    Unavailable,
}

/// Races the three geolocation outcomes: success callback, error
/// callback, and a fixed timeout. Whichever settles first wins.
#[derive(Debug, Clone)]
pub struct LocationTracker {
    next_token: u64,
    timeout_s: f64,
    state: LocationState,
}

impl LocationTracker {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_GEOLOCATION_TIMEOUT_S)
    }

    pub fn with_timeout(timeout_s: f64) -> Self {
        Self {
            next_token: 0,
            timeout_s,
            state: LocationState::Idle,
        }
    }

    pub fn state(&self) -> LocationState {
        self.state
    }

    /// Start a lookup; any in-flight request becomes stale.
    pub fn begin(&mut self, frame: Frame) -> RequestToken {
        let token = RequestToken(self.next_token);
        self.next_token += 1;
        self.state = LocationState::Pending {
            token,
            deadline: frame.time.offset(self.timeout_s),
        };
        token
    }

    /// Success callback. Returns whether the fix was applied.
    pub fn resolve_success(&mut self, token: RequestToken, location: GeoCoordinate) -> bool {
        if !self.accepts(token) {
            return false;
        }
        self.state = LocationState::Available(location);
        true
    }

    /// Error callback (denied or unsupported). Returns whether it settled
    /// the request.
    pub fn resolve_error(&mut self, token: RequestToken) -> bool {
        if !self.accepts(token) {
            return false;
        }
        self.state = LocationState::Unavailable;
        true
    }

    /// Fire the timeout if the deadline has passed and nothing else
    /// settled first. Returns whether the request timed out on this tick.
    pub fn tick(&mut self, frame: Frame) -> bool {
        if let LocationState::Pending { deadline, .. } = self.state {
            if frame.time.0 >= deadline.0 {
                self.state = LocationState::Unavailable;
                return true;
            }
        }
        false
    }

    fn accepts(&self, token: RequestToken) -> bool {
        matches!(self.state, LocationState::Pending { token: current, .. } if current == token)
    }
}

impl Default for LocationTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{LocationState, LocationTracker};
    use foundation::math::GeoCoordinate;
    use runtime::Frame;

    #[test]
    fn success_settles_the_request() {
        let mut tracker = LocationTracker::new();
        let token = tracker.begin(Frame::start());
        assert!(tracker.resolve_success(token, GeoCoordinate::new(37.0, -76.3)));
        assert_eq!(
            tracker.state(),
            LocationState::Available(GeoCoordinate::new(37.0, -76.3))
        );
    }

    #[test]
    fn timeout_resolves_to_unavailable_not_pending() {
        let mut tracker = LocationTracker::with_timeout(10.0);
        tracker.begin(Frame::start());

        let mut frame = Frame::start();
        for _ in 0..9 {
            frame = frame.advance(1.0);
            assert!(!tracker.tick(frame));
        }
        frame = frame.advance(1.0);
        assert!(tracker.tick(frame));
        assert_eq!(tracker.state(), LocationState::Unavailable);
    }

    #[test]
    fn late_success_after_timeout_is_ignored() {
        let mut tracker = LocationTracker::with_timeout(1.0);
        let token = tracker.begin(Frame::start());
        let frame = Frame::start().advance(2.0);
        assert!(tracker.tick(frame));

        assert!(!tracker.resolve_success(token, GeoCoordinate::new(0.0, 0.0)));
        assert_eq!(tracker.state(), LocationState::Unavailable);
    }

    #[test]
    fn stale_token_from_previous_request_is_ignored() {
        let mut tracker = LocationTracker::new();
        let first = tracker.begin(Frame::start());
        let _second = tracker.begin(Frame::start());

        assert!(!tracker.resolve_success(first, GeoCoordinate::new(1.0, 1.0)));
        assert!(matches!(tracker.state(), LocationState::Pending { .. }));
    }

    #[test]
    fn error_and_timeout_share_the_terminal_state() {
        let mut denied = LocationTracker::new();
        let token = denied.begin(Frame::start());
        denied.resolve_error(token);

        let mut timed_out = LocationTracker::with_timeout(0.5);
        timed_out.begin(Frame::start());
        timed_out.tick(Frame::start().advance(1.0));

        assert_eq!(denied.state(), timed_out.state());
    }
}
