//! Connection state machine.
//!
//! # States
//! - Online: probes and host signals agree the network is usable
//! - Offline: enough consecutive probe failures, or the host said so
//!
//! # State Transitions
//! ```text
//! Online → Offline: consecutive failures >= failure_threshold
//! Online → Offline: host offline event (immediate, counter untouched)
//! Offline → Online: a single successful probe, or a host online event
//! ```
//!
//! # Design Decisions
//! - Hysteresis: slow to declare offline, quick to recover
//! - Every input returns the notification to deliver (if any), so callers
//!   never notify on a non-transition
//! - Repeating an input that does not change state is a no-op

use serde::Serialize;

/// Classified connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Online,
    Offline,
}

impl ConnectionState {
    pub fn is_online(self) -> bool {
        self == ConnectionState::Online
    }
}

impl From<bool> for ConnectionState {
    fn from(online: bool) -> Self {
        if online {
            ConnectionState::Online
        } else {
            ConnectionState::Offline
        }
    }
}

/// Failure counter and online/offline classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    state: ConnectionState,
    consecutive_failures: u32,
    failure_threshold: u32,
}

impl Classifier {
    /// Create a classifier starting in the host-reported state.
    pub fn new(initially_online: bool, failure_threshold: u32) -> Self {
        Self {
            state: initially_online.into(),
            consecutive_failures: 0,
            failure_threshold: failure_threshold.max(1),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_online(&self) -> bool {
        self.state.is_online()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    /// A probe succeeded. Returns `Some(true)` when this recovers from offline.
    pub fn record_success(&mut self) -> Option<bool> {
        self.consecutive_failures = 0;
        self.transition(ConnectionState::Online)
    }

    /// A probe failed. Returns `Some(false)` only when the threshold is crossed
    /// while online.
    pub fn record_failure(&mut self) -> Option<bool> {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);

        if self.consecutive_failures >= self.failure_threshold {
            self.transition(ConnectionState::Offline)
        } else {
            None
        }
    }

    /// The host reported that the network came back.
    pub fn host_online(&mut self) -> Option<bool> {
        self.consecutive_failures = 0;
        self.transition(ConnectionState::Online)
    }

    /// The host reported that the network went away. Bypasses the threshold;
    /// the probe failure counter is left as is.
    pub fn host_offline(&mut self) -> Option<bool> {
        self.transition(ConnectionState::Offline)
    }

    fn transition(&mut self, next: ConnectionState) -> Option<bool> {
        if self.state == next {
            return None;
        }

        tracing::info!(
            from = ?self.state,
            to = ?next,
            consecutive_failures = self.consecutive_failures,
            "Connection state changed"
        );
        self.state = next;
        Some(next.is_online())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_mirrors_host() {
        assert!(Classifier::new(true, 3).is_online());
        assert!(!Classifier::new(false, 3).is_online());
    }

    #[test]
    fn test_three_failures_then_success() {
        let mut c = Classifier::new(true, 3);

        let observed = vec![
            c.record_failure(),
            c.record_failure(),
            c.record_failure(),
            c.record_success(),
        ];

        assert_eq!(observed, vec![None, None, Some(false), Some(true)]);
        assert_eq!(c.consecutive_failures(), 0);
    }

    #[test]
    fn test_single_offline_notification_while_failing() {
        let mut c = Classifier::new(true, 3);

        let notifications: Vec<bool> = (0..10).filter_map(|_| c.record_failure()).collect();

        assert_eq!(notifications, vec![false]);
        assert_eq!(c.consecutive_failures(), 10);
        assert_eq!(c.state(), ConnectionState::Offline);
    }

    #[test]
    fn test_success_below_threshold_resets_silently() {
        for failures in 1..3 {
            let mut c = Classifier::new(true, 3);
            for _ in 0..failures {
                assert_eq!(c.record_failure(), None);
            }
            assert_eq!(c.record_success(), None);
            assert_eq!(c.consecutive_failures(), 0);
            assert!(c.is_online());
        }
    }

    #[test]
    fn test_host_offline_bypasses_threshold() {
        let mut c = Classifier::new(true, 3);
        c.record_failure();

        assert_eq!(c.host_offline(), Some(false));
        assert_eq!(c.consecutive_failures(), 1);

        // Already offline: repeated event is idempotent
        assert_eq!(c.host_offline(), None);
    }

    #[test]
    fn test_host_online_resets_counter() {
        let mut c = Classifier::new(true, 3);
        for _ in 0..4 {
            c.record_failure();
        }

        assert_eq!(c.host_online(), Some(true));
        assert_eq!(c.consecutive_failures(), 0);
        assert_eq!(c.host_online(), None);
    }

    #[test]
    fn test_failures_after_host_offline_do_not_renotify() {
        let mut c = Classifier::new(true, 3);
        c.host_offline();

        for _ in 0..5 {
            assert_eq!(c.record_failure(), None);
        }
        assert_eq!(c.record_success(), Some(true));
    }

    #[test]
    fn test_zero_threshold_is_clamped() {
        let mut c = Classifier::new(true, 0);
        assert_eq!(c.failure_threshold(), 1);
        assert_eq!(c.record_failure(), Some(false));
    }
}
