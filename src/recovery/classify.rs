//! Failure classification for the recovery panel.
//!
//! Edge/proxy timeouts (Cloudflare 52x, gateway 504) and a persistent offline
//! classification get the recovery panel; ordinary application errors do not.

use serde::{Deserialize, Serialize};

use crate::health::types::ProbeError;

/// Status codes returned by the edge proxy when the origin is too slow.
pub const EDGE_TIMEOUT_STATUSES: [u16; 4] = [504, 522, 523, 524];

const EDGE_TIMEOUT_MARKERS: [&str; 4] = ["cloudflare", "gateway", "timed out", "timeout"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The edge proxy gave up waiting for the origin.
    EdgeTimeout,
    /// The connection monitor classified the network as offline.
    Offline,
    /// Anything else; handled by the application's own error paths.
    Application,
}

impl FailureKind {
    pub fn shows_recovery_panel(self) -> bool {
        !matches!(self, FailureKind::Application)
    }
}

/// Classify a failed fetch by its status (if any) and error message.
pub fn classify_failure(status: Option<u16>, message: &str) -> FailureKind {
    if let Some(status) = status {
        if EDGE_TIMEOUT_STATUSES.contains(&status) {
            return FailureKind::EdgeTimeout;
        }
    }

    let message = message.to_ascii_lowercase();
    if EDGE_TIMEOUT_MARKERS.iter().any(|m| message.contains(m)) {
        FailureKind::EdgeTimeout
    } else {
        FailureKind::Application
    }
}

impl From<&ProbeError> for FailureKind {
    fn from(error: &ProbeError) -> Self {
        match error {
            ProbeError::Timeout(_) => FailureKind::EdgeTimeout,
            ProbeError::Status(status) => classify_failure(Some(*status), ""),
            ProbeError::Transport(message) => classify_failure(None, message),
            ProbeError::NotConfigured(_) => FailureKind::Application,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_edge_statuses() {
        for status in EDGE_TIMEOUT_STATUSES {
            assert_eq!(classify_failure(Some(status), ""), FailureKind::EdgeTimeout);
        }
        assert_eq!(classify_failure(Some(500), "Internal error"), FailureKind::Application);
        assert_eq!(classify_failure(Some(404), ""), FailureKind::Application);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            classify_failure(None, "Error 524: A timeout occurred (Cloudflare)"),
            FailureKind::EdgeTimeout
        );
        assert_eq!(classify_failure(None, "operation timed out"), FailureKind::EdgeTimeout);
        assert_eq!(classify_failure(None, "row not found"), FailureKind::Application);
    }

    #[test]
    fn test_from_probe_error() {
        assert_eq!(
            FailureKind::from(&ProbeError::Timeout(Duration::from_secs(15))),
            FailureKind::EdgeTimeout
        );
        assert_eq!(FailureKind::from(&ProbeError::Status(522)), FailureKind::EdgeTimeout);
        assert_eq!(
            FailureKind::from(&ProbeError::NotConfigured("backend.base_url")),
            FailureKind::Application
        );
    }

    #[test]
    fn test_panel_visibility() {
        assert!(FailureKind::EdgeTimeout.shows_recovery_panel());
        assert!(FailureKind::Offline.shows_recovery_panel());
        assert!(!FailureKind::Application.shows_recovery_panel());
    }
}
