//! Owns the currently displayed recovery session, if any.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::health::listeners::Subscription;
use crate::health::monitor::ConnectionMonitor;
use crate::health::prober::Prober;
use crate::recovery::classify::FailureKind;
use crate::recovery::reload::Reloader;
use crate::recovery::session::RetrySession;

pub struct RecoveryCoordinator {
    budget: u32,
    reloader: Arc<dyn Reloader>,
    current: Mutex<Option<Arc<RetrySession>>>,
}

impl RecoveryCoordinator {
    pub fn new(budget: u32, reloader: Arc<dyn Reloader>) -> Self {
        Self {
            budget,
            reloader,
            current: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<RetrySession>>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Show the recovery panel for `kind`. An already open session is kept;
    /// kinds that do not warrant the panel return `None`.
    pub fn open(&self, kind: FailureKind) -> Option<Arc<RetrySession>> {
        if !kind.shows_recovery_panel() {
            return None;
        }
        let mut slot = self.slot();
        let session = slot
            .get_or_insert_with(|| Arc::new(RetrySession::new(kind, self.budget, self.reloader.clone())))
            .clone();
        Some(session)
    }

    pub fn current(&self) -> Option<Arc<RetrySession>> {
        self.slot().clone()
    }

    /// Recovery succeeded; dismiss the panel.
    pub fn close(&self) {
        if let Some(session) = self.slot().take() {
            tracing::info!(attempts = session.retry_count(), "Recovery session closed");
        }
    }

    /// Remove the session so the caller can consume it (e.g. to escalate).
    pub fn take(&self) -> Option<Arc<RetrySession>> {
        self.slot().take()
    }

    /// Open a session when the monitor goes offline and close it when it
    /// comes back.
    pub fn follow<P: Prober>(self: &Arc<Self>, monitor: &ConnectionMonitor<P>) -> Subscription {
        let coordinator = self.clone();
        monitor.subscribe(move |online| {
            if online {
                coordinator.close();
            } else {
                coordinator.open(FailureKind::Offline);
            }
        })
    }
}

impl std::fmt::Debug for RecoveryCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryCoordinator")
            .field("budget", &self.budget)
            .field("current", &self.slot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::monitor::MonitorSettings;
    use crate::host::HostSignals;
    use crate::recovery::reload::ChannelReloader;

    struct NullProber;

    impl Prober for NullProber {
        async fn probe_generic(&self) -> crate::health::ProbeResult {
            Ok(())
        }

        async fn probe_backend(&self) -> crate::health::ProbeResult {
            Ok(())
        }
    }

    fn coordinator() -> Arc<RecoveryCoordinator> {
        let (reloader, _rx) = ChannelReloader::new();
        Arc::new(RecoveryCoordinator::new(5, Arc::new(reloader)))
    }

    #[test]
    fn test_open_keeps_existing_session() {
        let coordinator = coordinator();

        let first = coordinator.open(FailureKind::EdgeTimeout).unwrap();
        let second = coordinator.open(FailureKind::Offline).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.kind(), FailureKind::EdgeTimeout);
    }

    #[test]
    fn test_application_errors_get_no_panel() {
        let coordinator = coordinator();
        assert!(coordinator.open(FailureKind::Application).is_none());
        assert!(coordinator.current().is_none());
    }

    #[test]
    fn test_follows_monitor_transitions() {
        let coordinator = coordinator();
        let host = Arc::new(HostSignals::new(true));
        let monitor = ConnectionMonitor::with_host(NullProber, MonitorSettings::default(), host.clone());
        let _sub = coordinator.follow(&monitor);

        host.report(false);
        assert_eq!(coordinator.current().unwrap().kind(), FailureKind::Offline);

        host.report(true);
        assert!(coordinator.current().is_none());
    }

    #[test]
    fn test_take_empties_slot() {
        let coordinator = coordinator();
        coordinator.open(FailureKind::EdgeTimeout);

        assert!(coordinator.take().is_some());
        assert!(coordinator.take().is_none());
    }
}
