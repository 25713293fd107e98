//! Retry session behind the recovery panel.
//!
//! # Responsibilities
//! - Run the caller's recovery action on request, one at a time
//! - Count attempts against an informational budget
//! - Escalate to a full reload on request
//!
//! # Design Decisions
//! - The budget is advisory: retries past it are allowed, the panel just
//!   starts suggesting a reload
//! - Recovery action errors and panics are logged and reported as a failed
//!   attempt, never propagated
//! - `is_retrying` is cleared by a drop guard, so a cancelled or panicking
//!   action cannot wedge the session

use std::fmt::Display;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use futures_util::FutureExt;
use serde::Serialize;

use crate::observability::metrics;
use crate::recovery::classify::FailureKind;
use crate::recovery::reload::Reloader;

/// Checklist shown when the user expands troubleshooting.
pub const TROUBLESHOOTING_STEPS: [&str; 5] = [
    "Check that your device is connected to the internet",
    "Disable VPNs or proxies that may block the site",
    "Wait a minute and retry; the service may be under heavy load",
    "Clear the browser cache and reload the page",
    "If the problem persists, contact support with the time of the error",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "error", rename_all = "snake_case")]
pub enum RetryOutcome {
    /// Another retry was still running; nothing was done.
    AlreadyRetrying,
    /// The recovery action succeeded.
    Recovered,
    /// The recovery action failed with the given message.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetryProgress {
    pub attempts: u32,
    pub budget: u32,
    pub suggest_reload: bool,
}

/// Serializable view of the recovery panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoveryPanel {
    pub kind: FailureKind,
    pub progress: RetryProgress,
    pub is_retrying: bool,
    pub troubleshooting_visible: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub troubleshooting_steps: Vec<&'static str>,
}

pub struct RetrySession {
    kind: FailureKind,
    budget: u32,
    retry_count: AtomicU32,
    is_retrying: AtomicBool,
    troubleshooting_visible: AtomicBool,
    reloader: Arc<dyn Reloader>,
}

struct RetryingGuard<'a>(&'a AtomicBool);

impl Drop for RetryingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl RetrySession {
    pub fn new(kind: FailureKind, budget: u32, reloader: Arc<dyn Reloader>) -> Self {
        tracing::info!(?kind, budget, "Recovery session opened");
        Self {
            kind,
            budget,
            retry_count: AtomicU32::new(0),
            is_retrying: AtomicBool::new(false),
            troubleshooting_visible: AtomicBool::new(false),
            reloader,
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count.load(Ordering::SeqCst)
    }

    pub fn is_retrying(&self) -> bool {
        self.is_retrying.load(Ordering::SeqCst)
    }

    /// Run `action` as one retry attempt, unless one is already running.
    pub async fn retry<F, Fut, E>(&self, action: F) -> RetryOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        if self
            .is_retrying
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Retry ignored: previous attempt still running");
            return RetryOutcome::AlreadyRetrying;
        }
        let _guard = RetryingGuard(&self.is_retrying);

        let attempt = self.retry_count.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(attempt, budget = self.budget, "Retrying after connection failure");

        let attempted = AssertUnwindSafe(async move { action().await }).catch_unwind().await;
        let result = match attempted {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(attempt, panic = %message, "Recovery action panicked");
                Err(format!("recovery action panicked: {}", message))
            }
        };

        match result {
            Ok(()) => {
                tracing::info!(attempt, "Recovery succeeded");
                metrics::record_retry(true);
                RetryOutcome::Recovered
            }
            Err(e) => {
                tracing::warn!(attempt, error = %e, "Recovery attempt failed");
                metrics::record_retry(false);
                RetryOutcome::Failed(e)
            }
        }
    }

    /// Give up on incremental retries and reload the application.
    pub fn force_reload(self: Arc<Self>) {
        tracing::warn!(attempts = self.retry_count(), "Escalating to full reload");
        self.reloader.reload();
    }

    pub fn progress(&self) -> RetryProgress {
        let attempts = self.retry_count();
        RetryProgress {
            attempts,
            budget: self.budget,
            suggest_reload: attempts >= self.budget,
        }
    }

    /// Flip troubleshooting visibility and return the new value.
    pub fn toggle_troubleshooting(&self) -> bool {
        !self.troubleshooting_visible.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn troubleshooting_visible(&self) -> bool {
        self.troubleshooting_visible.load(Ordering::SeqCst)
    }

    pub fn panel(&self) -> RecoveryPanel {
        let troubleshooting_visible = self.troubleshooting_visible();
        RecoveryPanel {
            kind: self.kind,
            progress: self.progress(),
            is_retrying: self.is_retrying(),
            troubleshooting_visible,
            troubleshooting_steps: if troubleshooting_visible {
                TROUBLESHOOTING_STEPS.to_vec()
            } else {
                Vec::new()
            },
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl std::fmt::Debug for RetrySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrySession")
            .field("kind", &self.kind)
            .field("retry_count", &self.retry_count())
            .field("budget", &self.budget)
            .field("is_retrying", &self.is_retrying())
            .finish()
    }
}
