//! Recovery subsystem.
//!
//! # Data Flow
//! ```text
//! Failure observed (offline transition, or a reported fetch failure)
//!     → classify.rs (edge timeout / offline / application)
//!     → session.rs RetrySession opened when the panel applies
//!     → user retry → recovery action → Recovered closes the session
//!     → user escalation → reload.rs → composition root rebuilds
//! ```

pub mod classify;
pub mod coordinator;
pub mod reload;
pub mod session;

pub use classify::{classify_failure, FailureKind};
pub use coordinator::RecoveryCoordinator;
pub use reload::{ChannelReloader, ReloadRequest, Reloader};
pub use session::{RecoveryPanel, RetryOutcome, RetryProgress, RetrySession, TROUBLESHOOTING_STEPS};
