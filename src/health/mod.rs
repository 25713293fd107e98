//! Connection health subsystem.
//!
//! # Data Flow
//! ```text
//! Active probing (active.rs):
//!     Startup delay, then periodic timer
//!     → monitor.rs check_connection (minimum-interval guard)
//!     → prober.rs (generic endpoint, local deadline)
//!     → state.rs classifier
//!
//! Host signals (crate::host):
//!     online/offline report
//!     → monitor.rs handle_host_event
//!     → state.rs classifier (immediate override)
//!
//! Transitions:
//!     state.rs → monitor.rs delivery queue → listeners.rs subscribers
//! ```
//!
//! # Design Decisions
//! - Slow to declare offline (consecutive failures), quick to recover
//! - Notifications only on transitions, never on every probe
//! - Backend probing is on demand and does not feed the classifier

pub mod active;
pub mod listeners;
pub mod monitor;
pub mod prober;
pub mod state;
pub mod types;

pub use listeners::{Listeners, Subscription};
pub use monitor::{ConnectionMonitor, MonitorSettings};
pub use prober::{HttpProber, Prober};
pub use state::{Classifier, ConnectionState};
pub use types::{CheckOutcome, ConnectionInfo, ProbeError, ProbeResult};
