//! eKaty connection health monitor.
//!
//! Tracks network and backend reachability with periodic probes, classifies
//! the results into an online/offline signal with hysteresis, notifies
//! subscribers of transitions, and drives the recovery panel shown when the
//! edge proxy times out or the connection is lost.

pub mod admin;
pub mod config;
pub mod health;
pub mod host;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod recovery;
pub mod resilience;

pub use config::MonitorConfig;
pub use health::{ConnectionInfo, ConnectionMonitor};
pub use http::StatusServer;
pub use lifecycle::Shutdown;
