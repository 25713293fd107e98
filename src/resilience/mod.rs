//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Probe to endpoint:
//!     → timeouts.rs (enforce per-probe deadline)
//!     → on expiry: ProbeError::Timeout, counted as a failed probe
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Deadlines are enforced locally, never delegated to the remote end

pub mod timeouts;
