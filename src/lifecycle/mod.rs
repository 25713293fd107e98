//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Init logging/metrics → Build monitor → Start status API
//!
//! Shutdown:
//!     signals.rs (SIGINT/SIGTERM) → shutdown.rs trigger
//!     → stop monitoring → drain status API → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
