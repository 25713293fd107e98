//! HTTP status API.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace + timeout layers)
//!     → crate::admin routes (auth on state-changing routes)
//!     → AppState (hot-swappable monitor + recovery coordinator)
//! ```

pub mod server;

pub use server::{AppInner, AppState, StatusServer};
