//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + EKATY_BACKEND_* environment
//!     → loader.rs (parse, deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → MonitorConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → composition root rebuilds the monitor and swaps it in
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, BackendConfig, HostConfig, ListenerConfig, LogFormat, MonitorConfig, ObservabilityConfig,
    ProbeConfig, RecoveryConfig,
};
