//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::MonitorConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `backend.base_url`.
pub const ENV_BACKEND_URL: &str = "EKATY_BACKEND_URL";
/// Environment variable overriding `backend.api_key`.
pub const ENV_BACKEND_KEY: &str = "EKATY_BACKEND_KEY";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, apply environment overrides, and validate a TOML file.
pub fn load_config(path: &Path) -> Result<MonitorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: MonitorConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Defaults plus environment overrides, for running without a file.
pub fn default_config() -> Result<MonitorConfig, ConfigError> {
    let mut config = MonitorConfig::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply backend overrides. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut MonitorConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.is_empty()) {
        config.backend.base_url = Some(url);
    }
    if let Some(key) = lookup(ENV_BACKEND_KEY).filter(|v| !v.is_empty()) {
        config.backend.api_key = Some(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_file() {
        let file = write_config(
            r#"
            [probe]
            interval_secs = 60

            [recovery]
            retry_budget = 3
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.probe.interval_secs, 60);
        assert_eq!(config.recovery.retry_budget, 3);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let file = write_config("[probe]\nfailure_threshold = 0\n");

        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let file = write_config("[probe\n");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config(Path::new("/nonexistent/ekaty-monitor.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = MonitorConfig::default();
        apply_env_overrides(&mut config, |key| match key {
            ENV_BACKEND_URL => Some("https://db.example.co".to_string()),
            ENV_BACKEND_KEY => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.backend.base_url.as_deref(), Some("https://db.example.co"));
        assert_eq!(config.backend.api_key, None);
    }
}
