//! Global tunables loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub inference: InferenceSettings,
    pub solver: SolverSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InferenceSettings {
    /// Maximum cached solved sentences per session before LRU eviction.
    pub cache_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolverSettings {
    /// Search-node budget per solve.
    pub max_nodes: u64,
    /// Wall-clock deadline per solve, in milliseconds.
    pub deadline_ms: u64,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings =
        toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    if s.inference.cache_capacity == 0 {
        return Err(SettingsError::InvalidValue {
            field: "inference.cache_capacity".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if s.solver.max_nodes == 0 {
        return Err(SettingsError::InvalidValue {
            field: "solver.max_nodes".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}
