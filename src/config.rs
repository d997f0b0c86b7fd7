//! Configuration file support for the viewport.
//!
//! This module provides serialization and deserialization of the zoom bounds
//! and logging options, so embedders can ship them as JSON next to the page
//! or persist them between sessions.

#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_SCALE, DEFAULT_MIN_SCALE, DEFAULT_SCALE, DEFAULT_STEP_SCALE};

/// Log level setting for the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }

    /// Convert to a concrete log::Level (console_log wants one).
    pub fn to_level(&self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

#[cfg(not(target_arch = "wasm32"))]
const CONFIG_FILE_NAME: &str = "viewport.json";

#[cfg(target_arch = "wasm32")]
const LOCAL_STORAGE_KEY: &str = "imgpan-config";

/// Zoom bounds and logging options for one viewport.
///
/// Every field has a default, so `{}` is a valid document. JavaScript-style
/// names (`minScale`, `maxScale`, `stepScale`) are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Version of the configuration file format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Initial zoom factor
    #[serde(default = "default_scale")]
    pub scale: f32,

    /// Lower zoom bound
    #[serde(default = "default_min_scale", alias = "minScale")]
    pub min_scale: f32,

    /// Upper zoom bound
    #[serde(default = "default_max_scale", alias = "maxScale")]
    pub max_scale: f32,

    /// Increment per zoom step
    #[serde(default = "default_step_scale", alias = "stepScale")]
    pub step_scale: f32,

    /// Log verbosity level
    #[serde(default, alias = "logLevel")]
    pub log_level: LogLevel,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_scale() -> f32 {
    DEFAULT_SCALE
}

fn default_min_scale() -> f32 {
    DEFAULT_MIN_SCALE
}

fn default_max_scale() -> f32 {
    DEFAULT_MAX_SCALE
}

fn default_step_scale() -> f32 {
    DEFAULT_STEP_SCALE
}

impl ViewportConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            scale: DEFAULT_SCALE,
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            step_scale: DEFAULT_STEP_SCALE,
            log_level: LogLevel::default(),
        }
    }

    /// Set the zoom bounds.
    pub fn with_bounds(mut self, min_scale: f32, max_scale: f32) -> Self {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self
    }

    /// Set the zoom step.
    pub fn with_step(mut self, step_scale: f32) -> Self {
        self.step_scale = step_scale;
        self
    }

    /// Set the initial zoom factor.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Check the scale invariants.
    ///
    /// Requires `0 < min_scale < max_scale` and `step_scale > 0`, all finite.
    /// An initial `scale` outside the bounds is clamped, not rejected.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let bounds_ok = self.min_scale.is_finite()
            && self.max_scale.is_finite()
            && self.min_scale > 0.0
            && self.min_scale < self.max_scale;
        if !bounds_ok {
            return Err(ConfigError::InvalidBounds {
                min: self.min_scale,
                max: self.max_scale,
            });
        }

        if !(self.step_scale.is_finite() && self.step_scale > 0.0) {
            return Err(ConfigError::InvalidStep(self.step_scale));
        }

        let clamped = crate::zoom_math::clamp_scale(self.scale, self.min_scale, self.max_scale);
        if clamped != self.scale {
            log::warn!(
                "Initial scale {} outside [{}, {}], clamped to {}",
                self.scale,
                self.min_scale,
                self.max_scale,
                clamped
            );
            self.scale = clamped;
        }

        Ok(self)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize and validate configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.validate()
    }

    /// Where the native tool keeps its config: `<config dir>/imgpan/viewport.json`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("imgpan").join(CONFIG_FILE_NAME))
    }

    /// Read and validate a config file. A missing file is `Ok(None)`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn read_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write this config as JSON, creating missing parent directories.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn write_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Viewport config written to {}", path.display());
        Ok(())
    }

    /// Read the config stored for this page. Nothing stored is `Ok(None)`.
    #[cfg(target_arch = "wasm32")]
    pub fn read_local_storage() -> Result<Option<Self>, ConfigError> {
        let stored = local_storage()?
            .get_item(LOCAL_STORAGE_KEY)
            .map_err(|e| ConfigError::StorageError(format!("{:?}", e)))?;
        stored.map(|json| Self::from_json(&json)).transpose()
    }

    /// Store this config for the page.
    #[cfg(target_arch = "wasm32")]
    pub fn write_local_storage(&self) -> Result<(), ConfigError> {
        local_storage()?
            .set_item(LOCAL_STORAGE_KEY, &self.to_json()?)
            .map_err(|e| ConfigError::StorageError(format!("{:?}", e)))?;
        log::info!("Viewport config stored under {}", LOCAL_STORAGE_KEY);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, ConfigError> {
    web_sys::window()
        .ok_or_else(|| ConfigError::StorageError("no window".to_string()))?
        .local_storage()
        .map_err(|e| ConfigError::StorageError(format!("{:?}", e)))?
        .ok_or_else(|| ConfigError::StorageError("localStorage unavailable".to_string()))
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// Zoom bounds violate `0 < min < max`
    #[error("Invalid scale bounds: min {min}, max {max}")]
    InvalidBounds { min: f32, max: f32 },

    /// Zoom step must be positive
    #[error("Invalid scale step: {0}")]
    InvalidStep(f32),

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Storage error (localStorage in WASM)
    #[error("Storage error: {0}")]
    StorageError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ViewportConfig::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.scale, 1.0);
        assert_eq!(config.min_scale, 0.25);
        assert_eq!(config.max_scale, 5.0);
        assert_eq!(config.step_scale, 0.1);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ViewportConfig::from_json("{}").expect("empty object is valid");
        assert_eq!(config, ViewportConfig::default());
    }

    #[test]
    fn test_camel_case_aliases() {
        let json = r#"{ "minScale": 0.5, "maxScale": 8, "stepScale": 0.25, "logLevel": "debug" }"#;
        let config = ViewportConfig::from_json(json).expect("aliases accepted");
        assert_eq!(config.min_scale, 0.5);
        assert_eq!(config.max_scale, 8.0);
        assert_eq!(config.step_scale, 0.25);
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = ViewportConfig::new().with_bounds(0.5, 4.0).with_step(0.5);
        let json = config.to_json().expect("serializes");
        let parsed = ViewportConfig::from_json(&json).expect("parses");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_version_too_new_rejected() {
        let json = format!(r#"{{ "version": {} }}"#, CONFIG_VERSION + 1);
        let err = ViewportConfig::from_json(&json).unwrap_err();
        assert!(matches!(err, ConfigError::VersionTooNew { .. }));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let err = ViewportConfig::new().with_bounds(5.0, 0.25).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBounds { .. }));

        let err = ViewportConfig::new().with_bounds(1.0, 1.0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBounds { .. }));
    }

    #[test]
    fn test_non_positive_min_rejected() {
        let err = ViewportConfig::new().with_bounds(0.0, 2.0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBounds { .. }));
    }

    #[test]
    fn test_non_positive_step_rejected() {
        let err = ViewportConfig::new().with_step(0.0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidStep(_)));

        let err = ViewportConfig::new().with_step(f32::NAN).validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidStep(_)));
    }

    #[test]
    fn test_initial_scale_clamped() {
        let config = ViewportConfig::new().with_scale(12.0).validate().expect("clamped, not rejected");
        assert_eq!(config.scale, 5.0);
    }

    #[test]
    fn test_malformed_json() {
        let err = ViewportConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("imgpan-{}-{}", name, std::process::id()))
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_write_then_read_file() {
        let dir = scratch_dir("write-read");
        let path = dir.join("nested").join(CONFIG_FILE_NAME);

        let config = ViewportConfig::new().with_bounds(0.5, 3.0).with_scale(2.0);
        config.write_file(&path).expect("writes, creating directories");
        let read = ViewportConfig::read_file(&path).expect("reads");
        assert_eq!(read, Some(config));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_missing_file_is_none() {
        let path = scratch_dir("missing").join(CONFIG_FILE_NAME);
        assert_eq!(ViewportConfig::read_file(&path).expect("missing is fine"), None);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = scratch_dir("invalid");
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::create_dir_all(&dir).expect("scratch dir");
        std::fs::write(&path, r#"{ "minScale": 3, "maxScale": 1 }"#).expect("scratch file");

        let err = ViewportConfig::read_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBounds { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_config_file_location() {
        if let Some(path) = ViewportConfig::config_file() {
            assert!(path.ends_with("imgpan/viewport.json"));
        }
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevel::Trace.to_level(), log::Level::Trace);
        assert_eq!(LogLevel::Debug.name(), "Debug");
    }
}
