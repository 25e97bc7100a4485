//! Configuration loading and validation.
//!
//! Drive nodes read one TOML file. Every field has a default matching
//! the shipped firmware values, so an empty file (or no file at all)
//! yields a usable configuration.
//!
//! # TOML Example
//!
//! ```toml
//! log_level = "info"
//!
//! [link]
//! address = "00001"
//!
//! [cycle]
//! interval_ms = 18
//!
//! [motion]
//! velocity_bound = 1000
//! acceleration_limit = 20
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::consts::{ACCELERATION_LIMIT, CYCLE_INTERVAL_MS, VELOCITY_BOUND};
use crate::link::PipeAddress;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
///
/// Semantic validation is a separate step; call the config type's
/// `validate()` after loading.
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

// ─── Drive Configuration ─────────────────────────────────────────────

/// Radio link settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Receive pipe address as literal bytes, e.g. `"00001"`.
    /// Must match the transmitter.
    pub address: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            address: "00001".to_string(),
        }
    }
}

/// Control cycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Cycle interval in milliseconds.
    pub interval_ms: u64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            interval_ms: CYCLE_INTERVAL_MS,
        }
    }
}

/// Motion limits applied to every axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Largest velocity magnitude in speed units.
    pub velocity_bound: u16,

    /// Largest velocity change per cycle in speed units.
    pub acceleration_limit: u16,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            velocity_bound: VELOCITY_BOUND,
            acceleration_limit: ACCELERATION_LIMIT,
        }
    }
}

/// Top-level configuration for a drive node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Logging verbosity level.
    pub log_level: LogLevel,

    pub link: LinkConfig,
    pub cycle: CycleConfig,
    pub motion: MotionConfig,
}

impl DriveConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `link.address` is not a valid pipe address
    /// - `cycle.interval_ms` is zero
    /// - `motion.velocity_bound` is zero or does not fit an `i16`
    /// - `motion.acceleration_limit` is zero or exceeds the bound
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pipe_address()?;

        if self.cycle.interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "cycle.interval_ms must be at least 1".to_string(),
            ));
        }

        if self.motion.velocity_bound == 0 || self.motion.velocity_bound > i16::MAX as u16 {
            return Err(ConfigError::ValidationError(format!(
                "motion.velocity_bound must be in 1..={}, got {}",
                i16::MAX,
                self.motion.velocity_bound
            )));
        }

        if self.motion.acceleration_limit == 0
            || self.motion.acceleration_limit > self.motion.velocity_bound
        {
            return Err(ConfigError::ValidationError(format!(
                "motion.acceleration_limit must be in 1..={}, got {}",
                self.motion.velocity_bound, self.motion.acceleration_limit
            )));
        }

        Ok(())
    }

    /// Parses the configured receive pipe address.
    pub fn pipe_address(&self) -> Result<PipeAddress, ConfigError> {
        self.link
            .address
            .parse()
            .map_err(|e: crate::link::LinkError| {
                ConfigError::ValidationError(format!("link.address: {e}"))
            })
    }
}
