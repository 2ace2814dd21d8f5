//! # Configuration Management
//!
//! Settings for the codec's outer surface: how large an inbound payload may
//! be, whether unread bytes after a message body are an error, and how logs
//! are emitted. The wire layouts themselves are fixed and not configurable.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment overrides via `from_env()`
//!
//! ```toml
//! [limits]
//! max_payload_size = 65535
//! reject_trailing_bytes = false
//!
//! [logging]
//! app_name = "spellwire"
//! log_level = "info"
//! log_to_console = true
//! log_to_file = false
//! json_format = false
//! ```

use crate::error::{constants, ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::Level;

/// Default inbound payload limit, the largest size a `u16` length can frame.
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

/// Hard ceiling for `max_payload_size` (16 MiB).
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Environment variable names read by [`CodecConfig::from_env`].
pub mod env {
    pub const MAX_PAYLOAD_SIZE: &str = "SPELLWIRE_MAX_PAYLOAD_SIZE";
    pub const REJECT_TRAILING_BYTES: &str = "SPELLWIRE_REJECT_TRAILING_BYTES";
    pub const LOG_LEVEL: &str = "SPELLWIRE_LOG_LEVEL";
}

/// Top-level codec configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct CodecConfig {
    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CodecConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| {
            ProtocolError::ConfigError(format!("{}: {e}", constants::ERR_CONFIG_OPEN))
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(|e| {
            ProtocolError::ConfigError(format!("{}: {e}", constants::ERR_CONFIG_READ))
        })?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content).map_err(|e| {
            ProtocolError::ConfigError(format!("{}: {e}", constants::ERR_CONFIG_PARSE))
        })
    }

    /// Defaults overridden by `SPELLWIRE_*` environment variables.
    ///
    /// Unparseable values are reported rather than ignored.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(size) = lookup(env::MAX_PAYLOAD_SIZE) {
            config.limits.max_payload_size = size.trim().parse::<usize>().map_err(|e| {
                ProtocolError::ConfigError(format!("{}: {e}", env::MAX_PAYLOAD_SIZE))
            })?;
        }

        if let Some(reject) = lookup(env::REJECT_TRAILING_BYTES) {
            config.limits.reject_trailing_bytes = parse_bool(&reject).ok_or_else(|| {
                ProtocolError::ConfigError(format!(
                    "{}: expected true/false, got '{reject}'",
                    env::REJECT_TRAILING_BYTES
                ))
            })?;
        }

        if let Some(level) = lookup(env::LOG_LEVEL) {
            config.logging.log_level = level.trim().parse::<Level>().map_err(|_| {
                ProtocolError::ConfigError(format!("{}: invalid level '{level}'", env::LOG_LEVEL))
            })?;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            ProtocolError::ConfigError(format!("{}: {e}", constants::ERR_CONFIG_SERIALIZE))
        })?;

        std::fs::write(path, content).map_err(|e| {
            ProtocolError::ConfigError(format!("{}: {e}", constants::ERR_CONFIG_WRITE))
        })?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.limits.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Inbound payload policy applied by the dispatcher
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LimitsConfig {
    /// Largest payload accepted for decode, in bytes
    pub max_payload_size: usize,

    /// Fail decodes that leave bytes unread after the message body
    pub reject_trailing_bytes: bool,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            reject_trailing_bytes: false,
        }
    }
}

impl LimitsConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_payload_size == 0 {
            errors.push("Max payload size cannot be 0".to_string());
        } else if self.max_payload_size > MAX_PAYLOAD_SIZE {
            errors.push(format!(
                "Max payload size too large: {} bytes (maximum: {} bytes)",
                self.max_payload_size, MAX_PAYLOAD_SIZE
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to log to console
    pub log_to_console: bool,

    /// Whether to log to file
    pub log_to_file: bool,

    /// Path to log file (if log_to_file is true)
    pub log_file_path: Option<String>,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("spellwire"),
            log_level: Level::INFO,
            log_to_console: true,
            log_to_file: false,
            log_file_path: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        if self.log_to_file {
            if let Some(ref path) = self.log_file_path {
                if let Some(parent) = Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        errors.push(format!(
                            "Log file directory does not exist: {}",
                            parent.display()
                        ));
                    }
                }
            } else {
                errors.push("log_file_path must be specified when log_to_file is true".to_string());
            }
        }

        if !self.log_to_console && !self.log_to_file {
            errors
                .push("At least one logging output (console or file) must be enabled".to_string());
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let config = CodecConfig::from_lookup(lookup_from(&[
            (env::MAX_PAYLOAD_SIZE, "4096"),
            (env::REJECT_TRAILING_BYTES, "yes"),
            (env::LOG_LEVEL, "debug"),
        ]))
        .unwrap();
        assert_eq!(config.limits.max_payload_size, 4096);
        assert!(config.limits.reject_trailing_bytes);
        assert_eq!(config.logging.log_level, Level::DEBUG);
    }

    #[test]
    fn test_env_rejects_garbage() {
        let err = CodecConfig::from_lookup(lookup_from(&[(env::MAX_PAYLOAD_SIZE, "lots")]))
            .unwrap_err();
        assert!(matches!(err, ProtocolError::ConfigError(_)));

        let err = CodecConfig::from_lookup(lookup_from(&[(env::REJECT_TRAILING_BYTES, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ProtocolError::ConfigError(_)));
    }

    #[test]
    fn test_empty_env_is_default() {
        let config = CodecConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, CodecConfig::default());
    }
}
