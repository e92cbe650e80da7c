//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/praxis-mapper/config.toml

pub mod defaults;

use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Ping lifetime and query settings
    #[serde(default)]
    pub pings: PingsConfig,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Ping lifetime and query settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingsConfig {
    /// How long a ping stays active, in milliseconds
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,

    /// Interval between expiry sweeps, in milliseconds
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,

    /// Radius used when a nearby query gives none (or an unusable one)
    #[serde(default = "default_radius_meters")]
    pub default_radius_meters: f64,
}

// Default value functions for serde
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_ttl_ms() -> u64 {
    DEFAULT_TTL_MS
}
fn default_sweep_interval_ms() -> u64 {
    DEFAULT_SWEEP_INTERVAL_MS
}
fn default_radius_meters() -> f64 {
    DEFAULT_RADIUS_METERS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for PingsConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
            sweep_interval_ms: default_sweep_interval_ms(),
            default_radius_meters: default_radius_meters(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Check that the timing settings can drive a server
    ///
    /// TTL and sweep interval must be non-zero, and sweeps must run more often
    /// than pings expire.
    pub fn validate(&self) -> Result<()> {
        if self.pings.ttl_ms == 0 {
            return Err(Error::Config("pings.ttl_ms must be greater than 0".to_string()));
        }
        if self.pings.sweep_interval_ms == 0 {
            return Err(Error::Config(
                "pings.sweep_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.pings.sweep_interval_ms >= self.pings.ttl_ms {
            return Err(Error::Config(format!(
                "pings.sweep_interval_ms ({}) must be shorter than pings.ttl_ms ({})",
                self.pings.sweep_interval_ms, self.pings.ttl_ms
            )));
        }
        let radius = self.pings.default_radius_meters;
        if radius.is_nan() || radius <= 0.0 {
            return Err(Error::Config(format!(
                "pings.default_radius_meters must be positive, got {}",
                radius
            )));
        }
        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["pings", "ttl_ms"] => Some(self.pings.ttl_ms.to_string()),
            ["pings", "sweep_interval_ms"] => Some(self.pings.sweep_interval_ms.to_string()),
            ["pings", "default_radius_meters"] => {
                Some(self.pings.default_radius_meters.to_string())
            }

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid port value: {}", value))
                })?;
            }

            ["pings", "ttl_ms"] => {
                self.pings.ttl_ms = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid TTL value: {}", value))
                })?;
            }
            ["pings", "sweep_interval_ms"] => {
                self.pings.sweep_interval_ms = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid sweep interval value: {}", value))
                })?;
            }
            ["pings", "default_radius_meters"] => {
                self.pings.default_radius_meters = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid radius value: {}", value))
                })?;
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "server.host",
            "server.port",
            "pings.ttl_ms",
            "pings.sweep_interval_ms",
            "pings.default_radius_meters",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Ping time-to-live
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.pings.ttl_ms)
    }

    /// Interval between expiry sweeps
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.pings.sweep_interval_ms)
    }
}
