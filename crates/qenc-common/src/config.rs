//! Configuration structures for the encoder sampler.
//!
//! Supports TOML deserialization with defaults that mirror a bench setup of
//! two 16-bit timers polled every 25 ms.

use crate::error::{check_modulus, EncoderError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Wrap period of a 16-bit hardware counter.
pub const DEFAULT_MODULUS: u64 = 1 << 16;

/// Top-level sampler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Interval between consecutive counter reads.
    #[serde(with = "humantime_serde")]
    pub sample_period: Duration,

    /// Emit a position report every N samples.
    pub log_every: u64,

    /// One entry per physical encoder.
    pub channels: Vec<ChannelConfig>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_period: Duration::from_millis(25),
            log_every: 40,
            channels: vec![
                ChannelConfig {
                    name: String::from("enc_a"),
                    simulated_speed: 4000,
                    ..ChannelConfig::default()
                },
                ChannelConfig {
                    name: String::from("enc_b"),
                    simulated_speed: -2500,
                    ..ChannelConfig::default()
                },
            ],
        }
    }
}

/// Per-encoder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Channel name used in logs.
    pub name: String,

    /// Counter wrap period (65536 for a 16-bit timer).
    pub modulus: u64,

    /// Shaft speed of the simulated counter, in ticks per second.
    pub simulated_speed: i64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            name: String::from("enc"),
            modulus: DEFAULT_MODULUS,
            simulated_speed: 0,
        }
    }
}

impl SamplerConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Serialize configuration to TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Check the configuration for values the sampler cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_period.is_zero() {
            return Err(ConfigError::Invalid("sample_period must be non-zero".into()));
        }
        if self.log_every == 0 {
            return Err(ConfigError::Invalid("log_every must be at least 1".into()));
        }
        if self.channels.is_empty() {
            return Err(ConfigError::Invalid("at least one channel is required".into()));
        }

        let mut seen = HashSet::new();
        for channel in &self.channels {
            if channel.name.trim().is_empty() {
                return Err(ConfigError::Invalid("channel name must not be empty".into()));
            }
            if !seen.insert(channel.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate channel name '{}'",
                    channel.name
                )));
            }
            check_modulus(channel.modulus).map_err(|e| {
                ConfigError::Invalid(format!("channel '{}': {e}", channel.name))
            })?;
        }
        Ok(())
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Semantically invalid configuration.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for EncoderError {
    fn from(err: ConfigError) -> Self {
        EncoderError::Config(err.to_string())
    }
}

/// Serde helper module for `Duration` using humantime format.
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
