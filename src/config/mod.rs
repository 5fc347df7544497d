//! Configuration for Hoist.
//!
//! Every monitor takes its section of [`HoistConfig`] as a constructor
//! argument. Nothing here is global, so tests build configs with tiny
//! intervals and run monitors side by side.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub mod loader;

#[cfg(test)]
mod tests;

pub use loader::{default_config_path, load_config, CONFIG_ENV_VAR};

/// Errors raised while locating or parsing the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HoistConfig {
    /// Event queue capacity shared by all monitors
    pub queue_capacity: usize,

    pub stack: StackPollerConfig,
    pub logs: LogTailConfig,
    pub health: RetryPolicy,
    pub deploy: DeployConfig,
}

/// Stack deletion polling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StackPollerConfig {
    /// Delay between status queries
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl Default for StackPollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
        }
    }
}

/// Log tailing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogTailConfig {
    /// Delay between log queries
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Provider-side filter pattern applied to every query
    pub filter_pattern: Option<String>,
}

impl Default for LogTailConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            filter_pattern: None,
        }
    }
}

/// Bounded retry used by the startup health probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryPolicy {
    /// Number of attempts before giving up
    pub retry_count: u32,

    /// Delay before every attempt after the first
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_count: 3,
            retry_delay: Duration::from_secs(3),
        }
    }
}

/// External deployment tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// Program name or path of the deployment tool
    pub program: String,

    /// Credential profile passed to the tool when none is given on the command line
    pub profile: Option<String>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            program: "cdk".to_string(),
            profile: None,
        }
    }
}

impl Default for HoistConfig {
    fn default() -> Self {
        Self {
            queue_capacity: crate::monitor::DEFAULT_QUEUE_CAPACITY,
            stack: StackPollerConfig::default(),
            logs: LogTailConfig::default(),
            health: RetryPolicy::default(),
            deploy: DeployConfig::default(),
        }
    }
}

impl HoistConfig {
    /// Reject values that would make a monitor spin or never start
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.stack.poll_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "stack.poll_interval must be greater than zero".to_string(),
            ));
        }
        if self.logs.poll_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "logs.poll_interval must be greater than zero".to_string(),
            ));
        }
        if self.deploy.program.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "deploy.program must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
