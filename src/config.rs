//! Configuration management
//!
//! Handles loading and validating pool and stress-driver configuration from
//! TOML files. Every section is optional.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pool: PoolConfig,
    pub stress: StressConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

/// Buffer pool configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Length of every buffer in bytes
    pub partition_size: usize,
    /// Buffers allocated up front
    pub partition_count: usize,
    /// Buffers added per expansion when a take misses (0 = never expand)
    pub expand_by: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            partition_size: 4096,
            partition_count: 1024,
            expand_by: 0,
        }
    }
}

/// Stress driver configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    /// Number of worker threads (0 = auto)
    pub workers: usize,
    /// Take/put cycles per worker
    pub iterations: u64,
    /// Interval between progress reports in milliseconds
    pub report_interval_ms: u64,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            iterations: 100_000,
            report_interval_ms: 1000,
        }
    }
}

impl StressConfig {
    /// Get effective worker count (auto-detect if 0)
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable metrics endpoint
    pub enabled: bool,
    /// Metrics server bind address
    pub bind_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 9090)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Output format: "json" or "pretty"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("region of {count} partitions of {size} bytes overflows usize")]
    RegionOverflow { size: usize, count: usize },
    #[error("iterations must be > 0")]
    NoIterations,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::parse(&contents)
    }

    /// Parse and validate configuration from a TOML document
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// A zero partition size or count is allowed and builds a degenerate pool.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = self.pool.partition_size;
        for count in [self.pool.partition_count, self.pool.expand_by] {
            if size.checked_mul(count).is_none() {
                return Err(ConfigError::RegionOverflow { size, count });
            }
        }
        if self.stress.iterations == 0 {
            return Err(ConfigError::NoIterations);
        }
        Ok(())
    }
}
