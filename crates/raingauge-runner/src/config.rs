//! Controller configuration.
//!
//! Settings come from three layers, later ones winning: built-in defaults
//! (the deployed controller), an optional YAML file, and command-line flags.
//!
//! ```yaml
//! serial:
//!   port: /dev/ttyUSB0
//!   baud_rate: 9600
//!   timeout_secs: 86400
//! destination: 0013A20040A096A1
//! latch_reset_delay_ms: 10
//! logging:
//!   level: info
//!   file: rainGauge.log
//! metrics_addr: 0.0.0.0:9184
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, ValueEnum};
use raingauge_metrics::SensorLabels;
use serde::{Deserialize, Serialize};
use xbee_api::Address64;

use crate::control::{ControlConfig, LATCH_RESET_DELAY};
use crate::error::{RunnerError, RunnerResult};
use crate::transport::SerialConfig;

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum severity (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    /// Append log lines to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Complete controller configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Serial link to the coordinator radio.
    pub serial: SerialConfig,
    /// 64-bit address of the remote radio, as 16 hex digits.
    pub destination: String,
    /// Pause between clearing and re-arming the latch, in milliseconds.
    pub latch_reset_delay_ms: u64,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Prometheus scrape endpoint; needs the `prometheus` feature.
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            serial: SerialConfig::default(),
            destination: Address64::default().to_string(),
            latch_reset_delay_ms: LATCH_RESET_DELAY.as_millis() as u64,
            logging: LoggingConfig::default(),
            metrics_addr: None,
        }
    }
}

impl RunnerConfig {
    /// Load a configuration file. Missing keys take their defaults.
    pub fn load(path: &Path) -> RunnerResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RunnerError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&content).map_err(|e| RunnerError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Parse a configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Parsed destination address.
    pub fn destination_address(&self) -> RunnerResult<Address64> {
        self.destination.parse().map_err(|e| {
            RunnerError::InvalidSetting(format!("destination {:?}: {}", self.destination, e))
        })
    }

    /// Settings for the control loop.
    pub fn control_config(&self) -> RunnerResult<ControlConfig> {
        let destination = self.destination_address()?;
        Ok(ControlConfig {
            destination,
            latch_reset_delay: Duration::from_millis(self.latch_reset_delay_ms),
            labels: SensorLabels::new(destination.to_string(), self.serial.port.clone()),
        })
    }
}

/// Arguments of `raingauge run`.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Serial port of the coordinator radio
    #[arg(short, long)]
    pub port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    pub baud: Option<u32>,

    /// Read timeout in seconds; the controller exits when it elapses
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// 64-bit address of the remote radio (16 hex digits)
    #[arg(short, long)]
    pub destination: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Serve Prometheus metrics on this address (requires the `prometheus` feature)
    #[arg(long)]
    pub metrics_addr: Option<SocketAddr>,
}

impl RunArgs {
    /// Build the effective configuration: defaults, then the file, then flags.
    pub fn resolve(&self) -> RunnerResult<RunnerConfig> {
        let mut config = match &self.config {
            Some(path) => RunnerConfig::load(path)?,
            None => RunnerConfig::default(),
        };
        self.apply(&mut config);
        config.destination_address()?;
        Ok(config)
    }

    /// Override `config` with every flag that was given.
    pub fn apply(&self, config: &mut RunnerConfig) {
        if let Some(port) = &self.port {
            config.serial.port = port.clone();
        }
        if let Some(baud) = self.baud {
            config.serial.baud_rate = baud;
        }
        if let Some(timeout) = self.timeout_secs {
            config.serial.timeout_secs = timeout;
        }
        if let Some(destination) = &self.destination {
            config.destination = destination.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
        if let Some(addr) = self.metrics_addr {
            config.metrics_addr = Some(addr);
        }
    }
}

/// Output format of `raingauge history`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `timestamp,raw,millivolts` rows with a header.
    #[default]
    Csv,
    /// A JSON array of readings.
    Json,
}

/// Arguments of `raingauge history`.
#[derive(Args, Debug, Clone)]
pub struct HistoryArgs {
    /// Controller log file to scan
    pub log: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Skip readings whose raw ADC value is below this
    #[arg(long)]
    pub min_raw: Option<u16>,
}
