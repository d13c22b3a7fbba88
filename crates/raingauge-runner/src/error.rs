//! Error types for the runner.

use std::path::PathBuf;

use thiserror::Error;
use xbee_api::CommandError;

/// Errors that end a controller session or a runner command.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The serial port could not be opened or configured.
    #[error("failed to open serial port {port}: {source}")]
    SerialOpen {
        /// Port name.
        port: String,
        /// Underlying error.
        source: serialport::Error,
    },

    /// Unrecoverable transport fault while reading or writing.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// An outbound command could not be encoded.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Configuration file could not be read or parsed.
    #[error("invalid config file {path}: {message}")]
    Config {
        /// Path of the file.
        path: PathBuf,
        /// Description of the problem.
        message: String,
    },

    /// Invalid value supplied on the command line or in the config file.
    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    /// Logging could not be initialised.
    #[error("failed to initialise logging: {0}")]
    Logging(String),

    /// Controller log could not be read.
    #[error("failed to read log {path}: {source}")]
    History {
        /// Path of the log.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// History output could not be written.
    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),

    /// The metrics exporter could not be started.
    #[error("failed to start metrics exporter: {0}")]
    Metrics(String),

    /// Voltage history could not be serialised.
    #[error("failed to write history: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;
