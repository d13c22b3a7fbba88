//! Log subscriber setup.

use std::fs::OpenOptions;
use std::sync::Mutex;

use chrono::Local;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{RunnerError, RunnerResult};

/// Timestamp format at the start of every log line.
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local wall-clock timestamps in [`LOG_TIME_FORMAT`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTimer;

impl FormatTime for LogTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format(LOG_TIME_FORMAT))
    }
}

/// Parse a configured level name.
pub fn parse_level(level: &str) -> RunnerResult<LevelFilter> {
    level
        .parse()
        .map_err(|_| RunnerError::InvalidSetting(format!("unknown log level {:?}", level)))
}

/// Filter from `RUST_LOG`, falling back to the configured level.
pub fn build_filter(config: &LoggingConfig) -> RunnerResult<EnvFilter> {
    let level = parse_level(&config.level)?;
    Ok(EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy())
}

/// Install the global subscriber. Call once, before the control loop starts.
pub fn init_logging(config: &LoggingConfig) -> RunnerResult<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(LogTimer);

    let result = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| RunnerError::Logging(format!("{}: {}", path.display(), e)))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    result.map_err(|e| RunnerError::Logging(e.to_string()))
}
