//! Supply voltage history recovered from a controller log.
//!
//! Every validated frame is logged as `Good frame rcvd: <hex>`, so the `%V`
//! responses in a log give a battery voltage time series for the remote.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;
use xbee_api::RawFrame;

use crate::error::{RunnerError, RunnerResult};
use crate::logging::LOG_TIME_FORMAT;
use crate::sensor::{self, SensorEvent};

/// Prefix of the log record carrying a validated frame.
pub const GOOD_FRAME_MARKER: &str = "Good frame rcvd: ";

const TIMESTAMP_LEN: usize = 19;

/// One supply voltage reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoltageReading {
    /// Local time the frame was logged.
    pub timestamp: NaiveDateTime,
    /// Raw ADC value.
    pub raw: u16,
    /// Reading in millivolts.
    pub millivolts: u32,
}

/// Extract a reading from one log line.
///
/// `None` unless the line is a timestamped `Good frame rcvd:` record holding a
/// checksum-valid `%V` response.
pub fn parse_line(line: &str) -> Option<VoltageReading> {
    let (_, rest) = line.split_once(GOOD_FRAME_MARKER)?;
    let timestamp = NaiveDateTime::parse_from_str(line.get(..TIMESTAMP_LEN)?, LOG_TIME_FORMAT).ok()?;

    let bytes = hex::decode(rest.split_whitespace().next()?).ok()?;
    let frame = RawFrame::from_bytes(bytes).ok()?.decode().ok()?;
    match sensor::interpret(&frame) {
        SensorEvent::SupplyVoltage { raw, millivolts } => Some(VoltageReading {
            timestamp,
            raw,
            millivolts,
        }),
        _ => None,
    }
}

/// Collect every reading from a log, in order. Readings below `min_raw` are skipped.
pub fn read_history<R: BufRead>(reader: R, min_raw: Option<u16>) -> std::io::Result<Vec<VoltageReading>> {
    let mut readings = Vec::new();
    for line in reader.lines() {
        if let Some(reading) = parse_line(&line?) {
            if min_raw.map_or(true, |min| reading.raw >= min) {
                readings.push(reading);
            }
        }
    }
    Ok(readings)
}

/// [`read_history`] over a log file.
pub fn read_history_file(path: &Path, min_raw: Option<u16>) -> RunnerResult<Vec<VoltageReading>> {
    let to_error = |source| RunnerError::History {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(to_error)?;
    read_history(BufReader::new(file), min_raw).map_err(to_error)
}

/// Write readings as CSV with a header row.
pub fn write_csv<W: Write>(mut out: W, readings: &[VoltageReading]) -> RunnerResult<()> {
    writeln!(out, "timestamp,raw,millivolts").map_err(RunnerError::Output)?;
    for reading in readings {
        writeln!(
            out,
            "{},{},{}",
            reading.timestamp.format(LOG_TIME_FORMAT),
            reading.raw,
            reading.millivolts
        )
        .map_err(RunnerError::Output)?;
    }
    out.flush().map_err(RunnerError::Output)
}

/// Write readings as a JSON array.
pub fn write_json<W: Write>(mut out: W, readings: &[VoltageReading]) -> RunnerResult<()> {
    serde_json::to_writer_pretty(&mut out, readings).map_err(|e| {
        if e.is_io() {
            RunnerError::Output(e.into())
        } else {
            RunnerError::Json(e)
        }
    })?;
    writeln!(out).map_err(RunnerError::Output)
}

/// One-line summary: the latest reading and how many there were.
pub fn summary(readings: &[VoltageReading]) -> String {
    match readings.last() {
        Some(latest) => format!(
            "{} readings, latest {} mV at {}",
            readings.len(),
            latest.millivolts,
            latest.timestamp.format(LOG_TIME_FORMAT)
        ),
        None => "no supply voltage readings found".to_string(),
    }
}
