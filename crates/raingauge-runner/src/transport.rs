//! Byte transports for the controller.
//!
//! The control loop works over anything that is `Read + Write`. In the field
//! that is the serial port the coordinator radio is plugged into; in tests it
//! is [`MemoryTransport`], which replays canned bytes and records every write.

use std::io::{self, Cursor, Read, Write};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RunnerError, RunnerResult};

/// Default serial device of the coordinator radio.
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";
/// Default baud rate of the coordinator radio.
pub const DEFAULT_BAUD_RATE: u32 = 9600;
/// Default read timeout. The remote may stay quiet for up to a day.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(86_400);

/// Serial port settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path or port name.
    pub port: String,
    /// Baud rate.
    pub baud_rate: u32,
    /// Read timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_secs: DEFAULT_READ_TIMEOUT.as_secs(),
        }
    }
}

impl SerialConfig {
    /// Read timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Open the serial port (8N1, no flow control).
pub fn open_serial(config: &SerialConfig) -> RunnerResult<Box<dyn serialport::SerialPort>> {
    let port = serialport::new(&config.port, config.baud_rate)
        .timeout(config.timeout())
        .open()
        .map_err(|source| RunnerError::SerialOpen {
            port: config.port.clone(),
            source,
        })?;
    info!(
        port = %config.port,
        baud = config.baud_rate,
        timeout_secs = config.timeout_secs,
        "Opened serial port"
    );
    Ok(port)
}

/// In-memory transport: reads come from a fixed buffer, writes are recorded.
///
/// Once the input is exhausted every read returns zero bytes, which the frame
/// reader treats like a serial read timeout.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    input: Cursor<Vec<u8>>,
    writes: Vec<Vec<u8>>,
}

impl MemoryTransport {
    /// Create a transport that will yield the given bytes.
    pub fn new(input: impl Into<Vec<u8>>) -> Self {
        MemoryTransport {
            input: Cursor::new(input.into()),
            writes: Vec::new(),
        }
    }

    /// Every `write` call made so far, in order.
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// Bytes not yet read.
    pub fn remaining(&self) -> usize {
        let pos = self.input.position() as usize;
        self.input.get_ref().len().saturating_sub(pos)
    }
}

impl Read for MemoryTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for MemoryTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_config_defaults() {
        let config = SerialConfig::default();
        assert_eq!(config.port, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.timeout(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_memory_transport_reads_then_eof() {
        let mut transport = MemoryTransport::new(vec![1, 2, 3]);
        let mut buf = [0u8; 2];
        assert_eq!(transport.read(&mut buf).unwrap(), 2);
        assert_eq!(transport.remaining(), 1);
        assert_eq!(transport.read(&mut buf).unwrap(), 1);
        assert_eq!(transport.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_memory_transport_records_writes() {
        let mut transport = MemoryTransport::default();
        transport.write_all(&[0x7E, 0x00]).unwrap();
        transport.write_all(&[0x01]).unwrap();
        assert_eq!(transport.writes(), &[vec![0x7E, 0x00], vec![0x01]]);
    }

    #[test]
    fn test_open_missing_port_fails() {
        let config = SerialConfig {
            port: "/dev/raingauge-does-not-exist".to_string(),
            ..Default::default()
        };
        assert!(matches!(open_serial(&config), Err(RunnerError::SerialOpen { .. })));
    }
}
