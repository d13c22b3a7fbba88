//! Voltage history extraction from controller log files.

use std::io::Write;

use raingauge_runner::config::LoggingConfig;
use raingauge_runner::control::{ControlConfig, ControlLoop, StopReason};
use raingauge_runner::history::{read_history_file, summary, write_csv};
use raingauge_runner::transport::MemoryTransport;
use raingauge_runner::{logging, RunnerError};
use xbee_api::compute_checksum;

fn voltage_frame(raw: u16) -> Vec<u8> {
    let mut data = vec![0x97, 0x04, 0x00, 0x13, 0xA2, 0x00, 0x40, 0xA0, 0x96, 0xA1, 0xFF, 0xFE, b'%', b'V', 0x00];
    data.extend_from_slice(&raw.to_be_bytes());
    let mut frame = vec![0x7E, 0x00, data.len() as u8];
    frame.extend_from_slice(&data);
    frame.push(compute_checksum(&data));
    frame
}

#[test]
fn test_history_from_log_file() {
    let mut log = tempfile::NamedTempFile::new().unwrap();
    writeln!(log, "2026-03-14 05:59:58  INFO raingauge_runner::transport: Opened serial port port=/dev/ttyUSB0").unwrap();
    writeln!(log, "2026-03-14 06:00:00  INFO raingauge_runner::control: Good frame rcvd: {}", hex::encode(voltage_frame(0x0A00))).unwrap();
    writeln!(log, "2026-03-14 06:00:00  INFO raingauge_runner::control: mV: 3000 raw=2560").unwrap();
    writeln!(log, "2026-03-14 07:00:00  INFO raingauge_runner::control: Good frame rcvd: {}", hex::encode(voltage_frame(0x09FC))).unwrap();
    log.flush().unwrap();

    let readings = read_history_file(log.path(), None).unwrap();
    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0].millivolts, 3000);
    assert_eq!(readings[1].millivolts, 2995);
    assert_eq!(summary(&readings), "2 readings, latest 2995 mV at 2026-03-14 07:00:00");

    let mut csv = Vec::new();
    write_csv(&mut csv, &readings).unwrap();
    let csv = String::from_utf8(csv).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert_eq!(csv.lines().nth(2), Some("2026-03-14 07:00:00,2556,2995"));
}

#[test]
fn test_missing_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_history_file(&dir.path().join("absent.log"), None).unwrap_err();
    assert!(matches!(err, RunnerError::History { .. }));
}

#[test]
fn test_controller_log_round_trips_through_history() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("rainGauge.log");
    logging::init_logging(&LoggingConfig {
        level: "info".to_string(),
        file: Some(log_path.clone()),
    })
    .unwrap();

    let mut input = voltage_frame(0x0A00);
    input.extend(voltage_frame(0x09FC));
    let mut control = ControlLoop::new(MemoryTransport::new(input), ControlConfig::default());
    assert_eq!(control.run().unwrap(), StopReason::Timeout);

    let readings = read_history_file(&log_path, None).unwrap();
    assert_eq!(readings.iter().map(|r| r.raw).collect::<Vec<_>>(), vec![0x0A00, 0x09FC]);

    let contents = std::fs::read_to_string(&log_path).unwrap();
    assert!(contents.contains("serial read timed out"));
    assert!(!contents.contains('\u{1b}'));
}
