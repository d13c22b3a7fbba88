//! Rain gauge controller.
//!
//! A tipping-bucket rain gauge's reed switch is wired to a remote XBee radio
//! whose DIO latch holds each closure. The radio sends IO samples to a
//! coordinator on a serial port. For every sample the controller either
//! counts a tip and resets the latch, or asks the remote for its supply
//! voltage.
//!
//! # Modules
//!
//! - [`control`]: the read, interpret, react loop
//! - [`sensor`]: what a decoded frame means for the gauge
//! - [`transport`]: the serial port and an in-memory stand-in
//! - [`config`]: defaults, YAML file and command-line settings
//! - [`logging`]: subscriber setup
//! - [`exporter`]: optional Prometheus endpoint for the loop's metrics
//! - [`history`]: supply voltage readings recovered from a controller log

pub mod config;
pub mod control;
pub mod error;
pub mod exporter;
pub mod history;
pub mod logging;
pub mod sensor;
pub mod transport;

pub use config::{HistoryArgs, LoggingConfig, OutputFormat, RunArgs, RunnerConfig};
pub use control::{ControlConfig, ControlLoop, LoopEvent, LoopState, StopReason};
pub use error::{RunnerError, RunnerResult};
pub use transport::{MemoryTransport, SerialConfig};
