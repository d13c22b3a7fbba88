//! The rain gauge control loop.
//!
//! One iteration reads a frame, classifies it and reacts:
//!
//! 1. A sample with the tip switch closed counts a tip, then clears the DIO0
//!    latch (`D0 05`) and after [`LATCH_RESET_DELAY`] re-arms it (`D0 04`).
//! 2. A sample with the switch open asks the remote for its supply voltage.
//! 3. A `%V` response reports the voltage.
//!
//! Malformed frames, checksum failures and frames too short for their type
//! are logged and skipped. A read timeout stops the loop; any other transport
//! error is returned as [`RunnerError::Transport`].

use std::io::{Read, Write};
use std::thread;
use std::time::Duration;

use raingauge_metrics::{metric_defs, SensorLabels};
use tracing::{debug, error, info, warn};
use xbee_api::{Address64, AtCommand, Frame, FrameError, FrameReader, RemoteAtCommand};

use crate::error::{RunnerError, RunnerResult};
use crate::sensor::{self, SensorEvent};

/// DIO0 parameter that clears the latch.
pub const LATCH_CLEAR: u8 = 0x05;
/// DIO0 parameter that re-arms the latch for the next tip.
pub const LATCH_ARM: u8 = 0x04;
/// Pause between clearing and re-arming the latch.
pub const LATCH_RESET_DELAY: Duration = Duration::from_millis(10);

/// Settings for a control loop session.
#[derive(Debug, Clone)]
pub struct ControlConfig {
    /// Remote radio that commands are addressed to.
    pub destination: Address64,
    /// Pause between clearing and re-arming the latch.
    pub latch_reset_delay: Duration,
    /// Labels attached to recorded metrics.
    pub labels: SensorLabels,
}

impl Default for ControlConfig {
    fn default() -> Self {
        let destination = Address64::default();
        ControlConfig {
            destination,
            latch_reset_delay: LATCH_RESET_DELAY,
            labels: SensorLabels::new(destination.to_string(), ""),
        }
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No frame arrived within the transport's read timeout.
    Timeout,
}

/// Where the loop is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for the next frame.
    Running,
    /// Reacting to a validated frame.
    DispatchingFrame,
    /// Terminal.
    Stopped(StopReason),
}

/// Outcome of a single iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    /// A tip was counted and the latch reset.
    Tip {
        /// Tip count after this tip.
        count: u64,
    },
    /// The switch was open; a supply voltage query was sent.
    VoltageRequested,
    /// A supply voltage reading arrived.
    Voltage {
        /// Raw ADC value.
        raw: u16,
        /// Reading in millivolts.
        millivolts: u32,
    },
    /// A malformed or corrupt frame was dropped.
    Discarded,
    /// A valid frame that needs no reaction.
    Ignored,
    /// The loop has stopped.
    Stopped(StopReason),
}

/// Drives the read, decode, interpret, react cycle over a transport.
pub struct ControlLoop<T> {
    reader: FrameReader<T>,
    config: ControlConfig,
    state: LoopState,
    tip_count: u64,
}

impl<T: Read + Write> ControlLoop<T> {
    /// Create a loop over the given transport. The tip count starts at zero.
    pub fn new(transport: T, config: ControlConfig) -> Self {
        ControlLoop {
            reader: FrameReader::new(transport),
            config,
            state: LoopState::Running,
            tip_count: 0,
        }
    }

    /// Tips counted this session.
    pub fn tip_count(&self) -> u64 {
        self.tip_count
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        self.reader.get_ref()
    }

    /// Consume the loop, returning the transport.
    pub fn into_transport(self) -> T {
        self.reader.into_inner()
    }

    /// Run until the loop stops, discarding per-iteration events.
    pub fn run(&mut self) -> RunnerResult<StopReason> {
        self.run_with(|_| {})
    }

    /// Run until the loop stops, passing every event to `on_event`.
    pub fn run_with<F>(&mut self, mut on_event: F) -> RunnerResult<StopReason>
    where
        F: FnMut(&LoopEvent),
    {
        loop {
            let event = self.step()?;
            on_event(&event);
            if let LoopEvent::Stopped(reason) = event {
                return Ok(reason);
            }
        }
    }

    /// Run one iteration: read one frame (or one stray byte) and react to it.
    pub fn step(&mut self) -> RunnerResult<LoopEvent> {
        if let LoopState::Stopped(reason) = self.state {
            return Ok(LoopEvent::Stopped(reason));
        }

        let raw = match self.reader.read_frame() {
            Ok(raw) => raw,
            Err(FrameError::ReadTimeout) => {
                error!("serial read timed out");
                self.state = LoopState::Stopped(StopReason::Timeout);
                return Ok(LoopEvent::Stopped(StopReason::Timeout));
            }
            Err(FrameError::MalformedFrame { bytes }) => {
                info!("Bad frame rcvd; first byte not delimiter: {}", hex::encode(&bytes));
                metric_defs::FRAMES_MALFORMED.increment(&self.config.labels);
                return Ok(LoopEvent::Discarded);
            }
            Err(FrameError::BadChecksum { bytes }) => {
                warn!("Bad frame: {}", hex::encode(&bytes));
                metric_defs::FRAMES_BAD_CHECKSUM.increment(&self.config.labels);
                return Ok(LoopEvent::Discarded);
            }
            Err(e @ FrameError::PayloadTooShort { .. }) => return Ok(self.discard_short(&e)),
            Err(FrameError::Io(e)) => return Err(RunnerError::Transport(e)),
        };

        info!("Good frame rcvd: {}", raw.to_hex());
        metric_defs::FRAMES_RECEIVED.increment(&self.config.labels);

        let frame = match raw.decode() {
            Ok(frame) => frame,
            Err(e) => return Ok(self.discard_short(&e)),
        };

        self.state = LoopState::DispatchingFrame;
        let result = self.dispatch(&frame);
        self.state = LoopState::Running;
        result
    }

    /// A checksum-valid frame too short for its type.
    fn discard_short(&self, err: &FrameError) -> LoopEvent {
        warn!("Bad frame: {}", err);
        metric_defs::FRAMES_MALFORMED.increment(&self.config.labels);
        LoopEvent::Discarded
    }

    fn dispatch(&mut self, frame: &Frame) -> RunnerResult<LoopEvent> {
        match sensor::interpret(frame) {
            SensorEvent::Tip => {
                self.tip_count += 1;
                info!(tip_count = self.tip_count, "TIPCOUNT: {}", self.tip_count);
                metric_defs::TIPS.increment(&self.config.labels);

                self.send(RemoteAtCommand::new(AtCommand::DIO0, &[LATCH_CLEAR], true))?;
                thread::sleep(self.config.latch_reset_delay);
                self.send(RemoteAtCommand::new(AtCommand::DIO0, &[LATCH_ARM], true))?;

                Ok(LoopEvent::Tip { count: self.tip_count })
            }
            SensorEvent::SwitchOpen => {
                debug!("switch open");
                self.send(RemoteAtCommand::new(AtCommand::SUPPLY_VOLTAGE, &[], false))?;
                Ok(LoopEvent::VoltageRequested)
            }
            SensorEvent::SupplyVoltage { raw, millivolts } => {
                info!(raw, "mV: {:4}", millivolts);
                metric_defs::SUPPLY_VOLTAGE.set(f64::from(millivolts), &self.config.labels);
                Ok(LoopEvent::Voltage { raw, millivolts })
            }
            SensorEvent::Ignored => Ok(LoopEvent::Ignored),
        }
    }

    fn send(&mut self, command: RemoteAtCommand) -> RunnerResult<()> {
        let bytes = command.with_destination(self.config.destination).encode()?;
        info!("RemoteATComm frame: {}", hex::encode(&bytes));

        let transport = self.reader.get_mut();
        transport.write_all(&bytes)?;
        transport.flush()?;
        metric_defs::FRAMES_SENT.increment(&self.config.labels);
        Ok(())
    }
}
