//! Typed API frames received from the modem.

use std::fmt;

use crate::constants::*;
use crate::error::FrameError;
use crate::types::*;

/// API frame type, discriminated by the first frame-data byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
    /// Remote AT command request (outbound only).
    RemoteAtCommand,
    /// ZigBee IO data sample indicator.
    IoDataSample,
    /// Remote AT command response.
    RemoteAtResponse,
    /// Any frame type this controller does not consume.
    Other(u8),
}

impl From<u8> for FrameType {
    fn from(code: u8) -> Self {
        match code {
            FRAME_TYPE_REMOTE_AT_COMMAND => FrameType::RemoteAtCommand,
            FRAME_TYPE_IO_DATA_SAMPLE => FrameType::IoDataSample,
            FRAME_TYPE_REMOTE_AT_RESPONSE => FrameType::RemoteAtResponse,
            _ => FrameType::Other(code),
        }
    }
}

impl From<FrameType> for u8 {
    fn from(frame_type: FrameType) -> Self {
        match frame_type {
            FrameType::RemoteAtCommand => FRAME_TYPE_REMOTE_AT_COMMAND,
            FrameType::IoDataSample => FRAME_TYPE_IO_DATA_SAMPLE,
            FrameType::RemoteAtResponse => FRAME_TYPE_REMOTE_AT_RESPONSE,
            FrameType::Other(code) => code,
        }
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameType::RemoteAtCommand => write!(f, "remote AT command"),
            FrameType::IoDataSample => write!(f, "IO data sample"),
            FrameType::RemoteAtResponse => write!(f, "remote AT response"),
            FrameType::Other(code) => write!(f, "frame type 0x{:02X}", code),
        }
    }
}

/// A decoded API frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// IO data sample from a remote device.
    IoDataSample(IoDataSample),

    /// Response to a remote AT command.
    RemoteAtResponse(RemoteAtResponse),

    /// A structurally valid frame of a type that is not interpreted.
    Other {
        /// Frame type.
        frame_type: FrameType,
        /// Frame data after the frame type byte.
        data: Vec<u8>,
    },
}

impl Frame {
    /// Decode frame data (frame type byte first, no header or checksum).
    pub fn decode(frame_data: &[u8]) -> Result<Self, FrameError> {
        let Some(&code) = frame_data.first() else {
            return Err(FrameError::PayloadTooShort {
                frame_type: 0,
                expected: 1,
                actual: 0,
            });
        };

        match FrameType::from(code) {
            FrameType::IoDataSample => Ok(Frame::IoDataSample(IoDataSample::decode(frame_data)?)),
            FrameType::RemoteAtResponse => Ok(Frame::RemoteAtResponse(RemoteAtResponse::decode(frame_data)?)),
            frame_type => Ok(Frame::Other {
                frame_type,
                data: frame_data[1..].to_vec(),
            }),
        }
    }

    /// The frame's type.
    pub fn frame_type(&self) -> FrameType {
        match self {
            Frame::IoDataSample(_) => FrameType::IoDataSample,
            Frame::RemoteAtResponse(_) => FrameType::RemoteAtResponse,
            Frame::Other { frame_type, .. } => *frame_type,
        }
    }
}

/// ZigBee IO data sample indicator (frame type 0x92).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IoDataSample {
    /// 64-bit address of the sending device.
    pub source_address: Address64,
    /// 16-bit network address of the sending device.
    pub source_network: u16,
    /// Receive options.
    pub receive_options: u8,
    /// Number of sample sets.
    pub sample_count: u8,
    /// Which DIO lines report digital state.
    pub digital_mask: u16,
    /// Which ADC lines report analog readings.
    pub analog_mask: u8,
    /// Digital state per DIO line. Zero when no digital lines are enabled.
    pub digital_value: u16,
    /// Analog readings in ascending channel order.
    pub analog_samples: Vec<u16>,
}

impl IoDataSample {
    /// Decode from frame data.
    pub fn decode(data: &[u8]) -> Result<Self, FrameError> {
        ensure_len(data, IO_SAMPLE_MIN_LEN)?;

        let digital_mask = read_u16(data, IO_SAMPLE_DIGITAL_MASK);
        let mut i = IO_SAMPLE_DIGITAL_VALUE;
        let digital_value = if digital_mask != 0 {
            ensure_len(data, IO_SAMPLE_DIGITAL_VALUE + 2)?;
            i += 2;
            read_u16(data, IO_SAMPLE_DIGITAL_VALUE)
        } else {
            0
        };

        let analog_mask = data[IO_SAMPLE_ANALOG_MASK];
        let mut analog_samples = Vec::with_capacity(analog_mask.count_ones() as usize);
        for _ in 0..analog_mask.count_ones() {
            if i + 2 > data.len() {
                break;
            }
            analog_samples.push(read_u16(data, i));
            i += 2;
        }

        Ok(IoDataSample {
            source_address: Address64::from_slice(&data[IO_SAMPLE_SOURCE_ADDRESS..]).unwrap_or_default(),
            source_network: read_u16(data, IO_SAMPLE_SOURCE_NETWORK),
            receive_options: data[IO_SAMPLE_RECEIVE_OPTIONS],
            sample_count: data[IO_SAMPLE_COUNT],
            digital_mask,
            analog_mask,
            digital_value,
            analog_samples,
        })
    }

    /// Whether a DIO line is enabled and reads high.
    pub fn digital_line(&self, line: u8) -> bool {
        line < 16 && self.digital_mask & self.digital_value & (1 << line) != 0
    }
}

/// Remote AT command response (frame type 0x97).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAtResponse {
    /// Frame id of the request this answers.
    pub frame_id: u8,
    /// 64-bit address of the responding device.
    pub source_address: Address64,
    /// 16-bit network address of the responding device.
    pub source_network: u16,
    /// Command code being answered.
    pub command: AtCommand,
    /// Command status.
    pub status: CommandStatus,
    /// Command data (register value for queries).
    pub data: Vec<u8>,
}

impl RemoteAtResponse {
    /// Decode from frame data.
    pub fn decode(data: &[u8]) -> Result<Self, FrameError> {
        ensure_len(data, AT_RESPONSE_MIN_LEN)?;

        Ok(RemoteAtResponse {
            frame_id: data[AT_RESPONSE_FRAME_ID],
            source_address: Address64::from_slice(&data[AT_RESPONSE_SOURCE_ADDRESS..]).unwrap_or_default(),
            source_network: read_u16(data, AT_RESPONSE_SOURCE_NETWORK),
            command: AtCommand([data[AT_RESPONSE_COMMAND], data[AT_RESPONSE_COMMAND + 1]]),
            status: CommandStatus::from(data[AT_RESPONSE_STATUS]),
            data: data[AT_RESPONSE_DATA..].to_vec(),
        })
    }

    /// The first two data bytes as a big-endian register value.
    pub fn value_u16(&self) -> Option<u16> {
        match self.data.as_slice() {
            [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo])),
            _ => None,
        }
    }
}

fn ensure_len(data: &[u8], expected: usize) -> Result<(), FrameError> {
    if data.len() < expected {
        return Err(FrameError::PayloadTooShort {
            frame_type: data.first().copied().unwrap_or(0),
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}
