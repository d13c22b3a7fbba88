//! Protocol error types.

use thiserror::Error;

/// Errors produced while reading an API frame from a byte source.
#[derive(Error, Debug)]
pub enum FrameError {
    /// The source produced no data (or too little) before its read timeout.
    #[error("read timed out waiting for frame data")]
    ReadTimeout,

    /// The byte read where a frame should start was not the delimiter.
    #[error("malformed frame: expected start delimiter, got {}", hex::encode(.bytes))]
    MalformedFrame {
        /// The offending bytes.
        bytes: Vec<u8>,
    },

    /// The frame checksum did not verify.
    #[error("bad checksum on frame {}", hex::encode(.bytes))]
    BadChecksum {
        /// The complete frame as received.
        bytes: Vec<u8>,
    },

    /// Frame data is too short for its declared frame type.
    #[error("frame type 0x{frame_type:02X} too short: expected at least {expected} bytes, got {actual}")]
    PayloadTooShort {
        /// Frame type byte.
        frame_type: u8,
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Unrecoverable transport error.
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// Whether the reader can continue with the next frame after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FrameError::MalformedFrame { .. }
                | FrameError::BadChecksum { .. }
                | FrameError::PayloadTooShort { .. }
        )
    }
}

/// Errors building an outbound command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// AT command codes are exactly two ASCII characters.
    #[error("invalid AT command code {0:?}: expected two ASCII characters")]
    InvalidCommandCode(String),

    /// Parameters do not fit in the 16-bit length field.
    #[error("parameter too long: maximum {max} bytes, got {actual}")]
    ParameterTooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual length given.
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(FrameError::MalformedFrame { bytes: vec![0x00] }.is_recoverable());
        assert!(FrameError::BadChecksum { bytes: vec![0x7E] }.is_recoverable());
        assert!(!FrameError::ReadTimeout.is_recoverable());
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        assert!(!FrameError::Io(io).is_recoverable());
    }

    #[test]
    fn test_display_includes_hex_bytes() {
        let err = FrameError::BadChecksum {
            bytes: vec![0x7E, 0x00, 0x02, 0x92, 0x00],
        };
        assert_eq!(err.to_string(), "bad checksum on frame 7e00029200");
    }
}
