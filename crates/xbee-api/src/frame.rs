//! Frame reading utilities.
//!
//! API frames are delimited, length-prefixed (big-endian) and checksummed:
//!
//! ```text
//! +------+--------+--------+----------------------+----------+
//! | 0x7E | len_hi | len_lo | frame data[0..len]   | checksum |
//! +------+--------+--------+----------------------+----------+
//! ```
//!
//! The first frame-data byte is the frame type. The checksum is not counted
//! in `len`.

use std::io::{ErrorKind, Read};

use crate::checksum::verify_checksum;
use crate::constants::*;
use crate::error::FrameError;
use crate::responses::{Frame, FrameType};

/// A complete, checksum-verified frame as it appeared on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    bytes: Vec<u8>,
}

impl RawFrame {
    /// Validate a complete frame held in memory.
    ///
    /// Checks the delimiter, that the declared length matches the buffer, and
    /// the checksum.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, FrameError> {
        if bytes.first() != Some(&FRAME_DELIMITER) {
            let bytes = bytes.into_iter().take(1).collect();
            return Err(FrameError::MalformedFrame { bytes });
        }
        if bytes.len() < FRAME_OVERHEAD {
            return Err(FrameError::PayloadTooShort {
                frame_type: 0,
                expected: FRAME_OVERHEAD,
                actual: bytes.len(),
            });
        }
        let declared = u16::from_be_bytes([bytes[1], bytes[2]]) as usize;
        if declared + FRAME_OVERHEAD != bytes.len() || !verify_checksum(&bytes) {
            return Err(FrameError::BadChecksum { bytes });
        }
        Ok(RawFrame { bytes })
    }

    /// The whole frame including delimiter, length and checksum.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume into the underlying bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Declared frame-data length.
    pub fn length(&self) -> u16 {
        u16::from_be_bytes([self.bytes[1], self.bytes[2]])
    }

    /// Frame data between the length field and the checksum.
    pub fn frame_data(&self) -> &[u8] {
        &self.bytes[FRAME_HEADER_SIZE..self.bytes.len() - 1]
    }

    /// Trailing checksum byte.
    pub fn checksum(&self) -> u8 {
        self.bytes[self.bytes.len() - 1]
    }

    /// Frame type, if the frame carries any data.
    pub fn frame_type(&self) -> Option<FrameType> {
        self.frame_data().first().map(|&code| FrameType::from(code))
    }

    /// Decode the frame data into a typed frame.
    pub fn decode(&self) -> Result<Frame, FrameError> {
        Frame::decode(self.frame_data())
    }

    /// Hex dump of the frame, as written to the log.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

/// Where the reader is within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    AwaitDelimiter,
    ReadLength,
    ReadPayloadAndChecksum,
    Validate,
}

/// Reads API frames from a blocking byte source such as a serial port.
///
/// The source's own read timeout bounds each read. A source that yields no
/// data (timeout or end of stream), or fewer bytes than a frame needs, ends
/// the read with [`FrameError::ReadTimeout`].
#[derive(Debug)]
pub struct FrameReader<R> {
    source: R,
}

impl<R: Read> FrameReader<R> {
    /// Create a reader over the given byte source.
    pub fn new(source: R) -> Self {
        FrameReader { source }
    }

    /// Read the next checksum-verified frame.
    ///
    /// A non-delimiter byte where a frame should start is returned as
    /// [`FrameError::MalformedFrame`] after consuming only that byte, so the
    /// next call resynchronises one byte at a time.
    pub fn read_frame(&mut self) -> Result<RawFrame, FrameError> {
        let mut bytes = Vec::with_capacity(FRAME_OVERHEAD);
        let mut state = DecodeState::AwaitDelimiter;

        loop {
            state = match state {
                DecodeState::AwaitDelimiter => {
                    let byte = self.read_exactly(1)?[0];
                    if byte != FRAME_DELIMITER {
                        return Err(FrameError::MalformedFrame { bytes: vec![byte] });
                    }
                    bytes.push(byte);
                    DecodeState::ReadLength
                }
                DecodeState::ReadLength => {
                    bytes.extend_from_slice(&self.read_exactly(2)?);
                    DecodeState::ReadPayloadAndChecksum
                }
                DecodeState::ReadPayloadAndChecksum => {
                    let len = u16::from_be_bytes([bytes[1], bytes[2]]) as usize;
                    bytes.extend_from_slice(&self.read_exactly(len + 1)?);
                    DecodeState::Validate
                }
                DecodeState::Validate => {
                    if !verify_checksum(&bytes) {
                        return Err(FrameError::BadChecksum { bytes });
                    }
                    return Ok(RawFrame { bytes });
                }
            };
        }
    }

    /// Read the next frame and decode it.
    pub fn next_frame(&mut self) -> Result<(RawFrame, Frame), FrameError> {
        let raw = self.read_frame()?;
        let frame = raw.decode()?;
        Ok((raw, frame))
    }

    fn read_exactly(&mut self, n: usize) -> Result<Vec<u8>, FrameError> {
        let mut buf = vec![0u8; n];
        match self.source.read_exact(&mut buf) {
            Ok(()) => Ok(buf),
            Err(e) if is_timeout(e.kind()) => Err(FrameError::ReadTimeout),
            Err(e) => Err(FrameError::Io(e)),
        }
    }
}

impl<R> FrameReader<R> {
    /// Get a reference to the byte source.
    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// Get a mutable reference to the byte source.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.source
    }

    /// Consume the reader, returning the byte source.
    pub fn into_inner(self) -> R {
        self.source
    }
}

fn is_timeout(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::UnexpectedEof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::compute_checksum;
    use std::io::Cursor;

    fn build_frame(data: &[u8]) -> Vec<u8> {
        let mut frame = vec![FRAME_DELIMITER];
        frame.extend_from_slice(&(data.len() as u16).to_be_bytes());
        frame.extend_from_slice(data);
        frame.push(compute_checksum(data));
        frame
    }

    #[test]
    fn test_read_single_frame() {
        let wire = build_frame(&[0x8B, 0x01, 0x02, 0x03]);
        let mut reader = FrameReader::new(Cursor::new(wire.clone()));

        let raw = reader.read_frame().expect("should read frame");
        assert_eq!(raw.as_bytes(), wire.as_slice());
        assert_eq!(raw.length(), 4);
        assert_eq!(raw.frame_data(), &[0x8B, 0x01, 0x02, 0x03]);
        assert_eq!(raw.frame_type(), Some(FrameType::Other(0x8B)));

        assert!(matches!(reader.read_frame(), Err(FrameError::ReadTimeout)));
    }

    #[test]
    fn test_read_multiple_frames() {
        let mut wire = build_frame(&[0x8B, 0x01]);
        wire.extend(build_frame(&[0x8A, 0x06]));
        let mut reader = FrameReader::new(Cursor::new(wire));

        assert_eq!(reader.read_frame().unwrap().frame_data(), &[0x8B, 0x01]);
        assert_eq!(reader.read_frame().unwrap().frame_data(), &[0x8A, 0x06]);
        assert!(matches!(reader.read_frame(), Err(FrameError::ReadTimeout)));
    }

    #[test]
    fn test_resync_one_byte_at_a_time() {
        let mut wire = vec![0x00, 0x13];
        wire.extend(build_frame(&[0x8B, 0x01]));
        let mut reader = FrameReader::new(Cursor::new(wire));

        match reader.read_frame() {
            Err(FrameError::MalformedFrame { bytes }) => assert_eq!(bytes, vec![0x00]),
            other => panic!("expected malformed frame, got {:?}", other),
        }
        match reader.read_frame() {
            Err(FrameError::MalformedFrame { bytes }) => assert_eq!(bytes, vec![0x13]),
            other => panic!("expected malformed frame, got {:?}", other),
        }
        assert_eq!(reader.read_frame().unwrap().frame_data(), &[0x8B, 0x01]);
    }

    #[test]
    fn test_bad_checksum_consumes_frame() {
        let mut bad = build_frame(&[0x8B, 0x01]);
        let last = bad.len() - 1;
        bad[last] ^= 0xFF;
        let mut wire = bad.clone();
        wire.extend(build_frame(&[0x8B, 0x02]));
        let mut reader = FrameReader::new(Cursor::new(wire));

        match reader.read_frame() {
            Err(FrameError::BadChecksum { bytes }) => assert_eq!(bytes, bad),
            other => panic!("expected bad checksum, got {:?}", other),
        }
        assert_eq!(reader.read_frame().unwrap().frame_data(), &[0x8B, 0x02]);
    }

    #[test]
    fn test_short_read_is_timeout() {
        let wire = build_frame(&[0x8B, 0x01, 0x02]);
        let truncated = wire[..wire.len() - 2].to_vec();
        let mut reader = FrameReader::new(Cursor::new(truncated));
        assert!(matches!(reader.read_frame(), Err(FrameError::ReadTimeout)));

        let mut reader = FrameReader::new(Cursor::new(vec![FRAME_DELIMITER, 0x00]));
        assert!(matches!(reader.read_frame(), Err(FrameError::ReadTimeout)));
    }

    #[test]
    fn test_empty_source_is_timeout() {
        let mut reader = FrameReader::new(Cursor::new(Vec::new()));
        assert!(matches!(reader.read_frame(), Err(FrameError::ReadTimeout)));
    }

    struct FailingSource(ErrorKind);

    impl Read for FailingSource {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(self.0, "source failure"))
        }
    }

    #[test]
    fn test_timeout_error_kind_maps_to_read_timeout() {
        let mut reader = FrameReader::new(FailingSource(ErrorKind::TimedOut));
        assert!(matches!(reader.read_frame(), Err(FrameError::ReadTimeout)));
    }

    #[test]
    fn test_transport_fault_propagates() {
        let mut reader = FrameReader::new(FailingSource(ErrorKind::BrokenPipe));
        match reader.read_frame() {
            Err(FrameError::Io(e)) => assert_eq!(e.kind(), ErrorKind::BrokenPipe),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[test]
    fn test_next_frame_decodes() {
        let wire = build_frame(&[0x8B, 0x01]);
        let mut reader = FrameReader::new(Cursor::new(wire));
        let (_, frame) = reader.next_frame().unwrap();
        assert_eq!(frame.frame_type(), FrameType::Other(0x8B));
    }

    #[test]
    fn test_raw_frame_from_bytes() {
        let wire = build_frame(&[0x8B, 0x01]);
        let raw = RawFrame::from_bytes(wire.clone()).unwrap();
        assert_eq!(raw.checksum(), wire[wire.len() - 1]);
        assert_eq!(raw.to_hex(), hex::encode(&wire));

        let mut long = wire.clone();
        long.push(0x00);
        assert!(matches!(RawFrame::from_bytes(long), Err(FrameError::BadChecksum { .. })));

        assert!(matches!(
            RawFrame::from_bytes(vec![0x00, 0x00, 0x00, 0xFF]),
            Err(FrameError::MalformedFrame { .. })
        ));
        assert!(RawFrame::from_bytes(vec![FRAME_DELIMITER, 0x00]).is_err());
    }
}
