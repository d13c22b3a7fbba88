//! Commands that can be sent to a remote device.

use bytes::BufMut;

use crate::checksum::compute_checksum;
use crate::constants::*;
use crate::error::CommandError;
use crate::types::*;

/// Largest parameter that still fits the 16-bit length field.
pub const MAX_PARAMETER_LEN: usize = u16::MAX as usize - REMOTE_AT_COMMAND_FIXED_LEN - 2;

/// Remote AT command request (frame type 0x17).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAtCommand {
    /// Frame id. Nonzero requests a response frame.
    pub frame_id: u8,
    /// 64-bit address of the target device.
    pub destination: Address64,
    /// 16-bit network address of the target, `0xFFFE` when unknown.
    pub network_address: u16,
    /// Remote command options.
    pub options: u8,
    /// Command code.
    pub command: AtCommand,
    /// Parameter bytes. Empty queries the register.
    pub parameter: Vec<u8>,
}

impl RemoteAtCommand {
    /// Create a command for the default destination that applies changes
    /// immediately, optionally without acknowledgement.
    pub fn new(command: AtCommand, parameter: &[u8], disable_ack: bool) -> Self {
        let mut options = REMOTE_OPTION_APPLY_CHANGES;
        if disable_ack {
            options += REMOTE_OPTION_DISABLE_ACK;
        }
        RemoteAtCommand {
            frame_id: DEFAULT_FRAME_ID,
            destination: Address64::default(),
            network_address: UNKNOWN_NETWORK_ADDRESS,
            options,
            command,
            parameter: parameter.to_vec(),
        }
    }

    /// Address the command to a different device.
    pub fn with_destination(mut self, destination: Address64) -> Self {
        self.destination = destination;
        self
    }

    /// Use a different frame id.
    pub fn with_frame_id(mut self, frame_id: u8) -> Self {
        self.frame_id = frame_id;
        self
    }

    /// Whether the remote device is asked not to acknowledge.
    pub fn ack_disabled(&self) -> bool {
        self.options & REMOTE_OPTION_DISABLE_ACK != 0
    }

    /// Frame data length as declared in the length field.
    pub fn frame_data_len(&self) -> usize {
        REMOTE_AT_COMMAND_FIXED_LEN + self.command.as_bytes().len() + self.parameter.len()
    }

    /// Encode the complete API frame, including delimiter, length and checksum.
    pub fn encode(&self) -> Result<Vec<u8>, CommandError> {
        if self.parameter.len() > MAX_PARAMETER_LEN {
            return Err(CommandError::ParameterTooLong {
                max: MAX_PARAMETER_LEN,
                actual: self.parameter.len(),
            });
        }

        let len = self.frame_data_len();
        let mut buf = Vec::with_capacity(len + FRAME_OVERHEAD);
        buf.push(FRAME_DELIMITER);
        buf.put_u16(len as u16);
        buf.push(FRAME_TYPE_REMOTE_AT_COMMAND);
        buf.push(self.frame_id);
        buf.extend_from_slice(self.destination.as_bytes());
        buf.put_u16(self.network_address);
        buf.push(self.options);
        buf.extend_from_slice(self.command.as_bytes());
        buf.extend_from_slice(&self.parameter);

        let checksum = compute_checksum(&buf[FRAME_HEADER_SIZE..]);
        buf.push(checksum);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::verify_checksum;
    use crate::frame::RawFrame;

    #[test]
    fn test_encode_clear_latch_bytes() {
        let frame = RemoteAtCommand::new(AtCommand::DIO0, &[0x05], true)
            .encode()
            .unwrap();
        let expected: Vec<u8> = vec![
            0x7E, 0x00, 0x10, // delimiter, length 16
            0x17, 0x04, // remote AT command, frame id
            0x00, 0x13, 0xA2, 0x00, 0x40, 0xA0, 0x96, 0xA1, // destination
            0xFF, 0xFE, // unknown network address
            0x03, // apply changes + disable ACK
            b'D', b'0', 0x05,
        ];
        assert_eq!(&frame[..frame.len() - 1], expected.as_slice());
        assert_eq!(frame[frame.len() - 1], compute_checksum(&expected[3..]));
        assert!(verify_checksum(&frame));
    }

    #[test]
    fn test_encode_voltage_query() {
        let cmd = RemoteAtCommand::new(AtCommand::SUPPLY_VOLTAGE, &[], false);
        assert!(!cmd.ack_disabled());
        let frame = cmd.encode().unwrap();
        assert_eq!(frame.len(), 15 + FRAME_OVERHEAD);
        assert_eq!(&frame[1..3], &[0x00, 0x0F]);
        assert_eq!(frame[15], REMOTE_OPTION_APPLY_CHANGES);
        assert_eq!(&frame[16..18], b"%V");
        assert!(verify_checksum(&frame));
    }

    #[test]
    fn test_declared_length_matches_frame() {
        let codes = ["D0", "%V", "WR", "ST", "D3"];
        let params: [&[u8]; 4] = [&[], &[0x04], &[0x7D, 0x00], &[0xAA; 64]];
        for code in codes {
            for param in params {
                for disable_ack in [false, true] {
                    let cmd = RemoteAtCommand::new(AtCommand::new(code).unwrap(), param, disable_ack);
                    let frame = cmd.encode().unwrap();
                    let declared = u16::from_be_bytes([frame[1], frame[2]]) as usize;
                    assert_eq!(declared, frame.len() - FRAME_OVERHEAD);
                    assert_eq!(declared, param.len() + 15);
                    assert!(verify_checksum(&frame));
                    assert!(RawFrame::from_bytes(frame).is_ok());
                }
            }
        }
    }

    #[test]
    fn test_with_destination_and_frame_id() {
        let dest = Address64::new([1, 2, 3, 4, 5, 6, 7, 8]);
        let frame = RemoteAtCommand::new(AtCommand::DIO0, &[0x04], true)
            .with_destination(dest)
            .with_frame_id(0x2A)
            .encode()
            .unwrap();
        assert_eq!(frame[4], 0x2A);
        assert_eq!(&frame[5..13], dest.as_bytes());
        assert!(verify_checksum(&frame));
    }

    #[test]
    fn test_parameter_too_long() {
        let cmd = RemoteAtCommand::new(AtCommand::DIO0, &vec![0u8; MAX_PARAMETER_LEN + 1], false);
        assert_eq!(
            cmd.encode(),
            Err(CommandError::ParameterTooLong {
                max: MAX_PARAMETER_LEN,
                actual: MAX_PARAMETER_LEN + 1,
            })
        );
    }
}
