//! API frame checksum.
//!
//! The checksum covers the frame data only (frame type through the last
//! field), never the delimiter or the length bytes. A frame is valid when the
//! low byte of the sum of its frame data and checksum is `0xFF`.

use crate::constants::{CHECKSUM_TARGET, FRAME_HEADER_SIZE, FRAME_OVERHEAD};

/// Compute the checksum byte for the given frame data.
pub fn compute_checksum(frame_data: &[u8]) -> u8 {
    CHECKSUM_TARGET.wrapping_sub(sum_low_byte(frame_data))
}

/// Verify the checksum of a complete frame (delimiter, length, data, checksum).
///
/// Anything shorter than a header plus checksum byte is rejected.
pub fn verify_checksum(frame: &[u8]) -> bool {
    if frame.len() < FRAME_OVERHEAD {
        return false;
    }
    sum_low_byte(&frame[FRAME_HEADER_SIZE..]) == CHECKSUM_TARGET
}

fn sum_low_byte(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_header(data: &[u8]) -> Vec<u8> {
        let mut frame = vec![0x7E, 0x00, data.len() as u8];
        frame.extend_from_slice(data);
        frame
    }

    #[test]
    fn test_compute_checksum_known_frame() {
        // Local AT "NJ": 0x08 + 0x01 + 0x4E + 0x4A = 0xA1
        assert_eq!(compute_checksum(&[0x08, 0x01, 0x4E, 0x4A]), 0x5E);
    }

    #[test]
    fn test_compute_checksum_empty() {
        assert_eq!(compute_checksum(&[]), 0xFF);
    }

    #[test]
    fn test_appended_checksum_verifies() {
        let samples: [&[u8]; 5] = [
            &[],
            &[0x00],
            &[0xFF, 0xFF, 0xFF],
            &[0x92, 0x00, 0x13, 0xA2, 0x00, 0x40, 0xA0, 0x96, 0xA1],
            &[0x01; 300],
        ];
        for data in samples {
            let mut frame = with_header(data);
            frame.push(compute_checksum(data));
            assert!(verify_checksum(&frame), "data {:02X?} should verify", data);
        }
    }

    #[test]
    fn test_verify_rejects_corruption() {
        let data = [0x97, 0x04, 0x25, 0x56];
        let mut frame = with_header(&data);
        frame.push(compute_checksum(&data));
        frame[4] ^= 0x10;
        assert!(!verify_checksum(&frame));
    }

    #[test]
    fn test_verify_ignores_header_bytes() {
        let data = [0x17, 0x04];
        let mut frame = with_header(&data);
        frame.push(compute_checksum(&data));
        frame[1] = 0xAB;
        frame[2] = 0xCD;
        assert!(verify_checksum(&frame));
    }

    #[test]
    fn test_verify_too_short() {
        assert!(!verify_checksum(&[]));
        assert!(!verify_checksum(&[0x7E, 0x00, 0x00]));
        // Header plus a lone 0xFF checksum is the smallest acceptable frame.
        assert!(verify_checksum(&[0x7E, 0x00, 0x00, 0xFF]));
    }
}
