//! Protocol constants
//!
//! These constants define the frame delimiter, frame type codes, field
//! offsets, and fixed addressing values used by XBee API mode (escaping
//! disabled).

// ============================================================================
// Framing
// ============================================================================

/// Start delimiter of every API frame (`~`).
pub const FRAME_DELIMITER: u8 = 0x7E;
/// Delimiter plus the two length bytes.
pub const FRAME_HEADER_SIZE: usize = 3;
/// Header plus the trailing checksum byte.
pub const FRAME_OVERHEAD: usize = FRAME_HEADER_SIZE + 1;
/// Low byte of a valid frame's checksum sum.
pub const CHECKSUM_TARGET: u8 = 0xFF;

// ============================================================================
// Frame Types
// ============================================================================

/// Remote AT command request (host → remote device).
pub const FRAME_TYPE_REMOTE_AT_COMMAND: u8 = 0x17;
/// ZigBee IO data sample indicator (remote device → host).
pub const FRAME_TYPE_IO_DATA_SAMPLE: u8 = 0x92;
/// Remote AT command response (remote device → host).
pub const FRAME_TYPE_REMOTE_AT_RESPONSE: u8 = 0x97;

// ============================================================================
// Addressing
// ============================================================================

/// 64-bit address of the deployed rain gauge's radio.
pub const DEFAULT_DESTINATION_ADDRESS: [u8; 8] = [0x00, 0x13, 0xA2, 0x00, 0x40, 0xA0, 0x96, 0xA1];
/// 16-bit network address meaning "unknown, resolve from the 64-bit address".
pub const UNKNOWN_NETWORK_ADDRESS: u16 = 0xFFFE;
/// Frame id used for every outbound request. Nonzero so the modem responds.
pub const DEFAULT_FRAME_ID: u8 = 0x04;

// ============================================================================
// Remote Command Options
// ============================================================================

/// Apply changes on the remote device immediately.
pub const REMOTE_OPTION_APPLY_CHANGES: u8 = 0x02;
/// Suppress the remote device's response.
pub const REMOTE_OPTION_DISABLE_ACK: u8 = 0x01;

/// Bytes of a remote AT command between the length field and the command
/// code: frame type, frame id, 64-bit address, 16-bit address, options.
pub const REMOTE_AT_COMMAND_FIXED_LEN: usize = 13;

// ============================================================================
// IO Data Sample Layout (offsets into frame data, frame type at 0)
// ============================================================================

/// 64-bit source address.
pub const IO_SAMPLE_SOURCE_ADDRESS: usize = 1;
/// 16-bit source network address.
pub const IO_SAMPLE_SOURCE_NETWORK: usize = 9;
/// Receive options byte.
pub const IO_SAMPLE_RECEIVE_OPTIONS: usize = 11;
/// Number of sample sets (always 1 on ZigBee firmware).
pub const IO_SAMPLE_COUNT: usize = 12;
/// 16-bit digital channel mask.
pub const IO_SAMPLE_DIGITAL_MASK: usize = 13;
/// 8-bit analog channel mask.
pub const IO_SAMPLE_ANALOG_MASK: usize = 15;
/// 16-bit digital sample value (present when the digital mask is nonzero).
pub const IO_SAMPLE_DIGITAL_VALUE: usize = 16;
/// Smallest IO data sample that carries a digital mask and analog mask.
pub const IO_SAMPLE_MIN_LEN: usize = 16;

// ============================================================================
// Remote AT Response Layout (offsets into frame data, frame type at 0)
// ============================================================================

/// Frame id echoed from the request.
pub const AT_RESPONSE_FRAME_ID: usize = 1;
/// 64-bit source address.
pub const AT_RESPONSE_SOURCE_ADDRESS: usize = 2;
/// 16-bit source network address.
pub const AT_RESPONSE_SOURCE_NETWORK: usize = 10;
/// Two-character AT command code.
pub const AT_RESPONSE_COMMAND: usize = 12;
/// Command status byte.
pub const AT_RESPONSE_STATUS: usize = 14;
/// Start of the command data.
pub const AT_RESPONSE_DATA: usize = 15;
/// Smallest remote AT response (no command data).
pub const AT_RESPONSE_MIN_LEN: usize = 15;

// ============================================================================
// AT Command Codes
// ============================================================================

/// Supply voltage query.
pub const AT_SUPPLY_VOLTAGE: [u8; 2] = *b"%V";
/// DIO0 pin configuration.
pub const AT_DIO0_CONFIG: [u8; 2] = *b"D0";
