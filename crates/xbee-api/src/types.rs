//! Common types used in the protocol.

use std::fmt;
use std::str::FromStr;

use crate::constants::*;
use crate::error::CommandError;

/// A 64-bit IEEE device address, most significant byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address64(pub [u8; 8]);

impl Address64 {
    /// Broadcast address.
    pub const BROADCAST: Address64 = Address64([0, 0, 0, 0, 0, 0, 0xFF, 0xFF]);

    /// Create a new address from bytes.
    pub fn new(bytes: [u8; 8]) -> Self {
        Address64(bytes)
    }

    /// Create from a slice. Returns None if the slice is shorter than 8 bytes.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; 8] = slice.get(..8)?.try_into().ok()?;
        Some(Address64(bytes))
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// The address as an integer.
    pub fn as_u64(&self) -> u64 {
        u64::from_be_bytes(self.0)
    }

    /// Get the bytes as a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for Address64 {
    fn default() -> Self {
        Address64(DEFAULT_DESTINATION_ADDRESS)
    }
}

impl fmt::Display for Address64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.as_u64())
    }
}

impl FromStr for Address64 {
    type Err = hex::FromHexError;

    /// Parse 16 hex digits, optionally prefixed with `0x`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches("0x").trim_start_matches("0X");
        let mut bytes = [0u8; 8];
        hex::decode_to_slice(digits, &mut bytes)?;
        Ok(Address64(bytes))
    }
}

/// A two-character AT command code such as `D0` or `%V`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtCommand(pub [u8; 2]);

impl AtCommand {
    /// Supply voltage query (`%V`).
    pub const SUPPLY_VOLTAGE: AtCommand = AtCommand(AT_SUPPLY_VOLTAGE);
    /// DIO0 configuration (`D0`).
    pub const DIO0: AtCommand = AtCommand(AT_DIO0_CONFIG);

    /// Create a command code from a two-character ASCII string.
    pub fn new(code: &str) -> Result<Self, CommandError> {
        match code.as_bytes() {
            &[a, b] if a.is_ascii_graphic() && b.is_ascii_graphic() => Ok(AtCommand([a, b])),
            _ => Err(CommandError::InvalidCommandCode(code.to_string())),
        }
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 2] {
        &self.0
    }
}

impl fmt::Display for AtCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl FromStr for AtCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AtCommand::new(s)
    }
}

/// Status byte returned with an AT command response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// Command accepted.
    Ok,
    /// Generic error.
    Error,
    /// Command code not recognised.
    InvalidCommand,
    /// Parameter rejected.
    InvalidParameter,
    /// The remote device could not be reached.
    TransmissionFailure,
    /// Unknown status code.
    Unknown(u8),
}

impl CommandStatus {
    /// Whether the remote device accepted the command.
    pub fn is_ok(&self) -> bool {
        matches!(self, CommandStatus::Ok)
    }
}

impl From<u8> for CommandStatus {
    fn from(code: u8) -> Self {
        match code {
            0 => CommandStatus::Ok,
            1 => CommandStatus::Error,
            2 => CommandStatus::InvalidCommand,
            3 => CommandStatus::InvalidParameter,
            4 => CommandStatus::TransmissionFailure,
            _ => CommandStatus::Unknown(code),
        }
    }
}

impl From<CommandStatus> for u8 {
    fn from(status: CommandStatus) -> Self {
        match status {
            CommandStatus::Ok => 0,
            CommandStatus::Error => 1,
            CommandStatus::InvalidCommand => 2,
            CommandStatus::InvalidParameter => 3,
            CommandStatus::TransmissionFailure => 4,
            CommandStatus::Unknown(code) => code,
        }
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandStatus::Ok => write!(f, "OK"),
            CommandStatus::Error => write!(f, "error"),
            CommandStatus::InvalidCommand => write!(f, "invalid command"),
            CommandStatus::InvalidParameter => write!(f, "invalid parameter"),
            CommandStatus::TransmissionFailure => write!(f, "transmission failure"),
            CommandStatus::Unknown(code) => write!(f, "unknown status (0x{:02X})", code),
        }
    }
}
