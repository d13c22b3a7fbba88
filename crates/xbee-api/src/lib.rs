//! XBee API Frame Protocol
//!
//! This crate provides types and utilities for talking to an XBee radio in
//! API mode (escaping disabled) over a serial link. Every message is an API
//! frame: a `0x7E` delimiter, a big-endian length, the frame data (frame type
//! byte first) and a one-byte checksum.
//!
//! # Protocol Overview
//!
//! Only the frames a remote sensor controller needs are modelled:
//!
//! - **Remote AT command** (`0x17`, host → remote): configure a pin or query
//!   a register on a remote device
//! - **IO data sample** (`0x92`, remote → host): digital and analog line states
//! - **Remote AT response** (`0x97`, remote → host): status and register value
//!
//! Any other frame type is still read and checksum-verified, then surfaced as
//! [`Frame::Other`].
//!
//! # Example
//!
//! ```rust,ignore
//! use xbee_api::{AtCommand, Frame, FrameReader, RemoteAtCommand};
//!
//! // Build a command
//! let bytes = RemoteAtCommand::new(AtCommand::SUPPLY_VOLTAGE, &[], false).encode()?;
//!
//! // Read a frame from a serial port
//! let mut reader = FrameReader::new(port);
//! let (raw, frame) = reader.next_frame()?;
//! ```

mod checksum;
mod commands;
mod constants;
mod error;
mod frame;
mod responses;
mod types;

pub use checksum::*;
pub use commands::*;
pub use constants::*;
pub use error::*;
pub use frame::*;
pub use responses::*;
pub use types::*;
