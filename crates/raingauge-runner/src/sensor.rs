//! Interpretation of rain gauge frames.
//!
//! The gauge's reed switch is wired to DIO3 of the remote radio, with the
//! pin's latch holding a closure until it is cleared. The radio's supply
//! voltage is read with the `%V` register, whose ADC reports 1200 mV full
//! scale over 1024 steps.

use xbee_api::{AtCommand, Frame, IoDataSample, RemoteAtResponse};

/// DIO line the tip switch is wired to.
pub const TIP_SWITCH_LINE: u8 = 3;
/// Bit of the digital mask/value words for the tip switch.
pub const TIP_SWITCH_MASK: u16 = 1 << TIP_SWITCH_LINE;

/// Millivolts at the top of the `%V` ADC range.
pub const SUPPLY_ADC_FULL_SCALE_MV: u32 = 1200;
/// Steps in the `%V` ADC range.
pub const SUPPLY_ADC_STEPS: u32 = 1024;

/// What a decoded frame means for the gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorEvent {
    /// The tip switch latched closed.
    Tip,
    /// A sample arrived with the tip switch open.
    SwitchOpen,
    /// Supply voltage reading.
    SupplyVoltage {
        /// Raw ADC value.
        raw: u16,
        /// Converted reading.
        millivolts: u32,
    },
    /// Nothing the controller reacts to.
    Ignored,
}

/// Tip switch state of a sample: [`TIP_SWITCH_MASK`] when closed, `0` otherwise.
pub fn extract_switch_state(sample: &IoDataSample) -> u16 {
    sample.digital_mask & sample.digital_value & TIP_SWITCH_MASK
}

/// Convert a raw `%V` reading to millivolts, truncating.
pub fn millivolts_from_raw(raw: u16) -> u32 {
    u32::from(raw) * SUPPLY_ADC_FULL_SCALE_MV / SUPPLY_ADC_STEPS
}

/// Supply voltage carried by a `%V` response, in millivolts.
///
/// `None` for any other command, or when the response has no value.
pub fn extract_voltage(response: &RemoteAtResponse) -> Option<u32> {
    if response.command != AtCommand::SUPPLY_VOLTAGE {
        return None;
    }
    response.value_u16().map(millivolts_from_raw)
}

/// Classify a decoded frame.
pub fn interpret(frame: &Frame) -> SensorEvent {
    match frame {
        Frame::IoDataSample(sample) => {
            if extract_switch_state(sample) == TIP_SWITCH_MASK {
                SensorEvent::Tip
            } else {
                SensorEvent::SwitchOpen
            }
        }
        Frame::RemoteAtResponse(response) => match (extract_voltage(response), response.value_u16()) {
            (Some(millivolts), Some(raw)) => SensorEvent::SupplyVoltage { raw, millivolts },
            _ => SensorEvent::Ignored,
        },
        Frame::Other { .. } => SensorEvent::Ignored,
    }
}
