//! Seat module message decoding
//!
//! Turns raw CAN frames into typed seat module messages. Both messages the
//! bench listens to have a fixed 8-byte layout, so every field is read from a
//! fixed byte offset.

use crate::types::{BenchError, CanFrame, Result};
use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};
use std::fmt;

/// CAN ID of the `SystemReady` message sent once boot-up completes
pub const SYSTEM_READY_ID: u32 = 0x100;

/// CAN ID of the `ErrorFrame` message sent on a detected fault
pub const ERROR_FRAME_ID: u32 = 0x7FF;

/// Payload length of both seat module messages
pub const PAYLOAD_LEN: usize = 8;

// Full-scale values of the 8-bit analog status bytes
const CURRENT_FULL_SCALE_A: f32 = 20.0;
const TEMPERATURE_FULL_SCALE_C: f32 = 100.0;
const PRESSURE_FULL_SCALE_BAR: f32 = 5.0;

/// `SystemReady` (0x100) status snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemReady {
    /// Byte 0: 0 = OFF, 1 = ON
    pub heating_status: u8,
    /// Byte 1: 0 = OFF, 1 = ON
    pub massage_status: u8,
    /// Byte 2: 0-255 maps to 0-20 A
    pub current: u8,
    /// Byte 3: 0-255 maps to 0-100 °C
    pub temperature: u8,
    /// Byte 4: 0-255 maps to 0-5 bar
    pub pressure: u8,
    /// Byte 5: raw error flag bits
    pub error_flags: u8,
}

impl SystemReady {
    /// Decode the fixed layout from a frame payload
    pub fn from_payload(data: &[u8]) -> Result<Self> {
        check_len("SystemReady", data)?;

        Ok(Self {
            heating_status: data[0],
            massage_status: data[1],
            current: data[2],
            temperature: data[3],
            pressure: data[4],
            error_flags: data[5],
        })
    }

    /// Encode into an 8-byte payload (bytes 6-7 reserved, zero)
    pub fn to_payload(&self) -> [u8; PAYLOAD_LEN] {
        [
            self.heating_status,
            self.massage_status,
            self.current,
            self.temperature,
            self.pressure,
            self.error_flags,
            0,
            0,
        ]
    }

    pub fn heating_on(&self) -> bool {
        self.heating_status == 1
    }

    pub fn massage_on(&self) -> bool {
        self.massage_status == 1
    }

    /// Supply current in amperes
    pub fn current_amps(&self) -> f32 {
        scale(self.current, CURRENT_FULL_SCALE_A)
    }

    /// Seat temperature in degrees Celsius
    pub fn temperature_celsius(&self) -> f32 {
        scale(self.temperature, TEMPERATURE_FULL_SCALE_C)
    }

    /// Massage pump pressure in bar
    pub fn pressure_bar(&self) -> f32 {
        scale(self.pressure, PRESSURE_FULL_SCALE_BAR)
    }
}

/// Fault classification carried in byte 0 of an `ErrorFrame`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultCode {
    /// Code 0x01: supply current above 10 A
    OverCurrent,
    /// Code 0x02: seat temperature above 50 °C
    OverTemperature,
    /// Code 0x03: CAN communication failure
    BusFailure,
    /// Any other code, kept raw for the report
    Unknown(u8),
}

impl FaultCode {
    /// Map the raw error code byte
    pub fn from_byte(code: u8) -> Self {
        match code {
            0x01 => FaultCode::OverCurrent,
            0x02 => FaultCode::OverTemperature,
            0x03 => FaultCode::BusFailure,
            other => FaultCode::Unknown(other),
        }
    }

    /// Raw error code byte
    pub fn to_byte(self) -> u8 {
        match self {
            FaultCode::OverCurrent => 0x01,
            FaultCode::OverTemperature => 0x02,
            FaultCode::BusFailure => 0x03,
            FaultCode::Unknown(code) => code,
        }
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultCode::OverCurrent => write!(f, "OVERCURRENT (>10A)"),
            FaultCode::OverTemperature => write!(f, "OVER-TEMPERATURE (>50°C)"),
            FaultCode::BusFailure => write!(f, "CAN COMMUNICATION FAILURE"),
            FaultCode::Unknown(code) => write!(f, "UNKNOWN (0x{:02X})", code),
        }
    }
}

/// `ErrorFrame` (0x7FF) fault notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorFrame {
    /// Byte 0: raw error code
    pub error_code: u8,
    /// Bytes 1-2: ECU-side timestamp in ms (high byte first)
    pub timestamp_ms: u16,
}

impl ErrorFrame {
    /// Decode the fixed layout from a frame payload
    pub fn from_payload(data: &[u8]) -> Result<Self> {
        check_len("ErrorFrame", data)?;

        Ok(Self {
            error_code: data[0],
            timestamp_ms: BigEndian::read_u16(&data[1..3]),
        })
    }

    /// Encode into an 8-byte payload (bytes 3-7 reserved, zero)
    pub fn to_payload(&self) -> [u8; PAYLOAD_LEN] {
        let mut payload = [0u8; PAYLOAD_LEN];
        payload[0] = self.error_code;
        BigEndian::write_u16(&mut payload[1..3], self.timestamp_ms);
        payload
    }

    pub fn fault_code(&self) -> FaultCode {
        FaultCode::from_byte(self.error_code)
    }
}

/// A frame the bench recognised
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodedFrame {
    SystemReady(SystemReady),
    ErrorFrame(ErrorFrame),
}

/// Frame decoder - dispatches on CAN ID to the fixed-layout decoders
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameDecoder {
    log_payloads: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: log every decoded field at debug level
    pub fn with_payload_logging(mut self, enabled: bool) -> Self {
        self.log_payloads = enabled;
        self
    }

    /// Decode a CAN frame
    ///
    /// # Returns
    /// * `Ok(Some(_))` for a recognised, well-formed message
    /// * `Ok(None)` for any other CAN ID (no handler fires)
    /// * `Err(BenchError::InvalidData)` for a recognised ID with a short payload
    pub fn decode(&self, frame: &CanFrame) -> Result<Option<DecodedFrame>> {
        // Both messages use 11-bit identifiers
        if frame.is_extended {
            log::trace!("Ignoring extended CAN ID 0x{:X}", frame.can_id);
            return Ok(None);
        }

        match frame.can_id {
            SYSTEM_READY_ID => {
                let status = SystemReady::from_payload(&frame.data)?;
                log::info!("SystemReady CAN message received (ID: 0x{:03X})", frame.can_id);
                if self.log_payloads {
                    log_system_ready(&status);
                }
                Ok(Some(DecodedFrame::SystemReady(status)))
            }
            ERROR_FRAME_ID => {
                let error = ErrorFrame::from_payload(&frame.data)?;
                log::info!("ErrorFrame CAN message received (ID: 0x{:03X})", frame.can_id);
                if self.log_payloads {
                    log::debug!("Error_Code: 0x{:02x}", error.error_code);
                    log::debug!("Timestamp: {} ms", error.timestamp_ms);
                }
                log::info!("Error Type: {}", error.fault_code());
                Ok(Some(DecodedFrame::ErrorFrame(error)))
            }
            other => {
                log::trace!("Ignoring CAN ID 0x{:X}", other);
                Ok(None)
            }
        }
    }
}

fn log_system_ready(status: &SystemReady) {
    log::debug!("Heating_Status: {} (0=OFF, 1=ON)", status.heating_status);
    log::debug!("Massage_Status: {} (0=OFF, 1=ON)", status.massage_status);
    log::debug!("Current: {} ({:.2} A)", status.current, status.current_amps());
    log::debug!("Temperature: {} ({:.1} °C)", status.temperature, status.temperature_celsius());
    log::debug!("Pressure: {} ({:.2} bar)", status.pressure, status.pressure_bar());
    log::debug!("Error_Flags: 0x{:02x}", status.error_flags);
}

fn check_len(message: &str, data: &[u8]) -> Result<()> {
    if data.len() < PAYLOAD_LEN {
        return Err(BenchError::InvalidData(format!(
            "{} requires {} bytes but frame only has {} bytes",
            message,
            PAYLOAD_LEN,
            data.len()
        )));
    }
    Ok(())
}

fn scale(raw: u8, full_scale: f32) -> f32 {
    raw as f32 * full_scale / u8::MAX as f32
}
