//! Core types for the KTM CAN decoder library
//!
//! This module defines the frames the decoder consumes and the signals it emits.
//! The decoder is stateless and only outputs decoded signals - it does not
//! track value changes or retain frames between calls.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Number of payload bytes every known layout is defined over
pub const PAYLOAD_LEN: usize = 8;

/// Raw frame read off the motorcycle bus
///
/// Produced by an external transport and only borrowed by the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    /// Bus arbitration ID (11-bit on this bus)
    pub identifier: u32,
    /// Payload bytes; layouts are defined over the first 8
    pub payload: Vec<u8>,
}

impl Frame {
    /// Create a frame from an identifier and any payload
    pub fn new(identifier: u32, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            identifier,
            payload: payload.into(),
        }
    }

    /// Create a frame from a full 8-byte payload
    pub fn from_bytes(identifier: u32, payload: [u8; PAYLOAD_LEN]) -> Self {
        Self::new(identifier, payload.to_vec())
    }

    /// Get the data length code (DLC) - number of payload bytes
    pub fn dlc(&self) -> usize {
        self.payload.len()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:03X} [{}]", self.identifier, self.dlc())?;
        for byte in &self.payload {
            write!(f, " {:02X}", byte)?;
        }
        Ok(())
    }
}

/// Errors that can occur while decoding a single frame
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecoderError {
    #[error("Insufficient payload length for identifier 0x{identifier:03X}: need {required} bytes, got {actual}")]
    InsufficientPayload {
        identifier: u32,
        required: usize,
        actual: usize,
    },

    #[error("Unexpected constant byte value for identifier 0x{identifier:03X}: byte {index} is 0x{actual:02X}, expected 0x{expected:02X}")]
    UnexpectedConstant {
        identifier: u32,
        index: usize,
        expected: u8,
        actual: u8,
    },
}

impl DecoderError {
    /// Identifier of the frame that failed to decode
    pub fn identifier(&self) -> u32 {
        match self {
            DecoderError::InsufficientPayload { identifier, .. } => *identifier,
            DecoderError::UnexpectedConstant { identifier, .. } => *identifier,
        }
    }

    /// Short machine-friendly label for the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            DecoderError::InsufficientPayload { .. } => "insufficient_payload",
            DecoderError::UnexpectedConstant { .. } => "unexpected_constant",
        }
    }
}

/// Closed vocabulary of signal names the decoder can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalName {
    Rpm,
    Throttle,
    KillSwitch,
    ThrottleMap,
    Gear,
    ClutchIn,
    RequestedThrottleMap,
    Tilt,
    Lean,
    CoolantTemp,
    KickstandUp,
    KickstandErr,
    /// Diagnostic dump of the bits no named field consumes
    Unmapped,
}

impl SignalName {
    /// Every name in the vocabulary
    pub const ALL: [SignalName; 13] = [
        SignalName::Rpm,
        SignalName::Throttle,
        SignalName::KillSwitch,
        SignalName::ThrottleMap,
        SignalName::Gear,
        SignalName::ClutchIn,
        SignalName::RequestedThrottleMap,
        SignalName::Tilt,
        SignalName::Lean,
        SignalName::CoolantTemp,
        SignalName::KickstandUp,
        SignalName::KickstandErr,
        SignalName::Unmapped,
    ];

    /// The string key used on output
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalName::Rpm => "rpm",
            SignalName::Throttle => "throttle",
            SignalName::KillSwitch => "kill_switch",
            SignalName::ThrottleMap => "throttle_map",
            SignalName::Gear => "gear",
            SignalName::ClutchIn => "clutch_in",
            SignalName::RequestedThrottleMap => "requested_throttle_map",
            SignalName::Tilt => "tilt",
            SignalName::Lean => "lean",
            SignalName::CoolantTemp => "coolant_temp",
            SignalName::KickstandUp => "kickstand_up",
            SignalName::KickstandErr => "kickstand_err",
            SignalName::Unmapped => "unmapped",
        }
    }

    /// True when the meaning of the field is not yet confirmed on a bike.
    ///
    /// The two 12-bit angles in 0x12B come from a single external report; which
    /// one is lean and which is tilt has not been validated.
    pub fn is_tentative(&self) -> bool {
        matches!(self, SignalName::Tilt | SignalName::Lean)
    }
}

impl fmt::Display for SignalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalName {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SignalName::ALL
            .iter()
            .find(|name| name.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown signal name: {}", s))
    }
}

/// Signal value types supported by the decoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    /// Integer value (raw counts, nibbles, single bits, signed angles)
    Integer(i64),
    /// Floating-point value (after scaling)
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Formatted diagnostic text
    Text(String),
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Integer(v) => write!(f, "{}", v),
            SignalValue::Float(v) => write!(f, "{:.1}", v),
            SignalValue::Boolean(v) => write!(f, "{}", if *v { "true" } else { "false" }),
            SignalValue::Text(v) => f.write_str(v),
        }
    }
}

impl SignalValue {
    /// Convert signal value to f64 (text maps to NaN)
    pub fn as_f64(&self) -> f64 {
        match self {
            SignalValue::Integer(v) => *v as f64,
            SignalValue::Float(v) => *v,
            SignalValue::Boolean(v) => if *v { 1.0 } else { 0.0 },
            SignalValue::Text(_) => f64::NAN,
        }
    }

    /// Convert signal value to i64 if possible
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SignalValue::Integer(v) => Some(*v),
            SignalValue::Float(v) => Some(*v as i64),
            SignalValue::Boolean(v) => Some(if *v { 1 } else { 0 }),
            SignalValue::Text(_) => None,
        }
    }

    /// Check if this is a truthy value
    pub fn as_bool(&self) -> bool {
        match self {
            SignalValue::Boolean(v) => *v,
            SignalValue::Integer(v) => *v != 0,
            SignalValue::Float(v) => *v != 0.0,
            SignalValue::Text(v) => !v.is_empty(),
        }
    }

    /// Borrow the diagnostic text, if this is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SignalValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// One decoded telemetry value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Identifier of the frame this value came from
    pub identifier: u32,
    pub name: SignalName,
    pub value: SignalValue,
}

impl Signal {
    pub fn new(identifier: u32, name: SignalName, value: SignalValue) -> Self {
        Self {
            identifier,
            name,
            value,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:03X} {} = {}",
            self.identifier, self.name, self.value
        )
    }
}
