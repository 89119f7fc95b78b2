//! KTM CAN Decoder Library
//!
//! A stateless, reusable library for decoding frames from a KTM motorcycle's CAN
//! bus into named telemetry values. The frame layouts were reverse-engineered
//! from bus captures; bits whose meaning is unknown are left alone and can be
//! inspected through the optional `unmapped` diagnostic.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on decoding:
//! - Dispatches each frame by identifier to a fixed payload layout
//! - Extracts named fields with shared bit primitives
//! - Optionally dumps the bits no field accounts for
//!
//! The library does NOT:
//! - Read frames from a bus or a capture file
//! - Track signal value changes (old→new)
//! - Print or log decoded values
//!
//! All higher-level functionality is in the application layer (ktm-can-cli).
//!
//! # Example Usage
//!
//! ```
//! use ktm_can_decoder::{Decoder, DecoderConfig, Frame, SignalName, SignalValue};
//!
//! let decoder = Decoder::new(DecoderConfig::new().with_unmapped(true));
//! let frame = Frame::from_bytes(0x540, [0x02, 0x06, 0x65, 0x00, 0x01, 0x00, 0x01, 0xDD]);
//!
//! for signal in decoder.decode(&frame).unwrap() {
//!     println!("{:03X} {} = {}", signal.identifier, signal.name, signal.value);
//! }
//!
//! let coolant = decoder
//!     .decode(&frame)
//!     .unwrap()
//!     .find(|s| s.name == SignalName::CoolantTemp)
//!     .unwrap();
//! assert_eq!(coolant.value, SignalValue::Float(47.7));
//! ```

// Public modules
pub mod bits;
pub mod config;
pub mod decoder;
pub mod layout;
pub mod types;
pub mod unmapped;

// Re-export main types for convenience
pub use bits::signed12;
pub use config::DecoderConfig;
pub use decoder::{Decoder, DecodingIterator, Signals};
pub use layout::FrameLayout;
pub use types::{DecoderError, Frame, Result, Signal, SignalName, SignalValue, PAYLOAD_LEN};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: a default decoder emits no diagnostics
        let decoder = Decoder::default();
        assert!(!decoder.config().emit_unmapped);
        assert!(!VERSION.is_empty());
    }
}
