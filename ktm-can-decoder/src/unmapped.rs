//! Unmapped-bits diagnostic
//!
//! Renders a payload as space-separated hex bytes with every bit a named field
//! already consumes cleared, and fully consumed bytes replaced by `__`. The
//! output only exists to help spot bits that still have no known meaning.

use crate::bits::ByteMask;
use crate::types::PAYLOAD_LEN;
use std::fmt::Write;

/// Placeholder for a byte fully accounted for
pub const PLACEHOLDER: &str = "__";

/// Format the diagnostic string for a payload under the given masks
pub fn format_unmapped(payload: &[u8; PAYLOAD_LEN], masks: &[ByteMask; PAYLOAD_LEN]) -> String {
    let mut out = String::with_capacity(PAYLOAD_LEN * 3);

    for (i, (byte, mask)) in payload.iter().zip(masks.iter()).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        match mask {
            ByteMask::Hidden => out.push_str(PLACEHOLDER),
            ByteMask::Keep(keep) => {
                // Writing to a String cannot fail
                let _ = write!(out, "{:02X}", byte & keep);
            }
        }
    }

    out
}
