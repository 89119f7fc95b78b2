//! Bit manipulation primitives shared by all frame layouts
//!
//! Bit numbering follows the bus captures: bit 7 is the most significant bit
//! of a byte, bit 0 the least significant.

use byteorder::{BigEndian, ByteOrder as _};

/// Lower 4 bits of a byte
pub fn lo_nibble(byte: u8) -> u8 {
    byte & 0x0F
}

/// Upper 4 bits of a byte, shifted down
pub fn hi_nibble(byte: u8) -> u8 {
    (byte >> 4) & 0x0F
}

/// Single bit of a byte as 0 or 1
pub fn bit(byte: u8, n: u8) -> u8 {
    (byte >> n) & 0x01
}

/// Single bit of a byte as a boolean
pub fn flag(byte: u8, n: u8) -> bool {
    bit(byte, n) == 1
}

/// Big-endian unsigned 16-bit value starting at `offset`
///
/// Callers validate the payload length before extracting fields.
pub fn be_u16(data: &[u8], offset: usize) -> u16 {
    BigEndian::read_u16(&data[offset..offset + 2])
}

/// Interpret the low 12 bits of `value` as a two's-complement integer
///
/// Bit 11 is the sign: `0x000..=0x7FF` map to themselves, `0x800..=0xFFF`
/// map to `-2048..=-1`. Bits above 11 are ignored.
pub fn signed12(value: u16) -> i16 {
    let value = (value & 0x0FFF) as i16;
    -(value & 0x0800) | (value & 0x07FF)
}

/// How one payload byte is rendered in the unmapped diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteMask {
    /// Fully consumed by named fields (or a known counter); shown as `__`
    Hidden,
    /// Shown in hex after clearing the bits outside the mask
    Keep(u8),
}

impl ByteMask {
    /// Byte shown untouched
    pub const RAW: ByteMask = ByteMask::Keep(0xFF);

    /// Byte shown with the given consumed bits cleared
    pub const fn consumed(bits: u8) -> ByteMask {
        ByteMask::Keep(!bits)
    }

    /// True if rendering this byte reads the payload
    pub fn reads_payload(&self) -> bool {
        matches!(self, ByteMask::Keep(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nibbles() {
        assert_eq!(hi_nibble(0x3A), 0x3);
        assert_eq!(lo_nibble(0x3A), 0xA);
        assert_eq!(hi_nibble(0xF0), 0xF);
        assert_eq!(lo_nibble(0xF0), 0x0);
    }

    #[test]
    fn test_bit_extraction() {
        assert_eq!(bit(0b0001_0000, 4), 1);
        assert_eq!(bit(0b1110_1111, 4), 0);
        assert!(flag(0b1000_0000, 7));
        assert!(!flag(0b0111_1111, 7));
    }

    #[test]
    fn test_be_u16() {
        let data = [0x1A, 0x2B, 0x01, 0x2C];
        assert_eq!(be_u16(&data, 0), 0x1A2B);
        assert_eq!(be_u16(&data, 2), 300);
    }

    #[test]
    fn test_signed12_boundaries() {
        assert_eq!(signed12(0x000), 0);
        assert_eq!(signed12(0x001), 1);
        assert_eq!(signed12(0x7FF), 2047);
        assert_eq!(signed12(0x800), -2048);
        assert_eq!(signed12(0xFFF), -1);
    }

    #[test]
    fn test_signed12_covers_full_range() {
        for v in 0u16..4096 {
            let decoded = signed12(v);
            assert!(
                (-2048..=2047).contains(&decoded),
                "0x{:03X} -> {}",
                v,
                decoded
            );
            assert_eq!((decoded as i32).rem_euclid(4096), v as i32);
        }
    }

    #[test]
    fn test_signed12_ignores_upper_bits() {
        assert_eq!(signed12(0xF001), 1);
        assert_eq!(signed12(0x1FFF), -1);
    }

    #[test]
    fn test_byte_mask_helpers() {
        assert_eq!(ByteMask::consumed(0b0001_0000), ByteMask::Keep(0b1110_1111));
        assert_eq!(ByteMask::RAW, ByteMask::Keep(0xFF));
        assert!(!ByteMask::Hidden.reads_payload());
    }
}
