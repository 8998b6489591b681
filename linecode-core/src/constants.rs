//! Constants and conventions for framing and line coding

use crate::types::{Bit, Level};

/// HDLC flag byte (`01111110`), delimits a byte-stuffed frame on both ends
pub const FLAG: u8 = 0x7E;

/// HDLC escape byte (`01111101`), precedes an in-band FLAG or ESC
pub const ESC: u8 = 0x7D;

/// Bits per byte-stuffing unit
pub const BYTE_BITS: usize = 8;

/// Consecutive `1`s after which bit stuffing inserts a `0`
pub const STUFF_RUN_LENGTH: usize = 5;

/// Level carried into bit 0 by NRZ-I, for both encoder and decoder
pub const NRZI_INITIAL_LEVEL: Level = Level::Low;

/// Level carried into bit 0 by Differential Manchester, for both encoder and decoder
pub const DIFF_MANCHESTER_INITIAL_LEVEL: Level = Level::Low;

/// Offset of the mid-bit point emitted by the Manchester family
pub const MID_BIT_OFFSET: f64 = 0.5;

/// NRZ-L polarity: the level a data bit is driven at
///
/// `0` is driven high and `1` low. The decoder uses [`nrzl_bit`] as the exact inverse.
pub const fn nrzl_level(bit: Bit) -> Level {
    match bit {
        Bit::Zero => Level::High,
        Bit::One => Level::Low,
    }
}

/// Inverse of [`nrzl_level`]
pub const fn nrzl_bit(level: Level) -> Bit {
    match level {
        Level::High => Bit::Zero,
        Level::Low => Bit::One,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_and_esc_bit_patterns() {
        assert_eq!(format!("{:08b}", FLAG), "01111110");
        assert_eq!(format!("{:08b}", ESC), "01111101");
    }

    #[test]
    fn test_nrzl_polarity_is_invertible() {
        for bit in [Bit::Zero, Bit::One] {
            assert_eq!(nrzl_bit(nrzl_level(bit)), bit);
        }
        assert_ne!(nrzl_level(Bit::Zero), nrzl_level(Bit::One));
    }
}
