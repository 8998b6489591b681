//! HDLC-style framing: bit stuffing and byte stuffing, and their inverses
//!
//! Stuffing works on clean bits. Destuffing works on decoded symbols, which
//! may contain `?` when the decoder met an invalid signal pattern.
//!
//! ## Bit stuffing
//!
//! After every fifth consecutive `1` a synthetic `0` is inserted. The
//! destuffer cannot tell synthetic bits from real ones; it drops a `0` that
//! follows five `1`s, as an HDLC receiver does.
//!
//! ## Byte stuffing
//!
//! ```text
//! FLAG | byte | ESC | FLAG-as-data | byte | ... | FLAG
//! ```
//!
//! Every in-band FLAG or ESC byte is preceded by ESC. Input bits that do not
//! fill a whole byte are not framed.

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::constants::{BYTE_BITS, ESC, FLAG, STUFF_RUN_LENGTH};
use crate::error::FramingError;
use crate::textcodec::{byte_value, push_byte};
use crate::types::{Bit, Symbol};

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Framing applied before line coding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    /// Bits go on the wire as-is
    #[default]
    None,
    /// Insert a `0` after five consecutive `1`s
    BitStuffing,
    /// FLAG-delimited frame with ESC before in-band FLAG/ESC bytes
    ByteStuffing,
}

/// Output of a stuffing pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StuffingResult {
    /// Which scheme produced this result
    pub framing: Framing,

    /// The bits to transmit
    pub stuffed: Vec<Bit>,

    /// Ascending indices into `stuffed` of inserted units: each synthetic `0`
    /// for bit stuffing, the first bit of each ESC byte for byte stuffing
    pub inserted_positions: Vec<usize>,

    /// Trailing input bits dropped because they did not fill a byte
    pub truncated_bits: usize,
}

impl StuffingResult {
    /// Result of not framing at all
    pub fn unframed(bits: &[Bit]) -> Self {
        Self {
            framing: Framing::None,
            stuffed: bits.to_vec(),
            inserted_positions: Vec::new(),
            truncated_bits: 0,
        }
    }

    /// Number of bits in `stuffed` that exist only because of framing
    pub fn synthetic_len(&self) -> usize {
        match self.framing {
            Framing::None => 0,
            Framing::BitStuffing => self.inserted_positions.len(),
            Framing::ByteStuffing => 2 * BYTE_BITS + BYTE_BITS * self.inserted_positions.len(),
        }
    }

    /// Number of payload bits carried in `stuffed`
    pub fn payload_len(&self) -> usize {
        self.stuffed.len().saturating_sub(self.synthetic_len())
    }

    /// Whether `index` holds a bit inserted by framing (stuffed `0`, ESC or FLAG)
    pub fn is_synthetic(&self, index: usize) -> bool {
        if index >= self.stuffed.len() {
            return false;
        }
        match self.framing {
            Framing::None => false,
            Framing::BitStuffing => self.inserted_positions.binary_search(&index).is_ok(),
            Framing::ByteStuffing => {
                if index < BYTE_BITS || index >= self.stuffed.len().saturating_sub(BYTE_BITS) {
                    return true;
                }
                let after = self.inserted_positions.partition_point(|&p| p <= index);
                after > 0 && index < self.inserted_positions[after - 1] + BYTE_BITS
            }
        }
    }
}

/// Apply the given framing
pub fn stuff(framing: Framing, bits: &[Bit]) -> StuffingResult {
    match framing {
        Framing::None => StuffingResult::unframed(bits),
        Framing::BitStuffing => bit_stuff(bits),
        Framing::ByteStuffing => byte_stuff(bits),
    }
}

/// Bit-stuff a bitstring
pub fn bit_stuff(bits: &[Bit]) -> StuffingResult {
    let mut stuffed = Vec::with_capacity(bits.len() + bits.len() / STUFF_RUN_LENGTH);
    let mut inserted_positions = Vec::new();
    let mut ones = 0;

    for &bit in bits {
        stuffed.push(bit);
        if bit.is_one() {
            ones += 1;
            if ones == STUFF_RUN_LENGTH {
                inserted_positions.push(stuffed.len());
                stuffed.push(Bit::Zero);
                ones = 0;
            }
        } else {
            ones = 0;
        }
    }

    #[cfg(feature = "logging")]
    debug!(
        "Bit stuffing inserted {} zeros into {} bits",
        inserted_positions.len(),
        bits.len()
    );

    StuffingResult {
        framing: Framing::BitStuffing,
        stuffed,
        inserted_positions,
        truncated_bits: 0,
    }
}

/// Remove bit stuffing: drop any `0` that directly follows five `1`s
pub fn bit_destuff(symbols: &[Symbol]) -> Vec<Symbol> {
    let mut out = Vec::with_capacity(symbols.len());
    let mut ones = 0;
    let mut skip_next = false;

    for (i, &symbol) in symbols.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        out.push(symbol);
        if symbol.is_one() {
            ones += 1;
            if ones == STUFF_RUN_LENGTH {
                skip_next = symbols.get(i + 1).is_some_and(|s| s.is_zero());
                ones = 0;
            }
        } else {
            ones = 0;
        }
    }

    out
}

/// Byte-stuff a bitstring between two FLAG bytes
pub fn byte_stuff(bits: &[Bit]) -> StuffingResult {
    let whole = bits.len() / BYTE_BITS * BYTE_BITS;
    let truncated_bits = bits.len() - whole;
    let mut stuffed = Vec::with_capacity(whole + 2 * BYTE_BITS);
    let mut inserted_positions = Vec::new();

    push_byte(&mut stuffed, FLAG);
    for chunk in bits[..whole].chunks_exact(BYTE_BITS) {
        let byte = pack(chunk);
        if byte == FLAG || byte == ESC {
            inserted_positions.push(stuffed.len());
            push_byte(&mut stuffed, ESC);
        }
        stuffed.extend_from_slice(chunk);
    }
    push_byte(&mut stuffed, FLAG);

    #[cfg(feature = "logging")]
    {
        if truncated_bits > 0 {
            warn!(
                "Byte stuffing skipped {} trailing bits that do not fill a byte",
                truncated_bits
            );
        }
        debug!(
            "Byte stuffing escaped {} bytes of {}",
            inserted_positions.len(),
            whole / BYTE_BITS
        );
    }

    StuffingResult {
        framing: Framing::ByteStuffing,
        stuffed,
        inserted_positions,
        truncated_bits,
    }
}

/// Result of a destuffing pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destuffed {
    /// Best-effort payload
    pub bits: Vec<Symbol>,

    /// First structural fault met, if any
    pub error: Option<FramingError>,

    /// ESC bytes removed (byte stuffing only)
    pub escapes_removed: usize,

    /// FLAG bytes stripped (byte stuffing only)
    pub flags_removed: usize,
}

impl Destuffed {
    fn clean(bits: Vec<Symbol>) -> Self {
        Self {
            bits,
            error: None,
            escapes_removed: 0,
            flags_removed: 0,
        }
    }
}

/// Reverse the given framing
pub fn destuff(framing: Framing, symbols: &[Symbol]) -> Destuffed {
    match framing {
        Framing::None => Destuffed::clean(symbols.to_vec()),
        Framing::BitStuffing => Destuffed::clean(bit_destuff(symbols)),
        Framing::ByteStuffing => byte_destuff(symbols),
    }
}

/// Remove byte stuffing
///
/// Destuffing never stops early without recording a [`FramingError`]; the
/// payload gathered up to that point is still returned.
pub fn byte_destuff(symbols: &[Symbol]) -> Destuffed {
    let len = symbols.len();
    let byte_at = |i: usize| symbols.get(i..i + BYTE_BITS).and_then(byte_value);

    let mut out = Destuffed::clean(Vec::with_capacity(len));

    let mut i = 0;
    if byte_at(0) == Some(FLAG) {
        i = BYTE_BITS;
        out.flags_removed += 1;
    } else {
        fault(&mut out, FramingError::MissingLeadingFlag);
    }

    let end = len.saturating_sub(BYTE_BITS);
    while i < end {
        if i + BYTE_BITS > end {
            fault(&mut out, FramingError::IncompleteByte { offset: i });
            break;
        }
        let chunk = &symbols[i..i + BYTE_BITS];
        match byte_value(chunk) {
            Some(ESC) => {
                let escaped = i + BYTE_BITS;
                if escaped + BYTE_BITS > end {
                    fault(&mut out, FramingError::DanglingEscape { offset: i });
                    break;
                }
                out.bits
                    .extend_from_slice(&symbols[escaped..escaped + BYTE_BITS]);
                out.escapes_removed += 1;
                i = escaped + BYTE_BITS;
            }
            Some(FLAG) => {
                fault(&mut out, FramingError::UnexpectedFlag { offset: i });
                break;
            }
            _ => {
                out.bits.extend_from_slice(chunk);
                i += BYTE_BITS;
            }
        }
    }

    if i == end && len >= BYTE_BITS && byte_at(end) == Some(FLAG) {
        out.flags_removed += 1;
    } else {
        fault(&mut out, FramingError::MissingTrailingFlag);
    }

    out
}

/// Map an index in the framed bitstring back to the unframed input
///
/// Returns `None` for bits inserted by framing and for indices past the end.
pub fn original_bit_index(result: &StuffingResult, framed_index: usize) -> Option<usize> {
    if framed_index >= result.stuffed.len() || result.is_synthetic(framed_index) {
        return None;
    }
    let before = result
        .inserted_positions
        .partition_point(|&p| p < framed_index);
    let original = match result.framing {
        Framing::None => framed_index,
        Framing::BitStuffing => framed_index - before,
        Framing::ByteStuffing => framed_index - BYTE_BITS - BYTE_BITS * before,
    };
    (original < result.payload_len()).then_some(original)
}

fn fault(out: &mut Destuffed, err: FramingError) {
    #[cfg(feature = "logging")]
    warn!("Byte destuff: {:?}", err);
    if out.error.is_none() {
        out.error = Some(err);
    }
}

fn pack(chunk: &[Bit]) -> u8 {
    chunk
        .iter()
        .fold(0u8, |acc, bit| (acc << 1) | u8::from(bit.is_one()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::textcodec::parse_bitstream;
    use crate::types::{bits_to_symbols, to_bit_string};

    fn bits(s: &str) -> Vec<Bit> {
        parse_bitstream(s).unwrap()
    }

    fn symbols(s: &str) -> Vec<Symbol> {
        bits_to_symbols(&bits(s))
    }

    #[test]
    fn test_bit_stuff_scenario() {
        let result = bit_stuff(&bits("01111110111110"));
        assert_eq!(to_bit_string(&result.stuffed), "0111110101111100");
        assert_eq!(result.inserted_positions, vec![6, 14]);
        assert_eq!(result.payload_len(), 14);

        let restored = bit_destuff(&bits_to_symbols(&result.stuffed));
        assert_eq!(to_bit_string(&restored), "01111110111110");
    }

    #[test]
    fn test_bit_stuff_trailing_run() {
        let result = bit_stuff(&bits("11111"));
        assert_eq!(to_bit_string(&result.stuffed), "111110");
        assert_eq!(to_bit_string(&bit_destuff(&bits_to_symbols(&result.stuffed))), "11111");
    }

    #[test]
    fn test_bit_destuff_unstuffed_run() {
        // Six 1s were never stuffed: the counter resets and nothing is dropped
        assert_eq!(to_bit_string(&bit_destuff(&symbols("1111111"))), "1111111");
    }

    #[test]
    fn test_byte_stuff_escapes_flag_and_esc() {
        let input = "00000001 01111110 01111101";
        let result = byte_stuff(&bits(input));
        assert_eq!(
            to_bit_string(&result.stuffed),
            "01111110000000010111110101111110011111010111110101111110"
        );
        assert_eq!(result.inserted_positions, vec![16, 32]);
        assert_eq!(result.payload_len(), 24);

        let destuffed = byte_destuff(&bits_to_symbols(&result.stuffed));
        assert_eq!(destuffed.error, None);
        assert_eq!(to_bit_string(&destuffed.bits), "000000010111111001111101");
        assert_eq!(destuffed.escapes_removed, 2);
        assert_eq!(destuffed.flags_removed, 2);
    }

    #[test]
    fn test_byte_stuff_truncates_partial_byte() {
        let result = byte_stuff(&bits("0100000111"));
        assert_eq!(result.truncated_bits, 2);
        assert_eq!(result.stuffed.len(), 24);
    }

    #[test]
    fn test_byte_destuff_empty_frame() {
        let destuffed = byte_destuff(&symbols("01111110 01111110"));
        assert_eq!(destuffed.error, None);
        assert!(destuffed.bits.is_empty());
    }

    #[test]
    fn test_byte_destuff_faults() {
        let missing_leading = byte_destuff(&symbols("01000001 01111110"));
        assert_eq!(missing_leading.error, Some(FramingError::MissingLeadingFlag));
        assert_eq!(to_bit_string(&missing_leading.bits), "01000001");

        let mid_flag = byte_destuff(&symbols("01111110 01000001 01111110 01000010 01111110"));
        assert_eq!(mid_flag.error, Some(FramingError::UnexpectedFlag { offset: 16 }));
        assert_eq!(to_bit_string(&mid_flag.bits), "01000001");

        let no_trailing = byte_destuff(&symbols("01111110 01000001 01000010"));
        assert_eq!(no_trailing.error, Some(FramingError::MissingTrailingFlag));

        let partial = byte_destuff(&symbols("01111110 0100 01111110"));
        assert_eq!(partial.error, Some(FramingError::IncompleteByte { offset: 8 }));

        let dangling = byte_destuff(&symbols("01111110 01111101 01111110"));
        assert_eq!(dangling.error, Some(FramingError::DanglingEscape { offset: 8 }));

        let lone_flag = byte_destuff(&symbols("01111110"));
        assert_eq!(lone_flag.error, Some(FramingError::MissingTrailingFlag));

        assert_eq!(byte_destuff(&[]).error, Some(FramingError::MissingLeadingFlag));
    }

    #[test]
    fn test_byte_destuff_with_invalid_symbols() {
        let mut frame = bits_to_symbols(&byte_stuff(&bits("01000001")).stuffed);
        frame[9] = Symbol::Invalid;
        let destuffed = byte_destuff(&frame);
        assert_eq!(destuffed.error, None);
        assert_eq!(destuffed.bits[1], Symbol::Invalid);
    }

    #[test]
    fn test_original_bit_index_bit_stuffing() {
        let result = bit_stuff(&bits("0111111"));
        // 0 1 1 1 1 1 [0] 1
        assert_eq!(original_bit_index(&result, 0), Some(0));
        assert_eq!(original_bit_index(&result, 5), Some(5));
        assert_eq!(original_bit_index(&result, 6), None);
        assert_eq!(original_bit_index(&result, 7), Some(6));
        assert_eq!(original_bit_index(&result, 8), None);
    }

    #[test]
    fn test_original_bit_index_byte_stuffing() {
        let result = byte_stuff(&bits("01000001 01111110"));
        // FLAG(0..8) A(8..16) ESC(16..24) FLAG-data(24..32) FLAG(32..40)
        assert_eq!(original_bit_index(&result, 3), None);
        assert_eq!(original_bit_index(&result, 8), Some(0));
        assert_eq!(original_bit_index(&result, 15), Some(7));
        assert_eq!(original_bit_index(&result, 20), None);
        assert_eq!(original_bit_index(&result, 24), Some(8));
        assert_eq!(original_bit_index(&result, 31), Some(15));
        assert_eq!(original_bit_index(&result, 32), None);
        assert!(result.is_synthetic(16));
        assert!(!result.is_synthetic(24));
    }

    #[test]
    fn test_unframed_passthrough() {
        let input = bits("1011");
        let result = stuff(Framing::None, &input);
        assert_eq!(result.stuffed, input);
        assert_eq!(original_bit_index(&result, 2), Some(2));
        let destuffed = destuff(Framing::None, &bits_to_symbols(&input));
        assert_eq!(destuffed.bits, bits_to_symbols(&input));
    }
}
