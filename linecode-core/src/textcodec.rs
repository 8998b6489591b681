//! Text ⇄ bitstring conversion and input classification
//!
//! Text is carried as one 8-bit big-endian field per character, so only
//! characters with code points `0..=255` can be transmitted.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{Bit, Symbol};

/// How the raw input should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// Bitstream if it looks like one, text otherwise
    #[default]
    Auto,
    /// Must be a bitstream; anything else is rejected
    Bitstream,
}

impl FromStr for InputKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(InputKind::Auto),
            "bitstream" => Ok(InputKind::Bitstream),
            other => Err(ValidationError::UnknownInputKind(other.to_string())),
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Auto => f.write_str("auto"),
            InputKind::Bitstream => f.write_str("bitstream"),
        }
    }
}

/// What the raw input turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Already a sequence of `0`/`1`
    Bitstream,
    /// Characters to be converted with [`text_to_bits`]
    Text,
}

/// Input after validation and conversion to bits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedInput {
    /// Trimmed raw input
    pub original: String,

    /// How the input was classified
    pub classification: Classification,

    /// The unframed bitstring
    pub bits: Vec<Bit>,
}

/// Convert each character to its 8-bit big-endian code, in order
pub fn text_to_bits(text: &str) -> Result<Vec<Bit>, ValidationError> {
    let mut bits = Vec::with_capacity(text.len() * 8);
    for (position, ch) in text.chars().enumerate() {
        let code = u32::from(ch);
        if code > 0xFF {
            return Err(ValidationError::UnencodableChar { ch, position });
        }
        push_byte(&mut bits, code as u8);
    }
    Ok(bits)
}

/// Convert a (possibly damaged) bitstring back into text
///
/// The input is right-padded with `0` to a whole number of bytes. A short
/// final chunk that pads out to zero is dropped, printable code points
/// (`>= 32`) and tab/LF/CR are kept, and anything else, including a full
/// zero byte or a byte holding a `?` symbol, becomes `?`.
pub fn bits_to_text(symbols: &[Symbol]) -> String {
    let mut text = String::with_capacity(symbols.len() / 8 + 1);
    for chunk in symbols.chunks(8) {
        let Some(value) = byte_value(chunk) else {
            text.push('?');
            continue;
        };
        match value {
            0 if chunk.len() < 8 => {}
            9 | 10 | 13 => text.push(char::from(value)),
            v if v >= 32 => text.push(char::from(v)),
            _ => text.push('?'),
        }
    }
    text
}

/// Classify raw input: a non-empty run of `0`/`1` (ignoring whitespace) is a bitstream
pub fn detect_kind(raw: &str) -> Classification {
    let mut saw_digit = false;
    for ch in raw.chars().filter(|c| !c.is_whitespace()) {
        if Bit::from_char(ch).is_none() {
            return Classification::Text;
        }
        saw_digit = true;
    }
    if saw_digit {
        Classification::Bitstream
    } else {
        Classification::Text
    }
}

/// Parse a bitstream, ignoring whitespace
pub fn parse_bitstream(raw: &str) -> Result<Vec<Bit>, ValidationError> {
    let mut bits = Vec::with_capacity(raw.len());
    for (position, ch) in raw.chars().enumerate() {
        if ch.is_whitespace() {
            continue;
        }
        match Bit::from_char(ch) {
            Some(bit) => bits.push(bit),
            None => return Err(ValidationError::InvalidBitstream { ch, position }),
        }
    }
    if bits.is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    Ok(bits)
}

/// Validate and convert raw input
pub fn prepare_input(raw: &str, kind: InputKind) -> Result<PreparedInput, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let classification = match kind {
        InputKind::Bitstream => Classification::Bitstream,
        InputKind::Auto => detect_kind(trimmed),
    };

    let bits = match classification {
        Classification::Bitstream => parse_bitstream(trimmed)?,
        Classification::Text => text_to_bits(trimmed)?,
    };

    Ok(PreparedInput {
        original: trimmed.to_string(),
        classification,
        bits,
    })
}

/// Check input without converting it, for validating as the user types
pub fn validate_input(raw: &str, kind: InputKind) -> Result<(), ValidationError> {
    prepare_input(raw, kind).map(|_| ())
}

/// Pack up to 8 symbols MSB-first; `None` if any is `?`
///
/// A short chunk is padded on the right with `0`.
pub(crate) fn byte_value(chunk: &[Symbol]) -> Option<u8> {
    let mut value = 0u8;
    for i in 0..8 {
        value <<= 1;
        match chunk.get(i) {
            Some(Symbol::Bit(Bit::One)) => value |= 1,
            Some(Symbol::Bit(Bit::Zero)) | None => {}
            Some(Symbol::Invalid) => return None,
        }
    }
    Some(value)
}

/// Append a byte MSB-first
pub(crate) fn push_byte(bits: &mut Vec<Bit>, byte: u8) {
    for shift in (0..8).rev() {
        bits.push(Bit::from((byte >> shift) & 1 == 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{bits_to_symbols, to_bit_string};

    #[test]
    fn test_text_to_bits_hi() {
        let bits = text_to_bits("Hi").unwrap();
        assert_eq!(to_bit_string(&bits), "0100100001101001");
    }

    #[test]
    fn test_text_to_bits_rejects_wide_chars() {
        let result = text_to_bits("añ€");
        assert_eq!(
            result,
            Err(ValidationError::UnencodableChar { ch: '€', position: 2 })
        );
        // Latin-1 is fine
        assert_eq!(text_to_bits("ñ").unwrap().len(), 8);
    }

    #[test]
    fn test_bits_to_text_pads_and_masks() {
        let symbols = bits_to_symbols(&parse_bitstream("0100100001101001").unwrap());
        assert_eq!(bits_to_text(&symbols), "Hi");

        // "0100001" padded to 01000010 = 'B'
        let short = bits_to_symbols(&parse_bitstream("0100001").unwrap());
        assert_eq!(bits_to_text(&short), "B");

        // 0x01 is a control char and a full 0x00 byte is not padding
        let ctrl = bits_to_symbols(&parse_bitstream("00000001 00000000 00001010").unwrap());
        assert_eq!(bits_to_text(&ctrl), "??\n");
    }

    #[test]
    fn test_bits_to_text_zero_bytes() {
        let inner = bits_to_symbols(&parse_bitstream("01000001 00000000 01000010").unwrap());
        assert_eq!(bits_to_text(&inner), "A?B");

        // A trailing partial chunk padding out to zero carries no character
        let padded = bits_to_symbols(&parse_bitstream("01000001 000").unwrap());
        assert_eq!(bits_to_text(&padded), "A");
    }

    #[test]
    fn test_bits_to_text_invalid_symbol() {
        let mut symbols = bits_to_symbols(&text_to_bits("AB").unwrap());
        symbols[3] = Symbol::Invalid;
        assert_eq!(bits_to_text(&symbols), "?B");
    }

    #[test]
    fn test_detect_kind() {
        assert_eq!(detect_kind("0101 1100"), Classification::Bitstream);
        assert_eq!(detect_kind("01a"), Classification::Text);
        assert_eq!(detect_kind("   "), Classification::Text);
        assert_eq!(detect_kind(""), Classification::Text);
    }

    #[test]
    fn test_prepare_input_forced_bitstream() {
        let err = prepare_input("0102", InputKind::Bitstream).unwrap_err();
        assert_eq!(err, ValidationError::InvalidBitstream { ch: '2', position: 3 });

        let ok = prepare_input("  10 10  ", InputKind::Bitstream).unwrap();
        assert_eq!(ok.original, "10 10");
        assert_eq!(to_bit_string(&ok.bits), "1010");
    }

    #[test]
    fn test_prepare_input_empty() {
        assert_eq!(
            prepare_input(" \n\t", InputKind::Auto),
            Err(ValidationError::EmptyInput)
        );
        assert!(validate_input("", InputKind::Bitstream).is_err());
        assert!(validate_input("hello", InputKind::Auto).is_ok());
    }

    #[test]
    fn test_input_kind_parse() {
        assert_eq!("auto".parse::<InputKind>().unwrap(), InputKind::Auto);
        assert!("binary".parse::<InputKind>().is_err());
    }
}
