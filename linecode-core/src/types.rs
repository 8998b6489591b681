//! Core types: bits, decoded symbols, signal levels and signal points

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A single data bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "char", try_from = "char")]
pub enum Bit {
    /// `0`
    Zero,
    /// `1`
    One,
}

impl Bit {
    /// Parse `'0'` or `'1'`
    pub const fn from_char(ch: char) -> Option<Bit> {
        match ch {
            '0' => Some(Bit::Zero),
            '1' => Some(Bit::One),
            _ => None,
        }
    }

    /// The complementary bit
    pub const fn flip(self) -> Bit {
        match self {
            Bit::Zero => Bit::One,
            Bit::One => Bit::Zero,
        }
    }

    /// `true` for [`Bit::One`]
    pub const fn is_one(self) -> bool {
        matches!(self, Bit::One)
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value {
            Bit::One
        } else {
            Bit::Zero
        }
    }
}

impl From<Bit> for char {
    fn from(bit: Bit) -> Self {
        match bit {
            Bit::Zero => '0',
            Bit::One => '1',
        }
    }
}

impl TryFrom<char> for Bit {
    type Error = &'static str;

    fn try_from(ch: char) -> Result<Self, Self::Error> {
        Bit::from_char(ch).ok_or("expected '0' or '1'")
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

/// A decoded symbol: a bit, or `?` when the decoder saw an invalid signal pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "char", try_from = "char")]
pub enum Symbol {
    /// A successfully decoded bit
    Bit(Bit),
    /// Invalid signal pattern, rendered as `?`
    Invalid,
}

impl Symbol {
    /// The bit, if this symbol is not [`Symbol::Invalid`]
    pub const fn bit(self) -> Option<Bit> {
        match self {
            Symbol::Bit(bit) => Some(bit),
            Symbol::Invalid => None,
        }
    }

    /// `true` if this symbol is the bit `1`
    pub const fn is_one(self) -> bool {
        matches!(self, Symbol::Bit(Bit::One))
    }

    /// `true` if this symbol is the bit `0`
    pub const fn is_zero(self) -> bool {
        matches!(self, Symbol::Bit(Bit::Zero))
    }
}

impl From<Bit> for Symbol {
    fn from(bit: Bit) -> Self {
        Symbol::Bit(bit)
    }
}

impl From<Symbol> for char {
    fn from(symbol: Symbol) -> Self {
        match symbol {
            Symbol::Bit(bit) => bit.into(),
            Symbol::Invalid => '?',
        }
    }
}

impl TryFrom<char> for Symbol {
    type Error = &'static str;

    fn try_from(ch: char) -> Result<Self, Self::Error> {
        match ch {
            '?' => Ok(Symbol::Invalid),
            _ => Bit::from_char(ch)
                .map(Symbol::Bit)
                .ok_or("expected '0', '1' or '?'"),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

/// A signal level on the line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Level {
    /// `+1` (+V)
    High,
    /// `-1` (-V)
    Low,
}

impl Level {
    /// The opposite level
    pub const fn flip(self) -> Level {
        match self {
            Level::High => Level::Low,
            Level::Low => Level::High,
        }
    }

    /// Signed representation, `+1` or `-1`
    pub const fn as_i8(self) -> i8 {
        match self {
            Level::High => 1,
            Level::Low => -1,
        }
    }
}

impl From<Level> for i8 {
    fn from(level: Level) -> Self {
        level.as_i8()
    }
}

impl TryFrom<i8> for Level {
    type Error = &'static str;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Level::High),
            -1 => Ok(Level::Low),
            _ => Err("signal level must be +1 or -1"),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::High => f.write_str("+V"),
            Level::Low => f.write_str("-V"),
        }
    }
}

/// One level change on the line
///
/// `time` is measured in bit intervals: the interval `[i, i + 1)` belongs to
/// bit `i`, and the Manchester family adds a second point at `i + 0.5`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalPoint {
    /// Position in bit intervals
    pub time: f64,

    /// Level from `time` until the next point
    pub level: Level,
}

impl SignalPoint {
    /// Create a new signal point
    pub const fn new(time: f64, level: Level) -> Self {
        Self { time, level }
    }
}

/// Anything that renders as one character of a bitstring
pub trait BitChar: Copy {
    /// The character for this symbol
    fn as_char(self) -> char;
}

impl BitChar for Bit {
    fn as_char(self) -> char {
        self.into()
    }
}

impl BitChar for Symbol {
    fn as_char(self) -> char {
        self.into()
    }
}

/// Render a bit or symbol sequence as a plain string
pub fn to_bit_string<T: BitChar>(bits: &[T]) -> String {
    bits.iter().map(|b| b.as_char()).collect()
}

/// Render a bit or symbol sequence with a space after every 8 symbols
pub fn format_grouped<T: BitChar>(bits: &[T]) -> String {
    let mut out = String::with_capacity(bits.len() + bits.len() / 8);
    for (i, chunk) in bits.chunks(8).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.extend(chunk.iter().map(|b| b.as_char()));
    }
    out
}

/// Render the levels of a step, e.g. `"+V -> -V"`
pub fn level_text(points: &[SignalPoint]) -> String {
    if points.is_empty() {
        return String::from("N/A");
    }
    let parts: Vec<String> = points
        .iter()
        .map(|p| alloc::format!("{}", p.level))
        .collect();
    parts.join(" -> ")
}

/// Widen a bit sequence into symbols
pub fn bits_to_symbols(bits: &[Bit]) -> Vec<Symbol> {
    bits.iter().copied().map(Symbol::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_grouped() {
        let bits: Vec<Bit> = "0100100001101001"
            .chars()
            .filter_map(Bit::from_char)
            .collect();
        assert_eq!(format_grouped(&bits), "01001000 01101001");
        assert_eq!(format_grouped::<Bit>(&[]), "");
        assert_eq!(format_grouped(&bits[..3]), "010");
    }

    #[test]
    fn test_symbol_rendering() {
        let symbols = [Symbol::Bit(Bit::One), Symbol::Invalid, Symbol::Bit(Bit::Zero)];
        assert_eq!(to_bit_string(&symbols), "1?0");
    }

    #[test]
    fn test_level_text() {
        let points = [
            SignalPoint::new(0.0, Level::High),
            SignalPoint::new(0.5, Level::Low),
        ];
        assert_eq!(level_text(&points), "+V -> -V");
        assert_eq!(level_text(&[]), "N/A");
    }

    #[test]
    fn test_level_flip_and_sign() {
        assert_eq!(Level::High.flip(), Level::Low);
        assert_eq!(Level::Low.as_i8(), -1);
        assert_eq!(Level::try_from(0i8), Err("signal level must be +1 or -1"));
    }
}
