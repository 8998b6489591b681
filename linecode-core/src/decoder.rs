//! Line decoding: one bit interval's signal points back to a symbol
//!
//! The decoder keeps its own copy of the carried level, seeded exactly like
//! the encoder's, so an undamaged signal always decodes to the bits it was
//! encoded from. Anything no bit encodes to becomes [`Symbol::Invalid`].

use alloc::vec::Vec;

use crate::constants::{nrzl_bit, MID_BIT_OFFSET};
use crate::encoder::carried;
use crate::technique::{CodecState, LineCode};
use crate::types::{Bit, Level, SignalPoint, Symbol};

/// Decode the points of bit `index`, threading the carried state through
///
/// The returned state is the level at the end of this interval for the
/// stateful codes, so the next bit sees "the level before this bit".
pub fn decode_bit(
    code: LineCode,
    state: CodecState,
    points: &[SignalPoint],
    index: usize,
) -> (Symbol, CodecState) {
    let symbol = match code {
        LineCode::NrzL => match single(points, index) {
            Some(level) => Symbol::Bit(nrzl_bit(level)),
            None => Symbol::Invalid,
        },
        LineCode::NrzI => match single(points, index) {
            Some(level) => Symbol::Bit(Bit::from(level != carried(code, state))),
            None => Symbol::Invalid,
        },
        LineCode::Manchester => match pair(points, index) {
            Some((Level::High, Level::Low)) => Symbol::Bit(Bit::Zero),
            Some((Level::Low, Level::High)) => Symbol::Bit(Bit::One),
            _ => Symbol::Invalid,
        },
        LineCode::DiffManchester => match pair(points, index) {
            Some((first, second)) if first == second => Symbol::Invalid,
            Some((first, _)) if first != carried(code, state) => Symbol::Bit(Bit::Zero),
            Some(_) => Symbol::Bit(Bit::One),
            None => Symbol::Invalid,
        },
    };

    let next = match (state, points.last()) {
        (CodecState::Stateless, _) | (_, None) => state,
        (CodecState::Carried(_), Some(last)) => CodecState::Carried(last.level),
    };

    (symbol, next)
}

/// The level of a lone point at the start of bit `index`
fn single(points: &[SignalPoint], index: usize) -> Option<Level> {
    match points {
        [p] if p.time == index as f64 => Some(p.level),
        _ => None,
    }
}

/// Levels of exactly two points at `index` and `index + 0.5`
fn pair(points: &[SignalPoint], index: usize) -> Option<(Level, Level)> {
    let start = index as f64;
    match points {
        [a, b] if a.time == start && b.time == start + MID_BIT_OFFSET => Some((a.level, b.level)),
        _ => None,
    }
}

/// Stateful wrapper around [`decode_bit`] that owns one decoder's state
#[derive(Debug, Clone, PartialEq)]
pub struct LineDecoder {
    code: LineCode,
    state: CodecState,
    next_index: usize,
}

impl LineDecoder {
    /// Create a decoder in the code's initial state
    pub fn new(code: LineCode) -> Self {
        Self::with_state(code, code.initial_state())
    }

    /// Create a decoder seeded with an arbitrary state
    pub fn with_state(code: LineCode, state: CodecState) -> Self {
        Self {
            code,
            state,
            next_index: 0,
        }
    }

    /// The line code in use
    pub fn code(&self) -> LineCode {
        self.code
    }

    /// State the next interval will be decoded with
    pub fn state(&self) -> CodecState {
        self.state
    }

    /// Decode the next bit interval
    pub fn decode(&mut self, points: &[SignalPoint]) -> Symbol {
        let (symbol, next) = decode_bit(self.code, self.state, points, self.next_index);
        self.state = next;
        self.next_index += 1;
        symbol
    }

    /// Decode a sequence of per-bit point groups
    pub fn decode_all(&mut self, groups: &[Vec<SignalPoint>]) -> Vec<Symbol> {
        groups.iter().map(|g| self.decode(g)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::LineEncoder;
    use crate::textcodec::parse_bitstream;
    use crate::types::bits_to_symbols;

    #[test]
    fn test_round_trip_all_codes() {
        let bits = parse_bitstream("0100100001101001 1111100000").unwrap();
        for code in LineCode::ALL {
            let groups = LineEncoder::new(code).encode_all(&bits);
            let decoded = LineDecoder::new(code).decode_all(&groups);
            assert_eq!(decoded, bits_to_symbols(&bits), "{code} round trip");
        }
    }

    #[test]
    fn test_manchester_same_level_is_invalid() {
        let points = [
            SignalPoint::new(0.0, Level::High),
            SignalPoint::new(0.5, Level::High),
        ];
        let (symbol, _) = decode_bit(LineCode::Manchester, CodecState::Stateless, &points, 0);
        assert_eq!(symbol, Symbol::Invalid);
    }

    #[test]
    fn test_manchester_point_count() {
        let one = [SignalPoint::new(3.0, Level::High)];
        let (symbol, _) = decode_bit(LineCode::Manchester, CodecState::Stateless, &one, 3);
        assert_eq!(symbol, Symbol::Invalid);

        let misplaced = [
            SignalPoint::new(3.0, Level::High),
            SignalPoint::new(3.25, Level::Low),
        ];
        let (symbol, _) = decode_bit(LineCode::Manchester, CodecState::Stateless, &misplaced, 3);
        assert_eq!(symbol, Symbol::Invalid);
    }

    #[test]
    fn test_diff_manchester_malformed() {
        let state = LineCode::DiffManchester.initial_state();
        let (symbol, next) = decode_bit(LineCode::DiffManchester, state, &[], 0);
        assert_eq!(symbol, Symbol::Invalid);
        assert_eq!(next, state);
    }

    #[test]
    fn test_diff_manchester_equal_levels_are_invalid() {
        for level in [Level::High, Level::Low] {
            for carried in [Level::High, Level::Low] {
                let points = [SignalPoint::new(2.0, level), SignalPoint::new(2.5, level)];
                let (symbol, next) =
                    decode_bit(LineCode::DiffManchester, CodecState::Carried(carried), &points, 2);
                assert_eq!(symbol, Symbol::Invalid, "({level}, {level}) after {carried}");
                assert_eq!(next, CodecState::Carried(level));
            }
        }
    }

    #[test]
    fn test_diff_manchester_transition_rule() {
        let state = CodecState::Carried(Level::High);
        let points = [
            SignalPoint::new(4.0, Level::High),
            SignalPoint::new(4.5, Level::Low),
        ];
        let (symbol, next) = decode_bit(LineCode::DiffManchester, state, &points, 4);
        assert_eq!(symbol, Symbol::Bit(Bit::One));
        assert_eq!(next, CodecState::Carried(Level::Low));
    }

    #[test]
    fn test_nrzi_transition_rule() {
        let mut decoder = LineDecoder::new(LineCode::NrzI);
        // initial low: high is a transition
        assert_eq!(decoder.decode(&[SignalPoint::new(0.0, Level::High)]), Symbol::Bit(Bit::One));
        assert_eq!(decoder.decode(&[SignalPoint::new(1.0, Level::High)]), Symbol::Bit(Bit::Zero));
        assert_eq!(decoder.decode(&[]), Symbol::Invalid);
    }
}
