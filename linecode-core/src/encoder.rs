//! Line encoding: one bit plus carried state to signal points
//!
//! | Code | `0` | `1` | State |
//! |---|---|---|---|
//! | NRZ-L | high | low | none |
//! | NRZ-I | hold level | flip level | level |
//! | Manchester | high, then low at `i + 0.5` | low, then high | none |
//! | Diff. Manchester | flip, emit, flip, emit | emit, flip, emit | level |

use alloc::vec;
use alloc::vec::Vec;

use crate::constants::{nrzl_level, MID_BIT_OFFSET};
use crate::technique::{CodecState, LineCode};
use crate::types::{Bit, Level, SignalPoint};

/// Encode bit `index`, threading the carried state through
///
/// Returns the points for the interval `[index, index + 1)` and the state
/// the next bit must be encoded with.
pub fn encode_bit(
    code: LineCode,
    state: CodecState,
    bit: Bit,
    index: usize,
) -> (Vec<SignalPoint>, CodecState) {
    let start = index as f64;
    let mid = start + MID_BIT_OFFSET;

    match code {
        LineCode::NrzL => (vec![SignalPoint::new(start, nrzl_level(bit))], state),
        LineCode::NrzI => {
            let previous = carried(code, state);
            let level = if bit.is_one() { previous.flip() } else { previous };
            (
                vec![SignalPoint::new(start, level)],
                CodecState::Carried(level),
            )
        }
        LineCode::Manchester => {
            let (first, second) = match bit {
                Bit::Zero => (Level::High, Level::Low),
                Bit::One => (Level::Low, Level::High),
            };
            (
                vec![SignalPoint::new(start, first), SignalPoint::new(mid, second)],
                state,
            )
        }
        LineCode::DiffManchester => {
            let previous = carried(code, state);
            let first = match bit {
                Bit::Zero => previous.flip(),
                Bit::One => previous,
            };
            let second = first.flip();
            (
                vec![SignalPoint::new(start, first), SignalPoint::new(mid, second)],
                CodecState::Carried(second),
            )
        }
    }
}

/// Level carried into the next bit, falling back to the code's initial level
pub(crate) fn carried(code: LineCode, state: CodecState) -> Level {
    state
        .level()
        .or_else(|| code.initial_state().level())
        .unwrap_or(Level::Low)
}

/// Stateful wrapper around [`encode_bit`] that owns one encoder's state
#[derive(Debug, Clone, PartialEq)]
pub struct LineEncoder {
    code: LineCode,
    state: CodecState,
    next_index: usize,
}

impl LineEncoder {
    /// Create an encoder in the code's initial state
    pub fn new(code: LineCode) -> Self {
        Self::with_state(code, code.initial_state())
    }

    /// Create an encoder seeded with an arbitrary state
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

    /// State the next bit will be encoded with
    pub fn state(&self) -> CodecState {
        self.state
    }

    /// Encode the next bit
    pub fn encode(&mut self, bit: Bit) -> Vec<SignalPoint> {
        let (points, next) = encode_bit(self.code, self.state, bit, self.next_index);
        self.state = next;
        self.next_index += 1;
        points
    }

    /// Encode a whole bitstring, one group of points per bit
    pub fn encode_all(&mut self, bits: &[Bit]) -> Vec<Vec<SignalPoint>> {
        bits.iter().map(|&bit| self.encode(bit)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::textcodec::parse_bitstream;

    fn levels(groups: &[Vec<SignalPoint>]) -> Vec<i8> {
        groups
            .iter()
            .flat_map(|g| g.iter().map(|p| p.level.as_i8()))
            .collect()
    }

    #[test]
    fn test_nrzl_polarity() {
        let groups = LineEncoder::new(LineCode::NrzL).encode_all(&parse_bitstream("0110").unwrap());
        assert_eq!(levels(&groups), vec![1, -1, -1, 1]);
        assert_eq!(groups[2][0].time, 2.0);
    }

    #[test]
    fn test_nrzi_flips_on_ones() {
        let mut encoder = LineEncoder::new(LineCode::NrzI);
        let groups = encoder.encode_all(&parse_bitstream("1101").unwrap());
        // start low: 1 -> high, 1 -> low, 0 -> low, 1 -> high
        assert_eq!(levels(&groups), vec![1, -1, -1, 1]);
        assert_eq!(encoder.state(), CodecState::Carried(Level::High));
    }

    #[test]
    fn test_manchester_mid_bit_transition() {
        let groups = LineEncoder::new(LineCode::Manchester).encode_all(&parse_bitstream("01").unwrap());
        assert_eq!(levels(&groups), vec![1, -1, -1, 1]);
        assert_eq!(groups[1][0].time, 1.0);
        assert_eq!(groups[1][1].time, 1.5);
    }

    #[test]
    fn test_diff_manchester() {
        let mut encoder = LineEncoder::new(LineCode::DiffManchester);
        let groups = encoder.encode_all(&parse_bitstream("001").unwrap());
        // low; 0: flip -> high, mid -> low; 0: flip -> high, mid -> low; 1: low, mid -> high
        assert_eq!(levels(&groups), vec![1, -1, 1, -1, -1, 1]);
        assert_eq!(encoder.state(), CodecState::Carried(Level::High));
    }

    #[test]
    fn test_seeded_state() {
        let (points, next) = encode_bit(
            LineCode::NrzI,
            CodecState::Carried(Level::High),
            Bit::Zero,
            7,
        );
        assert_eq!(points, vec![SignalPoint::new(7.0, Level::High)]);
        assert_eq!(next, CodecState::Carried(Level::High));
    }
}
