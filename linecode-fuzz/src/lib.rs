//! Fuzzing entry points for linecode-core
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Run fuzzer: cargo fuzz run fuzz_destuff

use linecode_core::{
    decoder::decode_bit,
    framer::{destuff, Framing},
    technique::CodecState,
    types::{Bit, Level, SignalPoint, Symbol},
    InputKind, LineCode, Session, Technique,
};

fn symbol_from(byte: u8) -> Symbol {
    match byte % 3 {
        0 => Symbol::Bit(Bit::Zero),
        1 => Symbol::Bit(Bit::One),
        _ => Symbol::Invalid,
    }
}

/// Destuff arbitrary received symbols with every framing
pub fn fuzz_destuff(data: &[u8]) {
    let symbols: Vec<Symbol> = data.iter().copied().map(symbol_from).collect();

    // Should never panic
    for framing in [Framing::None, Framing::BitStuffing, Framing::ByteStuffing] {
        let out = destuff(framing, &symbols);
        assert!(out.bits.len() <= symbols.len());
    }
}

/// Decode arbitrary signal fragments with every line code
///
/// Each byte yields one point: the low bit picks the level, the rest a
/// time in half-bit steps. A zero byte ends the current interval.
pub fn fuzz_decode(data: &[u8]) {
    for code in LineCode::ALL {
        let mut state = code.initial_state();
        for (index, chunk) in data.split(|&b| b == 0).enumerate() {
            let points: Vec<SignalPoint> = chunk
                .iter()
                .map(|&b| {
                    let level = if b & 1 == 1 { Level::High } else { Level::Low };
                    SignalPoint::new(f64::from(b >> 1) * 0.5, level)
                })
                .collect();
            let (_, next) = decode_bit(code, state, &points, index);
            state = next;
        }
        if let CodecState::Carried(_) = code.initial_state() {
            assert!(state.level().is_some());
        }
    }
}

/// Run a full session on arbitrary input
///
/// The first byte picks the technique, the second the indices to corrupt.
pub fn fuzz_session(data: &[u8]) {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let technique = Technique::ALL[usize::from(selector) % Technique::ALL.len()];
    let every = rest.first().map_or(0, |&b| usize::from(b % 8));
    let input = String::from_utf8_lossy(rest.get(1..).unwrap_or_default());

    let mut session = Session::new();
    if session.start(&input, InputKind::Auto, technique).is_err() {
        return;
    }
    loop {
        if every > 0 && session.position() % every == 0 {
            let _ = session.arm_error_injection();
        }
        if session.tick().is_none() {
            break;
        }
    }
    assert!(session.report().is_some());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzz_destuff_empty() {
        fuzz_destuff(&[]);
    }

    #[test]
    fn test_fuzz_destuff_random() {
        fuzz_destuff(&[0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0]);
    }

    #[test]
    fn test_fuzz_destuff_all_ones() {
        fuzz_destuff(&[1; 1024]);
    }

    #[test]
    fn test_fuzz_decode_empty() {
        fuzz_decode(&[]);
    }

    #[test]
    fn test_fuzz_decode_random() {
        fuzz_decode(&[0x03, 0x02, 0x00, 0x05, 0x00, 0xFF, 0xFE, 0x07]);
    }

    #[test]
    fn test_fuzz_session_empty() {
        fuzz_session(&[]);
        fuzz_session(&[4]);
    }

    #[test]
    fn test_fuzz_session_random() {
        fuzz_session(&[5, 3, b'H', b'i', 0xFF, 0xC3]);
        fuzz_session(&[1, 2, b'0', b'1', b'1', b'0']);
    }
}
