//! Technique selection: line codes, framing and their combined identifiers

use alloc::string::ToString;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::constants::{DIFF_MANCHESTER_INITIAL_LEVEL, NRZI_INITIAL_LEVEL};
use crate::error::ValidationError;
use crate::framer::Framing;
use crate::types::Level;

/// Mapping from bits to signal levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCode {
    /// Non-Return-to-Zero Level
    NrzL,
    /// Non-Return-to-Zero Invert-on-ones
    NrzI,
    /// Manchester (0 = high→low, 1 = low→high)
    Manchester,
    /// Differential Manchester (0 = transition at bit start)
    DiffManchester,
}

impl LineCode {
    /// All line codes
    pub const ALL: [LineCode; 4] = [
        LineCode::NrzL,
        LineCode::NrzI,
        LineCode::Manchester,
        LineCode::DiffManchester,
    ];

    /// State an encoder or decoder starts from
    pub const fn initial_state(self) -> CodecState {
        match self {
            LineCode::NrzL | LineCode::Manchester => CodecState::Stateless,
            LineCode::NrzI => CodecState::Carried(NRZI_INITIAL_LEVEL),
            LineCode::DiffManchester => CodecState::Carried(DIFF_MANCHESTER_INITIAL_LEVEL),
        }
    }

    /// Signal points emitted per bit
    pub const fn points_per_bit(self) -> usize {
        match self {
            LineCode::NrzL | LineCode::NrzI => 1,
            LineCode::Manchester | LineCode::DiffManchester => 2,
        }
    }
}

impl fmt::Display for LineCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LineCode::NrzL => "NRZ-L",
            LineCode::NrzI => "NRZ-I",
            LineCode::Manchester => "Manchester",
            LineCode::DiffManchester => "Differential Manchester",
        })
    }
}

/// Level carried across bit boundaries
///
/// Owned by exactly one encoder or decoder. NRZ-I and Differential
/// Manchester carry the level just before the next bit; the other codes
/// carry nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecState {
    /// No state
    Stateless,
    /// Level at the end of the previous bit interval
    Carried(Level),
}

impl CodecState {
    /// The carried level, if any
    pub const fn level(self) -> Option<Level> {
        match self {
            CodecState::Stateless => None,
            CodecState::Carried(level) => Some(level),
        }
    }
}

/// The six technique identifiers offered to callers
///
/// The two stuffing techniques put NRZ-L on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Technique {
    /// NRZ-L, no framing
    #[default]
    NrzL,
    /// NRZ-I, no framing
    NrzI,
    /// Manchester, no framing
    Manchester,
    /// Differential Manchester, no framing
    DiffManchester,
    /// Bit stuffing over NRZ-L
    BitStuff,
    /// Byte stuffing over NRZ-L
    ByteStuff,
}

impl Technique {
    /// All techniques
    pub const ALL: [Technique; 6] = [
        Technique::NrzL,
        Technique::NrzI,
        Technique::Manchester,
        Technique::DiffManchester,
        Technique::BitStuff,
        Technique::ByteStuff,
    ];

    /// Line code used on the wire
    pub const fn line_code(self) -> LineCode {
        match self {
            Technique::NrzL | Technique::BitStuff | Technique::ByteStuff => LineCode::NrzL,
            Technique::NrzI => LineCode::NrzI,
            Technique::Manchester => LineCode::Manchester,
            Technique::DiffManchester => LineCode::DiffManchester,
        }
    }

    /// Framing applied before line coding
    pub const fn framing(self) -> Framing {
        match self {
            Technique::BitStuff => Framing::BitStuffing,
            Technique::ByteStuff => Framing::ByteStuffing,
            _ => Framing::None,
        }
    }

    /// Identifier accepted by [`FromStr`]
    pub const fn id(self) -> &'static str {
        match self {
            Technique::NrzL => "nrzl",
            Technique::NrzI => "nrzi",
            Technique::Manchester => "manchester",
            Technique::DiffManchester => "diffmanchester",
            Technique::BitStuff => "bitstuff",
            Technique::ByteStuff => "bytestuff",
        }
    }

    /// Compact label for status displays
    pub const fn short_name(self) -> &'static str {
        match self {
            Technique::NrzL => "NRZ-L",
            Technique::NrzI => "NRZ-I",
            Technique::Manchester => "MANCH",
            Technique::DiffManchester => "DIFF",
            Technique::BitStuff => "BIT+NRZL",
            Technique::ByteStuff => "BYTE+NRZL",
        }
    }
}

impl FromStr for Technique {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Technique::ALL
            .into_iter()
            .find(|t| t.id() == s)
            .ok_or_else(|| ValidationError::UnknownTechnique(s.to_string()))
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Technique::BitStuff => f.write_str("Bit Stuffing (NRZ-L)"),
            Technique::ByteStuff => f.write_str("Byte Stuffing (NRZ-L)"),
            other => write!(f, "{}", other.line_code()),
        }
    }
}
