//! Error types for linecode operations
//!
//! Only [`LineError`] is ever returned as an `Err`. [`FramingError`] and
//! [`BitErrorKind`] are carried as values in results and reports.

use alloc::string::String;
use serde::{Deserialize, Serialize};

use crate::session::SessionState;

/// Errors that abort a linecode operation
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, PartialEq)]
pub enum LineError {
    /// Input rejected before the session started
    #[cfg_attr(feature = "std", error("Validation error: {0}"))]
    Validation(ValidationError),

    /// Control call not accepted in the current session state
    #[cfg_attr(feature = "std", error("Cannot {operation} while session is {state:?}"))]
    InvalidState {
        /// The rejected operation
        operation: &'static str,
        /// The state the session was in
        state: SessionState,
    },
}

impl From<ValidationError> for LineError {
    fn from(err: ValidationError) -> Self {
        LineError::Validation(err)
    }
}

/// Malformed or empty input
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Nothing to transmit
    #[cfg_attr(feature = "std", error("Input data cannot be empty"))]
    EmptyInput,

    /// A forced bitstream contained something other than `0`/`1`/whitespace
    #[cfg_attr(
        feature = "std",
        error("Invalid bitstream: {ch:?} at position {position}, use only 0s and 1s")
    )]
    InvalidBitstream {
        /// The offending character
        ch: char,
        /// Character position in the raw input
        position: usize,
    },

    /// A text character outside the 8-bit code point range
    #[cfg_attr(
        feature = "std",
        error("Character {ch:?} at position {position} does not fit in 8 bits")
    )]
    UnencodableChar {
        /// The offending character
        ch: char,
        /// Character position in the trimmed input
        position: usize,
    },

    /// Unrecognised technique identifier
    #[cfg_attr(feature = "std", error("Unknown technique: {0}"))]
    UnknownTechnique(String),

    /// Unrecognised input-kind identifier
    #[cfg_attr(feature = "std", error("Unknown input kind: {0}"))]
    UnknownInputKind(String),
}

/// Malformed byte-stuffed frame, reported by destuffing
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FramingError {
    /// The frame does not begin with FLAG
    #[cfg_attr(feature = "std", error("No starting flag found"))]
    MissingLeadingFlag,

    /// Fewer than 8 bits remained where a byte was expected
    #[cfg_attr(feature = "std", error("Incomplete byte at bit offset {offset}"))]
    IncompleteByte {
        /// Bit offset of the partial byte
        offset: usize,
    },

    /// FLAG found before the end of the frame
    #[cfg_attr(feature = "std", error("Unexpected flag mid-stream at bit offset {offset}"))]
    UnexpectedFlag {
        /// Bit offset of the flag
        offset: usize,
    },

    /// ESC with no escaped byte before the trailing flag
    #[cfg_attr(feature = "std", error("Escape at bit offset {offset} has no following byte"))]
    DanglingEscape {
        /// Bit offset of the escape byte
        offset: usize,
    },

    /// The frame does not end with FLAG where expected
    #[cfg_attr(feature = "std", error("No ending flag found where expected"))]
    MissingTrailingFlag,
}

/// Why a bit position was recorded as a transmission error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitErrorKind {
    /// Deliberately flipped by the error injector
    Injected,
    /// The decoder saw a signal pattern no bit encodes to
    InvalidPattern,
}
