//! # Linecode Core
//!
//! Data-link layer physical encoding and framing, stepped one bit at a time.
//!
//! A message becomes a bitstring, is optionally framed with HDLC-style bit or
//! byte stuffing, is line coded into signal levels, may have a bit corrupted
//! in transit, and is decoded, deframed and reassembled.
//!
//! ## Modules
//!
//! - `constants`: FLAG/ESC bytes, stuffing run length, line coding conventions
//! - `types`: Core types (Bit, Symbol, Level, SignalPoint)
//! - `textcodec`: Text ⇄ bitstring conversion and input classification
//! - `framer`: Bit and byte stuffing and their inverses
//! - `technique`: Line code, framing and technique selectors, carried codec state
//! - `encoder`: Per-bit line encoding
//! - `decoder`: Per-bit line decoding
//! - `session`: The stepwise transmission state machine

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod framer;
pub mod session;
pub mod technique;
pub mod textcodec;
pub mod types;

// Re-export commonly used types
pub use error::{BitErrorKind, FramingError, LineError, ValidationError};
pub use session::{CompletionReport, Session, SessionConfig, SessionState, Step};
pub use technique::{LineCode, Technique};
pub use textcodec::InputKind;
pub use types::{Bit, Level, SignalPoint, Symbol};

/// Result type alias for linecode operations
pub type Result<T> = core::result::Result<T, LineError>;
