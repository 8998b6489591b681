//! Stepwise transmission session
//!
//! A [`Session`] walks the framed bitstring one bit per [`Session::tick`]:
//! encode, optionally corrupt, decode, record. The caller owns the cadence.
//! Pausing means the session refuses to step until resumed; nothing is
//! rewound.
//!
//! ```text
//! Idle --start--> Running <--pause/resume--> Paused
//!                    |
//!                 last tick
//!                    v
//!                Completed          (reset: any state -> Idle)
//! ```

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize, Serializer};

use crate::decoder::decode_bit;
use crate::encoder::encode_bit;
use crate::error::{BitErrorKind, FramingError, LineError};
use crate::framer::{destuff, original_bit_index, stuff, Framing, StuffingResult};
use crate::technique::{CodecState, LineCode, Technique};
use crate::textcodec::{bits_to_text, byte_value, prepare_input, Classification, InputKind, PreparedInput};
use crate::types::{bits_to_symbols, format_grouped, to_bit_string, Bit, Level, SignalPoint, Symbol};
use crate::Result;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No data loaded
    #[default]
    Idle,
    /// Accepting ticks
    Running,
    /// Ticks are ignored until resumed
    Paused,
    /// Every bit processed, report available
    Completed,
}

/// Everything a session needs besides the message itself
///
/// Missing fields take their defaults: NRZ-L and auto-detected input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Line code and framing
    pub technique: Technique,

    /// How to interpret the raw input
    pub input_kind: InputKind,
}

impl SessionConfig {
    /// Create a config
    pub const fn new(technique: Technique, input_kind: InputKind) -> Self {
        Self {
            technique,
            input_kind,
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    /// Index into the framed bitstring
    pub index: usize,

    /// Bit put on the wire
    pub bit: Bit,

    /// Signal points emitted for this bit
    pub points: Vec<SignalPoint>,

    /// What the receiver recorded
    pub decoded: Symbol,

    /// Set when this bit was recorded as an error
    pub error: Option<BitErrorKind>,

    /// Index of the corresponding unframed input bit, `None` for framing bits
    pub original_index: Option<usize>,

    /// Whether this bit was inserted by framing
    pub synthetic: bool,

    /// Encoder's carried level before this bit (stateful codes only)
    pub level_before: Option<Level>,
}

/// Reconstructed message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FinalMessage {
    /// Input was text and a whole number of bytes came back
    Text(String),
    /// Grouped bitstring, 8 symbols per group
    Bits(String),
    /// Nothing survived deframing
    Empty,
}

/// Comparison of a bitstream input with what came back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Identical
    Match,
    /// Differs
    Mismatch,
}

/// Produced once when the session completes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionReport {
    /// Technique the session ran with
    pub technique: Technique,

    /// How the input was classified
    pub classification: Classification,

    /// Trimmed raw input
    pub original: String,

    /// Bits transmitted
    pub total_steps: usize,

    /// Received bits after deframing
    #[serde(serialize_with = "serialize_symbols")]
    pub deframed: Vec<Symbol>,

    /// Set when destuffing met a malformed frame
    pub frame_error: Option<FramingError>,

    /// Text or formatted bitstring
    pub message: FinalMessage,

    /// Present for bitstream input without framing
    pub verdict: Option<Verdict>,

    /// Every position (into the framed bitstring) recorded as an error
    pub error_positions: Vec<usize>,

    /// Errors from deliberate flips
    pub injected_errors: usize,

    /// Errors from invalid signal patterns
    pub invalid_patterns: usize,

    /// Bits dropped by deframing
    pub bits_removed: usize,

    /// ESC bytes dropped by byte destuffing
    pub escapes_removed: usize,

    /// FLAG bytes dropped by byte destuffing
    pub flags_removed: usize,

    /// Input bits byte stuffing could not frame
    pub truncated_bits: usize,
}

impl CompletionReport {
    /// Total errors of either kind
    pub fn error_count(&self) -> usize {
        self.error_positions.len()
    }

    /// Whether deframing failed
    pub fn deframe_failed(&self) -> bool {
        self.frame_error.is_some()
    }

    /// Received bits as a plain string
    pub fn deframed_string(&self) -> String {
        to_bit_string(&self.deframed)
    }

    /// Received bits packed into bytes, if there are any and they are whole
    /// bytes with no `?`
    pub fn deframed_bytes(&self) -> Option<Vec<u8>> {
        if self.deframed.is_empty() || self.deframed.len() % 8 != 0 {
            return None;
        }
        self.deframed.chunks(8).map(byte_value).collect()
    }
}

#[allow(clippy::ptr_arg)]
fn serialize_symbols<S: Serializer>(symbols: &Vec<Symbol>, serializer: S) -> core::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_bit_string(symbols))
}

/// Data owned by a started session
#[derive(Debug, Clone)]
struct Run {
    technique: Technique,
    line_code: LineCode,
    input: PreparedInput,
    framed: StuffingResult,
    position: usize,
    encoder: CodecState,
    decoder: CodecState,
    signal_log: Vec<SignalPoint>,
    decoded_bits: Vec<Symbol>,
    errors: BTreeMap<usize, BitErrorKind>,
    pending_injection: bool,
}

/// A single-message transmission, stepped one bit at a time
///
/// Every method takes `&mut self`, so steps can never overlap; share a
/// session across threads behind a `Mutex`.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    run: Option<Run>,
    report: Option<CompletionReport>,
}

impl Session {
    /// Create an idle session
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Validate and frame `input`, then start running
    ///
    /// Fails with [`LineError::Validation`] on empty or malformed input, in
    /// which case the session stays idle.
    pub fn start(&mut self, input: &str, kind: InputKind, technique: Technique) -> Result<()> {
        if self.state != SessionState::Idle {
            return Err(LineError::InvalidState {
                operation: "start",
                state: self.state,
            });
        }

        let input = prepare_input(input, kind)?;
        let framed = stuff(technique.framing(), &input.bits);
        let line_code = technique.line_code();

        #[cfg(feature = "logging")]
        debug!(
            "Session started with {}: {} input bits, {} to transmit",
            technique,
            input.bits.len(),
            framed.stuffed.len()
        );

        let empty = framed.stuffed.is_empty();
        self.run = Some(Run {
            technique,
            line_code,
            input,
            position: 0,
            encoder: line_code.initial_state(),
            decoder: line_code.initial_state(),
            signal_log: Vec::with_capacity(framed.stuffed.len() * line_code.points_per_bit()),
            decoded_bits: Vec::with_capacity(framed.stuffed.len()),
            errors: BTreeMap::new(),
            pending_injection: false,
            framed,
        });
        self.state = SessionState::Running;

        if empty {
            self.complete();
        }
        Ok(())
    }

    /// Start from a config
    pub fn start_with(&mut self, config: &SessionConfig, input: &str) -> Result<()> {
        self.start(input, config.input_kind, config.technique)
    }

    /// Process one bit
    ///
    /// Returns `None` without doing anything unless the session is running.
    pub fn tick(&mut self) -> Option<Step> {
        if self.state != SessionState::Running {
            return None;
        }
        let run = self.run.as_mut()?;
        let index = run.position;
        let bit = *run.framed.stuffed.get(index)?;

        let level_before = run.encoder.level();
        let (points, next) = encode_bit(run.line_code, run.encoder, bit, index);
        run.encoder = next;
        run.signal_log.extend_from_slice(&points);

        // The decoder always observes the interval so its carried level stays
        // in step with the line, even when the outcome is overridden.
        let (observed, next) = decode_bit(run.line_code, run.decoder, &points, index);
        run.decoder = next;

        let (decoded, error) = if run.pending_injection {
            run.pending_injection = false;
            #[cfg(feature = "logging")]
            warn!("Bit {} flipped during transmission", index);
            (Symbol::Bit(bit.flip()), Some(BitErrorKind::Injected))
        } else if observed == Symbol::Invalid {
            #[cfg(feature = "logging")]
            warn!("Invalid signal pattern for bit {}", index);
            (observed, Some(BitErrorKind::InvalidPattern))
        } else {
            (observed, None)
        };

        if let Some(kind) = error {
            run.errors.insert(index, kind);
        }
        run.decoded_bits.push(decoded);
        run.position += 1;

        #[cfg(feature = "logging")]
        debug!("Bit {} ('{}') decoded as '{}'", index, bit, decoded);

        let step = Step {
            index,
            bit,
            points,
            decoded,
            error,
            original_index: original_bit_index(&run.framed, index),
            synthetic: run.framed.is_synthetic(index),
            level_before,
        };

        if run.position == run.framed.stuffed.len() {
            self.complete();
        }
        Some(step)
    }

    /// Flip the decoded outcome of the next bit
    ///
    /// Arming twice before the next tick has no further effect.
    pub fn arm_error_injection(&mut self) -> Result<()> {
        let run = self.running("arm error injection")?;
        run.pending_injection = true;
        Ok(())
    }

    /// Stop accepting ticks
    pub fn pause(&mut self) -> Result<()> {
        self.running("pause")?;
        self.state = SessionState::Paused;
        Ok(())
    }

    /// Accept ticks again, continuing from the same position
    pub fn resume(&mut self) -> Result<()> {
        if self.state != SessionState::Paused {
            return Err(LineError::InvalidState {
                operation: "resume",
                state: self.state,
            });
        }
        self.state = SessionState::Running;
        Ok(())
    }

    /// Discard everything and return to idle
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Tick until the session stops running
    pub fn run_to_completion(&mut self) -> Vec<Step> {
        let mut steps = Vec::new();
        while let Some(step) = self.tick() {
            steps.push(step);
        }
        steps
    }

    /// Technique in use, once started
    pub fn technique(&self) -> Option<Technique> {
        self.run.as_ref().map(|r| r.technique)
    }

    /// Validated input, once started
    pub fn input(&self) -> Option<&PreparedInput> {
        self.run.as_ref().map(|r| &r.input)
    }

    /// Framing result, once started
    pub fn stuffing(&self) -> Option<&StuffingResult> {
        self.run.as_ref().map(|r| &r.framed)
    }

    /// Bits being transmitted (the framed bitstring)
    pub fn processed_data(&self) -> &[Bit] {
        self.run.as_ref().map_or(&[], |r| &r.framed.stuffed)
    }

    /// Index of the next bit to transmit
    pub fn position(&self) -> usize {
        self.run.as_ref().map_or(0, |r| r.position)
    }

    /// Every signal point emitted so far
    pub fn signal_log(&self) -> &[SignalPoint] {
        self.run.as_ref().map_or(&[], |r| &r.signal_log)
    }

    /// One symbol per completed step
    pub fn decoded_bits(&self) -> &[Symbol] {
        self.run.as_ref().map_or(&[], |r| &r.decoded_bits)
    }

    /// Positions recorded as errors, ascending
    pub fn error_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.run.iter().flat_map(|r| r.errors.keys().copied())
    }

    /// Why `position` was recorded as an error, if it was
    pub fn error_at(&self, position: usize) -> Option<BitErrorKind> {
        self.run.as_ref()?.errors.get(&position).copied()
    }

    /// Whether the next tick will flip its bit
    pub fn is_injection_armed(&self) -> bool {
        self.run.as_ref().is_some_and(|r| r.pending_injection)
    }

    /// Final report, once completed
    pub fn report(&self) -> Option<&CompletionReport> {
        self.report.as_ref()
    }

    fn running(&mut self, operation: &'static str) -> Result<&mut Run> {
        let state = self.state;
        match (state, self.run.as_mut()) {
            (SessionState::Running, Some(run)) => Ok(run),
            _ => Err(LineError::InvalidState { operation, state }),
        }
    }

    fn complete(&mut self) {
        self.state = SessionState::Completed;
        self.report = self.run.as_ref().map(finalize);
    }
}

fn finalize(run: &Run) -> CompletionReport {
    let framing = run.framed.framing;
    let destuffed = destuff(framing, &run.decoded_bits);

    #[cfg(feature = "logging")]
    if let Some(err) = &destuffed.error {
        warn!("Deframing failed: {:?}", err);
    }

    let deframed = destuffed.bits;
    let message = if deframed.is_empty() {
        FinalMessage::Empty
    } else if run.input.classification == Classification::Text && deframed.len() % 8 == 0 {
        FinalMessage::Text(bits_to_text(&deframed))
    } else {
        FinalMessage::Bits(format_grouped(&deframed))
    };

    let verdict = (run.input.classification == Classification::Bitstream
        && framing == Framing::None)
        .then(|| {
            if deframed == bits_to_symbols(&run.input.bits) {
                Verdict::Match
            } else {
                Verdict::Mismatch
            }
        });

    let injected_errors = run
        .errors
        .values()
        .filter(|&&k| k == BitErrorKind::Injected)
        .count();

    #[cfg(feature = "logging")]
    debug!(
        "Session complete: {} bits processed, {} error(s)",
        run.position,
        run.errors.len()
    );

    CompletionReport {
        technique: run.technique,
        classification: run.input.classification,
        original: run.input.original.clone(),
        total_steps: run.position,
        bits_removed: run.decoded_bits.len() - deframed.len(),
        deframed,
        frame_error: destuffed.error,
        message,
        verdict,
        error_positions: run.errors.keys().copied().collect(),
        injected_errors,
        invalid_patterns: run.errors.len() - injected_errors,
        escapes_removed: destuffed.escapes_removed,
        flags_removed: destuffed.flags_removed,
        truncated_bits: run.framed.truncated_bits,
    }
}
