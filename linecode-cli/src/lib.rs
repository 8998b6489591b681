//! Library entry for linecode-cli used by integration tests and embedding.

pub mod commands;

// Re-export commands for convenience
pub use commands::*;

/// Stuffing scheme selected by `frame --mode`
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum FrameMode {
    /// Insert a 0 after five consecutive 1s
    Bit,
    /// FLAG-delimited frame with ESC before in-band FLAG/ESC bytes
    Byte,
}

impl FrameMode {
    /// The core framing this mode selects
    pub fn framing(self) -> linecode_core::framer::Framing {
        match self {
            FrameMode::Bit => linecode_core::framer::Framing::BitStuffing,
            FrameMode::Byte => linecode_core::framer::Framing::ByteStuffing,
        }
    }
}
