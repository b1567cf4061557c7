//! Single conversion steps.

use core::fmt;

/// How a step relates to ASCII on either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsciiCompatibility {
    /// The source is not ASCII-compatible, the destination is.
    Decoder,
    /// The source is ASCII-compatible, the destination is not.
    Encoder,
    /// Both sides are ASCII-compatible.
    Converter,
}

/// Mutable per-session state of one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepState {
    /// Free for the step's own use, e.g. a pending carriage return.
    pub flag: bool,
}

/// What a step did with the bytes it was offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The whole window was one character; its conversion was written out.
    Converted,
    /// The window is a proper prefix of a character.
    NeedMore,
    /// The first `consumed` bytes of the window are malformed; the rest must
    /// be offered again.
    Invalid { consumed: usize },
    /// The window is a well-formed character with no destination mapping.
    Undefined,
}

/// Converts the character in `window`, appending its conversion to `out`.
pub type StepFn = fn(state: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome;

/// Flushes whatever a stateful step still owes at end of input.
pub type FinishFn = fn(state: &mut StepState, out: &mut Vec<u8>);

/// A unit converter from one named encoding to another.
///
/// Decorators use an empty source name and their own name as destination.
pub struct Transcoder {
    pub source: &'static str,
    pub destination: &'static str,
    pub compatibility: AsciiCompatibility,
    pub step: StepFn,
    pub finish: Option<FinishFn>,
}

impl Transcoder {
    #[must_use]
    pub fn is_decorator(&self) -> bool {
        self.source.is_empty()
    }
}

impl fmt::Debug for Transcoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transcoder")
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("compatibility", &self.compatibility)
            .finish_non_exhaustive()
    }
}
