//! Conversion between named encodings.
//!
//! [`Converter`] is the streaming session; [`transcode`] and
//! [`transcode_rope`] convert whole values in one call.

mod buffer;
mod converter;
mod flags;
pub mod registry;
mod result;
mod transcoder;
mod transcoders;

pub use converter::Converter;
pub use flags::{EconvFlags, InvalidAction, UndefinedAction};
pub use result::{ConversionResult, LastError};
pub use transcoder::{AsciiCompatibility, FinishFn, StepFn, StepOutcome, StepState, Transcoder};

use crate::encoding::Encoding;
use crate::error::TranscodeError;
use crate::rope::{CodeRange, Rope, make_leaf};

/// Converts `bytes` from `source` to `destination` in one go.
///
/// Error handling and decorators come from `flags`; `PARTIAL_INPUT` and
/// `AFTER_OUTPUT` are ignored. Equal names only apply the decorators.
pub fn transcode(
    bytes: &[u8],
    source: &str,
    destination: &str,
    flags: EconvFlags,
) -> Result<Vec<u8>, TranscodeError> {
    let mut converter = if source.eq_ignore_ascii_case(destination) {
        if flags.decorator_names()?.is_empty() {
            return Ok(bytes.to_vec());
        }
        Converter::open("", "", flags)?
    } else {
        Converter::open(source, destination, flags)?
    };
    converter::convert_to_end(&mut converter, bytes)
}

/// Converts `rope` into a leaf in `encoding`.
pub fn transcode_rope(
    rope: &Rope,
    encoding: Encoding,
    flags: EconvFlags,
) -> Result<Rope, TranscodeError> {
    if rope.encoding() == encoding && flags.decorator_names()?.is_empty() {
        return Ok(rope.clone());
    }
    let bytes = transcode(&rope.bytes(), rope.encoding().name(), encoding.name(), flags)?;
    Ok(make_leaf(bytes, encoding, CodeRange::Unknown, None))
}
