//! Picking the encoding that governs an operation over two values.

use super::Encoding;
use crate::rope::{CodeRange, Rope};

/// The encoding a combination of `first` and `second` should carry, or
/// `None` when the two cannot be mixed.
///
/// ASCII-only content is compatible with any ASCII-compatible encoding, so
/// a 7-bit side defers to the other side's encoding.
#[must_use]
pub fn negotiate(first: &Rope, second: &Rope) -> Option<Encoding> {
    let first_encoding = first.encoding();
    let second_encoding = second.encoding();

    if first_encoding == second_encoding {
        return Some(first_encoding);
    }
    if second.is_empty() {
        return Some(first_encoding);
    }
    if first.is_empty() {
        return Some(
            if first_encoding.is_ascii_compatible()
                && second.scan_code_range() == CodeRange::SevenBit
            {
                first_encoding
            } else {
                second_encoding
            },
        );
    }
    if !first_encoding.is_ascii_compatible() || !second_encoding.is_ascii_compatible() {
        return None;
    }

    let first_range = first.scan_code_range();
    let second_range = second.scan_code_range();
    if second_range == CodeRange::SevenBit {
        Some(first_encoding)
    } else if first_range == CodeRange::SevenBit {
        Some(second_encoding)
    } else {
        None
    }
}

/// Encoding-only negotiation, for when no content is at hand.
///
/// US-ASCII defers to any other ASCII-compatible encoding.
#[must_use]
pub fn negotiate_encodings(first: Encoding, second: Encoding) -> Option<Encoding> {
    if first == second {
        return Some(first);
    }
    if !first.is_ascii_compatible() || !second.is_ascii_compatible() {
        return None;
    }
    if second == Encoding::US_ASCII {
        Some(first)
    } else if first == Encoding::US_ASCII {
        Some(second)
    } else {
        None
    }
}
