//! Code-range classification.

use core::fmt;

use crate::encoding::{CharLength, Encoding};

/// How well-formed a byte sequence is under its encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CodeRange {
    /// Not computed yet.
    #[default]
    Unknown,
    /// Pure ASCII.
    SevenBit,
    /// Well-formed, with at least one non-ASCII character.
    Valid,
    /// Contains at least one malformed sequence.
    Broken,
}

impl CodeRange {
    /// Code range of the concatenation of two sequences.
    ///
    /// Identical ranges pass through and `Broken` dominates. A 7-bit and a
    /// valid sequence combine to `Valid`.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        if self == other {
            self
        } else if self == Self::Broken || other == Self::Broken {
            Self::Broken
        } else if self == Self::Unknown || other == Self::Unknown {
            Self::Unknown
        } else {
            Self::Valid
        }
    }
}

impl fmt::Display for CodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "UNKNOWN",
            Self::SevenBit => "7BIT",
            Self::Valid => "VALID",
            Self::Broken => "BROKEN",
        })
    }
}

/// Character count and code range of a byte sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StringAttributes {
    pub character_length: usize,
    pub code_range: CodeRange,
}

/// Computes the character count and code range of `bytes` under `encoding`.
///
/// A malformed sequence marks the result [`CodeRange::Broken`] and counts as
/// one character per offending byte.
#[must_use]
pub fn classify(encoding: Encoding, bytes: &[u8]) -> StringAttributes {
    if bytes.is_empty() {
        return StringAttributes {
            character_length: 0,
            code_range: if encoding.is_ascii_compatible() {
                CodeRange::SevenBit
            } else {
                CodeRange::Valid
            },
        };
    }

    if encoding.is_binary() {
        return StringAttributes {
            character_length: bytes.len(),
            code_range: if bytes.is_ascii() {
                CodeRange::SevenBit
            } else {
                CodeRange::Valid
            },
        };
    }

    let ascii_compatible = encoding.is_ascii_compatible();
    let mut code_range = if ascii_compatible {
        CodeRange::SevenBit
    } else {
        CodeRange::Valid
    };
    let mut characters = 0;
    let mut p = 0;
    while p < bytes.len() {
        if ascii_compatible {
            let run = bytes[p..]
                .iter()
                .position(|b| !b.is_ascii())
                .unwrap_or(bytes.len() - p);
            characters += run;
            p += run;
            if p == bytes.len() {
                break;
            }
        }
        match encoding.precise_length(&bytes[p..]) {
            CharLength::Char(length) => {
                if code_range != CodeRange::Broken {
                    code_range = CodeRange::Valid;
                }
                p += length;
            }
            CharLength::NeedMore(_) | CharLength::Invalid => {
                code_range = CodeRange::Broken;
                p += 1;
            }
        }
        characters += 1;
    }

    StringAttributes {
        character_length: characters,
        code_range,
    }
}

/// Counts characters of a sequence already known to be well-formed.
pub(crate) fn count_characters(encoding: Encoding, bytes: &[u8]) -> usize {
    if encoding.is_fixed_width() {
        bytes.len() / encoding.min_length()
    } else {
        classify(encoding, bytes).character_length
    }
}
