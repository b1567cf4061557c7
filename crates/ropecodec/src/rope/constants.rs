//! Canonical empty and single-byte ropes.

use std::sync::{Arc, LazyLock};

use super::{CodeRange, Rope, classify};
use crate::encoding::Encoding;

fn empty_leaf(encoding: Encoding) -> Rope {
    let code_range = if encoding.is_ascii_compatible() {
        CodeRange::SevenBit
    } else {
        CodeRange::Valid
    };
    Rope::new_leaf(Arc::from(&[][..]), encoding, code_range, 0)
}

fn single_byte_table(encoding: Encoding) -> Vec<Rope> {
    (0..=u8::MAX)
        .map(|byte| {
            let attributes = classify(encoding, &[byte]);
            Rope::new_leaf(
                Arc::from(&[byte][..]),
                encoding,
                attributes.code_range,
                attributes.character_length,
            )
        })
        .collect()
}

static EMPTY_UTF_8: LazyLock<Rope> = LazyLock::new(|| empty_leaf(Encoding::UTF_8));
static EMPTY_US_ASCII: LazyLock<Rope> = LazyLock::new(|| empty_leaf(Encoding::US_ASCII));
static EMPTY_BINARY: LazyLock<Rope> = LazyLock::new(|| empty_leaf(Encoding::ASCII_8BIT));

static SINGLE_UTF_8: LazyLock<Vec<Rope>> = LazyLock::new(|| single_byte_table(Encoding::UTF_8));
static SINGLE_US_ASCII: LazyLock<Vec<Rope>> =
    LazyLock::new(|| single_byte_table(Encoding::US_ASCII));
static SINGLE_BINARY: LazyLock<Vec<Rope>> =
    LazyLock::new(|| single_byte_table(Encoding::ASCII_8BIT));

pub(crate) fn empty(encoding: Encoding) -> Rope {
    if encoding == Encoding::UTF_8 {
        EMPTY_UTF_8.clone()
    } else if encoding == Encoding::US_ASCII {
        EMPTY_US_ASCII.clone()
    } else if encoding == Encoding::ASCII_8BIT {
        EMPTY_BINARY.clone()
    } else {
        empty_leaf(encoding)
    }
}

/// The shared one-byte rope for `byte`, for the encodings that keep a table.
pub(crate) fn single_byte(encoding: Encoding, byte: u8) -> Option<Rope> {
    let table = if encoding == Encoding::UTF_8 {
        &SINGLE_UTF_8
    } else if encoding == Encoding::US_ASCII {
        &SINGLE_US_ASCII
    } else if encoding == Encoding::ASCII_8BIT {
        &SINGLE_BINARY
    } else {
        return None;
    };
    table.get(usize::from(byte)).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_shared() {
        let a = single_byte(Encoding::UTF_8, b'a').unwrap();
        let b = single_byte(Encoding::UTF_8, b'a').unwrap();
        assert!(Arc::ptr_eq(a.inner(), b.inner()));
        assert_eq!(a.code_range(), CodeRange::SevenBit);
        assert_eq!(
            single_byte(Encoding::UTF_8, 0xFF).unwrap().code_range(),
            CodeRange::Broken
        );
        assert_eq!(
            single_byte(Encoding::ASCII_8BIT, 0xFF).unwrap().code_range(),
            CodeRange::Valid
        );
        assert!(single_byte(Encoding::SHIFT_JIS, b'a').is_none());
    }

    #[test]
    fn empty_ropes() {
        assert!(Arc::ptr_eq(
            empty(Encoding::UTF_8).inner(),
            empty(Encoding::UTF_8).inner()
        ));
        assert_eq!(empty(Encoding::UTF_16LE).code_range(), CodeRange::Valid);
        assert_eq!(empty(Encoding::US_ASCII).code_range(), CodeRange::SevenBit);
    }
}
