use rstest::*;

use crate::{CodeRange, Encoding, Rope, make_leaf, negotiate, negotiate_encodings};

fn rope(bytes: &[u8], encoding: Encoding) -> Rope {
    make_leaf(bytes.to_vec(), encoding, CodeRange::Unknown, None)
}

#[rstest]
#[case(b"abc", Encoding::UTF_8, b"\xC3\xA9", Encoding::UTF_8, Some(Encoding::UTF_8))]
#[case(b"\xC3\xA9", Encoding::UTF_8, b"a", Encoding::US_ASCII, Some(Encoding::UTF_8))]
#[case(b"a", Encoding::US_ASCII, b"\xC3\xA9", Encoding::UTF_8, Some(Encoding::UTF_8))]
#[case(b"\x82\xA0", Encoding::SHIFT_JIS, b"a", Encoding::UTF_8, Some(Encoding::SHIFT_JIS))]
#[case(b"x", Encoding::UTF_8, b"", Encoding::SHIFT_JIS, Some(Encoding::UTF_8))]
#[case(b"", Encoding::ISO_8859_1, b"a", Encoding::UTF_8, Some(Encoding::ISO_8859_1))]
#[case(b"", Encoding::ISO_8859_1, b"\xC3\xA9", Encoding::UTF_8, Some(Encoding::UTF_8))]
#[case(b"", Encoding::UTF_16LE, b"a", Encoding::UTF_8, Some(Encoding::UTF_8))]
#[case(b"\xC3\xA9", Encoding::UTF_8, b"\xE9", Encoding::ISO_8859_1, None)]
#[case(b"a\0", Encoding::UTF_16LE, b"a", Encoding::UTF_8, None)]
#[case(b"a", Encoding::UTF_8, b"a\0\0\0", Encoding::UTF_32LE, None)]
fn negotiation_matrix(
    #[case] first: &[u8],
    #[case] first_encoding: Encoding,
    #[case] second: &[u8],
    #[case] second_encoding: Encoding,
    #[case] expected: Option<Encoding>,
) {
    let first = rope(first, first_encoding);
    let second = rope(second, second_encoding);
    assert_eq!(negotiate(&first, &second), expected);
}

#[rstest]
#[case(Encoding::UTF_8, Encoding::UTF_8, Some(Encoding::UTF_8))]
#[case(Encoding::UTF_8, Encoding::US_ASCII, Some(Encoding::UTF_8))]
#[case(Encoding::US_ASCII, Encoding::EUC_JP, Some(Encoding::EUC_JP))]
#[case(Encoding::UTF_8, Encoding::ISO_8859_1, None)]
#[case(Encoding::US_ASCII, Encoding::UTF_16BE, None)]
#[case(Encoding::UTF_16, Encoding::US_ASCII, None)]
fn encoding_only_negotiation(
    #[case] first: Encoding,
    #[case] second: Encoding,
    #[case] expected: Option<Encoding>,
) {
    assert_eq!(negotiate_encodings(first, second), expected);
}

#[test]
fn unknown_code_ranges_are_scanned() {
    let lazy = Rope::lazy(Encoding::ISO_8859_1, CodeRange::Unknown, 2, 2, || b"ok".to_vec());
    let other = rope(b"\xC3\xA9", Encoding::UTF_8);
    assert_eq!(negotiate(&other, &lazy), Some(Encoding::UTF_8));
    assert_eq!(negotiate(&lazy, &other), Some(Encoding::UTF_8));
}
