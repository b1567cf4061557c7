use quickcheck::QuickCheck;

use crate::{CodeRange, Encoding, Rope, RopeEngine, RopeOptions, make_leaf};

fn test_count() -> u64 {
    #[cfg(not(miri))]
    let tests = if cfg!(feature = "test-fast") {
        20
    } else if is_ci::cached() {
        10_000
    } else {
        1_000
    };
    #[cfg(miri)]
    let tests = 10;
    tests
}

fn binary(bytes: &[u8]) -> Rope {
    make_leaf(bytes.to_vec(), Encoding::ASCII_8BIT, CodeRange::Unknown, None)
}

/// Concatenates `bytes` back together from pieces whose sizes are derived
/// from `splits`.
fn build(engine: &RopeEngine, bytes: &[u8], splits: &[usize]) -> Rope {
    let mut rope = Rope::empty(Encoding::ASCII_8BIT);
    let mut rest = bytes;
    for split in splits {
        if rest.is_empty() {
            break;
        }
        let (piece, tail) = rest.split_at(1 + split % rest.len());
        rope = engine.concat(&rope, &binary(piece), Encoding::ASCII_8BIT).unwrap();
        rest = tail;
    }
    if !rest.is_empty() {
        rope = engine.concat(&rope, &binary(rest), Encoding::ASCII_8BIT).unwrap();
    }
    rope
}

/// Property: concatenation preserves content and adds lengths.
#[test]
fn concat_identity_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(left: String, right: String) -> bool {
        let engine = RopeEngine::default();
        let joined = engine
            .concat(&Rope::from(left.as_str()), &Rope::from(right.as_str()), Encoding::UTF_8)
            .unwrap();
        *joined.bytes() == *format!("{left}{right}").as_bytes()
            && joined.byte_length() == left.len() + right.len()
            && joined.character_length() == left.chars().count() + right.chars().count()
            && joined.code_range() != CodeRange::Broken
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(String, String) -> bool);
}

/// Property: a substring of any tree shape reads the same bytes as slicing
/// the flat input, lazily or eagerly.
#[test]
fn substring_roundtrip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(bytes: Vec<u8>, splits: Vec<usize>, offset: usize, length: usize, lazy: bool) -> bool {
        let engine = RopeEngine::new(RopeOptions {
            lazy_substrings: lazy,
            depth_threshold: 8,
        });
        let rope = build(&engine, &bytes, &splits);
        let offset = offset % (bytes.len() + 1);
        let length = length % (bytes.len() - offset + 1);

        let sub = engine.substring(&rope, offset, length).unwrap();
        sub.to_vec() == bytes[offset..offset + length]
            && sub.character_length() == length
            && rope.extract(offset, length).unwrap() == sub.to_vec()
            && (length == 0 || sub.get_byte(length - 1).unwrap() == bytes[offset + length - 1])
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(Vec<u8>, Vec<usize>, usize, usize, bool) -> bool);
}

/// Property: building a rope one byte at a time keeps its depth logarithmic,
/// whichever side the bytes are added on. Balanced pieces below half the
/// threshold survive rebalancing whole, so the bound is twice the threshold.
#[test]
fn depth_stays_bounded() {
    let engine = RopeEngine::new(RopeOptions {
        depth_threshold: 16,
        ..RopeOptions::default()
    });
    let mut appended = Rope::empty(Encoding::US_ASCII);
    let mut prepended = Rope::empty(Encoding::US_ASCII);
    let mut expected = Vec::new();
    for i in 0..10_000u32 {
        let byte = b'a' + u8::try_from(i % 26).unwrap();
        let single = binary(&[byte]);
        appended = engine.concat(&appended, &single, Encoding::US_ASCII).unwrap();
        prepended = engine.concat(&single, &prepended, Encoding::US_ASCII).unwrap();
        assert!(appended.depth() <= 32, "depth {} after {i} appends", appended.depth());
        assert!(prepended.depth() <= 32, "depth {} after {i} prepends", prepended.depth());
        expected.push(byte);
    }
    assert_eq!(appended.to_vec(), expected);
    expected.reverse();
    assert_eq!(prepended.to_vec(), expected);
    assert_eq!(appended.code_range(), CodeRange::SevenBit);
    assert_eq!(appended.character_length(), 10_000);
}

/// Property: repeating and then slicing agrees with `[T]::repeat`.
#[test]
fn repeat_matches_slice_repeat_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(bytes: Vec<u8>, times: u8, offset: usize, length: usize) -> bool {
        let engine = RopeEngine::default();
        let times = usize::from(times % 8);
        let expected = bytes.repeat(times);
        let repeated = engine.repeat(&binary(&bytes), times).unwrap();
        if repeated.to_vec() != expected {
            return false;
        }
        let offset = offset % (expected.len() + 1);
        let length = length % (expected.len() - offset + 1);
        engine.substring(&repeated, offset, length).unwrap().to_vec()
            == expected[offset..offset + length]
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(Vec<u8>, u8, usize, usize) -> bool);
}
