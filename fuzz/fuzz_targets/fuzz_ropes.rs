#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ropecodec::{CodeRange, Encoding, Rope, RopeEngine, RopeOptions, classify, make_leaf};

/// Largest model the repeat operation may grow to.
const MAX_BYTES: usize = 1 << 16;

#[derive(Debug, Arbitrary)]
enum Op {
    Append(Vec<u8>),
    Prepend(Vec<u8>),
    Substring { offset: u16, length: u16 },
    Repeat(u8),
    Flatten,
    Rebalance,
    ReadByte(u16),
}

#[derive(Debug, Arbitrary)]
struct Input {
    lazy_substrings: bool,
    depth_threshold: u8,
    ops: Vec<Op>,
}

fn leaf(bytes: &[u8]) -> Rope {
    make_leaf(bytes.to_vec(), Encoding::UTF_8, CodeRange::Unknown, None)
}

/// Applies every operation both to a rope and to a plain byte vector, and
/// checks after each step that the two agree.
fn run(input: Input) {
    let engine = RopeEngine::new(RopeOptions {
        lazy_substrings: input.lazy_substrings,
        depth_threshold: usize::from(input.depth_threshold).max(2),
    });
    let mut rope = leaf(b"");
    let mut model: Vec<u8> = Vec::new();

    for op in input.ops {
        match op {
            Op::Append(bytes) => {
                rope = engine.concat(&rope, &leaf(&bytes), Encoding::UTF_8).unwrap();
                model.extend_from_slice(&bytes);
            }
            Op::Prepend(bytes) => {
                rope = engine.concat(&leaf(&bytes), &rope, Encoding::UTF_8).unwrap();
                model.splice(0..0, bytes);
            }
            Op::Substring { offset, length } => {
                let (offset, length) = (usize::from(offset), usize::from(length));
                let result = engine.substring(&rope, offset, length);
                if offset.checked_add(length).is_some_and(|end| end <= model.len()) {
                    rope = result.unwrap();
                    model = model[offset..offset + length].to_vec();
                } else {
                    assert!(result.is_err());
                }
            }
            Op::Repeat(times) => {
                let times = usize::from(times % 8);
                if model.len() * times > MAX_BYTES {
                    continue;
                }
                rope = engine.repeat(&rope, times).unwrap();
                model = model.repeat(times);
            }
            Op::Flatten => rope = engine.flatten(&rope),
            Op::Rebalance => rope = engine.rebalance(&rope),
            Op::ReadByte(index) => {
                let index = usize::from(index);
                assert_eq!(rope.get_byte(index).ok(), model.get(index).copied());
            }
        }

        assert_eq!(rope.byte_length(), model.len());
        assert_eq!(
            rope.character_length(),
            classify(Encoding::UTF_8, &model).character_length
        );
        assert_eq!(rope.to_vec(), model);
        assert_eq!(rope, leaf(&model));
    }
}

fuzz_target!(|input: Input| run(input));
