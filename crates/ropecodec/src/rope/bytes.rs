//! Walking the byte content of a tree without recursion.

use super::{Rope, RopeKind};

/// Calls `visit` with consecutive chunks covering `length` bytes of `root`
/// starting at `offset`.
pub(crate) fn for_each_chunk<F: FnMut(&[u8])>(
    root: &Rope,
    offset: usize,
    length: usize,
    mut visit: F,
) {
    let mut stack = vec![(root, offset, length)];
    while let Some((rope, offset, length)) = stack.pop() {
        if length == 0 {
            continue;
        }
        if let Some(bytes) = rope.stored_bytes() {
            visit(&bytes[offset..offset + length]);
            continue;
        }
        match rope.kind() {
            RopeKind::Leaf(_) | RopeKind::Lazy(_) => {
                visit(&rope.materialized()[offset..offset + length]);
            }
            RopeKind::Native(buffer) => buffer.read_range(offset, length, &mut visit),
            RopeKind::Substring { child, byte_offset } => {
                stack.push((child, byte_offset + offset, length));
            }
            RopeKind::Concat { left, right, .. } => {
                let left_length = left.byte_length();
                if offset + length <= left_length {
                    stack.push((left, offset, length));
                } else if offset >= left_length {
                    stack.push((right, offset - left_length, length));
                } else {
                    // right first so that left is visited first
                    stack.push((right, 0, offset + length - left_length));
                    stack.push((left, offset, left_length - offset));
                }
            }
            RopeKind::Repeating { child, .. } => {
                let child_length = child.byte_length();
                let end = offset + length;
                let mut pieces = Vec::new();
                let mut position = offset;
                while position < end {
                    let within = position % child_length;
                    let take = (child_length - within).min(end - position);
                    pieces.push((child, within, take));
                    position += take;
                }
                stack.extend(pieces.into_iter().rev());
            }
        }
    }
}

pub(crate) fn extract(rope: &Rope, offset: usize, length: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(length);
    for_each_chunk(rope, offset, length, |chunk| out.extend_from_slice(chunk));
    out
}

pub(crate) fn flatten_bytes(rope: &Rope) -> Vec<u8> {
    extract(rope, 0, rope.byte_length())
}

pub(crate) fn hash_bytes(rope: &Rope) -> u32 {
    let mut hash = 1u32;
    for_each_chunk(rope, 0, rope.byte_length(), |chunk| {
        for &byte in chunk {
            hash = hash.wrapping_mul(31).wrapping_add(u32::from(byte));
        }
    });
    hash
}
