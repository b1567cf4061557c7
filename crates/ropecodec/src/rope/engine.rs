//! Tree-building operations.

use log::debug;

use super::{
    CodeRange, NodeAttributes, Rope, RopeKind, RopeOptions, bytes, check_range, classify, constants,
    make_leaf,
};
use crate::encoding::{Encoding, negotiate};
use crate::error::RopeError;

/// Builds new ropes out of existing ones.
///
/// The engine is a plain value; it only carries the [`RopeOptions`] that
/// steer substring laziness and rebalancing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RopeEngine {
    options: RopeOptions,
}

impl RopeEngine {
    #[must_use]
    pub fn new(options: RopeOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &RopeOptions {
        &self.options
    }

    // ----------------------------------------------------------------------
    // Concatenation

    /// Concatenates two ropes under `encoding`.
    ///
    /// The caller has already settled on the result encoding, see
    /// [`RopeEngine::concat_compatible`] for the negotiating variant.
    pub fn concat(&self, left: &Rope, right: &Rope, encoding: Encoding) -> Result<Rope, RopeError> {
        left.byte_length()
            .checked_add(right.byte_length())
            .ok_or(RopeError::StringTooLong {
                left: left.byte_length(),
                right: right.byte_length(),
            })?;

        if right.is_empty() {
            return Ok(self.retag(left, encoding));
        }
        if left.is_empty() {
            return Ok(self.retag(right, encoding));
        }

        let left = native_to_leaf(left);
        let right = native_to_leaf(right);

        if left.code_range() == CodeRange::Broken || right.code_range() == CodeRange::Broken {
            let mut joined = Vec::with_capacity(left.byte_length() + right.byte_length());
            joined.extend_from_slice(&left.bytes());
            joined.extend_from_slice(&right.bytes());
            return Ok(make_leaf(joined, encoding, CodeRange::Unknown, None));
        }

        let threshold = self.options.depth_threshold;
        let left = if left.depth() >= threshold {
            self.rebalance(&left)
        } else {
            left
        };
        let right = if right.depth() >= threshold {
            self.rebalance(&right)
        } else {
            right
        };

        let joined = concat_node(left, right, encoding);
        #[cfg(any(test, feature = "fuzzing"))]
        assert!(
            joined.code_range() != CodeRange::Broken,
            "Internal error: broken operand reached a concat node"
        );
        Ok(joined)
    }

    /// Concatenates two ropes under the encoding the negotiator picks for
    /// them.
    pub fn concat_compatible(&self, left: &Rope, right: &Rope) -> Result<Rope, RopeError> {
        let encoding = negotiate(left, right).ok_or(RopeError::EncodingIncompatible {
            first: left.encoding().name(),
            second: right.encoding().name(),
        })?;
        self.concat(left, right, encoding)
    }

    /// Rebuilds an unbalanced concatenation tree so that its depth is
    /// logarithmic in the number of its pieces.
    ///
    /// Balanced subtrees are kept whole; pieces at least half the threshold
    /// deep are flattened first.
    #[must_use]
    pub fn rebalance(&self, rope: &Rope) -> Rope {
        if !matches!(rope.kind(), RopeKind::Concat { balanced: false, .. }) {
            return rope.clone();
        }

        let flatten_depth = self.options.depth_threshold / 2;
        let mut queue = Vec::new();
        let mut stack = vec![rope];
        while let Some(node) = stack.pop() {
            match node.kind() {
                RopeKind::Concat {
                    left,
                    right,
                    balanced: false,
                } => {
                    stack.push(right);
                    stack.push(left);
                }
                _ if node.depth() >= flatten_depth => queue.push(node.flatten()),
                _ => queue.push(node.clone()),
            }
        }

        let pieces = queue.len();
        let encoding = rope.encoding();
        while queue.len() > 1 {
            let mut level = Vec::with_capacity(queue.len() / 2 + 1);
            let mut nodes = queue.into_iter();
            while let Some(left) = nodes.next() {
                match nodes.next() {
                    Some(right) => level.push(concat_node(left, right, encoding)),
                    None => level.push(left),
                }
            }
            queue = level;
        }

        match queue.pop() {
            Some(root) => {
                debug!(
                    "rebalanced rope of {} bytes: depth {} -> {} over {pieces} pieces",
                    rope.byte_length(),
                    rope.depth(),
                    root.depth()
                );
                root
            }
            None => rope.clone(),
        }
    }

    // ----------------------------------------------------------------------
    // Substrings

    /// The `byte_length` bytes of `base` starting at `byte_offset`.
    pub fn substring(
        &self,
        base: &Rope,
        byte_offset: usize,
        byte_length: usize,
    ) -> Result<Rope, RopeError> {
        check_range(base, byte_offset, byte_length)?;
        let encoding = base.encoding();

        if byte_length == 0 {
            return Ok(constants::empty(encoding));
        }
        if byte_length == 1 {
            let byte = base.get_byte(byte_offset)?;
            return Ok(constants::single_byte(encoding, byte)
                .unwrap_or_else(|| make_leaf(vec![byte], encoding, CodeRange::Unknown, None)));
        }
        if byte_length == base.byte_length() {
            return Ok(base.clone());
        }

        Ok(match base.kind() {
            RopeKind::Leaf(_) | RopeKind::Lazy(_) => {
                self.make_substring(base, byte_offset, byte_length, encoding)
            }
            RopeKind::Native(_) => {
                self.make_substring(&base.flatten(), byte_offset, byte_length, encoding)
            }
            RopeKind::Substring {
                child,
                byte_offset: child_offset,
            } => self.make_substring(child, child_offset + byte_offset, byte_length, encoding),
            RopeKind::Repeating { child, .. } => {
                self.substring_repeating(base, child, byte_offset, byte_length, encoding)
            }
            RopeKind::Concat { .. } => {
                self.substring_concat(base, byte_offset, byte_length, encoding)
            }
        })
    }

    fn substring_repeating(
        &self,
        base: &Rope,
        child: &Rope,
        byte_offset: usize,
        byte_length: usize,
        encoding: Encoding,
    ) -> Rope {
        let child_length = child.byte_length();
        if byte_offset % child_length == 0 && byte_length == child_length {
            self.retag(child, encoding)
        } else {
            self.make_substring(base, byte_offset, byte_length, encoding)
        }
    }

    fn substring_concat(
        &self,
        base: &Rope,
        byte_offset: usize,
        byte_length: usize,
        encoding: Encoding,
    ) -> Rope {
        let mut root = base;
        let mut offset = byte_offset;
        while let RopeKind::Concat { left, right, .. } = root.kind() {
            let left_length = left.byte_length();
            if offset + byte_length <= left_length {
                root = left;
            } else if offset >= left_length {
                offset -= left_length;
                root = right;
            } else if byte_length == root.byte_length() {
                return self.retag(root, encoding);
            } else {
                return self.make_substring(root, offset, byte_length, encoding);
            }
        }

        if byte_length == root.byte_length() {
            return self.retag(root, encoding);
        }
        match root.kind() {
            RopeKind::Substring {
                child,
                byte_offset: child_offset,
            } => self.make_substring(child, child_offset + offset, byte_length, encoding),
            RopeKind::Repeating { child, .. } => {
                self.substring_repeating(root, child, offset, byte_length, encoding)
            }
            RopeKind::Native(_) => {
                self.make_substring(&root.flatten(), offset, byte_length, encoding)
            }
            _ => self.make_substring(root, offset, byte_length, encoding),
        }
    }

    fn make_substring(
        &self,
        base: &Rope,
        byte_offset: usize,
        byte_length: usize,
        encoding: Encoding,
    ) -> Rope {
        if base.code_range() == CodeRange::SevenBit && encoding.is_ascii_compatible() {
            let attributes = NodeAttributes {
                encoding,
                code_range: CodeRange::SevenBit,
                single_byte_optimizable: true,
                byte_length,
                character_length: byte_length,
                depth: base.depth(),
            };
            return if self.options.lazy_substrings {
                substring_node(base, byte_offset, attributes)
            } else {
                make_leaf(
                    bytes::extract(base, byte_offset, byte_length),
                    encoding,
                    CodeRange::SevenBit,
                    Some(byte_length),
                )
            };
        }

        if self.options.lazy_substrings {
            let whole = base.bytes();
            let attributes = classify(encoding, &whole[byte_offset..byte_offset + byte_length]);
            substring_node(
                base,
                byte_offset,
                NodeAttributes {
                    encoding,
                    code_range: attributes.code_range,
                    single_byte_optimizable: attributes.code_range == CodeRange::SevenBit
                        || encoding.max_length() == 1,
                    byte_length,
                    character_length: attributes.character_length,
                    depth: base.depth(),
                },
            )
        } else {
            let extracted = bytes::extract(base, byte_offset, byte_length);
            let attributes = classify(encoding, &extracted);
            make_leaf(
                extracted,
                encoding,
                attributes.code_range,
                Some(attributes.character_length),
            )
        }
    }

    // ----------------------------------------------------------------------
    // Repetition, flattening, re-tagging

    /// `base` repeated `times` times.
    pub fn repeat(&self, base: &Rope, times: usize) -> Result<Rope, RopeError> {
        let encoding = base.encoding();
        if times == 0 {
            return Ok(constants::empty(encoding));
        }
        if times == 1 || base.is_empty() {
            return Ok(base.clone());
        }
        let byte_length = base
            .byte_length()
            .checked_mul(times)
            .ok_or(RopeError::RepeatTooLong {
                byte_length: base.byte_length(),
                times,
            })?;

        let base = native_to_leaf(base);
        if base.code_range() == CodeRange::Broken {
            // Copies may join into valid characters at the seams.
            return Ok(make_leaf(base.bytes().repeat(times), encoding, CodeRange::Unknown, None));
        }
        let character_length = base.character_length() * times;
        if base.byte_length() == 1 {
            let byte = base.get_byte(0)?;
            return Ok(make_leaf(
                vec![byte; byte_length],
                encoding,
                base.code_range(),
                Some(character_length),
            ));
        }

        let attributes = NodeAttributes {
            encoding,
            code_range: base.code_range(),
            single_byte_optimizable: base.is_single_byte_optimizable(),
            byte_length,
            character_length,
            depth: base.depth() + 1,
        };
        Ok(Rope::from_parts(
            attributes,
            RopeKind::Repeating { child: base, times },
            None,
        ))
    }

    /// A leaf with the same content as `rope`.
    #[must_use]
    pub fn flatten(&self, rope: &Rope) -> Rope {
        rope.flatten()
    }

    /// `rope` tagged with `encoding`.
    ///
    /// A 7-bit rope moving into an ASCII-compatible encoding keeps its tree.
    /// Anything else is re-materialized as a leaf carrying `code_range`, which
    /// is computed from the bytes when it is [`CodeRange::Unknown`].
    #[must_use]
    pub fn with_encoding(&self, rope: &Rope, encoding: Encoding, code_range: CodeRange) -> Rope {
        if rope.encoding() == encoding {
            return rope.clone();
        }
        if rope.code_range() == CodeRange::SevenBit
            && encoding.is_ascii_compatible()
            && matches!(code_range, CodeRange::SevenBit | CodeRange::Unknown)
        {
            return rope.retagged(encoding);
        }
        make_leaf(rope.to_vec(), encoding, code_range, None)
    }

    fn retag(&self, rope: &Rope, encoding: Encoding) -> Rope {
        self.with_encoding(rope, encoding, CodeRange::Unknown)
    }
}

fn native_to_leaf(rope: &Rope) -> Rope {
    if matches!(rope.kind(), RopeKind::Native(_)) {
        rope.flatten()
    } else {
        rope.clone()
    }
}

fn substring_node(base: &Rope, byte_offset: usize, attributes: NodeAttributes) -> Rope {
    Rope::from_parts(
        attributes,
        RopeKind::Substring {
            child: base.clone(),
            byte_offset,
        },
        None,
    )
}

fn is_balanced(left: &Rope, right: &Rope) -> bool {
    match (left.kind(), right.kind()) {
        (RopeKind::Concat { balanced: l, .. }, RopeKind::Concat { balanced: r, .. }) => *l && *r,
        (RopeKind::Concat { .. }, _) | (_, RopeKind::Concat { .. }) => false,
        _ => true,
    }
}

fn concat_node(left: Rope, right: Rope, encoding: Encoding) -> Rope {
    let attributes = NodeAttributes {
        encoding,
        code_range: left.code_range().combine(right.code_range()),
        single_byte_optimizable: left.is_single_byte_optimizable()
            && right.is_single_byte_optimizable(),
        byte_length: left.byte_length() + right.byte_length(),
        character_length: left.character_length() + right.character_length(),
        depth: left.depth().max(right.depth()) + 1,
    };
    let balanced = is_balanced(&left, &right);
    Rope::from_parts(
        attributes,
        RopeKind::Concat {
            left,
            right,
            balanced,
        },
        None,
    )
}
