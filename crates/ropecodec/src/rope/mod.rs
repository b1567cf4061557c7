//! Immutable byte ropes.
//!
//! A [`Rope`] is a reference-counted, immutable tree over a byte sequence
//! tagged with an [`Encoding`]. Every node caches the attributes the host
//! needs for character-indexed access (code range, character length,
//! single-byte optimizability) so that they never have to be recomputed by
//! walking the tree. Raw bytes of structural nodes are materialized on first
//! read and published once.
//!
//! Tree-building operations live on [`RopeEngine`]; this module owns the node
//! representation and the read side.

mod builder;
mod bytes;
mod cache;
pub(crate) mod code_range;
mod constants;
mod debug;
mod engine;
mod native;
mod options;

use core::fmt;
use core::hash::{Hash, Hasher};
use std::borrow::Cow;
use std::sync::{Arc, OnceLock};

use bstr::BStr;

pub use builder::RopeBuilder;
pub use cache::{CacheStats, RopeCache, RopeCacheOptions};
pub use code_range::{CodeRange, StringAttributes, classify};
pub use debug::debug_tree;
pub use engine::RopeEngine;
pub use native::NativeBuffer;
pub use options::{DEFAULT_DEPTH_THRESHOLD, RopeOptions};

use crate::encoding::{CharLength, Encoding};
use crate::error::RopeError;
use code_range::count_characters;

/// Shape of a leaf, by code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    AsciiOnly,
    Valid,
    Invalid,
}

/// Bytes produced on demand by an external supplier.
#[derive(Clone)]
pub struct LazyBytes {
    supplier: Arc<dyn Fn() -> Vec<u8> + Send + Sync>,
}

impl LazyBytes {
    fn produce(&self) -> Arc<[u8]> {
        (self.supplier)().into()
    }
}

impl fmt::Debug for LazyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LazyBytes")
    }
}

/// The node variants of a rope tree.
#[derive(Debug, Clone)]
pub enum RopeKind {
    /// Owns its bytes directly.
    Leaf(LeafKind),
    /// A window of `byte_length` bytes into `child`, starting at
    /// `byte_offset`. The child is never itself a substring.
    Substring { child: Rope, byte_offset: usize },
    Concat {
        left: Rope,
        right: Rope,
        /// Both children are non-concat, or both are balanced concats.
        balanced: bool,
    },
    /// `child` repeated `times` times, `times >= 2`.
    Repeating { child: Rope, times: usize },
    /// Bytes live in a buffer that other writers may mutate; never cached.
    Native(NativeBuffer),
    /// Bytes are produced by a supplier on first read.
    Lazy(LazyBytes),
}

pub(crate) struct RopeInner {
    encoding: Encoding,
    code_range: CodeRange,
    single_byte_optimizable: bool,
    byte_length: usize,
    character_length: usize,
    depth: usize,
    hash: OnceLock<u32>,
    bytes: OnceLock<Arc<[u8]>>,
    kind: RopeKind,
}

/// Cached attributes shared by every node variant.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NodeAttributes {
    pub(crate) encoding: Encoding,
    pub(crate) code_range: CodeRange,
    pub(crate) single_byte_optimizable: bool,
    pub(crate) byte_length: usize,
    pub(crate) character_length: usize,
    pub(crate) depth: usize,
}

/// An immutable, encoding-tagged byte sequence.
///
/// Cloning is a reference-count increment.
#[derive(Clone)]
pub struct Rope(Arc<RopeInner>);

impl Rope {
    pub(crate) fn from_parts(
        attributes: NodeAttributes,
        kind: RopeKind,
        bytes: Option<Arc<[u8]>>,
    ) -> Self {
        Self(Arc::new(RopeInner {
            encoding: attributes.encoding,
            code_range: attributes.code_range,
            single_byte_optimizable: attributes.single_byte_optimizable,
            byte_length: attributes.byte_length,
            character_length: attributes.character_length,
            depth: attributes.depth,
            hash: OnceLock::new(),
            bytes: bytes.map_or_else(OnceLock::new, OnceLock::from),
            kind,
        }))
    }

    pub(crate) fn from_inner(inner: Arc<RopeInner>) -> Self {
        Self(inner)
    }

    pub(crate) fn inner(&self) -> &Arc<RopeInner> {
        &self.0
    }

    /// Builds a leaf without canonicalization.
    pub(crate) fn new_leaf(
        bytes: Arc<[u8]>,
        encoding: Encoding,
        code_range: CodeRange,
        character_length: usize,
    ) -> Self {
        debug_assert_ne!(code_range, CodeRange::Unknown);
        let kind = match code_range {
            CodeRange::SevenBit => LeafKind::AsciiOnly,
            CodeRange::Valid => LeafKind::Valid,
            CodeRange::Broken | CodeRange::Unknown => LeafKind::Invalid,
        };
        let attributes = NodeAttributes {
            encoding,
            code_range,
            single_byte_optimizable: code_range == CodeRange::SevenBit
                || encoding.max_length() == 1,
            byte_length: bytes.len(),
            character_length,
            depth: 0,
        };
        Self::from_parts(attributes, RopeKind::Leaf(kind), Some(bytes))
    }

    /// Canonical empty rope for `encoding`.
    #[must_use]
    pub fn empty(encoding: Encoding) -> Self {
        constants::empty(encoding)
    }

    /// Wraps a mutable external buffer.
    ///
    /// The rope's code range stays [`CodeRange::Unknown`] because the bytes
    /// may change underneath it.
    #[must_use]
    pub fn native(buffer: NativeBuffer, encoding: Encoding) -> Self {
        let attributes = NodeAttributes {
            encoding,
            code_range: CodeRange::Unknown,
            single_byte_optimizable: encoding.max_length() == 1,
            byte_length: buffer.len(),
            character_length: 0,
            depth: 1,
        };
        Self::from_parts(attributes, RopeKind::Native(buffer), None)
    }

    /// A rope whose bytes are produced by `supplier` on first read.
    ///
    /// The supplier must return exactly `byte_length` bytes with the given
    /// code range and character length.
    pub fn lazy(
        encoding: Encoding,
        code_range: CodeRange,
        byte_length: usize,
        character_length: usize,
        supplier: impl Fn() -> Vec<u8> + Send + Sync + 'static,
    ) -> Self {
        let attributes = NodeAttributes {
            encoding,
            code_range,
            single_byte_optimizable: code_range == CodeRange::SevenBit
                || encoding.max_length() == 1,
            byte_length,
            character_length,
            depth: 1,
        };
        let lazy = LazyBytes {
            supplier: Arc::new(supplier),
        };
        Self::from_parts(attributes, RopeKind::Lazy(lazy), None)
    }

    /// The decimal representation of `value`, formatted on first read.
    #[must_use]
    pub fn lazy_int(value: i64) -> Self {
        let digits = value
            .unsigned_abs()
            .checked_ilog10()
            .map_or(1, |log| log as usize + 1);
        let length = digits + usize::from(value < 0);
        Self::lazy(
            Encoding::US_ASCII,
            CodeRange::SevenBit,
            length,
            length,
            move || value.to_string().into_bytes(),
        )
    }

    // ----------------------------------------------------------------------
    // Attributes

    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.0.encoding
    }

    #[must_use]
    pub fn code_range(&self) -> CodeRange {
        self.0.code_range
    }

    /// The code range, classifying the bytes if it is not known yet.
    #[must_use]
    pub fn scan_code_range(&self) -> CodeRange {
        match self.0.code_range {
            CodeRange::Unknown => classify(self.0.encoding, &self.bytes()).code_range,
            known => known,
        }
    }

    #[must_use]
    pub fn is_single_byte_optimizable(&self) -> bool {
        self.0.single_byte_optimizable
    }

    #[must_use]
    pub fn byte_length(&self) -> usize {
        self.0.byte_length
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.byte_length == 0
    }

    #[must_use]
    pub fn character_length(&self) -> usize {
        match &self.0.kind {
            RopeKind::Native(buffer) => {
                classify(self.0.encoding, &buffer.snapshot()).character_length
            }
            _ => self.0.character_length,
        }
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.depth
    }

    #[must_use]
    pub fn kind(&self) -> &RopeKind {
        &self.0.kind
    }

    pub(crate) fn attributes(&self) -> NodeAttributes {
        NodeAttributes {
            encoding: self.0.encoding,
            code_range: self.0.code_range,
            single_byte_optimizable: self.0.single_byte_optimizable,
            byte_length: self.0.byte_length,
            character_length: self.0.character_length,
            depth: self.0.depth,
        }
    }

    /// Human-readable variant name.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match &self.0.kind {
            RopeKind::Leaf(LeafKind::AsciiOnly) => "AsciiOnlyLeaf",
            RopeKind::Leaf(LeafKind::Valid) => "ValidLeaf",
            RopeKind::Leaf(LeafKind::Invalid) => "InvalidLeaf",
            RopeKind::Substring { .. } => "Substring",
            RopeKind::Concat { .. } => "Concat",
            RopeKind::Repeating { .. } => "Repeating",
            RopeKind::Native(_) => "Native",
            RopeKind::Lazy(_) => "Lazy",
        }
    }

    // ----------------------------------------------------------------------
    // Bytes

    /// Bytes published on this node, if any. Always present on leaves.
    pub(crate) fn stored_bytes(&self) -> Option<&[u8]> {
        self.0.bytes.get().map(|bytes| &**bytes)
    }

    /// Whether the raw bytes of this node have not been materialized yet.
    #[must_use]
    pub fn is_bytes_absent(&self) -> bool {
        self.0.bytes.get().is_none()
    }

    pub(crate) fn shared_bytes(&self) -> Option<&Arc<[u8]>> {
        self.0.bytes.get()
    }

    /// Materializes and publishes the bytes of a non-native node.
    fn materialized(&self) -> &[u8] {
        self.0.bytes.get_or_init(|| match &self.0.kind {
            RopeKind::Lazy(lazy) => {
                let bytes = lazy.produce();
                debug_assert_eq!(bytes.len(), self.0.byte_length);
                bytes
            }
            _ => bytes::flatten_bytes(self).into(),
        })
    }

    /// The full byte content.
    ///
    /// Native ropes are re-read on every call; every other variant
    /// materializes its bytes once and borrows them afterwards.
    #[must_use]
    pub fn bytes(&self) -> Cow<'_, [u8]> {
        match &self.0.kind {
            RopeKind::Native(buffer) => Cow::Owned(buffer.snapshot()),
            _ => Cow::Borrowed(self.materialized()),
        }
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes().into_owned()
    }

    /// Copies `byte_length` bytes starting at `byte_offset` without
    /// materializing this node.
    pub fn extract(&self, byte_offset: usize, byte_length: usize) -> Result<Vec<u8>, RopeError> {
        check_range(self, byte_offset, byte_length)?;
        Ok(bytes::extract(self, byte_offset, byte_length))
    }

    /// A leaf with the same content and attributes.
    ///
    /// Leaves are returned as-is; native ropes are snapshotted and
    /// classified.
    #[must_use]
    pub fn flatten(&self) -> Self {
        match &self.0.kind {
            RopeKind::Leaf(_) => self.clone(),
            RopeKind::Native(buffer) => {
                make_leaf(buffer.snapshot(), self.0.encoding, CodeRange::Unknown, None)
            }
            _ => {
                let bytes = match self.0.bytes.get() {
                    Some(bytes) => bytes.clone(),
                    None => bytes::flatten_bytes(self).into(),
                };
                make_leaf(
                    bytes,
                    self.0.encoding,
                    self.0.code_range,
                    Some(self.0.character_length),
                )
            }
        }
    }

    /// The byte at `index`, found by descending the tree.
    pub fn get_byte(&self, index: usize) -> Result<u8, RopeError> {
        let out_of_bounds = RopeError::IndexOutOfBounds {
            index,
            length: self.0.byte_length,
        };
        if index >= self.0.byte_length {
            return Err(out_of_bounds);
        }
        let mut rope = self;
        let mut index = index;
        loop {
            if let Some(bytes) = rope.stored_bytes() {
                return bytes.get(index).copied().ok_or(out_of_bounds);
            }
            match &rope.0.kind {
                RopeKind::Leaf(_) | RopeKind::Lazy(_) => {
                    return rope.materialized().get(index).copied().ok_or(out_of_bounds);
                }
                RopeKind::Native(buffer) => return buffer.byte_at(index).ok_or(out_of_bounds),
                RopeKind::Substring { child, byte_offset } => {
                    index += byte_offset;
                    rope = child;
                }
                RopeKind::Concat { left, right, .. } => {
                    if index < left.byte_length() {
                        rope = left;
                    } else {
                        index -= left.byte_length();
                        rope = right;
                    }
                }
                RopeKind::Repeating { child, .. } => {
                    index %= child.byte_length();
                    rope = child;
                }
            }
        }
    }

    /// Decodes the character starting at byte `index`.
    pub fn get_code_point(&self, index: usize) -> Result<u32, RopeError> {
        let encoding = self.0.encoding;
        if self.0.single_byte_optimizable {
            let byte = self.get_byte(index)?;
            return encoding
                .code_point(&[byte])
                .ok_or(RopeError::InvalidByteSequence {
                    encoding: encoding.name(),
                });
        }
        let bytes = self.bytes();
        let tail = bytes.get(index..).ok_or(RopeError::IndexOutOfBounds {
            index,
            length: bytes.len(),
        })?;
        if tail.is_empty() {
            return Err(RopeError::IndexOutOfBounds {
                index,
                length: bytes.len(),
            });
        }
        let code_point = match encoding.precise_length(tail) {
            CharLength::Char(_) => encoding.code_point(tail),
            CharLength::NeedMore(_) | CharLength::Invalid => None,
        };
        code_point.ok_or(RopeError::InvalidByteSequence {
            encoding: encoding.name(),
        })
    }

    /// Java-style polynomial hash over the bytes, cached after the first call
    /// except on native ropes.
    #[must_use]
    pub fn hash_code(&self) -> u32 {
        if matches!(self.0.kind, RopeKind::Native(_)) {
            return bytes::hash_bytes(self);
        }
        *self.0.hash.get_or_init(|| bytes::hash_bytes(self))
    }

    /// The same tree tagged with another encoding.
    pub(crate) fn retagged(&self, encoding: Encoding) -> Self {
        let mut attributes = self.attributes();
        attributes.encoding = encoding;
        attributes.single_byte_optimizable |= encoding.max_length() == 1;
        Self::from_parts(attributes, self.0.kind.clone(), self.0.bytes.get().cloned())
    }
}

pub(crate) fn check_range(rope: &Rope, offset: usize, length: usize) -> Result<(), RopeError> {
    match offset.checked_add(length) {
        Some(end) if end <= rope.byte_length() => Ok(()),
        _ => Err(RopeError::SubstringOutOfBounds {
            offset,
            length,
            byte_length: rope.byte_length(),
        }),
    }
}

/// Builds a leaf over `bytes`.
///
/// `character_length` is used when the code range is `Valid` or `Broken`;
/// a 7-bit leaf always has one character per byte and an `Unknown` code
/// range is computed by classifying the bytes. Empty input with an unknown
/// code range yields the canonical empty rope.
pub fn make_leaf(
    bytes: impl Into<Arc<[u8]>>,
    encoding: Encoding,
    code_range: CodeRange,
    character_length: Option<usize>,
) -> Rope {
    let bytes = bytes.into();
    match code_range {
        CodeRange::SevenBit => {
            let length = bytes.len();
            Rope::new_leaf(bytes, encoding, code_range, length)
        }
        CodeRange::Valid => {
            let length = character_length.unwrap_or_else(|| count_characters(encoding, &bytes));
            Rope::new_leaf(bytes, encoding, code_range, length)
        }
        CodeRange::Broken => {
            let length =
                character_length.unwrap_or_else(|| classify(encoding, &bytes).character_length);
            Rope::new_leaf(bytes, encoding, code_range, length)
        }
        CodeRange::Unknown => {
            if bytes.is_empty() {
                return constants::empty(encoding);
            }
            let attributes = classify(encoding, &bytes);
            Rope::new_leaf(
                bytes,
                encoding,
                attributes.code_range,
                attributes.character_length,
            )
        }
    }
}

impl From<&str> for Rope {
    fn from(value: &str) -> Self {
        make_leaf(value.as_bytes(), Encoding::UTF_8, CodeRange::Unknown, None)
    }
}

impl From<String> for Rope {
    fn from(value: String) -> Self {
        make_leaf(value.into_bytes(), Encoding::UTF_8, CodeRange::Unknown, None)
    }
}

impl PartialEq for Rope {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        if let (Some(a), Some(b)) = (self.0.hash.get(), other.0.hash.get()) {
            if a != b {
                return false;
            }
        }
        self.encoding() == other.encoding()
            && self.byte_length() == other.byte_length()
            && self.bytes() == other.bytes()
    }
}

impl Eq for Rope {}

impl Hash for Rope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash_code());
    }
}

impl fmt::Debug for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rope")
            .field("kind", &self.kind_name())
            .field("encoding", &self.encoding())
            .field("code_range", &self.code_range())
            .field("bytes", &BStr::new(&self.bytes()))
            .finish()
    }
}

impl fmt::Display for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(BStr::new(&self.bytes()), f)
    }
}
