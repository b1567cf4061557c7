use super::{CodeRange, Rope, make_leaf};
use crate::encoding::Encoding;

/// Accumulates bytes for a rope that is built incrementally.
#[derive(Debug, Clone)]
pub struct RopeBuilder {
    bytes: Vec<u8>,
    encoding: Encoding,
}

impl RopeBuilder {
    #[must_use]
    pub fn new(encoding: Encoding) -> Self {
        Self::with_capacity(encoding, 0)
    }

    #[must_use]
    pub fn with_capacity(encoding: Encoding, capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            encoding,
        }
    }

    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Appends the content of `rope`, ignoring its encoding.
    pub fn append_rope(&mut self, rope: &Rope) {
        self.bytes.extend_from_slice(&rope.bytes());
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// A leaf over a copy of the accumulated bytes.
    #[must_use]
    pub fn to_rope(&self, code_range: CodeRange) -> Rope {
        make_leaf(self.bytes.as_slice(), self.encoding, code_range, None)
    }

    #[must_use]
    pub fn into_rope(self, code_range: CodeRange) -> Rope {
        make_leaf(self.bytes, self.encoding, code_range, None)
    }
}

impl Extend<u8> for RopeBuilder {
    fn extend<I: IntoIterator<Item = u8>>(&mut self, iter: I) {
        self.bytes.extend(iter);
    }
}
