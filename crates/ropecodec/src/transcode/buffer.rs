/// Bytes produced by one stage and not yet consumed by the next.
///
/// Consumption only advances a read offset; space is reclaimed when more
/// output is appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TranscodeBuffer {
    bytes: Vec<u8>,
    start: usize,
}

impl TranscodeBuffer {
    pub(crate) fn data(&self) -> &[u8] {
        &self.bytes[self.start..]
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len() - self.start
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn pop_front(&mut self) -> Option<u8> {
        let byte = *self.bytes.get(self.start)?;
        self.consume(1);
        Some(byte)
    }

    pub(crate) fn consume(&mut self, count: usize) {
        self.start = (self.start + count).min(self.bytes.len());
        if self.start == self.bytes.len() {
            self.bytes.clear();
            self.start = 0;
        }
    }

    /// Moves unread bytes to the front and makes room for `additional` more.
    pub(crate) fn reserve(&mut self, additional: usize) {
        if self.start > 0 {
            self.bytes.drain(..self.start);
            self.start = 0;
        }
        self.bytes.reserve(additional);
    }

    pub(crate) fn extend_from_slice(&mut self, data: &[u8]) {
        self.reserve(data.len());
        self.bytes.extend_from_slice(data);
    }

    /// Write target for a step; callers append directly.
    pub(crate) fn tail(&mut self) -> &mut Vec<u8> {
        self.reserve(0);
        &mut self.bytes
    }
}
