use core::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use bstr::BStr;

use crate::error::RopeError;

/// A fixed-size byte buffer owned outside the rope tree.
///
/// Writers may change the contents at any time through [`NativeBuffer::write`];
/// ropes over the buffer observe the change on their next read.
#[derive(Clone)]
pub struct NativeBuffer(Arc<RwLock<Box<[u8]>>>);

impl NativeBuffer {
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        Self(Arc::new(RwLock::new(bytes.into())))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrites bytes starting at `offset`. The buffer never grows.
    pub fn write(&self, offset: usize, data: &[u8]) -> Result<(), RopeError> {
        let mut buffer = self.0.write().unwrap_or_else(PoisonError::into_inner);
        let length = buffer.len();
        let target = offset
            .checked_add(data.len())
            .and_then(|end| buffer.get_mut(offset..end))
            .ok_or(RopeError::SubstringOutOfBounds {
                offset,
                length: data.len(),
                byte_length: length,
            })?;
        target.copy_from_slice(data);
        Ok(())
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<u8> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).to_vec()
    }

    pub(crate) fn byte_at(&self, index: usize) -> Option<u8> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index)
            .copied()
    }

    pub(crate) fn read_range<F: FnMut(&[u8])>(&self, offset: usize, length: usize, visit: &mut F) {
        let buffer = self.0.read().unwrap_or_else(PoisonError::into_inner);
        visit(&buffer[offset..offset + length]);
    }
}

impl fmt::Debug for NativeBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buffer = self.0.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_tuple("NativeBuffer").field(&BStr::new(&buffer[..])).finish()
    }
}
