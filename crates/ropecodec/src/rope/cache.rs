//! Interning of leaf ropes by content.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, PoisonError, RwLock, Weak};

use log::{debug, trace};

use super::{CodeRange, Rope, RopeInner, make_leaf};
use crate::encoding::Encoding;

/// Tuning for [`RopeCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RopeCacheOptions {
    /// Number of insertions between sweeps that drop entries whose ropes
    /// are gone.
    ///
    /// # Default
    ///
    /// `1024`
    pub purge_interval: usize,
}

impl Default for RopeCacheOptions {
    fn default() -> Self {
        Self {
            purge_interval: 1024,
        }
    }
}

/// Counters describing how much sharing a cache achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups answered with a live rope.
    pub ropes_reused: usize,
    /// Misses that could still share a byte array with a rope under another
    /// encoding.
    pub byte_arrays_reused: usize,
    /// Bytes that did not have to be allocated thanks to reuse.
    pub bytes_saved: usize,
    /// Ropes currently alive in the cache.
    pub live_ropes: usize,
}

type Entries = HashMap<Arc<[u8]>, Vec<Weak<RopeInner>>>;

/// A weak interning table for leaf ropes.
///
/// Entries do not keep ropes alive; once every strong reference is gone the
/// next lookup misses and dead entries are swept periodically.
#[derive(Debug, Default)]
pub struct RopeCache {
    options: RopeCacheOptions,
    entries: RwLock<Entries>,
    inserts_since_purge: AtomicUsize,
    ropes_reused: AtomicUsize,
    byte_arrays_reused: AtomicUsize,
    bytes_saved: AtomicUsize,
}

static GLOBAL: LazyLock<RopeCache> = LazyLock::new(RopeCache::default);

fn find(entries: &Entries, bytes: &[u8], encoding: Encoding) -> Option<Rope> {
    entries
        .get(bytes)?
        .iter()
        .filter_map(Weak::upgrade)
        .find(|inner| inner.encoding == encoding)
        .map(Rope::from_inner)
}

impl RopeCache {
    #[must_use]
    pub fn new(options: RopeCacheOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// The process-wide cache.
    pub fn global() -> &'static RopeCache {
        &GLOBAL
    }

    /// Returns the live rope with this content and encoding, creating it if
    /// needed.
    ///
    /// A miss still reuses the byte array of a live rope with the same
    /// content under another encoding.
    pub fn intern(&self, bytes: &[u8], encoding: Encoding, code_range: CodeRange) -> Rope {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(rope) = find(&entries, bytes, encoding) {
                self.record_hit(bytes.len());
                return rope;
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(rope) = find(&entries, bytes, encoding) {
            self.record_hit(bytes.len());
            return rope;
        }

        let shared = match entries.get_key_value(bytes) {
            Some((key, _)) => {
                self.byte_arrays_reused.fetch_add(1, Ordering::Relaxed);
                self.bytes_saved.fetch_add(bytes.len(), Ordering::Relaxed);
                Arc::clone(key)
            }
            None => Arc::from(bytes),
        };
        trace!("rope cache miss for {} bytes in {encoding}", bytes.len());
        let rope = make_leaf(Arc::clone(&shared), encoding, code_range, None);
        entries
            .entry(shared)
            .or_default()
            .push(Arc::downgrade(rope.inner()));

        let inserts = self.inserts_since_purge.fetch_add(1, Ordering::Relaxed) + 1;
        if inserts >= self.options.purge_interval {
            self.inserts_since_purge.store(0, Ordering::Relaxed);
            purge(&mut entries);
        }
        rope
    }

    /// Whether `rope` itself is the interned rope for its content.
    #[must_use]
    pub fn contains(&self, rope: &Rope) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        find(&entries, &rope.bytes(), rope.encoding())
            .is_some_and(|found| Arc::ptr_eq(found.inner(), rope.inner()))
    }

    /// Drops entries whose ropes are gone.
    pub fn purge(&self) {
        purge(&mut self.entries.write().unwrap_or_else(PoisonError::into_inner));
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let live_ropes = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .flatten()
            .filter(|weak| weak.strong_count() > 0)
            .count();
        CacheStats {
            ropes_reused: self.ropes_reused.load(Ordering::Relaxed),
            byte_arrays_reused: self.byte_arrays_reused.load(Ordering::Relaxed),
            bytes_saved: self.bytes_saved.load(Ordering::Relaxed),
            live_ropes,
        }
    }

    fn record_hit(&self, length: usize) {
        self.ropes_reused.fetch_add(1, Ordering::Relaxed);
        self.bytes_saved.fetch_add(length, Ordering::Relaxed);
    }
}

fn purge(entries: &mut Entries) {
    let before = entries.len();
    entries.retain(|_, ropes| {
        ropes.retain(|weak| weak.strong_count() > 0);
        !ropes.is_empty()
    });
    debug!("rope cache purge: {before} -> {} byte arrays", entries.len());
}
