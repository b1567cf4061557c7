/// Depth at which a concatenation operand is rebalanced by default.
pub const DEFAULT_DEPTH_THRESHOLD: usize = 128;

/// Tuning knobs for [`RopeEngine`](super::RopeEngine).
///
/// # Examples
///
/// ```rust
/// use ropecodec::{RopeEngine, RopeOptions};
///
/// let engine = RopeEngine::new(RopeOptions {
///     lazy_substrings: false,
///     ..Default::default()
/// });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RopeOptions {
    /// Whether substrings are represented as views into their base rope.
    ///
    /// When `false`, every substring copies its bytes into a fresh leaf.
    ///
    /// # Default
    ///
    /// `true`
    pub lazy_substrings: bool,

    /// Tree depth at which a concatenation operand is rebalanced before the
    /// new node is built.
    ///
    /// During rebalancing, subtrees at least half this deep are flattened
    /// into leaves.
    ///
    /// # Default
    ///
    /// [`DEFAULT_DEPTH_THRESHOLD`]
    pub depth_threshold: usize,
}

impl Default for RopeOptions {
    fn default() -> Self {
        Self {
            lazy_substrings: true,
            depth_threshold: DEFAULT_DEPTH_THRESHOLD,
        }
    }
}
