//! Immutable rope strings tagged with a character encoding, and a streaming
//! converter between encodings.
//!
//! ```rust
//! use ropecodec::{CodeRange, Encoding, RopeEngine, Rope};
//!
//! let engine = RopeEngine::default();
//! let greeting = engine
//!     .concat_compatible(&Rope::from("hello "), &Rope::from("world"))
//!     .unwrap();
//! let word = engine.substring(&greeting, 6, 5).unwrap();
//! assert_eq!(&*word.bytes(), b"world");
//! assert_eq!(word.code_range(), CodeRange::SevenBit);
//!
//! let utf16 = ropecodec::transcode_rope(&word, Encoding::UTF_16BE, Default::default()).unwrap();
//! assert_eq!(utf16.byte_length(), 10);
//! ```

#![allow(missing_docs)]

mod encoding;
mod error;
mod rope;
mod transcode;

#[cfg(test)]
mod tests;

pub use encoding::{CharLength, CharScheme, Encoding, negotiate, negotiate_encodings, registry};
pub use error::{EncodingError, OpenError, RopeError, TranscodeError};
pub use rope::{
    CacheStats, CodeRange, DEFAULT_DEPTH_THRESHOLD, LazyBytes, LeafKind, NativeBuffer, Rope,
    RopeBuilder, RopeCache, RopeCacheOptions, RopeEngine, RopeKind, RopeOptions,
    StringAttributes, classify, debug_tree, make_leaf,
};
pub use transcode::{
    AsciiCompatibility, ConversionResult, Converter, EconvFlags, FinishFn, InvalidAction,
    LastError, StepFn, StepOutcome, StepState, Transcoder, UndefinedAction, transcode,
    transcode_rope,
};

/// Route lookup and registration of conversion steps.
pub mod transcoders {
    pub use crate::transcode::registry::{
        direct_destinations, lookup, register_transcoder, search_path,
    };
}
