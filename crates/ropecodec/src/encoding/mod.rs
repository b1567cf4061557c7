//! Encoding descriptors.
//!
//! An [`Encoding`] is a cheap, copyable handle onto a registered
//! [`EncodingEntry`]. Built-in encodings are available as associated
//! constants; everything else goes through the process-wide [`registry`].

mod compatibility;
pub mod registry;
mod scheme;

use core::fmt;
use core::hash::{Hash, Hasher};

pub use compatibility::{negotiate, negotiate_encodings};
pub use scheme::{CharLength, CharScheme};

/// One registered encoding.
#[derive(Debug)]
pub struct EncodingEntry {
    name: &'static str,
    index: usize,
    scheme: CharScheme,
    dummy: bool,
}

impl EncodingEntry {
    pub(crate) const fn new(
        name: &'static str,
        index: usize,
        scheme: CharScheme,
        dummy: bool,
    ) -> Self {
        Self {
            name,
            index,
            scheme,
            dummy,
        }
    }
}

/// Handle to a registered encoding.
///
/// Two handles are equal when they refer to the same registry slot.
#[derive(Clone, Copy)]
pub struct Encoding(&'static EncodingEntry);

macro_rules! builtin_encodings {
    ($(
        $(#[$doc:meta])*
        $konst:ident = ($index:literal, $name:literal, $scheme:ident, $dummy:literal)
    ),* $(,)?) => {
        impl Encoding {
            $(
                $(#[$doc])*
                pub const $konst: Encoding =
                    Encoding(&EncodingEntry::new($name, $index, CharScheme::$scheme, $dummy));
            )*
        }

        pub(crate) const BUILTIN: &[Encoding] = &[$(Encoding::$konst),*];
    };
}

builtin_encodings! {
    /// Raw bytes with no character structure.
    ASCII_8BIT = (0, "ASCII-8BIT", Binary, false),
    UTF_8 = (1, "UTF-8", Utf8, false),
    US_ASCII = (2, "US-ASCII", Ascii, false),
    UTF_16BE = (3, "UTF-16BE", Utf16Be, false),
    UTF_16LE = (4, "UTF-16LE", Utf16Le, false),
    UTF_32BE = (5, "UTF-32BE", Utf32Be, false),
    UTF_32LE = (6, "UTF-32LE", Utf32Le, false),
    ISO_8859_1 = (7, "ISO-8859-1", SingleByte, false),
    WINDOWS_1252 = (8, "Windows-1252", SingleByte, false),
    SHIFT_JIS = (9, "Shift_JIS", ShiftJis, false),
    EUC_JP = (10, "EUC-JP", EucJp, false),
    /// Byte-order-marked UTF-16; only meaningful as a conversion target.
    UTF_16 = (11, "UTF-16", Utf16Be, true),
    UTF_32 = (12, "UTF-32", Utf32Be, true),
    ISO_2022_JP = (13, "ISO-2022-JP", Binary, true),
}

/// Aliases registered alongside the built-ins.
pub(crate) const BUILTIN_ALIASES: &[(&str, usize)] = &[
    ("BINARY", 0),
    ("CP65001", 1),
    ("ASCII", 2),
    ("ANSI_X3.4-1968", 2),
    ("646", 2),
    ("UCS-2BE", 3),
    ("UCS-4BE", 5),
    ("UCS-4LE", 6),
    ("ISO8859-1", 7),
    ("CP1252", 8),
    ("eucJP", 10),
];

impl Encoding {
    pub(crate) const fn from_entry(entry: &'static EncodingEntry) -> Self {
        Self(entry)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.0.name
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0.index
    }

    #[must_use]
    pub fn scheme(self) -> CharScheme {
        self.0.scheme
    }

    /// Dummy encodings name a stateful or byte-order-marked format that the
    /// core cannot index into.
    #[must_use]
    pub fn is_dummy(self) -> bool {
        self.0.dummy
    }

    /// Whether every ASCII byte stands for the same character in this
    /// encoding.
    #[must_use]
    pub fn is_ascii_compatible(self) -> bool {
        !self.0.dummy && self.0.scheme.min_length() == 1
    }

    /// Whether this is the raw byte encoding, which never reports broken
    /// content.
    #[must_use]
    pub fn is_binary(self) -> bool {
        self.0.scheme == CharScheme::Binary && !self.0.dummy
    }

    #[must_use]
    pub fn is_unicode(self) -> bool {
        self.0.scheme.is_unicode()
    }

    #[must_use]
    pub fn min_length(self) -> usize {
        self.0.scheme.min_length()
    }

    #[must_use]
    pub fn max_length(self) -> usize {
        self.0.scheme.max_length()
    }

    #[must_use]
    pub fn is_fixed_width(self) -> bool {
        self.0.scheme.is_fixed_width()
    }

    #[must_use]
    pub fn precise_length(self, bytes: &[u8]) -> CharLength {
        self.0.scheme.precise_length(bytes)
    }

    #[must_use]
    pub fn code_point(self, bytes: &[u8]) -> Option<u32> {
        self.0.scheme.code_point(bytes)
    }
}

impl PartialEq for Encoding {
    fn eq(&self, other: &Self) -> bool {
        self.0.index == other.0.index
    }
}

impl Eq for Encoding {}

impl Hash for Encoding {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.index.hash(state);
    }
}

impl fmt::Debug for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Encoding({})", self.0.name)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_indices_match_slots() {
        for (slot, encoding) in BUILTIN.iter().enumerate() {
            assert_eq!(encoding.index(), slot, "{encoding}");
        }
    }

    #[test]
    fn ascii_compatibility() {
        assert!(Encoding::UTF_8.is_ascii_compatible());
        assert!(Encoding::SHIFT_JIS.is_ascii_compatible());
        assert!(Encoding::ASCII_8BIT.is_ascii_compatible());
        assert!(!Encoding::UTF_16LE.is_ascii_compatible());
        assert!(!Encoding::UTF_16.is_ascii_compatible());
        assert!(!Encoding::ISO_2022_JP.is_ascii_compatible());
        assert!(!Encoding::ISO_2022_JP.is_binary());
    }
}
