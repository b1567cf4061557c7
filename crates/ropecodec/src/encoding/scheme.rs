//! Per-family character decoding rules.
//!
//! Each [`CharScheme`] knows how long a character starting at a given byte is,
//! and how to turn a complete character into a code point. Nothing here
//! allocates.

/// Outcome of measuring the character at the front of a byte slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharLength {
    /// A complete, well-formed character of this many bytes.
    Char(usize),
    /// The slice ends inside a character; this many more bytes are needed.
    NeedMore(usize),
    /// The leading bytes cannot start a character.
    Invalid,
}

/// Byte-level layout shared by a family of encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharScheme {
    /// Every byte is a character and no byte is ever invalid.
    Binary,
    /// Seven-bit ASCII; high bytes are invalid.
    Ascii,
    /// ASCII-compatible single-byte code page.
    SingleByte,
    Utf8,
    Utf16Be,
    Utf16Le,
    Utf32Be,
    Utf32Le,
    ShiftJis,
    EucJp,
}

impl CharScheme {
    /// Smallest number of bytes a character can occupy.
    #[must_use]
    pub const fn min_length(self) -> usize {
        match self {
            Self::Utf16Be | Self::Utf16Le => 2,
            Self::Utf32Be | Self::Utf32Le => 4,
            _ => 1,
        }
    }

    /// Largest number of bytes a character can occupy.
    #[must_use]
    pub const fn max_length(self) -> usize {
        match self {
            Self::Binary | Self::Ascii | Self::SingleByte => 1,
            Self::ShiftJis => 2,
            Self::EucJp => 3,
            Self::Utf8 | Self::Utf16Be | Self::Utf16Le | Self::Utf32Be | Self::Utf32Le => 4,
        }
    }

    #[must_use]
    pub const fn is_fixed_width(self) -> bool {
        self.min_length() == self.max_length()
    }

    #[must_use]
    pub const fn is_unicode(self) -> bool {
        matches!(
            self,
            Self::Utf8 | Self::Utf16Be | Self::Utf16Le | Self::Utf32Be | Self::Utf32Le
        )
    }

    /// Measures the character at the front of `bytes`.
    #[must_use]
    pub fn precise_length(self, bytes: &[u8]) -> CharLength {
        let Some(&lead) = bytes.first() else {
            return CharLength::NeedMore(self.min_length());
        };
        match self {
            Self::Binary | Self::SingleByte => CharLength::Char(1),
            Self::Ascii => {
                if lead.is_ascii() {
                    CharLength::Char(1)
                } else {
                    CharLength::Invalid
                }
            }
            Self::Utf8 => utf8_length(bytes),
            Self::Utf16Be => utf16_length(bytes, u16::from_be_bytes),
            Self::Utf16Le => utf16_length(bytes, u16::from_le_bytes),
            Self::Utf32Be => utf32_length(bytes, u32::from_be_bytes),
            Self::Utf32Le => utf32_length(bytes, u32::from_le_bytes),
            Self::ShiftJis => shift_jis_length(bytes),
            Self::EucJp => euc_jp_length(bytes),
        }
    }

    /// Decodes a complete character into its code point.
    ///
    /// Multi-byte legacy encodings report the big-endian integer of their
    /// bytes, which is what the host's regular expression engine expects.
    #[must_use]
    pub fn code_point(self, bytes: &[u8]) -> Option<u32> {
        let CharLength::Char(length) = self.precise_length(bytes) else {
            return None;
        };
        let bytes = &bytes[..length];
        match self {
            Self::Binary | Self::Ascii | Self::SingleByte => Some(u32::from(bytes[0])),
            Self::Utf8 => decode_utf8(bytes),
            Self::Utf16Be => decode_utf16(bytes, u16::from_be_bytes),
            Self::Utf16Le => decode_utf16(bytes, u16::from_le_bytes),
            Self::Utf32Be => Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
            Self::Utf32Le => Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
            Self::ShiftJis | Self::EucJp => {
                Some(bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)))
            }
        }
    }
}

fn utf8_length(bytes: &[u8]) -> CharLength {
    let lead = bytes[0];
    let (length, second) = match lead {
        0x00..=0x7F => return CharLength::Char(1),
        0xC2..=0xDF => (2, 0x80..=0xBF),
        0xE0 => (3, 0xA0..=0xBF),
        0xE1..=0xEC | 0xEE..=0xEF => (3, 0x80..=0xBF),
        0xED => (3, 0x80..=0x9F),
        0xF0 => (4, 0x90..=0xBF),
        0xF1..=0xF3 => (4, 0x80..=0xBF),
        0xF4 => (4, 0x80..=0x8F),
        _ => return CharLength::Invalid,
    };
    for (i, &byte) in bytes.iter().enumerate().take(length).skip(1) {
        let ok = if i == 1 {
            second.contains(&byte)
        } else {
            (0x80..=0xBF).contains(&byte)
        };
        if !ok {
            return CharLength::Invalid;
        }
    }
    if bytes.len() < length {
        CharLength::NeedMore(length - bytes.len())
    } else {
        CharLength::Char(length)
    }
}

fn decode_utf8(bytes: &[u8]) -> Option<u32> {
    let lead = u32::from(bytes[0]);
    let tail = |i: usize| u32::from(bytes[i] & 0x3F);
    match bytes.len() {
        1 => Some(lead),
        2 => Some(((lead & 0x1F) << 6) | tail(1)),
        3 => Some(((lead & 0x0F) << 12) | (tail(1) << 6) | tail(2)),
        4 => Some(((lead & 0x07) << 18) | (tail(1) << 12) | (tail(2) << 6) | tail(3)),
        _ => None,
    }
}

fn utf16_length(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> CharLength {
    if bytes.len() < 2 {
        return CharLength::NeedMore(2 - bytes.len());
    }
    match unit([bytes[0], bytes[1]]) {
        0xD800..=0xDBFF => {
            if bytes.len() < 4 {
                return CharLength::NeedMore(4 - bytes.len());
            }
            if (0xDC00..=0xDFFF).contains(&unit([bytes[2], bytes[3]])) {
                CharLength::Char(4)
            } else {
                CharLength::Invalid
            }
        }
        0xDC00..=0xDFFF => CharLength::Invalid,
        _ => CharLength::Char(2),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<u32> {
    let high = u32::from(unit([bytes[0], bytes[1]]));
    if bytes.len() == 2 {
        return Some(high);
    }
    let low = u32::from(unit([bytes[2], bytes[3]]));
    Some(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
}

fn utf32_length(bytes: &[u8], unit: fn([u8; 4]) -> u32) -> CharLength {
    if bytes.len() < 4 {
        return CharLength::NeedMore(4 - bytes.len());
    }
    match unit([bytes[0], bytes[1], bytes[2], bytes[3]]) {
        0xD800..=0xDFFF | 0x0011_0000.. => CharLength::Invalid,
        _ => CharLength::Char(4),
    }
}

fn shift_jis_length(bytes: &[u8]) -> CharLength {
    match bytes[0] {
        0x00..=0x7F | 0xA1..=0xDF => CharLength::Char(1),
        0x81..=0x9F | 0xE0..=0xFC => match bytes.get(1) {
            None => CharLength::NeedMore(1),
            Some(0x40..=0x7E | 0x80..=0xFC) => CharLength::Char(2),
            Some(_) => CharLength::Invalid,
        },
        _ => CharLength::Invalid,
    }
}

fn euc_jp_length(bytes: &[u8]) -> CharLength {
    let trail = |from: usize, range: core::ops::RangeInclusive<u8>, length: usize| {
        for i in from..length {
            match bytes.get(i) {
                None => return CharLength::NeedMore(length - i),
                Some(b) if range.contains(b) => {}
                Some(_) => return CharLength::Invalid,
            }
        }
        CharLength::Char(length)
    };
    match bytes[0] {
        0x00..=0x7F => CharLength::Char(1),
        0x8E => trail(1, 0xA1..=0xDF, 2),
        0x8F => trail(1, 0xA1..=0xFE, 3),
        0xA1..=0xFE => trail(1, 0xA1..=0xFE, 2),
        _ => CharLength::Invalid,
    }
}
