use bitflags::bitflags;

use crate::error::OpenError;

bitflags! {
    /// Options of a conversion session: error handling, decorators and
    /// per-call conversion modes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EconvFlags: u32 {
        const ERROR_HANDLER_MASK = 0x0000_00ff;

        const INVALID_MASK = 0x0000_000f;
        const INVALID_REPLACE = 0x0000_0002;

        const UNDEF_MASK = 0x0000_00f0;
        const UNDEF_REPLACE = 0x0000_0020;
        const UNDEF_HEX_CHARREF = 0x0000_0030;

        const DECORATOR_MASK = 0x00f0_ff00;
        const NEWLINE_DECORATOR_MASK = 0x0000_3f00;

        const UNIVERSAL_NEWLINE_DECORATOR = 0x0000_0100;
        const CRLF_NEWLINE_DECORATOR = 0x0000_1000;
        const CR_NEWLINE_DECORATOR = 0x0000_2000;
        const XML_TEXT_DECORATOR = 0x0000_4000;
        const XML_ATTR_CONTENT_DECORATOR = 0x0000_8000;

        const STATEFUL_DECORATOR_MASK = 0x00f0_0000;
        const XML_ATTR_QUOTE_DECORATOR = 0x0010_0000;

        const PARTIAL_INPUT = 0x0001_0000;
        const AFTER_OUTPUT = 0x0002_0000;
    }
}

/// What to do with malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidAction {
    Raise,
    Replace,
}

/// What to do with characters the destination cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndefinedAction {
    Raise,
    Replace,
    HexCharRef,
}

impl EconvFlags {
    #[must_use]
    pub fn invalid_action(self) -> InvalidAction {
        if self & Self::INVALID_MASK == Self::INVALID_REPLACE {
            InvalidAction::Replace
        } else {
            InvalidAction::Raise
        }
    }

    #[must_use]
    pub fn undefined_action(self) -> UndefinedAction {
        let undefined = self & Self::UNDEF_MASK;
        if undefined == Self::UNDEF_HEX_CHARREF {
            UndefinedAction::HexCharRef
        } else if undefined == Self::UNDEF_REPLACE {
            UndefinedAction::Replace
        } else {
            UndefinedAction::Raise
        }
    }

    /// Decorator names requested by these flags, in insertion order.
    ///
    /// At most one newline decorator may be requested, and XML text escaping
    /// excludes XML attribute escaping.
    pub fn decorator_names(self) -> Result<Vec<&'static str>, OpenError> {
        let newline = self & Self::NEWLINE_DECORATOR_MASK;
        if !(newline.is_empty()
            || newline == Self::UNIVERSAL_NEWLINE_DECORATOR
            || newline == Self::CRLF_NEWLINE_DECORATOR
            || newline == Self::CR_NEWLINE_DECORATOR)
        {
            return Err(OpenError::InvalidDecoratorFlags);
        }
        if self.contains(Self::XML_TEXT_DECORATOR)
            && self.contains(Self::XML_ATTR_CONTENT_DECORATOR)
        {
            return Err(OpenError::InvalidDecoratorFlags);
        }

        let mut names = Vec::new();
        if self.contains(Self::XML_TEXT_DECORATOR) {
            names.push("xml_text_escape");
        }
        if self.contains(Self::XML_ATTR_CONTENT_DECORATOR) {
            names.push("xml_attr_content_escape");
        }
        if self.contains(Self::XML_ATTR_QUOTE_DECORATOR) {
            names.push("xml_attr_quote");
        }
        if self.contains(Self::CRLF_NEWLINE_DECORATOR) {
            names.push("crlf_newline");
        }
        if self.contains(Self::CR_NEWLINE_DECORATOR) {
            names.push("cr_newline");
        }
        if self.contains(Self::UNIVERSAL_NEWLINE_DECORATOR) {
            names.push("universal_newline");
        }
        Ok(names)
    }
}
