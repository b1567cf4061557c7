use thiserror::Error;

use crate::transcode::{ConversionResult, LastError};

/// Errors raised by rope construction and access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RopeError {
    #[error("string too long: {left} + {right} bytes overflows the maximum length")]
    StringTooLong { left: usize, right: usize },
    #[error("string too long: {byte_length} bytes times {times} overflows the maximum length")]
    RepeatTooLong { byte_length: usize, times: usize },
    #[error("index {index} out of bounds for a rope of {length} bytes")]
    IndexOutOfBounds { index: usize, length: usize },
    #[error("range {offset}+{length} out of bounds for a rope of {byte_length} bytes")]
    SubstringOutOfBounds {
        offset: usize,
        length: usize,
        byte_length: usize,
    },
    #[error("invalid byte sequence in {encoding}")]
    InvalidByteSequence { encoding: &'static str },
    #[error("incompatible character encodings: {first} and {second}")]
    EncodingIncompatible {
        first: &'static str,
        second: &'static str,
    },
}

/// Errors raised by the encoding registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("encoding {0} is already registered")]
    DuplicateName(String),
    #[error("unknown encoding name - {0}")]
    UnknownEncoding(String),
    #[error("no encoding registered at index {0}")]
    UnknownIndex(usize),
}

/// Reasons a conversion session could not be opened.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpenError {
    #[error("code converter not found ({from} to {to})")]
    NoConversionPath { from: String, to: String },
    #[error("conflicting newline or xml decorator flags")]
    InvalidDecoratorFlags,
    #[error("decorator {name} cannot be added to this converter")]
    DecoratorRejected { name: String },
}

/// Errors surfaced by the one-shot conversion helpers and by recovery actions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscodeError {
    #[error(transparent)]
    Open(#[from] OpenError),
    #[error("{0}")]
    InvalidByteSequence(LastError),
    #[error("{0}")]
    IncompleteInput(LastError),
    #[error("{0}")]
    UndefinedConversion(LastError),
    #[error("cannot build a character reference from {length} bytes of UTF-32BE")]
    CharRefLength { length: usize },
    #[error("conversion stopped unexpectedly: {0:?}")]
    Unexpected(ConversionResult),
}

impl TranscodeError {
    /// Wraps the error record of a failed conversion in the variant matching
    /// its result.
    pub(crate) fn from_result(result: ConversionResult, last_error: Option<&LastError>) -> Self {
        match (result, last_error) {
            (ConversionResult::InvalidByteSequence, Some(error)) => {
                Self::InvalidByteSequence(error.clone())
            }
            (ConversionResult::IncompleteInput, Some(error)) => {
                Self::IncompleteInput(error.clone())
            }
            (ConversionResult::UndefinedConversion, Some(error)) => {
                Self::UndefinedConversion(error.clone())
            }
            (result, _) => Self::Unexpected(result),
        }
    }
}
