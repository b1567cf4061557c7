use core::fmt;

use bstr::BStr;

/// Why a call to [`Converter::convert`](super::Converter::convert) returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConversionResult {
    InvalidByteSequence,
    UndefinedConversion,
    /// The output slice is full; call again with more room.
    DestinationBufferFull,
    /// All input was consumed under `PARTIAL_INPUT`; call again with more.
    SourceBufferEmpty,
    Finished,
    /// Some output was produced and `AFTER_OUTPUT` asked to stop there.
    AfterOutput,
    /// The input ended in the middle of a character.
    IncompleteInput,
}

impl ConversionResult {
    /// Whether this result describes a conversion error.
    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(
            self,
            Self::InvalidByteSequence | Self::UndefinedConversion | Self::IncompleteInput
        )
    }
}

impl fmt::Display for ConversionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidByteSequence => "invalid_byte_sequence",
            Self::UndefinedConversion => "undefined_conversion",
            Self::DestinationBufferFull => "destination_buffer_full",
            Self::SourceBufferEmpty => "source_buffer_empty",
            Self::Finished => "finished",
            Self::AfterOutput => "after_output",
            Self::IncompleteInput => "incomplete_input",
        })
    }
}

/// Details of the most recent conversion error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastError {
    pub kind: ConversionResult,
    /// Source name of the step that failed.
    pub source: &'static str,
    /// Destination name of the step that failed.
    pub destination: &'static str,
    /// The bytes that could not be converted.
    pub error_bytes: Vec<u8>,
    /// Bytes read past the error that will be converted again.
    pub readagain_bytes: Vec<u8>,
}

impl fmt::Display for LastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let error = BStr::new(&self.error_bytes);
        match self.kind {
            ConversionResult::UndefinedConversion => write!(
                f,
                "{error:?} from {} to {} is undefined",
                self.source, self.destination
            ),
            ConversionResult::IncompleteInput => {
                write!(f, "incomplete {error:?} on {}", self.source)
            }
            _ if self.readagain_bytes.is_empty() => {
                write!(f, "{error:?} on {}", self.source)
            }
            _ => write!(
                f,
                "{error:?} followed by {:?} on {}",
                BStr::new(&self.readagain_bytes),
                self.source
            ),
        }
    }
}
