//! Conversion sessions.
//!
//! Overview
//! - A [`Converter`] owns a chain of steps resolved by
//!   [`search_path`](super::registry::search_path), plus any decorators the
//!   session flags asked for. Each call to [`Converter::convert`] pulls bytes
//!   through the chain and writes as much as fits into the caller's output
//!   slice.
//!
//! Buffers
//! - Every step owns an output [`TranscodeBuffer`] which is the input of the
//!   next step. The last step's buffer drains into the caller's output.
//!   `in_buf` sits in front of the first step; it only receives bytes from
//!   [`Converter::insert_output`] and is read before the caller's input.
//! - A step reads one byte at a time into `read_buf` until it recognizes a
//!   character. Bytes that turn out to belong after a malformed sequence are
//!   queued in `read_again` and offered to the same step first.
//!
//! Scheduling
//! - Steps are tried from last to first and the first one that makes progress
//!   restarts the round, so at most one character of output is pending at the
//!   end of the chain before it is flushed. When nothing moves, the session is
//!   either waiting for input, holding an incomplete character, or finishing.
//!
//! Recovery
//! - `convert` wraps the raw loop: invalid and undefined input is replaced or
//!   rendered as a hexadecimal character reference when the session flags say
//!   so, by splicing text into the chain with `insert_output`, and the loop
//!   resumes. Anything else goes back to the caller.

use std::borrow::Cow;
use std::collections::VecDeque;

use log::{debug, trace};

use super::buffer::TranscodeBuffer;
use super::flags::{EconvFlags, InvalidAction, UndefinedAction};
use super::registry::{lookup, search_path};
use super::result::{ConversionResult, LastError};
use super::transcoder::{AsciiCompatibility, StepOutcome, StepState, Transcoder};
use crate::error::{OpenError, TranscodeError};

/// One step of a session and the bytes in flight around it.
#[derive(Debug)]
pub(crate) struct Element {
    transcoder: &'static Transcoder,
    state: StepState,
    read_buf: Vec<u8>,
    read_again: VecDeque<u8>,
    out: TranscodeBuffer,
    finished: bool,
}

impl Element {
    fn new(transcoder: &'static Transcoder) -> Self {
        Self {
            transcoder,
            state: StepState::default(),
            read_buf: Vec::new(),
            read_again: VecDeque::new(),
            out: TranscodeBuffer::default(),
            finished: false,
        }
    }

    fn is_encoder(&self) -> bool {
        !self.transcoder.is_decorator()
            && self.transcoder.compatibility == AsciiCompatibility::Encoder
    }

    fn error(
        &self,
        kind: ConversionResult,
        error_bytes: Vec<u8>,
        readagain_bytes: Vec<u8>,
    ) -> LastError {
        LastError {
            kind,
            source: self.transcoder.source,
            destination: self.transcoder.destination,
            error_bytes,
            readagain_bytes,
        }
    }
}

/// A single conversion session.
///
/// Not shareable between threads while converting; every call mutates the
/// cursors of the chain.
#[derive(Debug)]
pub struct Converter {
    source_encoding: String,
    destination_encoding: String,
    flags: EconvFlags,
    started: bool,
    elements: Vec<Element>,
    in_buf: TranscodeBuffer,
    replacement: Option<(Vec<u8>, String)>,
    last_error: Option<LastError>,
}

impl Converter {
    /// Opens a session converting `source` to `destination`.
    ///
    /// Both names empty gives a session that only applies the decorators
    /// requested in `flags`.
    pub fn open(source: &str, destination: &str, flags: EconvFlags) -> Result<Self, OpenError> {
        let decorators = flags.decorator_names()?;
        let no_path = || OpenError::NoConversionPath {
            from: source.to_owned(),
            to: destination.to_owned(),
        };

        let path = match (source.is_empty(), destination.is_empty()) {
            (true, true) => Vec::new(),
            (false, false) => search_path(source, destination).ok_or_else(no_path)?,
            _ => return Err(no_path()),
        };
        debug!(
            "open {source:?} -> {destination:?}: {} steps, decorators {decorators:?}",
            path.len()
        );

        let mut flags = flags;
        if flags.intersects(
            EconvFlags::XML_TEXT_DECORATOR | EconvFlags::XML_ATTR_CONTENT_DECORATOR,
        ) {
            flags.insert(EconvFlags::UNDEF_HEX_CHARREF);
        }

        let mut converter = Self {
            source_encoding: source.to_owned(),
            destination_encoding: destination.to_owned(),
            flags,
            started: false,
            elements: path.into_iter().map(Element::new).collect(),
            in_buf: TranscodeBuffer::default(),
            replacement: None,
            last_error: None,
        };
        for name in decorators {
            converter.decorate_at_last(name)?;
        }
        Ok(converter)
    }

    /// Adds the decorator `name` at the end of the chain, or just before a
    /// trailing encoder so that it sees ASCII-compatible bytes.
    ///
    /// Fails without touching the session once conversion has started or
    /// when `name` is not a registered decorator.
    pub fn decorate_at_last(&mut self, name: &str) -> Result<(), OpenError> {
        let rejected = || OpenError::DecoratorRejected {
            name: name.to_owned(),
        };
        if self.started {
            debug!("decorator {name} rejected: conversion already started");
            return Err(rejected());
        }
        let Some(transcoder) = lookup("", name).filter(|transcoder| transcoder.is_decorator())
        else {
            debug!("decorator {name} rejected: not registered");
            return Err(rejected());
        };

        let position = match self.elements.last() {
            Some(last) if last.is_encoder() => self.elements.len() - 1,
            _ => self.elements.len(),
        };
        self.elements.insert(position, Element::new(transcoder));
        Ok(())
    }

    #[must_use]
    pub fn source_encoding(&self) -> &str {
        &self.source_encoding
    }

    #[must_use]
    pub fn destination_encoding(&self) -> &str {
        &self.destination_encoding
    }

    #[must_use]
    pub fn flags(&self) -> EconvFlags {
        self.flags
    }

    /// Whether `convert` has been called on this session.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// The chain, decorators included, in the order bytes flow through it.
    pub fn steps(&self) -> impl ExactSizeIterator<Item = &'static Transcoder> + '_ {
        self.elements.iter().map(|element| element.transcoder)
    }

    /// Details of the most recent conversion error.
    #[must_use]
    pub fn last_error(&self) -> Option<&LastError> {
        self.last_error.as_ref()
    }

    /// Ends the session, returning its last error record.
    pub fn close(self) -> Option<LastError> {
        self.last_error
    }

    /// Converts `input[*input_pos..]` into `output[*output_pos..]`, advancing
    /// both cursors.
    ///
    /// `flags` carries the per-call modes `PARTIAL_INPUT` and `AFTER_OUTPUT`;
    /// error handling comes from the flags the session was opened with.
    pub fn convert(
        &mut self,
        input: &[u8],
        input_pos: &mut usize,
        output: &mut [u8],
        output_pos: &mut usize,
        flags: EconvFlags,
    ) -> ConversionResult {
        self.started = true;
        loop {
            let result = self.convert_internal(input, input_pos, output, output_pos, flags);
            let recovery = match result {
                ConversionResult::InvalidByteSequence | ConversionResult::IncompleteInput
                    if self.flags.invalid_action() == InvalidAction::Replace =>
                {
                    self.output_replacement_character()
                }
                ConversionResult::UndefinedConversion => match self.flags.undefined_action() {
                    UndefinedAction::Replace => self.output_replacement_character(),
                    UndefinedAction::HexCharRef => self.output_hex_charref(),
                    UndefinedAction::Raise => return result,
                },
                _ => return result,
            };
            match recovery {
                Ok(()) => trace!("recovered from {result}"),
                Err(error) => {
                    trace!("recovery from {result} failed: {error}");
                    return result;
                }
            }
        }
    }

    fn convert_internal(
        &mut self,
        input: &[u8],
        input_pos: &mut usize,
        output: &mut [u8],
        output_pos: &mut usize,
        flags: EconvFlags,
    ) -> ConversionResult {
        let output_start = *output_pos;
        let partial = flags.contains(EconvFlags::PARTIAL_INPUT);

        loop {
            if !self.flush(output, output_pos) {
                return ConversionResult::DestinationBufferFull;
            }
            if flags.contains(EconvFlags::AFTER_OUTPUT) && *output_pos > output_start {
                return ConversionResult::AfterOutput;
            }

            if self.elements.is_empty() {
                let remaining = &input[*input_pos..];
                if remaining.is_empty() {
                    return if partial {
                        ConversionResult::SourceBufferEmpty
                    } else {
                        ConversionResult::Finished
                    };
                }
                let count = remaining.len().min(output.len() - *output_pos);
                if count == 0 {
                    return ConversionResult::DestinationBufferFull;
                }
                output[*output_pos..*output_pos + count].copy_from_slice(&remaining[..count]);
                *input_pos += count;
                *output_pos += count;
                continue;
            }

            let mut progressed = false;
            for index in (0..self.elements.len()).rev() {
                match self.run_step(index, input, input_pos) {
                    Ok(true) => {
                        progressed = true;
                        break;
                    }
                    Ok(false) => {}
                    Err(result) => {
                        self.flush(output, output_pos);
                        return result;
                    }
                }
            }
            if progressed {
                continue;
            }

            if partial {
                return ConversionResult::SourceBufferEmpty;
            }
            if let Some(element) = self.elements.iter_mut().find(|e| !e.read_buf.is_empty()) {
                let error_bytes = core::mem::take(&mut element.read_buf);
                self.last_error =
                    Some(element.error(ConversionResult::IncompleteInput, error_bytes, Vec::new()));
                return ConversionResult::IncompleteInput;
            }
            if let Some(element) = self.elements.iter_mut().find(|e| !e.finished) {
                element.finished = true;
                if let Some(finish) = element.transcoder.finish {
                    finish(&mut element.state, element.out.tail());
                }
                continue;
            }
            return ConversionResult::Finished;
        }
    }

    /// Feeds step `index` until it converts one character, runs dry, or
    /// fails. Returns whether the step made progress.
    fn run_step(
        &mut self,
        index: usize,
        input: &[u8],
        input_pos: &mut usize,
    ) -> Result<bool, ConversionResult> {
        let (before, rest) = self.elements.split_at_mut(index);
        let element = &mut rest[0];
        loop {
            let byte = if let Some(byte) = element.read_again.pop_front() {
                byte
            } else if let Some(previous) = before.last_mut() {
                match previous.out.pop_front() {
                    Some(byte) => byte,
                    None => return Ok(false),
                }
            } else if let Some(byte) = self.in_buf.pop_front() {
                byte
            } else if let Some(&byte) = input.get(*input_pos) {
                *input_pos += 1;
                byte
            } else {
                return Ok(false);
            };

            element.read_buf.push(byte);
            let outcome = (
                element.transcoder.step)(&mut element.state,
                &element.read_buf,
                element.out.tail(),
            );
            match outcome {
                StepOutcome::Converted => {
                    element.read_buf.clear();
                    return Ok(true);
                }
                StepOutcome::NeedMore => {}
                StepOutcome::Invalid { consumed } => {
                    let mut error_bytes = core::mem::take(&mut element.read_buf);
                    let readagain_bytes = error_bytes.split_off(consumed.min(error_bytes.len()));
                    for &byte in readagain_bytes.iter().rev() {
                        element.read_again.push_front(byte);
                    }
                    self.last_error = Some(element.error(
                        ConversionResult::InvalidByteSequence,
                        error_bytes,
                        readagain_bytes,
                    ));
                    return Err(ConversionResult::InvalidByteSequence);
                }
                StepOutcome::Undefined => {
                    let error_bytes = core::mem::take(&mut element.read_buf);
                    self.last_error = Some(element.error(
                        ConversionResult::UndefinedConversion,
                        error_bytes,
                        Vec::new(),
                    ));
                    return Err(ConversionResult::UndefinedConversion);
                }
            }
        }
    }

    /// Moves pending bytes at the end of the chain into `output`. Returns
    /// whether nothing is left pending.
    fn flush(&mut self, output: &mut [u8], output_pos: &mut usize) -> bool {
        let buffer = match self.elements.last_mut() {
            Some(element) => &mut element.out,
            None => &mut self.in_buf,
        };
        let count = buffer.len().min(output.len() - *output_pos);
        output[*output_pos..*output_pos + count].copy_from_slice(&buffer.data()[..count]);
        buffer.consume(count);
        *output_pos += count;
        buffer.is_empty()
    }

    /// Encoding that text spliced into the chain must be in: the input side
    /// of a trailing encoder, or the output side of the last real step.
    /// Empty for decorator-only sessions.
    fn insert_encoding(&self) -> &'static str {
        self.elements
            .iter()
            .rev()
            .find(|element| !element.transcoder.is_decorator())
            .map_or("", |element| {
                if element.transcoder.compatibility == AsciiCompatibility::Encoder {
                    element.transcoder.source
                } else {
                    element.transcoder.destination
                }
            })
    }

    /// Splices `text`, written in `encoding`, into the output stream at the
    /// current position.
    ///
    /// Text is re-encoded when the chain expects another encoding. Bytes go
    /// in as they are only when the names match or the session has no
    /// insert encoding; an empty `encoding` on a session that has one is
    /// rejected with [`OpenError::NoConversionPath`].
    pub fn insert_output(&mut self, text: &[u8], encoding: &str) -> Result<(), TranscodeError> {
        let insert_encoding = self.insert_encoding();
        let text: Cow<'_, [u8]> = if passes_through(insert_encoding, encoding) {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(allocate_converted_string(encoding, insert_encoding, text)?)
        };

        let last = self.elements.len().checked_sub(1);
        match last {
            Some(last) if self.elements[last].is_encoder() => {
                let read_again: Vec<u8> = self.elements[last].read_again.drain(..).collect();
                let buffer = match last.checked_sub(1) {
                    Some(previous) => &mut self.elements[previous].out,
                    None => &mut self.in_buf,
                };
                buffer.reserve(text.len() + read_again.len());
                buffer.extend_from_slice(&text);
                buffer.extend_from_slice(&read_again);
            }
            Some(last) => self.elements[last].out.extend_from_slice(&text),
            None => self.in_buf.extend_from_slice(&text),
        }
        Ok(())
    }

    /// Sets the text used by the replace actions, converting it to the
    /// encoding expected at the insertion point.
    pub fn set_replacement(&mut self, bytes: &[u8], encoding: &str) -> Result<(), TranscodeError> {
        let insert_encoding = self.insert_encoding();
        let replacement = if passes_through(insert_encoding, encoding) {
            (bytes.to_vec(), encoding.to_owned())
        } else {
            (
                allocate_converted_string(encoding, insert_encoding, bytes)?,
                insert_encoding.to_owned(),
            )
        };
        self.replacement = Some(replacement);
        Ok(())
    }

    /// The replacement text and its encoding, choosing the default one if
    /// none was set.
    pub fn replacement(&mut self) -> (&[u8], &str) {
        let insert_encoding = self.insert_encoding();
        let (bytes, encoding) = self.replacement.get_or_insert_with(|| {
            if insert_encoding.eq_ignore_ascii_case("UTF-8") {
                ("\u{FFFD}".into(), "UTF-8".to_owned())
            } else if insert_encoding.is_empty() {
                (b"?".to_vec(), String::new())
            } else {
                (b"?".to_vec(), "US-ASCII".to_owned())
            }
        });
        (bytes.as_slice(), encoding.as_str())
    }

    fn output_replacement_character(&mut self) -> Result<(), TranscodeError> {
        let (bytes, encoding) = self.replacement();
        let (bytes, encoding) = (bytes.to_vec(), encoding.to_owned());
        self.insert_output(&bytes, &encoding)
    }

    fn output_hex_charref(&mut self) -> Result<(), TranscodeError> {
        let Some(error) = &self.last_error else {
            return Err(TranscodeError::Unexpected(ConversionResult::UndefinedConversion));
        };
        let utf32: Cow<'_, [u8]> = if error.source.eq_ignore_ascii_case("UTF-32BE") {
            Cow::Borrowed(&error.error_bytes)
        } else {
            Cow::Owned(allocate_converted_string(error.source, "UTF-32BE", &error.error_bytes)?)
        };
        if utf32.len() % 4 != 0 {
            return Err(TranscodeError::CharRefLength { length: utf32.len() });
        }

        let text: String = utf32
            .chunks_exact(4)
            .map(|unit| {
                let code_point = u32::from_be_bytes([unit[0], unit[1], unit[2], unit[3]]);
                format!("&#x{code_point:X};")
            })
            .collect();
        self.insert_output(text.as_bytes(), "US-ASCII")
    }
}

/// Whether text in `encoding` can be spliced in without a nested conversion.
fn passes_through(insert_encoding: &str, encoding: &str) -> bool {
    insert_encoding.is_empty() || insert_encoding.eq_ignore_ascii_case(encoding)
}

/// Converts a short byte string through a throwaway session.
pub(crate) fn allocate_converted_string(
    source: &str,
    destination: &str,
    bytes: &[u8],
) -> Result<Vec<u8>, TranscodeError> {
    let mut converter = Converter::open(source, destination, EconvFlags::empty())?;
    convert_to_end(&mut converter, bytes)
}

/// Runs `converter` over all of `bytes`, doubling the output until it fits.
pub(crate) fn convert_to_end(
    converter: &mut Converter,
    bytes: &[u8],
) -> Result<Vec<u8>, TranscodeError> {
    let mut output = vec![0; bytes.len().max(4) * 2];
    let mut input_pos = 0;
    let mut output_pos = 0;
    loop {
        match converter.convert(
            bytes,
            &mut input_pos,
            &mut output,
            &mut output_pos,
            EconvFlags::empty(),
        ) {
            ConversionResult::Finished => {
                output.truncate(output_pos);
                return Ok(output);
            }
            ConversionResult::DestinationBufferFull => {
                let doubled = output.len() * 2;
                output.resize(doubled, 0);
            }
            result => return Err(TranscodeError::from_result(result, converter.last_error())),
        }
    }
}
