//! Built-in conversion steps and decorators.

use super::transcoder::{AsciiCompatibility, StepOutcome, StepState, Transcoder};
use crate::encoding::{CharLength, CharScheme};

const fn step(
    source: &'static str,
    destination: &'static str,
    compatibility: AsciiCompatibility,
    step: super::transcoder::StepFn,
) -> Transcoder {
    Transcoder {
        source,
        destination,
        compatibility,
        step,
        finish: None,
    }
}

const fn decorator(name: &'static str, step: super::transcoder::StepFn) -> Transcoder {
    Transcoder {
        source: "",
        destination: name,
        compatibility: AsciiCompatibility::Converter,
        step,
        finish: None,
    }
}

pub(crate) static BUILTIN: &[Transcoder] = &[
    step("US-ASCII", "UTF-8", AsciiCompatibility::Converter, us_ascii_to_utf8),
    step("UTF-8", "US-ASCII", AsciiCompatibility::Converter, utf8_to_us_ascii),
    step("ISO-8859-1", "UTF-8", AsciiCompatibility::Converter, iso_8859_1_to_utf8),
    step("UTF-8", "ISO-8859-1", AsciiCompatibility::Converter, utf8_to_iso_8859_1),
    step("Windows-1252", "UTF-8", AsciiCompatibility::Converter, windows_1252_to_utf8),
    step("UTF-8", "Windows-1252", AsciiCompatibility::Converter, utf8_to_windows_1252),
    step("UTF-16BE", "UTF-8", AsciiCompatibility::Decoder, utf16be_to_utf8),
    step("UTF-16LE", "UTF-8", AsciiCompatibility::Decoder, utf16le_to_utf8),
    step("UTF-32BE", "UTF-8", AsciiCompatibility::Decoder, utf32be_to_utf8),
    step("UTF-32LE", "UTF-8", AsciiCompatibility::Decoder, utf32le_to_utf8),
    step("UTF-8", "UTF-16BE", AsciiCompatibility::Encoder, utf8_to_utf16be),
    step("UTF-8", "UTF-16LE", AsciiCompatibility::Encoder, utf8_to_utf16le),
    step("UTF-8", "UTF-32BE", AsciiCompatibility::Encoder, utf8_to_utf32be),
    step("UTF-8", "UTF-32LE", AsciiCompatibility::Encoder, utf8_to_utf32le),
    decorator("universal_newline", universal_newline),
    decorator("crlf_newline", crlf_newline),
    decorator("cr_newline", cr_newline),
    decorator("xml_text_escape", xml_text_escape),
    decorator("xml_attr_content_escape", xml_attr_content_escape),
    Transcoder {
        source: "",
        destination: "xml_attr_quote",
        compatibility: AsciiCompatibility::Converter,
        step: xml_attr_quote,
        finish: Some(xml_attr_quote_finish),
    },
];

// --------------------------------------------------------------------------
// UTF-8 plumbing

/// Malformed window: the last byte broke an otherwise incomplete prefix and
/// must be read again, unless the window is a single byte.
fn invalid_prefix(window: &[u8]) -> StepOutcome {
    StepOutcome::Invalid {
        consumed: window.len().saturating_sub(1).max(1),
    }
}

fn utf8_char(window: &[u8]) -> Result<u32, StepOutcome> {
    match CharScheme::Utf8.precise_length(window) {
        CharLength::Char(_) => CharScheme::Utf8
            .code_point(window)
            .ok_or(StepOutcome::Invalid { consumed: 1 }),
        CharLength::NeedMore(_) => Err(StepOutcome::NeedMore),
        CharLength::Invalid => Err(invalid_prefix(window)),
    }
}

fn push_utf8(code_point: u32, out: &mut Vec<u8>) {
    if let Some(c) = char::from_u32(code_point) {
        let mut buffer = [0; 4];
        out.extend_from_slice(c.encode_utf8(&mut buffer).as_bytes());
    }
}

// --------------------------------------------------------------------------
// Single-byte code pages

fn us_ascii_to_utf8(_: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    if window[0].is_ascii() {
        out.push(window[0]);
        StepOutcome::Converted
    } else {
        StepOutcome::Invalid { consumed: 1 }
    }
}

fn utf8_to_us_ascii(_: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    match utf8_char(window) {
        Ok(code_point) => match u8::try_from(code_point) {
            Ok(byte) if byte.is_ascii() => {
                out.push(byte);
                StepOutcome::Converted
            }
            _ => StepOutcome::Undefined,
        },
        Err(outcome) => outcome,
    }
}

fn iso_8859_1_to_utf8(_: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    push_utf8(u32::from(window[0]), out);
    StepOutcome::Converted
}

fn utf8_to_iso_8859_1(_: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    match utf8_char(window) {
        Ok(code_point) => match u8::try_from(code_point) {
            Ok(byte) => {
                out.push(byte);
                StepOutcome::Converted
            }
            Err(_) => StepOutcome::Undefined,
        },
        Err(outcome) => outcome,
    }
}

/// Code points of Windows-1252 bytes 0x80 to 0x9F; zero marks a hole.
const WINDOWS_1252_HIGH: [u32; 32] = [
    0x20AC, 0, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, //
    0x02C6, 0x2030, 0x0160, 0x2039, 0x0152, 0, 0x017D, 0, //
    0, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014, //
    0x02DC, 0x2122, 0x0161, 0x203A, 0x0153, 0, 0x017E, 0x0178,
];

fn windows_1252_to_utf8(_: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    let byte = window[0];
    let code_point = match byte {
        0x80..=0x9F => WINDOWS_1252_HIGH[usize::from(byte - 0x80)],
        _ => u32::from(byte),
    };
    if code_point == 0 && byte != 0 {
        return StepOutcome::Undefined;
    }
    push_utf8(code_point, out);
    StepOutcome::Converted
}

fn utf8_to_windows_1252(_: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    let code_point = match utf8_char(window) {
        Ok(code_point) => code_point,
        Err(outcome) => return outcome,
    };
    let byte = match code_point {
        0x00..=0x7F | 0xA0..=0xFF => u8::try_from(code_point).ok(),
        _ => WINDOWS_1252_HIGH
            .iter()
            .position(|&mapped| mapped == code_point)
            .and_then(|index| u8::try_from(0x80 + index).ok()),
    };
    match byte {
        Some(byte) => {
            out.push(byte);
            StepOutcome::Converted
        }
        None => StepOutcome::Undefined,
    }
}

// --------------------------------------------------------------------------
// UTF-16 and UTF-32

fn decode_wide(scheme: CharScheme, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    match scheme.precise_length(window) {
        CharLength::Char(_) => {
            if let Some(code_point) = scheme.code_point(window) {
                push_utf8(code_point, out);
            }
            StepOutcome::Converted
        }
        CharLength::NeedMore(_) => StepOutcome::NeedMore,
        CharLength::Invalid => StepOutcome::Invalid {
            consumed: window.len().min(scheme.min_length()),
        },
    }
}

fn encode_wide(scheme: CharScheme, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    let code_point = match utf8_char(window) {
        Ok(code_point) => code_point,
        Err(outcome) => return outcome,
    };
    let Some(c) = char::from_u32(code_point) else {
        return StepOutcome::Invalid {
            consumed: window.len(),
        };
    };
    match scheme {
        CharScheme::Utf16Be | CharScheme::Utf16Le => {
            let mut units = [0; 2];
            for unit in c.encode_utf16(&mut units) {
                if scheme == CharScheme::Utf16Be {
                    out.extend_from_slice(&unit.to_be_bytes());
                } else {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
            }
        }
        CharScheme::Utf32Le => out.extend_from_slice(&code_point.to_le_bytes()),
        _ => out.extend_from_slice(&code_point.to_be_bytes()),
    }
    StepOutcome::Converted
}

fn utf16be_to_utf8(_: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    decode_wide(CharScheme::Utf16Be, window, out)
}

fn utf16le_to_utf8(_: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    decode_wide(CharScheme::Utf16Le, window, out)
}

fn utf32be_to_utf8(_: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    decode_wide(CharScheme::Utf32Be, window, out)
}

fn utf32le_to_utf8(_: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    decode_wide(CharScheme::Utf32Le, window, out)
}

fn utf8_to_utf16be(_: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    encode_wide(CharScheme::Utf16Be, window, out)
}

fn utf8_to_utf16le(_: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    encode_wide(CharScheme::Utf16Le, window, out)
}

fn utf8_to_utf32be(_: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    encode_wide(CharScheme::Utf32Be, window, out)
}

fn utf8_to_utf32le(_: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    encode_wide(CharScheme::Utf32Le, window, out)
}

// --------------------------------------------------------------------------
// Decorators

fn universal_newline(state: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    let pending_cr = core::mem::take(&mut state.flag);
    match window[0] {
        b'\r' => {
            out.push(b'\n');
            state.flag = true;
        }
        b'\n' if pending_cr => {}
        byte => out.push(byte),
    }
    StepOutcome::Converted
}

fn crlf_newline(_: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    match window[0] {
        b'\n' => out.extend_from_slice(b"\r\n"),
        byte => out.push(byte),
    }
    StepOutcome::Converted
}

fn cr_newline(_: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    match window[0] {
        b'\n' => out.push(b'\r'),
        byte => out.push(byte),
    }
    StepOutcome::Converted
}

fn xml_text_escape(_: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    match window[0] {
        b'&' => out.extend_from_slice(b"&amp;"),
        b'<' => out.extend_from_slice(b"&lt;"),
        b'>' => out.extend_from_slice(b"&gt;"),
        byte => out.push(byte),
    }
    StepOutcome::Converted
}

fn xml_attr_content_escape(_: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    match window[0] {
        b'"' => out.extend_from_slice(b"&quot;"),
        _ => return xml_text_escape(&mut StepState::default(), window, out),
    }
    StepOutcome::Converted
}

fn xml_attr_quote(state: &mut StepState, window: &[u8], out: &mut Vec<u8>) -> StepOutcome {
    if !state.flag {
        out.push(b'"');
        state.flag = true;
    }
    out.push(window[0]);
    StepOutcome::Converted
}

fn xml_attr_quote_finish(state: &mut StepState, out: &mut Vec<u8>) {
    if !state.flag {
        out.push(b'"');
        state.flag = true;
    }
    out.push(b'"');
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    fn run(step: super::super::transcoder::StepFn, window: &[u8]) -> (StepOutcome, Vec<u8>) {
        let mut out = Vec::new();
        let outcome = step(&mut StepState::default(), window, &mut out);
        (outcome, out)
    }

    #[rstest]
    #[case(&[0xE2, 0x82, 0xAC], StepOutcome::Converted, &[0x80])]
    #[case(&[0xC3, 0xA9], StepOutcome::Converted, &[0xE9])]
    #[case(&[0xE2, 0x80, 0x8B], StepOutcome::Undefined, &[])]
    #[case(&[0xE2, 0x80], StepOutcome::NeedMore, &[])]
    fn windows_1252_encoding(
        #[case] window: &[u8],
        #[case] outcome: StepOutcome,
        #[case] bytes: &[u8],
    ) {
        assert_eq!(run(utf8_to_windows_1252, window), (outcome, bytes.to_vec()));
    }

    #[test]
    fn windows_1252_holes_are_undefined() {
        assert_eq!(run(windows_1252_to_utf8, &[0x81]).0, StepOutcome::Undefined);
        assert_eq!(
            run(windows_1252_to_utf8, &[0x80]),
            (StepOutcome::Converted, vec![0xE2, 0x82, 0xAC])
        );
        assert_eq!(
            run(windows_1252_to_utf8, &[0x00]),
            (StepOutcome::Converted, vec![0x00])
        );
    }

    #[test]
    fn invalid_utf8_rereads_the_breaking_byte() {
        assert_eq!(
            run(utf8_to_us_ascii, &[0xE3, 0x41]).0,
            StepOutcome::Invalid { consumed: 1 }
        );
        assert_eq!(
            run(utf8_to_us_ascii, &[0xFF]).0,
            StepOutcome::Invalid { consumed: 1 }
        );
        assert_eq!(
            run(utf16be_to_utf8, &[0xD8, 0x3D, 0x00, 0x41]).0,
            StepOutcome::Invalid { consumed: 2 }
        );
    }

    #[quickcheck_macros::quickcheck]
    fn latin1_bytes_round_trip(byte: u8) -> bool {
        let (outcome, utf8) = run(iso_8859_1_to_utf8, &[byte]);
        outcome == StepOutcome::Converted
            && run(utf8_to_iso_8859_1, &utf8) == (StepOutcome::Converted, vec![byte])
    }

    #[test]
    fn astral_code_points_use_surrogates() {
        assert_eq!(
            run(utf8_to_utf16le, &[0xF0, 0x9F, 0x98, 0x80]),
            (StepOutcome::Converted, vec![0x3D, 0xD8, 0x00, 0xDE])
        );
        assert_eq!(
            run(utf16le_to_utf8, &[0x3D, 0xD8, 0x00, 0xDE]),
            (StepOutcome::Converted, vec![0xF0, 0x9F, 0x98, 0x80])
        );
    }
}
