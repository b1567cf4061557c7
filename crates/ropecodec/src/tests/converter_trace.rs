use std::fmt::Write as _;

use bstr::BStr;

use crate::{ConversionResult, Converter, EconvFlags, transcode};

#[test]
fn resume_loop_with_a_tiny_output_buffer() {
    let mut converter = Converter::open("UTF-8", "UTF-16LE", EconvFlags::empty()).unwrap();
    let input = "h\u{E9}llo".as_bytes();
    let mut output = [0; 4];
    let mut input_pos = 0;
    let mut trace = String::new();
    loop {
        let mut output_pos = 0;
        let result = converter.convert(
            input,
            &mut input_pos,
            &mut output,
            &mut output_pos,
            EconvFlags::empty(),
        );
        writeln!(
            trace,
            "{result} in={input_pos} out={:?}",
            BStr::new(&output[..output_pos])
        )
        .unwrap();
        if result.is_error() || result == ConversionResult::Finished {
            break;
        }
    }

    insta::assert_snapshot!(trace, @r#"
    destination_buffer_full in=4 out="h\0\xE9\0"
    destination_buffer_full in=6 out="l\0l\0"
    finished in=6 out="o\0"
    "#);
}

#[test]
fn chain_and_error_records() {
    let converter = Converter::open(
        "UTF-16LE",
        "US-ASCII",
        EconvFlags::XML_TEXT_DECORATOR | EconvFlags::CRLF_NEWLINE_DECORATOR,
    )
    .unwrap();
    let mut report = String::new();
    for step in converter.steps() {
        writeln!(
            report,
            "{:?} -> {:?} ({:?})",
            step.source,
            step.destination,
            step.compatibility
        )
        .unwrap();
    }
    for (input, source, destination) in [
        (&b"a\xE3A"[..], "UTF-8", "UTF-16LE"),
        (&b"ab\xE2\x82"[..], "UTF-8", "US-ASCII"),
        (&b"\x81"[..], "Windows-1252", "UTF-8"),
    ] {
        let error = transcode(input, source, destination, EconvFlags::empty()).unwrap_err();
        writeln!(report, "{error}").unwrap();
    }

    insta::assert_snapshot!(report, @r#"
    "UTF-16LE" -> "UTF-8" (Decoder)
    "UTF-8" -> "US-ASCII" (Converter)
    "" -> "xml_text_escape" (Converter)
    "" -> "crlf_newline" (Converter)
    "\xE3" followed by "A" on UTF-8
    incomplete "\xE2\x82" on UTF-8
    "\x81" from Windows-1252 to UTF-8 is undefined
    "#);
}
