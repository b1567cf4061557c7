#![allow(missing_docs)]

use quickcheck::QuickCheck;
use ropecodec::{
    ConversionResult, Converter, EconvFlags, OpenError, TranscodeError, transcode, transcoders,
};

fn test_count() -> u64 {
    #[cfg(not(miri))]
    let tests = if cfg!(feature = "test-fast") {
        20
    } else if is_ci::cached() {
        2_000
    } else {
        200
    };
    #[cfg(miri)]
    let tests = 5;
    tests
}

/// Feeds `input` in chunks sized by `splits`, with `PARTIAL_INPUT` on every
/// chunk but the last, and collects everything written.
fn convert_chunked(
    converter: &mut Converter,
    input: &[u8],
    splits: &[usize],
    output_size: usize,
) -> (ConversionResult, Vec<u8>) {
    let mut collected = Vec::new();
    let mut output = vec![0; output_size.max(1)];
    let mut rest = input;
    let mut chunks = Vec::new();
    for split in splits {
        if rest.is_empty() {
            break;
        }
        let (chunk, tail) = rest.split_at(1 + split % rest.len());
        chunks.push(chunk);
        rest = tail;
    }
    chunks.push(rest);

    let last = chunks.len() - 1;
    for (index, chunk) in chunks.into_iter().enumerate() {
        let flags = if index == last {
            EconvFlags::empty()
        } else {
            EconvFlags::PARTIAL_INPUT
        };
        let mut input_pos = 0;
        loop {
            let mut output_pos = 0;
            let result =
                converter.convert(chunk, &mut input_pos, &mut output, &mut output_pos, flags);
            collected.extend_from_slice(&output[..output_pos]);
            match result {
                ConversionResult::DestinationBufferFull => {}
                ConversionResult::SourceBufferEmpty => break,
                result => return (result, collected),
            }
        }
    }
    (ConversionResult::SourceBufferEmpty, collected)
}

#[test]
fn utf16_round_trip() {
    let utf16 = transcode(b"hello", "UTF-8", "UTF-16BE", EconvFlags::empty()).unwrap();
    assert_eq!(utf16, b"\0h\0e\0l\0l\0o");
    let back = transcode(&utf16, "UTF-16BE", "UTF-8", EconvFlags::empty()).unwrap();
    assert_eq!(back, b"hello");
}

#[test]
fn undefined_character_becomes_hex_charref() {
    let mut converter =
        Converter::open("UTF-8", "US-ASCII", EconvFlags::UNDEF_HEX_CHARREF).unwrap();
    let (result, output) = convert_chunked(&mut converter, "caf\u{e9}".as_bytes(), &[], 64);
    assert_eq!(result, ConversionResult::Finished);
    assert_eq!(output, b"caf&#xE9;");
}

#[test]
fn unknown_encodings_have_no_route() {
    assert_eq!(
        Converter::open("Klingon-7", "Pirate-9", EconvFlags::empty()).unwrap_err(),
        OpenError::NoConversionPath {
            from: "Klingon-7".into(),
            to: "Pirate-9".into(),
        }
    );
    assert!(transcoders::search_path("Klingon-7", "Pirate-9").is_none());
}

#[test]
fn conflicting_decorators_fail_to_open() {
    assert_eq!(
        Converter::open(
            "UTF-8",
            "UTF-16LE",
            EconvFlags::CR_NEWLINE_DECORATOR | EconvFlags::CRLF_NEWLINE_DECORATOR
        )
        .unwrap_err(),
        OpenError::InvalidDecoratorFlags
    );
}

#[test]
fn replacement_policies() {
    let replaced = transcode(
        b"ok\xFF\xFEok",
        "UTF-8",
        "UTF-16LE",
        EconvFlags::INVALID_REPLACE,
    )
    .unwrap();
    assert_eq!(
        String::from_utf16_lossy(
            &replaced
                .chunks_exact(2)
                .map(|unit| u16::from_le_bytes([unit[0], unit[1]]))
                .collect::<Vec<_>>()
        ),
        "ok\u{FFFD}\u{FFFD}ok"
    );

    let replaced = transcode(
        "na\u{EF}ve \u{2603}".as_bytes(),
        "UTF-8",
        "US-ASCII",
        EconvFlags::UNDEF_REPLACE,
    )
    .unwrap();
    assert_eq!(replaced, b"na?ve ?");

    let raised =
        transcode(b"\x81", "Windows-1252", "UTF-8", EconvFlags::INVALID_REPLACE).unwrap_err();
    let TranscodeError::UndefinedConversion(error) = raised else {
        panic!("unexpected error {raised:?}");
    };
    assert_eq!(error.error_bytes, b"\x81");
    assert_eq!(error.to_string(), r#""\x81" from Windows-1252 to UTF-8 is undefined"#);
}

#[test]
fn incomplete_input_is_reported_or_replaced() {
    let error = transcode(b"ab\xF0\x9F", "UTF-8", "UTF-32LE", EconvFlags::empty()).unwrap_err();
    let TranscodeError::IncompleteInput(record) = error else {
        panic!("unexpected error {error:?}");
    };
    assert_eq!(record.error_bytes, b"\xF0\x9F");

    let replaced =
        transcode(b"ab\xF0\x9F", "UTF-8", "ISO-8859-1", EconvFlags::INVALID_REPLACE).unwrap();
    assert_eq!(replaced, b"ab?");
}

#[test]
fn xml_decorators_escape_and_quote() {
    let text = transcode(
        "<a href=\"x\">&\u{2603}</a>".as_bytes(),
        "UTF-8",
        "US-ASCII",
        EconvFlags::XML_TEXT_DECORATOR,
    )
    .unwrap();
    assert_eq!(text, b"&lt;a href=\"x\"&gt;&amp;&#x2603;&lt;/a&gt;");

    let attribute = transcode(
        b"say \"hi\"",
        "ISO-8859-1",
        "UTF-8",
        EconvFlags::XML_ATTR_CONTENT_DECORATOR | EconvFlags::XML_ATTR_QUOTE_DECORATOR,
    )
    .unwrap();
    assert_eq!(attribute, b"\"say &quot;hi&quot;\"");
}

#[test]
fn newline_decorators_run_before_the_encoder() {
    let converter =
        Converter::open("UTF-8", "UTF-16BE", EconvFlags::CRLF_NEWLINE_DECORATOR).unwrap();
    let steps: Vec<_> = converter.steps().map(|step| step.destination).collect();
    assert_eq!(steps, ["crlf_newline", "UTF-16BE"]);

    let crlf = transcode(b"a\nb", "UTF-8", "UTF-16BE", EconvFlags::CRLF_NEWLINE_DECORATOR).unwrap();
    assert_eq!(crlf, b"\0a\0\r\0\n\0b");

    let universal =
        transcode(b"a\r\nb\rc\n", "", "", EconvFlags::UNIVERSAL_NEWLINE_DECORATOR).unwrap();
    assert_eq!(universal, b"a\nb\nc\n");
}

#[test]
fn decorators_are_rejected_once_started() {
    let mut converter = Converter::open("UTF-16LE", "UTF-8", EconvFlags::empty()).unwrap();
    converter.decorate_at_last("xml_text_escape").unwrap();

    let mut output = [0; 8];
    let (mut input_pos, mut output_pos) = (0, 0);
    let result = converter.convert(
        b"<\0",
        &mut input_pos,
        &mut output,
        &mut output_pos,
        EconvFlags::PARTIAL_INPUT,
    );
    assert_eq!(result, ConversionResult::SourceBufferEmpty);
    assert_eq!(&output[..output_pos], b"&lt;");
    assert!(converter.is_started());

    assert_eq!(
        converter.decorate_at_last("crlf_newline"),
        Err(OpenError::DecoratorRejected {
            name: "crlf_newline".into()
        })
    );
    assert_eq!(converter.steps().len(), 2);
}

#[test]
fn inserted_output_is_encoded_for_the_chain() {
    let mut converter = Converter::open("UTF-8", "UTF-32BE", EconvFlags::empty()).unwrap();
    converter.insert_output(b"\xE9", "ISO-8859-1").unwrap();

    let mut output = [0; 16];
    let (mut input_pos, mut output_pos) = (0, 0);
    let result =
        converter.convert(b"!", &mut input_pos, &mut output, &mut output_pos, EconvFlags::empty());
    assert_eq!(result, ConversionResult::Finished);
    assert_eq!(&output[..output_pos], b"\0\0\0\xE9\0\0\0!");
    assert!(converter.close().is_none());
}

#[test]
fn routes_prefer_direct_steps() {
    let names = |source: &str, destination: &str| -> Vec<(&'static str, &'static str)> {
        transcoders::search_path(source, destination)
            .unwrap()
            .into_iter()
            .map(|step| (step.source, step.destination))
            .collect()
    };
    assert_eq!(names("Windows-1252", "UTF-8"), [("Windows-1252", "UTF-8")]);
    assert_eq!(
        names("UTF-32LE", "UTF-16BE"),
        [("UTF-32LE", "UTF-8"), ("UTF-8", "UTF-16BE")]
    );
    assert!(transcoders::direct_destinations("utf-8").contains(&"Windows-1252"));
}

/// Property: chunking the input and shrinking the output buffer does not
/// change what a conversion produces.
#[test]
fn chunked_conversion_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(text: String, splits: Vec<usize>, output_size: u8) -> bool {
        let whole = transcode(text.as_bytes(), "UTF-8", "UTF-16LE", EconvFlags::empty()).unwrap();
        let mut converter = Converter::open("UTF-8", "UTF-16LE", EconvFlags::empty()).unwrap();
        let (result, chunked) = convert_chunked(
            &mut converter,
            text.as_bytes(),
            &splits,
            usize::from(output_size % 16),
        );
        result == ConversionResult::Finished && chunked == whole
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(String, Vec<usize>, u8) -> bool);
}
