#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ropecodec::{ConversionResult, Converter, EconvFlags, transcode};

static ROUTES: &[(&str, &str)] = &[
    ("UTF-8", "UTF-16LE"),
    ("UTF-8", "UTF-32BE"),
    ("UTF-16BE", "UTF-8"),
    ("ISO-8859-1", "UTF-16BE"),
    ("Windows-1252", "UTF-16LE"),
    ("UTF-8", "US-ASCII"),
];

#[derive(Debug, Arbitrary)]
struct Input {
    route: u8,
    replace: bool,
    split_seed: u16,
    output_size: u8,
    data: Vec<u8>,
}

/// Converting in chunks through a small output buffer must produce what a
/// one-shot conversion produces.
fn run(input: Input) {
    let (source, destination) = ROUTES[usize::from(input.route) % ROUTES.len()];
    let flags = if input.replace {
        EconvFlags::INVALID_REPLACE | EconvFlags::UNDEF_REPLACE
    } else {
        EconvFlags::empty()
    };
    let whole = transcode(&input.data, source, destination, flags);

    let mut converter = Converter::open(source, destination, flags).unwrap();
    let mut output = vec![0; usize::from(input.output_size % 32).max(1)];
    let mut collected = Vec::new();
    let chunk_size = usize::from(input.split_seed) % 16 + 1;
    let chunks: Vec<_> = input.data.chunks(chunk_size).collect();

    let mut result = ConversionResult::Finished;
    'chunks: for (index, chunk) in chunks.iter().enumerate() {
        let flags = if index + 1 == chunks.len() {
            EconvFlags::empty()
        } else {
            EconvFlags::PARTIAL_INPUT
        };
        let mut input_pos = 0;
        loop {
            let mut output_pos = 0;
            result = converter.convert(chunk, &mut input_pos, &mut output, &mut output_pos, flags);
            collected.extend_from_slice(&output[..output_pos]);
            match result {
                ConversionResult::DestinationBufferFull => {}
                ConversionResult::SourceBufferEmpty => break,
                _ => break 'chunks,
            }
        }
    }

    match whole {
        Ok(bytes) if !input.data.is_empty() => {
            assert_eq!(result, ConversionResult::Finished);
            assert_eq!(collected, bytes);
        }
        Ok(_) => {}
        Err(_) => assert!(result.is_error()),
    }
}

fuzz_target!(|input: Input| run(input));
