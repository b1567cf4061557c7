use crate::{CodeRange, ConversionResult, Encoding, RopeOptions, classify};

#[test]
fn attributes_serialize_by_field() {
    let attributes = classify(Encoding::UTF_8, "h\u{E9}".as_bytes());
    assert_eq!(
        serde_json::to_string(&attributes).unwrap(),
        r#"{"character_length":2,"code_range":"Valid"}"#
    );
    assert_eq!(
        serde_json::from_str::<CodeRange>(r#""Broken""#).unwrap(),
        CodeRange::Broken
    );
}

#[test]
fn options_load_from_json() {
    let options: RopeOptions =
        serde_json::from_str(r#"{"lazy_substrings":false,"depth_threshold":16}"#).unwrap();
    assert_eq!(
        options,
        RopeOptions {
            lazy_substrings: false,
            depth_threshold: 16,
        }
    );
    assert_eq!(
        serde_json::to_string(&ConversionResult::SourceBufferEmpty).unwrap(),
        r#""SourceBufferEmpty""#
    );
}
