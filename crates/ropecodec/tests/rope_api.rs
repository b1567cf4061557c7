#![allow(missing_docs)]

use ropecodec::{
    CodeRange, EconvFlags, Encoding, EncodingError, Rope, RopeEngine, RopeError, RopeKind,
    RopeOptions, classify, make_leaf, negotiate, registry, transcode_rope,
};

#[test]
fn building_and_slicing_text() {
    let engine = RopeEngine::default();
    let greeting = engine
        .concat_compatible(&Rope::from("h\u{E9}llo"), &Rope::from(", world"))
        .unwrap();
    assert_eq!(greeting.code_range(), CodeRange::Valid);
    assert_eq!(greeting.character_length(), 12);
    assert!(matches!(greeting.kind(), RopeKind::Concat { balanced: true, .. }));

    let world = engine.substring(&greeting, 8, 5).unwrap();
    assert_eq!(world.to_string(), "world");
    assert_eq!(world.code_range(), CodeRange::SevenBit);

    let echo = engine.repeat(&world, 3).unwrap();
    assert_eq!(echo.to_vec(), b"worldworldworld");
    assert_eq!(echo.depth(), world.depth() + 1);

    assert_eq!(
        engine.substring(&greeting, 10, 5),
        Err(RopeError::SubstringOutOfBounds {
            offset: 10,
            length: 5,
            byte_length: 13,
        })
    );
}

#[test]
fn incompatible_content_does_not_concatenate() {
    let engine = RopeEngine::default();
    let latin1 = make_leaf(&b"caf\xE9"[..], Encoding::ISO_8859_1, CodeRange::Unknown, None);
    let utf8 = Rope::from("caf\u{E9}");
    assert_eq!(negotiate(&latin1, &utf8), None);
    assert_eq!(
        engine.concat_compatible(&latin1, &utf8),
        Err(RopeError::EncodingIncompatible {
            first: "ISO-8859-1",
            second: "UTF-8",
        })
    );

    let converted = transcode_rope(&latin1, Encoding::UTF_8, EconvFlags::empty()).unwrap();
    assert_eq!(converted, utf8);
    let joined = engine.concat_compatible(&converted, &utf8).unwrap();
    assert_eq!(joined.character_length(), 8);
}

#[test]
fn eager_substrings_copy_bytes() {
    let engine = RopeEngine::new(RopeOptions {
        lazy_substrings: false,
        ..RopeOptions::default()
    });
    let base = Rope::from("abcdefgh");
    let slice = engine.substring(&base, 2, 3).unwrap();
    assert_eq!(slice.kind_name(), "AsciiOnlyLeaf");
    assert_eq!(slice.to_vec(), b"cde");
}

#[test]
fn re_tagging_keeps_ascii_trees() {
    let engine = RopeEngine::default();
    let ascii = engine
        .concat(&Rope::from("ab"), &Rope::from("cd"), Encoding::UTF_8)
        .unwrap();
    let latin1 = engine.with_encoding(&ascii, Encoding::ISO_8859_1, CodeRange::Unknown);
    assert_eq!(latin1.kind_name(), "Concat");
    assert_eq!(latin1.encoding(), Encoding::ISO_8859_1);
    assert_eq!(latin1.code_range(), CodeRange::SevenBit);

    let utf16 = engine.with_encoding(&ascii, Encoding::UTF_16LE, CodeRange::Unknown);
    assert_eq!(utf16.kind_name(), "ValidLeaf");
    assert_eq!(utf16.character_length(), 2);
}

#[test]
fn classification_per_encoding() {
    let utf16 = classify(Encoding::UTF_16LE, b"a\0\x3D\xD8\x00\xDE");
    assert_eq!((utf16.code_range, utf16.character_length), (CodeRange::Valid, 2));

    let sjis = classify(Encoding::SHIFT_JIS, b"\x82\xA0a");
    assert_eq!((sjis.code_range, sjis.character_length), (CodeRange::Valid, 2));

    let binary = classify(Encoding::ASCII_8BIT, b"\xFF\xFE");
    assert_eq!((binary.code_range, binary.character_length), (CodeRange::Valid, 2));
}

#[test]
fn registry_names_and_aliases() {
    assert_eq!(registry::find("cp65001"), Ok(Encoding::UTF_8));
    assert_eq!(registry::lookup_by_name("binary"), Some(Encoding::ASCII_8BIT));
    assert_eq!(
        registry::find("no-such-encoding"),
        Err(EncodingError::UnknownEncoding("no-such-encoding".into()))
    );

    let before = registry::encoding_list_size();
    let replica = registry::replicate_encoding(Encoding::UTF_8, "UTF-8-TEST-REPLICA").unwrap();
    assert_eq!(registry::encoding_list_size(), before + 1);
    assert!(replica.is_ascii_compatible());
    assert_eq!(registry::lookup_by_index(replica.index()), Ok(replica));
    assert!(registry::encodings().contains(&replica));
    assert_eq!(
        registry::replicate_encoding(Encoding::UTF_8, "utf-8-test-replica"),
        Err(EncodingError::DuplicateName("utf-8-test-replica".into()))
    );

    let text = make_leaf(&b"ok"[..], replica, CodeRange::Unknown, None);
    assert_eq!(text.code_range(), CodeRange::SevenBit);
}
