use crate::{Encoding, Rope, RopeEngine, debug_tree};

#[test]
fn concat_over_lazy_substring() {
    let engine = RopeEngine::default();
    let world = engine.substring(&Rope::from("hello world"), 6, 5).unwrap();
    let rope = engine.concat(&Rope::from("hi "), &world, Encoding::UTF_8).unwrap();

    insta::assert_snapshot!(debug_tree(&rope, true), @r#"
    "hi world" Concat(BN: true, BL: 8, CL: 8, CR: 7BIT, D: 1, B: true)
    |  "hi " AsciiOnlyLeaf(BN: false, BL: 3, CL: 3, CR: 7BIT, D: 0)
    |  "world" Substring(BN: true, BL: 5, CL: 5, CR: 7BIT, D: 0, O: 6)
    |  |  "hello world" AsciiOnlyLeaf(BN: false, BL: 11, CL: 11, CR: 7BIT, D: 0)
    "#);

    // Printing the content materialized every node.
    assert!(!rope.is_bytes_absent());
    assert!(!world.is_bytes_absent());
}

#[test]
fn skipped_content_leaves_nodes_unmaterialized() {
    let engine = RopeEngine::default();
    let rope = engine.repeat(&Rope::from("ab"), 3).unwrap();

    insta::assert_snapshot!(debug_tree(&rope, false), @r"
    <skipped> Repeating(BN: true, BL: 6, CL: 6, CR: 7BIT, D: 1, T: 3)
    |  <skipped> AsciiOnlyLeaf(BN: false, BL: 2, CL: 2, CR: 7BIT, D: 0)
    ");
    assert!(rope.is_bytes_absent());
}

#[test]
fn broken_leaves_report_their_code_range() {
    let rope = Rope::from("ok");
    let broken = crate::make_leaf(&b"\xFFok"[..], Encoding::UTF_8, crate::CodeRange::Unknown, None);
    let joined = RopeEngine::default().concat(&rope, &broken, Encoding::UTF_8).unwrap();

    insta::assert_snapshot!(
        debug_tree(&joined, true),
        @r#""ok\xFFok" InvalidLeaf(BN: false, BL: 5, CL: 5, CR: BROKEN, D: 0)"#
    );
}
