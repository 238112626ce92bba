//! End-to-end parse tests.
//!
//! Documents go through the full pipeline (tokenize, reconstruct, tidy) and
//! the resulting trees are snapshotted to catch unintended changes in shape
//! or line numbering.

use marktree_core::to_markdown;
use marktree_pulldown::parse;

#[test]
fn heading_and_list() {
    let tree = parse("# Title\n\n- one\n- two\n").unwrap();
    insta::assert_snapshot!(tree.pretty(), @r#"
    [0000]Fragment
    [0000]├─ Header(1)
    [0000]│  └─ Text("Title")
    [0002]└─ List
    [0002]   ├─ ListItem('-')
    [0002]   │  └─ Text("one")
    [0003]   └─ ListItem('-')
    [0003]      └─ Text("two")
    "#);
}

#[test]
fn blockquote_and_code() {
    let tree = parse("> quote\n\n```sh\nls\n```\n").unwrap();
    insta::assert_snapshot!(tree.pretty(), @r#"
    [0000]Fragment
    [0000]├─ BlockQuote
    [0000]│  └─ Paragraph
    [0000]│     └─ Text("quote")
    [0002]└─ CodeBlock(fenced, "sh")
    [0002]   └─ Text("ls\n")
    "#);
}

#[test]
fn round_trip_composite_document() {
    let source = "# Notes\n\nSome *text* with `code`.\n\n- first\n- second";
    let tree = parse(source).unwrap();
    insta::assert_snapshot!(to_markdown(&tree), @r"
    # Notes

    Some *text* with `code`.

    - first
    - second
    ");
}

#[test]
fn round_trip_reference_links() {
    let source = "See [the docs][docs] for details.\n\n[docs]: https://example.com/docs";
    let tree = parse(source).unwrap();
    assert_eq!(to_markdown(&tree), source);
}
