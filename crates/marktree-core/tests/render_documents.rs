//! Pipeline tests: event stream in, rendered document out.

use marktree_core::{reconstruct, to_json, to_markdown, Event, JsonOptions, NodeKind, Tree};

#[test]
fn reconstructed_document_renders_as_markdown() {
    let events = vec![
        Event::open("heading_open").with_attrs(marktree_core::Attrs {
            level: Some(1),
            ..Default::default()
        }),
        Event::leaf("text").with_content("Changelog"),
        Event::close("heading_open"),
        Event::open("bullet_list_open"),
        Event::open("list_item_open").with_markup("-"),
        Event::leaf("text").with_content("Added parsing"),
        Event::close("list_item_open"),
        Event::open("list_item_open").with_markup("-"),
        Event::leaf("text").with_content("Fixed rendering"),
        Event::close("list_item_open"),
        Event::close("bullet_list_open"),
    ];
    let tree = reconstruct(events).unwrap();
    insta::assert_snapshot!(to_markdown(&tree), @r"
    # Changelog

    - Added parsing
    - Fixed rendering
    ");
}

#[test]
fn json_dump_of_link_paragraph() {
    let mut tree = Tree::new();
    let para = tree.paragraph();
    let link = tree
        .alloc(NodeKind::link("https://example.com", None, None))
        .unwrap();
    let text = tree.text("docs");
    tree.append(link, text).unwrap();
    tree.append(para, link).unwrap();
    tree.append(tree.root(), para).unwrap();

    insta::assert_snapshot!(
        to_json(&tree, &JsonOptions { pretty: false }),
        @r#"{"children":[{"children":[{"children":[{"content":"docs","type":"text"}],"reference":null,"title":null,"type":"link","url":"https://example.com"}],"type":"paragraph"}],"type":"fragment"}"#
    );
}
