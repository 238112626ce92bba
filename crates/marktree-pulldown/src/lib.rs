//! marktree-pulldown: CommonMark tokenizer backend
//!
//! Wraps [`pulldown_cmark`] and lowers its pull events into the flat event
//! stream that `marktree-core` reconstructs trees from. Strikethrough is the
//! only extension enabled; unsupported constructs surface as reconstruction
//! errors rather than silently dropping content.

use marktree_core::reconstruct::{reconstruct, ReconstructError};
use marktree_core::{Attrs, Event, Tree};
use pulldown_cmark::{
    CodeBlockKind, Event as CmEvent, LinkType, Options, Parser, Tag, TagEnd,
};

/// Parses markdown into a tidied document tree with line numbers.
pub fn parse(source: &str) -> Result<Tree, ReconstructError> {
    reconstruct(tokenize(source))
}

/// Maps byte offsets to zero-based line numbers.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                starts.push(offset + 1);
            }
        }
        LineIndex { starts }
    }

    fn line_of(&self, offset: usize) -> u32 {
        (self.starts.partition_point(|&start| start <= offset) - 1) as u32
    }
}

/// Content of a code block being buffered between its open and close tags.
struct PendingCode {
    info: Option<String>,
    fenced: bool,
    line: u32,
    content: String,
}

/// Tokenizes markdown into the backend-neutral flat event stream.
pub fn tokenize(source: &str) -> Vec<Event> {
    let index = LineIndex::new(source);
    let mut events: Vec<Event> = Vec::new();
    // Tracks whether each open list is ordered, to pick item bullets.
    let mut ordered: Vec<bool> = Vec::new();
    let mut code: Option<PendingCode> = None;
    let mut html: Option<(u32, String)> = None;

    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH);
    for (event, range) in parser.into_offset_iter() {
        let line = index.line_of(range.start);
        let end_line = index.line_of(range.end.saturating_sub(1).max(range.start)) + 1;
        let span = |event: Event| event.with_lines(line, end_line);

        match event {
            CmEvent::Start(tag) => match tag {
                Tag::Paragraph => events.push(span(Event::open("paragraph_open"))),
                Tag::Heading { level, .. } => events.push(span(
                    Event::open("heading_open").with_attrs(Attrs {
                        level: Some(level as u8),
                        ..Attrs::default()
                    }),
                )),
                Tag::BlockQuote(_) => events.push(span(Event::open("blockquote_open"))),
                Tag::CodeBlock(kind) => {
                    let (info, fenced) = match kind {
                        CodeBlockKind::Fenced(info) => (Some(info.to_string()), true),
                        CodeBlockKind::Indented => (None, false),
                    };
                    code = Some(PendingCode {
                        info,
                        fenced,
                        line,
                        content: String::new(),
                    });
                }
                Tag::List(start) => {
                    ordered.push(start.is_some());
                    let event = match start {
                        Some(start) => Event::open("ordered_list_open").with_attrs(Attrs {
                            start: Some(start),
                            ..Attrs::default()
                        }),
                        None => Event::open("bullet_list_open"),
                    };
                    events.push(span(event));
                }
                Tag::Item => {
                    let bullet = if ordered.last().copied().unwrap_or(false) {
                        "."
                    } else {
                        "-"
                    };
                    events.push(span(Event::open("list_item_open").with_markup(bullet)));
                }
                Tag::Emphasis => events.push(Event::open("em_open")),
                Tag::Strong => events.push(Event::open("strong_open")),
                Tag::Strikethrough => events.push(Event::open("s_open")),
                Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                } => events.push(span(
                    Event::open("link_open").with_attrs(link_attrs(link_type, &dest_url, &title, &id)),
                )),
                Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                } => events.push(span(
                    Event::open("image").with_attrs(link_attrs(link_type, &dest_url, &title, &id)),
                )),
                Tag::HtmlBlock => html = Some((line, String::new())),
                _ => events.push(span(Event::open("unsupported"))),
            },
            CmEvent::End(end) => match end {
                TagEnd::CodeBlock => {
                    if let Some(pending) = code.take() {
                        let kind = if pending.fenced { "fence" } else { "code_block" };
                        let mut event = Event::leaf(kind)
                            .with_content(pending.content)
                            .with_lines(pending.line, end_line);
                        if pending.fenced {
                            event = event.with_markup("```");
                            if let Some(info) = pending.info {
                                event = event.with_info(info);
                            }
                        }
                        events.push(event);
                    }
                }
                TagEnd::HtmlBlock => {
                    if let Some((start, content)) = html.take() {
                        events.push(
                            Event::leaf("html_block")
                                .with_content(content)
                                .with_lines(start, end_line),
                        );
                    }
                }
                TagEnd::Paragraph => events.push(Event::close("paragraph_open")),
                TagEnd::Heading(_) => events.push(Event::close("heading_open")),
                TagEnd::BlockQuote(_) => events.push(Event::close("blockquote_open")),
                TagEnd::List(is_ordered) => {
                    ordered.pop();
                    let kind = if is_ordered {
                        "ordered_list_open"
                    } else {
                        "bullet_list_open"
                    };
                    events.push(Event::close(kind));
                }
                TagEnd::Item => events.push(Event::close("list_item_open")),
                TagEnd::Emphasis => events.push(Event::close("em_open")),
                TagEnd::Strong => events.push(Event::close("strong_open")),
                TagEnd::Strikethrough => events.push(Event::close("s_open")),
                TagEnd::Link => events.push(Event::close("link_open")),
                TagEnd::Image => events.push(Event::close("image")),
                _ => events.push(Event::close("unsupported")),
            },
            CmEvent::Text(text) => match (&mut code, &mut html) {
                (Some(pending), _) => pending.content.push_str(&text),
                (None, Some((_, content))) => content.push_str(&text),
                (None, None) => {
                    events.push(span(Event::leaf("text").with_content(text.to_string())));
                }
            },
            CmEvent::Code(content) => events.push(span(
                Event::leaf("code_inline").with_content(content.to_string()),
            )),
            CmEvent::Html(content) => match &mut html {
                Some((_, buffered)) => buffered.push_str(&content),
                None => events.push(span(
                    Event::leaf("html_block").with_content(content.to_string()),
                )),
            },
            CmEvent::InlineHtml(content) => events.push(span(
                Event::leaf("html_inline").with_content(content.to_string()),
            )),
            // The node set has no hard-break variant, so both break kinds
            // fold into softbreak and re-render as a plain newline.
            CmEvent::SoftBreak | CmEvent::HardBreak => {
                events.push(span(Event::leaf("softbreak")));
            }
            CmEvent::Rule => events.push(span(Event::leaf("hr").with_markup("-"))),
            _ => events.push(span(Event::leaf("unsupported"))),
        }
    }
    events
}

fn link_attrs(link_type: LinkType, url: &str, title: &str, id: &str) -> Attrs {
    let reference = match link_type {
        LinkType::Reference | LinkType::Collapsed | LinkType::Shortcut if !id.is_empty() => {
            Some(id.to_string())
        }
        _ => None,
    };
    Attrs {
        url: Some(url.to_string()),
        title: (!title.is_empty()).then(|| title.to_string()),
        reference,
        ..Attrs::default()
    }
}

#[cfg(test)]
mod tests {
    use marktree_core::{to_markdown, NodeKind, NodeType};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_tokenize_heading() {
        let events = tokenize("# Hi");
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].kind, "heading_open");
        assert_eq!(events[0].attrs.level, Some(1));
        assert_eq!(events[0].lines, Some((0, 1)));
        assert_eq!(events[1].kind, "text");
        assert_eq!(events[1].content.as_deref(), Some("Hi"));
        assert_eq!(events[2].nesting, -1);
    }

    #[test]
    fn test_tokenize_list_closer_names_match_openers() {
        let events = tokenize("- a");
        assert_eq!(events.first().map(|e| e.kind.as_str()), Some("bullet_list_open"));
        assert_eq!(events.last().map(|e| e.kind.as_str()), Some("bullet_list_open"));
        assert_eq!(events.last().map(|e| e.nesting), Some(-1));

        let events = tokenize("1. a");
        assert_eq!(events.first().map(|e| e.kind.as_str()), Some("ordered_list_open"));
        assert_eq!(events.last().map(|e| e.kind.as_str()), Some("ordered_list_open"));
    }

    #[test]
    fn test_parse_hard_break_folds_to_softbreak() {
        let tree = parse("one  \ntwo").unwrap();
        let para = tree.first_child(tree.root()).unwrap();
        let kinds: Vec<_> = tree
            .children(para)
            .map(|id| tree.node_type(id))
            .collect();
        assert_eq!(
            kinds,
            vec![NodeType::Text, NodeType::SoftBreak, NodeType::Text]
        );
    }

    #[test]
    fn test_parse_paragraphs_with_lines() {
        let tree = parse("one\n\ntwo").unwrap();
        let paragraphs: Vec<_> = tree.children(tree.root()).collect();
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(tree.line(paragraphs[0]), Some(0));
        assert_eq!(tree.line(paragraphs[1]), Some(2));
    }

    #[test]
    fn test_parse_tight_list() {
        let tree = parse("- one\n- two").unwrap();
        let list = tree.first_child(tree.root()).unwrap();
        assert_eq!(tree.kind(list), &NodeKind::list(None));
        let item = tree.first_child(list).unwrap();
        assert_eq!(tree.kind(item), &NodeKind::list_item('-').unwrap());
        // Tight list items hold their text directly, with no paragraph.
        assert_eq!(
            tree.kind(tree.first_child(item).unwrap()),
            &NodeKind::text("one")
        );
    }

    #[test]
    fn test_parse_ordered_list_start() {
        let tree = parse("2. item1\n3. item2").unwrap();
        let list = tree.first_child(tree.root()).unwrap();
        assert_eq!(tree.kind(list), &NodeKind::list(Some(2)));
        let item = tree.first_child(list).unwrap();
        assert_eq!(tree.kind(item), &NodeKind::list_item('.').unwrap());
    }

    #[test]
    fn test_parse_fenced_code() {
        let tree = parse("```rust\nlet x = 1;\n```").unwrap();
        let block = tree.first_child(tree.root()).unwrap();
        assert_eq!(
            tree.kind(block),
            &NodeKind::code_block(Some("rust".to_string()), Some(true), '`').unwrap()
        );
        assert_eq!(
            tree.kind(tree.first_child(block).unwrap()),
            &NodeKind::text("let x = 1;\n")
        );
    }

    #[test]
    fn test_parse_indented_code() {
        let tree = parse("    let x = 1;\n").unwrap();
        let block = tree.first_child(tree.root()).unwrap();
        assert_eq!(
            tree.kind(block),
            &NodeKind::code_block(None, Some(false), '`').unwrap()
        );
    }

    #[test]
    fn test_parse_blockquote() {
        let tree = parse("> quoted").unwrap();
        let quote = tree.first_child(tree.root()).unwrap();
        assert_eq!(tree.node_type(quote), NodeType::BlockQuote);
        let para = tree.first_child(quote).unwrap();
        assert_eq!(tree.node_type(para), NodeType::Paragraph);
    }

    #[test]
    fn test_parse_strikethrough() {
        let tree = parse("~~gone~~").unwrap();
        let para = tree.first_child(tree.root()).unwrap();
        let strike = tree.first_child(para).unwrap();
        assert_eq!(tree.node_type(strike), NodeType::Strike);
    }

    #[test]
    fn test_parse_reference_link() {
        let tree = parse("[example][ex]\n\n[ex]: https://example.com").unwrap();
        let para = tree.first_child(tree.root()).unwrap();
        let link = tree.first_child(para).unwrap();
        assert_eq!(
            tree.kind(link),
            &NodeKind::link("https://example.com", Some("ex".to_string()), None)
        );
    }

    #[test]
    fn test_parse_inline_link_has_no_reference() {
        let tree = parse("[example](https://example.com)").unwrap();
        let para = tree.first_child(tree.root()).unwrap();
        let link = tree.first_child(para).unwrap();
        assert_eq!(
            tree.kind(link),
            &NodeKind::link("https://example.com", None, None)
        );
    }

    #[test]
    fn test_parse_thematic_break() {
        let tree = parse("---").unwrap();
        let hr = tree.first_child(tree.root()).unwrap();
        assert_eq!(tree.node_type(hr), NodeType::ThematicBreak);
    }

    #[test]
    fn test_parse_html_block() {
        let tree = parse("<div>\nraw\n</div>\n").unwrap();
        let block = tree.first_child(tree.root()).unwrap();
        assert_eq!(tree.kind(block), &NodeKind::html_block("<div>\nraw\n</div>\n"));
    }

    #[test]
    fn test_round_trip_minimal_document() {
        let source = "# Hello World!\n\nThis is a minimal test document.";
        let tree = parse(source).unwrap();
        assert_eq!(to_markdown(&tree), source);
    }

    #[test]
    fn test_round_trip_emphasis() {
        let source = "**bold** and *lean* and ~~struck~~";
        let tree = parse(source).unwrap();
        assert_eq!(to_markdown(&tree), source);
    }

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_of(0), 0);
        assert_eq!(index.line_of(2), 0);
        assert_eq!(index.line_of(3), 1);
        assert_eq!(index.line_of(6), 2);
        assert_eq!(index.line_of(7), 3);
    }
}
