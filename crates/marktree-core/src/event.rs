//! Flat parse events.
//!
//! Tokenizer backends describe a document as a linear stream of [`Event`]
//! values: openers (`nesting == 1`), closers (`nesting == -1`), and
//! self-contained leaves (`nesting == 0`). A leaf may instead carry nested
//! child events, which some tokenizers emit for inline runs.

/// Attributes a tokenizer attaches to an event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs {
    pub url: Option<String>,
    pub title: Option<String>,
    pub reference: Option<String>,
    pub level: Option<u8>,
    pub start: Option<u64>,
}

/// One token in a flat parse stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Backend token name, e.g. `"paragraph_open"` or `"fence"`.
    pub kind: String,
    /// 1 opens a container, -1 closes it, 0 is self-contained.
    pub nesting: i32,
    pub content: Option<String>,
    /// The literal marker the token was written with, e.g. a fence string.
    pub markup: Option<String>,
    pub info: Option<String>,
    pub attrs: Attrs,
    /// Zero-based source line span, inclusive start and exclusive end.
    pub lines: Option<(u32, u32)>,
    pub children: Vec<Event>,
}

impl Event {
    fn new(kind: impl Into<String>, nesting: i32) -> Self {
        Event {
            kind: kind.into(),
            nesting,
            content: None,
            markup: None,
            info: None,
            attrs: Attrs::default(),
            lines: None,
            children: Vec::new(),
        }
    }

    pub fn open(kind: impl Into<String>) -> Self {
        Event::new(kind, 1)
    }

    pub fn close(kind: impl Into<String>) -> Self {
        Event::new(kind, -1)
    }

    pub fn leaf(kind: impl Into<String>) -> Self {
        Event::new(kind, 0)
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = Some(markup.into());
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_lines(mut self, start: u32, end: u32) -> Self {
        self.lines = Some((start, end));
        self
    }

    pub fn with_children(mut self, children: Vec<Event>) -> Self {
        self.children = children;
        self
    }
}
