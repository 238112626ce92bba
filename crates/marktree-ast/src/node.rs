//! Node variants and their classification rules.
//!
//! Every node in the tree carries a [`NodeKind`], a closed sum type over all
//! markdown constructs this crate models. Structural rules (which child
//! variants a parent accepts) live here as well, so every mutation site can
//! consult a single acceptance function.

use std::fmt;

use serde::Serialize;

use crate::error::AstError;

/// Discriminant-only view of a node variant.
///
/// Used by query filters and error messages, where the payload of the
/// variant does not matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Fragment,
    ThematicBreak,
    HtmlBlock,
    HtmlInline,
    Header,
    Paragraph,
    List,
    ListItem,
    BlockQuote,
    CodeBlock,
    Text,
    Strong,
    Emphasis,
    Strike,
    Link,
    Image,
    InlineCode,
    SoftBreak,
}

impl NodeType {
    /// Lowercase name of this variant, matching its serialized form.
    pub fn name(self) -> &'static str {
        match self {
            NodeType::Fragment => "fragment",
            NodeType::ThematicBreak => "thematicbreak",
            NodeType::HtmlBlock => "htmlblock",
            NodeType::HtmlInline => "htmlinline",
            NodeType::Header => "header",
            NodeType::Paragraph => "paragraph",
            NodeType::List => "list",
            NodeType::ListItem => "listitem",
            NodeType::BlockQuote => "blockquote",
            NodeType::CodeBlock => "codeblock",
            NodeType::Text => "text",
            NodeType::Strong => "strong",
            NodeType::Emphasis => "emphasis",
            NodeType::Strike => "strike",
            NodeType::Link => "link",
            NodeType::Image => "image",
            NodeType::InlineCode => "inlinecode",
            NodeType::SoftBreak => "softbreak",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a node participates in block or inline layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Block,
    Inline,
}

/// Whether a node can hold structured children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Leaf,
    Container,
}

/// A node variant together with its variant-specific fields.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A transparent grouping container with no rendering identity.
    Fragment,
    ThematicBreak {
        char: char,
    },
    HtmlBlock {
        content: String,
    },
    HtmlInline {
        content: String,
    },
    Header {
        level: u8,
    },
    Paragraph,
    List {
        start: Option<u64>,
    },
    /// A `.` bullet denotes a numbered item; `-`, `+`, and `*` are bullets.
    ListItem {
        bullet: char,
    },
    BlockQuote,
    CodeBlock {
        infostring: Option<String>,
        fenced: bool,
        fencechar: char,
    },
    Text {
        content: String,
    },
    Strong,
    Emphasis,
    Strike,
    Link {
        url: String,
        reference: Option<String>,
        title: Option<String>,
    },
    Image {
        url: String,
        reference: Option<String>,
        title: Option<String>,
    },
    InlineCode {
        content: String,
    },
    SoftBreak,
}

impl NodeKind {
    /// Header at the given level (1 to 6).
    pub fn header(level: u8) -> Result<Self, AstError> {
        if !(1..=6).contains(&level) {
            return Err(AstError::HeaderLevel(level));
        }
        Ok(NodeKind::Header { level })
    }

    /// Thematic break drawn with `-`, `_`, or `*`.
    pub fn thematic_break(char: char) -> Result<Self, AstError> {
        if !matches!(char, '-' | '_' | '*') {
            return Err(AstError::InvalidBreakChar(char));
        }
        Ok(NodeKind::ThematicBreak { char })
    }

    /// List item with the given bullet; `.` marks a numbered item.
    pub fn list_item(bullet: char) -> Result<Self, AstError> {
        if !matches!(bullet, '-' | '+' | '*' | '.') {
            return Err(AstError::InvalidBullet(bullet));
        }
        Ok(NodeKind::ListItem { bullet })
    }

    /// Code block; `fenced` defaults to true only when an infostring is given.
    pub fn code_block(
        infostring: Option<String>,
        fenced: Option<bool>,
        fencechar: char,
    ) -> Result<Self, AstError> {
        if !matches!(fencechar, '`' | '~') {
            return Err(AstError::InvalidFenceChar(fencechar));
        }
        let fenced = fenced.unwrap_or(infostring.is_some());
        Ok(NodeKind::CodeBlock {
            infostring,
            fenced,
            fencechar,
        })
    }

    pub fn text(content: impl Into<String>) -> Self {
        NodeKind::Text {
            content: content.into(),
        }
    }

    pub fn html_block(content: impl Into<String>) -> Self {
        NodeKind::HtmlBlock {
            content: content.into(),
        }
    }

    pub fn html_inline(content: impl Into<String>) -> Self {
        NodeKind::HtmlInline {
            content: content.into(),
        }
    }

    pub fn inline_code(content: impl Into<String>) -> Self {
        NodeKind::InlineCode {
            content: content.into(),
        }
    }

    pub fn list(start: Option<u64>) -> Self {
        NodeKind::List { start }
    }

    pub fn link(
        url: impl Into<String>,
        reference: Option<String>,
        title: Option<String>,
    ) -> Self {
        NodeKind::Link {
            url: url.into(),
            reference,
            title,
        }
    }

    pub fn image(
        url: impl Into<String>,
        reference: Option<String>,
        title: Option<String>,
    ) -> Self {
        NodeKind::Image {
            url: url.into(),
            reference,
            title,
        }
    }

    /// The discriminant of this variant.
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Fragment => NodeType::Fragment,
            NodeKind::ThematicBreak { .. } => NodeType::ThematicBreak,
            NodeKind::HtmlBlock { .. } => NodeType::HtmlBlock,
            NodeKind::HtmlInline { .. } => NodeType::HtmlInline,
            NodeKind::Header { .. } => NodeType::Header,
            NodeKind::Paragraph => NodeType::Paragraph,
            NodeKind::List { .. } => NodeType::List,
            NodeKind::ListItem { .. } => NodeType::ListItem,
            NodeKind::BlockQuote => NodeType::BlockQuote,
            NodeKind::CodeBlock { .. } => NodeType::CodeBlock,
            NodeKind::Text { .. } => NodeType::Text,
            NodeKind::Strong => NodeType::Strong,
            NodeKind::Emphasis => NodeType::Emphasis,
            NodeKind::Strike => NodeType::Strike,
            NodeKind::Link { .. } => NodeType::Link,
            NodeKind::Image { .. } => NodeType::Image,
            NodeKind::InlineCode { .. } => NodeType::InlineCode,
            NodeKind::SoftBreak => NodeType::SoftBreak,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            NodeKind::Fragment
            | NodeKind::ThematicBreak { .. }
            | NodeKind::HtmlBlock { .. }
            | NodeKind::Header { .. }
            | NodeKind::Paragraph
            | NodeKind::List { .. }
            | NodeKind::ListItem { .. }
            | NodeKind::BlockQuote
            | NodeKind::CodeBlock { .. } => Role::Block,
            NodeKind::HtmlInline { .. }
            | NodeKind::Text { .. }
            | NodeKind::Strong
            | NodeKind::Emphasis
            | NodeKind::Strike
            | NodeKind::Link { .. }
            | NodeKind::Image { .. }
            | NodeKind::InlineCode { .. }
            | NodeKind::SoftBreak => Role::Inline,
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            NodeKind::ThematicBreak { .. }
            | NodeKind::HtmlBlock { .. }
            | NodeKind::HtmlInline { .. }
            | NodeKind::Text { .. }
            | NodeKind::InlineCode { .. }
            | NodeKind::SoftBreak => Shape::Leaf,
            _ => Shape::Container,
        }
    }

    pub fn is_block(&self) -> bool {
        self.role() == Role::Block
    }

    pub fn is_inline(&self) -> bool {
        self.role() == Role::Inline
    }

    pub fn is_leaf(&self) -> bool {
        self.shape() == Shape::Leaf
    }

    pub fn is_container(&self) -> bool {
        self.shape() == Shape::Container
    }

    /// Returns true if `child` may be attached directly under this node.
    ///
    /// Zero children are always allowed; this rule is consulted only when a
    /// child is actually attached.
    pub fn accepts(&self, child: &NodeKind) -> bool {
        match self {
            // Inline leaves hold their payload in a field, never as children.
            NodeKind::Text { .. }
            | NodeKind::SoftBreak
            | NodeKind::InlineCode { .. }
            | NodeKind::HtmlInline { .. } => false,
            NodeKind::List { .. } => matches!(child, NodeKind::ListItem { .. }),
            NodeKind::CodeBlock { .. } => matches!(child, NodeKind::Text { .. }),
            // Block leaves accept inline content only.
            NodeKind::ThematicBreak { .. } | NodeKind::HtmlBlock { .. } => child.is_inline(),
            _ => true,
        }
    }

    /// Re-checks the variant-specific field constraints.
    ///
    /// The validated constructors make invalid values unrepresentable through
    /// the public surface, but the enum fields themselves are open; the tree
    /// calls this when a kind is allocated.
    pub fn validate(&self) -> Result<(), AstError> {
        match self {
            NodeKind::Header { level } if !(1..=6).contains(level) => {
                Err(AstError::HeaderLevel(*level))
            }
            NodeKind::ThematicBreak { char } if !matches!(char, '-' | '_' | '*') => {
                Err(AstError::InvalidBreakChar(*char))
            }
            NodeKind::ListItem { bullet } if !matches!(bullet, '-' | '+' | '*' | '.') => {
                Err(AstError::InvalidBullet(*bullet))
            }
            NodeKind::CodeBlock { fencechar, .. } if !matches!(fencechar, '`' | '~') => {
                Err(AstError::InvalidFenceChar(*fencechar))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Fragment => write!(f, "Fragment"),
            NodeKind::ThematicBreak { char } => write!(f, "ThematicBreak({char:?})"),
            NodeKind::HtmlBlock { content } => {
                write!(f, "HtmlBlock({} characters)", content.len())
            }
            NodeKind::HtmlInline { content } => {
                write!(f, "HtmlInline({} characters)", content.len())
            }
            NodeKind::Header { level } => write!(f, "Header({level})"),
            NodeKind::Paragraph => write!(f, "Paragraph"),
            NodeKind::List { start: Some(start) } => write!(f, "List(start={start})"),
            NodeKind::List { start: None } => write!(f, "List"),
            NodeKind::ListItem { bullet } => write!(f, "ListItem({bullet:?})"),
            NodeKind::BlockQuote => write!(f, "BlockQuote"),
            NodeKind::CodeBlock {
                infostring,
                fenced,
                ..
            } => {
                let style = if *fenced { "fenced" } else { "indented" };
                match infostring {
                    Some(info) => write!(f, "CodeBlock({style}, {info:?})"),
                    None => write!(f, "CodeBlock({style})"),
                }
            }
            NodeKind::Text { content } => write!(f, "Text({content:?})"),
            NodeKind::Strong => write!(f, "Strong"),
            NodeKind::Emphasis => write!(f, "Emphasis"),
            NodeKind::Strike => write!(f, "Strike"),
            NodeKind::Link { url, .. } => write!(f, "Link({url:?})"),
            NodeKind::Image { url, .. } => write!(f, "Image({url:?})"),
            NodeKind::InlineCode { content } => write!(f, "InlineCode({content:?})"),
            NodeKind::SoftBreak => write!(f, "SoftBreak"),
        }
    }
}
