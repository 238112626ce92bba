//! Plain-text extraction, e.g. for spell checking or word counts.

use marktree_ast::{NodeId, NodeKind, Tree};

/// Options for [`to_text`].
#[derive(Debug, Clone, Copy)]
pub struct TextOptions {
    /// Skip the contents of code blocks.
    pub ignore_code_blocks: bool,
    /// Skip inline code spans.
    pub ignore_inline_code: bool,
    /// Replace punctuation with whitespace before collapsing.
    pub strip_punctuation: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        TextOptions {
            ignore_code_blocks: true,
            ignore_inline_code: true,
            strip_punctuation: true,
        }
    }
}

/// Collects the human-readable text of the tree as one whitespace-separated
/// line.
pub fn to_text(tree: &Tree, options: &TextOptions) -> String {
    let mut pieces: Vec<String> = Vec::new();
    collect(tree, tree.root(), options, &mut pieces);
    let joined = pieces.join(" ");
    joined.split_whitespace().collect::<Vec<&str>>().join(" ")
}

fn collect(tree: &Tree, id: NodeId, options: &TextOptions, out: &mut Vec<String>) {
    match tree.kind(id) {
        NodeKind::CodeBlock { .. } if options.ignore_code_blocks => return,
        NodeKind::Text { content } => out.push(clean(content, options)),
        NodeKind::InlineCode { content } => {
            if !options.ignore_inline_code {
                out.push(clean(content, options));
            }
        }
        _ => {}
    }
    for child in tree.children(id) {
        collect(tree, child, options, out);
    }
}

fn clean(content: &str, options: &TextOptions) -> String {
    if !options.strip_punctuation {
        return content.to_string();
    }
    content
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect()
}
