//! Markdown rendering.
//!
//! Structural output only: the renderer emits one canonical spelling per
//! construct regardless of how the source was written, except where a node
//! records its own marker (list bullets, fence characters). Reference-style
//! links collect into a trailer of definitions after the body.

use marktree_ast::{Depth, NodeId, NodeKind, NodeType, Query, Tree};

/// Renders the whole tree back to markdown.
pub fn to_markdown(tree: &Tree) -> String {
    let body = render_node(tree, tree.root());
    let refs = reference_definitions(tree);
    if refs.is_empty() {
        return body;
    }
    let mut out = body;
    let trailing = out.chars().rev().take_while(|&c| c == '\n').count().min(2);
    for _ in trailing..2 {
        out.push('\n');
    }
    out.push_str(&refs.join("\n"));
    out
}

/// One `[label]: url` line per referenced link label. A label used twice
/// keeps its first position but takes its last definition.
fn reference_definitions(tree: &Tree) -> Vec<String> {
    let query = Query::kind(NodeType::Link)
        .depth(Depth::Unbounded)
        .filter(|tree, id| {
            matches!(
                tree.kind(id),
                NodeKind::Link {
                    reference: Some(_),
                    ..
                }
            )
        });
    let mut defs: Vec<(String, String)> = Vec::new();
    for id in tree.find(tree.root(), &query) {
        let NodeKind::Link {
            url,
            reference: Some(label),
            title,
        } = tree.kind(id)
        else {
            continue;
        };
        let line = match title {
            Some(title) => format!("[{label}]: {url} \"{title}\""),
            None => format!("[{label}]: {url}"),
        };
        match defs.iter_mut().find(|(existing, _)| existing == label) {
            Some(existing) => existing.1 = line,
            None => defs.push((label.clone(), line)),
        }
    }
    defs.into_iter().map(|(_, line)| line).collect()
}

fn render_children(tree: &Tree, id: NodeId, separator: &str) -> String {
    tree.children(id)
        .map(|child| render_node(tree, child))
        .collect::<Vec<String>>()
        .join(separator)
}

fn render_node(tree: &Tree, id: NodeId) -> String {
    match tree.kind(id) {
        NodeKind::Fragment => {
            let block = tree.children(id).any(|child| tree.kind(child).is_block());
            render_children(tree, id, if block { "\n\n" } else { "" })
        }
        NodeKind::ThematicBreak { .. } => "---".to_string(),
        NodeKind::HtmlBlock { content } | NodeKind::HtmlInline { content } => content.clone(),
        NodeKind::Header { level } => {
            format!(
                "{} {}",
                "#".repeat(usize::from(*level)),
                render_children(tree, id, "")
            )
        }
        NodeKind::Paragraph => render_children(tree, id, ""),
        NodeKind::List { start } => render_list(tree, id, start.unwrap_or(1)),
        // Items are rendered by their list, which owns the marker.
        NodeKind::ListItem { .. } => render_children(tree, id, "\n"),
        NodeKind::BlockQuote => {
            let inner = render_children(tree, id, "\n");
            if inner.is_empty() {
                return ">".to_string();
            }
            inner
                .lines()
                .map(|line| format!("> {line}"))
                .collect::<Vec<String>>()
                .join("\n")
        }
        NodeKind::CodeBlock {
            infostring,
            fenced,
            fencechar,
        } => render_code_block(tree, id, infostring.as_deref(), *fenced, *fencechar),
        NodeKind::Text { content } => content.clone(),
        NodeKind::Strong => format!("**{}**", render_children(tree, id, "")),
        NodeKind::Emphasis => format!("*{}*", render_children(tree, id, "")),
        NodeKind::Strike => format!("~~{}~~", render_children(tree, id, "")),
        NodeKind::Link {
            url,
            reference,
            title,
        } => {
            if reference.is_none() && is_autolink(tree, id, url) {
                return format!("<{url}>");
            }
            let text = render_children(tree, id, "");
            match (reference, title) {
                (Some(label), _) => format!("[{text}][{label}]"),
                (None, Some(title)) => format!("[{text}]({url} \"{title}\")"),
                (None, None) => format!("[{text}]({url})"),
            }
        }
        NodeKind::Image {
            url,
            reference,
            title,
        } => {
            let text = render_children(tree, id, "");
            match (reference, title) {
                (Some(label), _) => format!("![{text}][{label}]"),
                (None, Some(title)) => format!("![{text}]({url} \"{title}\")"),
                (None, None) => format!("![{text}]({url})"),
            }
        }
        NodeKind::InlineCode { content } => {
            let ticks = "`".repeat(longest_run(content, '`') + 1);
            format!("{ticks}{content}{ticks}")
        }
        NodeKind::SoftBreak => "\n".to_string(),
    }
}

/// A link whose visible text is exactly its destination.
fn is_autolink(tree: &Tree, id: NodeId, url: &str) -> bool {
    let Some(only) = tree.first_child(id) else {
        return false;
    };
    if tree.next_sibling(only).is_some() {
        return false;
    }
    matches!(tree.kind(only), NodeKind::Text { content } if content == url)
}

fn render_list(tree: &Tree, id: NodeId, start: u64) -> String {
    let mut index = start;
    let mut items: Vec<String> = Vec::new();
    for item in tree.children(id) {
        let current = index;
        // Every item advances the numbering, rendered or not.
        index += 1;
        let body = render_node(tree, item);
        if body.is_empty() {
            continue;
        }
        let marker = match tree.kind(item) {
            NodeKind::ListItem { bullet: '.' } => format!("{current}."),
            NodeKind::ListItem { bullet } => bullet.to_string(),
            _ => continue,
        };
        let indent = " ".repeat(marker.len() + 1);
        let mut lines = body.lines();
        let mut rendered = match lines.next() {
            Some(first) => format!("{marker} {first}"),
            None => continue,
        };
        for line in lines {
            rendered.push('\n');
            if !line.is_empty() {
                rendered.push_str(&indent);
            }
            rendered.push_str(line);
        }
        items.push(rendered);
    }
    items.join("\n")
}

fn render_code_block(
    tree: &Tree,
    id: NodeId,
    infostring: Option<&str>,
    fenced: bool,
    fencechar: char,
) -> String {
    let content = tree
        .children(id)
        .find_map(|child| match tree.kind(child) {
            NodeKind::Text { content } => Some(content.as_str()),
            _ => None,
        })
        .unwrap_or("");
    if fenced || infostring.is_some() {
        let fence = fencechar.to_string().repeat(3);
        // Some tokenizers include the final newline before the closing
        // fence. Others don't.
        let newline = if content.ends_with('\n') || content.is_empty() {
            ""
        } else {
            "\n"
        };
        format!(
            "{fence}{}\n{content}{newline}{fence}",
            infostring.unwrap_or("")
        )
    } else {
        content
            .lines()
            .map(|line| format!("    {line}"))
            .collect::<Vec<String>>()
            .join("\n")
    }
}

fn longest_run(content: &str, target: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in content.chars() {
        if c == target {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
