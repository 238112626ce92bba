//! Rebuilding a document tree from a flat event stream.
//!
//! Openers and closers in the stream are matched with an explicit stack, so
//! arbitrarily deep documents never recurse. Each opener claims the events
//! up to its matching closer as an enclosed sub-stream, which is then
//! consumed with the new node as the insertion point.

use std::collections::VecDeque;

use marktree_ast::{AstError, NodeId, NodeKind, Tree};
use thiserror::Error;

use crate::event::Event;

#[derive(Debug, Error, PartialEq)]
pub enum ReconstructError {
    #[error("no node is implemented for token kind {0:?}")]
    Unimplemented(String),
    #[error("token {0:?} is missing its {1} attribute")]
    MissingAttr(String, &'static str),
    #[error("event stream has unbalanced open and close tokens")]
    UnbalancedStream,
    #[error(transparent)]
    Ast(#[from] AstError),
}

/// Rebuilds a tree from `events`, then tidies it and backfills locations.
pub fn reconstruct(events: Vec<Event>) -> Result<Tree, ReconstructError> {
    let mut tree = Tree::new();
    let mut points: Vec<NodeId> = vec![tree.root()];
    let mut queues: Vec<VecDeque<Event>> = vec![events.into()];

    while let Some(queue) = queues.last_mut() {
        let Some(mut event) = queue.pop_front() else {
            queues.pop();
            points.pop();
            continue;
        };
        if event.nesting < 0 {
            // A close with no matching open.
            return Err(ReconstructError::UnbalancedStream);
        }

        let mut enclosed: VecDeque<Event> = VecDeque::new();
        if event.nesting > 0 {
            // Claim everything up to the matching close, dropping the close
            // itself.
            let mut depth = 1;
            loop {
                let Some(inner) = queue.pop_front() else {
                    return Err(ReconstructError::UnbalancedStream);
                };
                depth += inner.nesting;
                if depth == 0 {
                    break;
                }
                enclosed.push_back(inner);
            }
        } else if !event.children.is_empty() {
            enclosed = std::mem::take(&mut event.children).into();
        }

        let node = build_node(&mut tree, &event)?;
        if let Some((start, _)) = event.lines {
            tree.set_line(node, Some(start));
        }
        let point = points.last().copied().ok_or(ReconstructError::UnbalancedStream)?;
        tree.append(point, node)?;

        if !enclosed.is_empty() {
            points.push(node);
            queues.push(enclosed);
        }
    }

    tree.tidy()?;
    tree.fix_missing_locations();
    Ok(tree)
}

fn build_node(tree: &mut Tree, event: &Event) -> Result<NodeId, ReconstructError> {
    let content = || event.content.clone().unwrap_or_default();
    let markup_char = |default: char| {
        event
            .markup
            .as_ref()
            .and_then(|markup| markup.chars().next())
            .unwrap_or(default)
    };

    let kind = match event.kind.as_str() {
        "heading_open" => {
            let level = event
                .attrs
                .level
                .ok_or_else(|| ReconstructError::MissingAttr(event.kind.clone(), "level"))?;
            NodeKind::header(level)?
        }
        "paragraph_open" => NodeKind::Paragraph,
        // Inline runs group under a transparent container; tidy dissolves it.
        "inline" => NodeKind::Fragment,
        "text" => NodeKind::text(content()),
        "code_block" => {
            let block = tree.alloc(NodeKind::code_block(None, Some(false), '`')?)?;
            let body = tree.text(content());
            tree.append(block, body)?;
            return Ok(block);
        }
        "fence" => {
            let info = event.info.clone().filter(|info| !info.is_empty());
            let block = tree.alloc(NodeKind::code_block(info, Some(true), markup_char('`'))?)?;
            let body = tree.text(content());
            tree.append(block, body)?;
            return Ok(block);
        }
        "blockquote_open" => NodeKind::BlockQuote,
        "softbreak" => NodeKind::SoftBreak,
        "hr" => NodeKind::thematic_break(markup_char('-'))?,
        "bullet_list_open" => NodeKind::list(None),
        "ordered_list_open" => NodeKind::list(Some(event.attrs.start.unwrap_or(1))),
        "list_item_open" => NodeKind::list_item(markup_char('-'))?,
        "html_block" => NodeKind::html_block(content()),
        "html_inline" => NodeKind::html_inline(content()),
        "code_inline" => NodeKind::inline_code(content()),
        "em_open" => NodeKind::Emphasis,
        "strong_open" => NodeKind::Strong,
        "s_open" => NodeKind::Strike,
        "link_open" => {
            let url = event
                .attrs
                .url
                .clone()
                .ok_or_else(|| ReconstructError::MissingAttr(event.kind.clone(), "url"))?;
            NodeKind::link(url, event.attrs.reference.clone(), event.attrs.title.clone())
        }
        "image" => {
            let url = event
                .attrs
                .url
                .clone()
                .ok_or_else(|| ReconstructError::MissingAttr(event.kind.clone(), "url"))?;
            NodeKind::image(url, event.attrs.reference.clone(), event.attrs.title.clone())
        }
        _ => return Err(ReconstructError::Unimplemented(event.kind.clone())),
    };
    Ok(tree.alloc(kind)?)
}
