//! JSON dumps of the tree structure.

use marktree_ast::{NodeId, NodeKind, Tree};
use serde_json::{json, Map, Value};

/// Options for [`to_json`].
#[derive(Debug, Clone, Copy)]
pub struct JsonOptions {
    pub pretty: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        JsonOptions { pretty: true }
    }
}

/// Serializes the whole tree starting at its root.
pub fn to_json(tree: &Tree, options: &JsonOptions) -> String {
    let value = to_value(tree, tree.root());
    if options.pretty {
        format!("{value:#}")
    } else {
        value.to_string()
    }
}

/// One node as a JSON object: its type, variant fields, source line, and
/// children.
pub fn to_value(tree: &Tree, id: NodeId) -> Value {
    let mut object = Map::new();
    object.insert(
        "type".to_string(),
        json!(tree.node_type(id).name()),
    );
    match tree.kind(id) {
        NodeKind::ThematicBreak { char } => {
            object.insert("char".to_string(), json!(char));
        }
        NodeKind::HtmlBlock { content }
        | NodeKind::HtmlInline { content }
        | NodeKind::Text { content }
        | NodeKind::InlineCode { content } => {
            object.insert("content".to_string(), json!(content));
        }
        NodeKind::Header { level } => {
            object.insert("level".to_string(), json!(level));
        }
        NodeKind::List { start } => {
            object.insert("start".to_string(), json!(start));
        }
        NodeKind::ListItem { bullet } => {
            object.insert("bullet".to_string(), json!(bullet));
        }
        NodeKind::CodeBlock {
            infostring,
            fenced,
            fencechar,
        } => {
            object.insert("infostring".to_string(), json!(infostring));
            object.insert("fenced".to_string(), json!(fenced));
            object.insert("fencechar".to_string(), json!(fencechar));
        }
        NodeKind::Link {
            url,
            reference,
            title,
        }
        | NodeKind::Image {
            url,
            reference,
            title,
        } => {
            object.insert("url".to_string(), json!(url));
            object.insert("reference".to_string(), json!(reference));
            object.insert("title".to_string(), json!(title));
        }
        NodeKind::Fragment
        | NodeKind::Paragraph
        | NodeKind::BlockQuote
        | NodeKind::Strong
        | NodeKind::Emphasis
        | NodeKind::Strike
        | NodeKind::SoftBreak => {}
    }
    if let Some(line) = tree.line(id) {
        object.insert("line".to_string(), json!(line));
    }
    if tree.kind(id).is_container() {
        let children: Vec<Value> = tree
            .children(id)
            .map(|child| to_value(tree, child))
            .collect();
        object.insert("children".to_string(), Value::Array(children));
    }
    Value::Object(object)
}
