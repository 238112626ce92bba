//! Arena-backed document tree.
//!
//! Nodes live in a flat slot vector and refer to each other by [`NodeId`],
//! so sibling and parent links are plain indices and every splice operation
//! is O(1). A tree always has a [`NodeKind::Fragment`] root.

use std::fmt::Write as _;

use crate::error::AstError;
use crate::node::{NodeKind, NodeType};
use crate::query::Query;

/// Index of a node inside its [`Tree`].
///
/// Ids are never reused; an unlinked node keeps its id and can be attached
/// again elsewhere in the same tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct Slot {
    kind: NodeKind,
    line: Option<u32>,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

impl Slot {
    fn new(kind: NodeKind) -> Self {
        Slot {
            kind,
            line: None,
            parent: None,
            first_child: None,
            last_child: None,
            prev: None,
            next: None,
        }
    }
}

/// A mutable markdown document tree.
#[derive(Debug, Clone)]
pub struct Tree {
    slots: Vec<Slot>,
    root: NodeId,
}

impl Tree {
    /// An empty tree holding only a `Fragment` root.
    pub fn new() -> Self {
        Tree {
            slots: vec![Slot::new(NodeKind::Fragment)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Allocates a detached node, validating its field constraints.
    pub fn alloc(&mut self, kind: NodeKind) -> Result<NodeId, AstError> {
        kind.validate()?;
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Slot::new(kind));
        Ok(id)
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.slots[id.index()].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.slots[id.index()].kind
    }

    pub fn node_type(&self, id: NodeId) -> NodeType {
        self.kind(id).node_type()
    }

    /// Zero-based source line, when known.
    pub fn line(&self, id: NodeId) -> Option<u32> {
        self.slots[id.index()].line
    }

    pub fn set_line(&mut self, id: NodeId, line: Option<u32>) {
        self.slots[id.index()].line = line;
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.index()].parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.index()].first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.index()].last_child
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.index()].prev
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.index()].next
    }

    /// Iterates the direct children of `id` in order.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.first_child(id),
        }
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// Iterates the subtree below `id` in depth-first pre-order, excluding
    /// `id` itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).collect();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    fn check_attachable(&self, parent: NodeId, child: NodeId) -> Result<(), AstError> {
        let slot = &self.slots[child.index()];
        if slot.parent.is_some() || slot.prev.is_some() || slot.next.is_some() {
            return Err(AstError::AlreadyAttached);
        }
        if !self.kind(parent).accepts(self.kind(child)) {
            return Err(AstError::InvalidChild {
                parent: self.node_type(parent),
                child: self.node_type(child),
            });
        }
        // Walk up from the parent; finding the child means a cycle.
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(AstError::WouldCycle);
            }
            cursor = self.parent(id);
        }
        Ok(())
    }

    /// Attaches a detached node as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), AstError> {
        self.check_attachable(parent, child)?;
        match self.slots[parent.index()].last_child {
            Some(last) => {
                self.slots[last.index()].next = Some(child);
                self.slots[child.index()].prev = Some(last);
            }
            None => self.slots[parent.index()].first_child = Some(child),
        }
        self.slots[parent.index()].last_child = Some(child);
        self.slots[child.index()].parent = Some(parent);
        Ok(())
    }

    /// Appends each node in turn; stops at the first failure.
    pub fn extend(
        &mut self,
        parent: NodeId,
        children: impl IntoIterator<Item = NodeId>,
    ) -> Result<(), AstError> {
        for child in children {
            self.append(parent, child)?;
        }
        Ok(())
    }

    /// Detaches `id` from its parent and siblings; its subtree stays intact.
    pub fn unlink(&mut self, id: NodeId) {
        let slot = &self.slots[id.index()];
        let (parent, prev, next) = (slot.parent, slot.prev, slot.next);
        match prev {
            Some(prev) => self.slots[prev.index()].next = next,
            None => {
                if let Some(parent) = parent {
                    self.slots[parent.index()].first_child = next;
                }
            }
        }
        match next {
            Some(next) => self.slots[next.index()].prev = prev,
            None => {
                if let Some(parent) = parent {
                    self.slots[parent.index()].last_child = prev;
                }
            }
        }
        let slot = &mut self.slots[id.index()];
        slot.parent = None;
        slot.prev = None;
        slot.next = None;
    }

    /// Swaps `old` out of its position and puts the detached `new` there.
    ///
    /// `old` is left detached with its subtree intact.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<(), AstError> {
        let parent = self.parent(old).ok_or(AstError::Detached)?;
        self.check_attachable(parent, new)?;
        let (prev, next) = {
            let slot = &self.slots[old.index()];
            (slot.prev, slot.next)
        };
        self.unlink(old);
        self.splice(parent, prev, next, new);
        Ok(())
    }

    /// Inserts the detached `new` immediately before `anchor`.
    pub fn insert_before(&mut self, anchor: NodeId, new: NodeId) -> Result<(), AstError> {
        let parent = self.parent(anchor).ok_or(AstError::Detached)?;
        self.check_attachable(parent, new)?;
        let prev = self.prev_sibling(anchor);
        self.splice(parent, prev, Some(anchor), new);
        Ok(())
    }

    /// Inserts the detached `new` immediately after `anchor`.
    pub fn insert_after(&mut self, anchor: NodeId, new: NodeId) -> Result<(), AstError> {
        let parent = self.parent(anchor).ok_or(AstError::Detached)?;
        self.check_attachable(parent, new)?;
        let next = self.next_sibling(anchor);
        self.splice(parent, Some(anchor), next, new);
        Ok(())
    }

    /// Links `node` between `prev` and `next` under `parent`. All invariant
    /// checks have already happened.
    fn splice(
        &mut self,
        parent: NodeId,
        prev: Option<NodeId>,
        next: Option<NodeId>,
        node: NodeId,
    ) {
        match prev {
            Some(prev) => self.slots[prev.index()].next = Some(node),
            None => self.slots[parent.index()].first_child = Some(node),
        }
        match next {
            Some(next) => self.slots[next.index()].prev = Some(node),
            None => self.slots[parent.index()].last_child = Some(node),
        }
        let slot = &mut self.slots[node.index()];
        slot.parent = Some(parent);
        slot.prev = prev;
        slot.next = next;
    }

    /// Unlinks every node matching `query` below `base`. Returns how many
    /// nodes were removed.
    pub fn remove(&mut self, base: NodeId, query: &Query) -> usize {
        let matches = self.find(base, query);
        for &id in &matches {
            self.unlink(id);
        }
        matches.len()
    }

    /// Normalizes the subtree below `id`.
    ///
    /// Three rules, applied bottom-up:
    /// - a solitary `Fragment` child is collapsed into its parent,
    /// - empty `Text` nodes are dropped,
    /// - adjacent `Text` siblings are merged left-to-right.
    pub fn tidy(&mut self) -> Result<(), AstError> {
        self.tidy_node(self.root)
    }

    fn tidy_node(&mut self, id: NodeId) -> Result<(), AstError> {
        let children: Vec<NodeId> = self.children(id).collect();
        for child in children {
            self.tidy_node(child)?;
        }

        // Text cleanup runs first so a Fragment left as the sole child after
        // empty-text drops still collapses in the same pass.
        let mut cursor = self.first_child(id);
        while let Some(child) = cursor {
            let next = self.next_sibling(child);
            if let NodeKind::Text { content } = self.kind(child) {
                if content.is_empty() {
                    self.unlink(child);
                    cursor = next;
                    continue;
                }
                if let Some(prev) = self.prev_sibling(child) {
                    if let NodeKind::Text { content: _ } = self.kind(prev) {
                        let tail = content.clone();
                        self.unlink(child);
                        if let NodeKind::Text { content } = self.kind_mut(prev) {
                            content.push_str(&tail);
                        }
                    }
                }
            }
            cursor = next;
        }

        // A lone Fragment child dissolves, provided the parent accepts
        // everything it holds.
        if self.kind(id).is_container() && self.child_count(id) == 1 {
            if let Some(only) = self.first_child(id) {
                if self.node_type(only) == NodeType::Fragment {
                    let grandchildren: Vec<NodeId> = self.children(only).collect();
                    let ok = grandchildren
                        .iter()
                        .all(|&gc| self.kind(id).accepts(self.kind(gc)));
                    if ok {
                        for &gc in &grandchildren {
                            self.unlink(gc);
                        }
                        self.unlink(only);
                        self.extend(id, grandchildren)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Fills in missing line numbers from the nearest located ancestor.
    pub fn fix_missing_locations(&mut self) {
        self.fix_locations_from(self.root, self.line(self.root).unwrap_or(0));
    }

    fn fix_locations_from(&mut self, id: NodeId, inherited: u32) {
        let line = match self.line(id) {
            Some(line) => line,
            None => {
                self.set_line(id, Some(inherited));
                inherited
            }
        };
        let children: Vec<NodeId> = self.children(id).collect();
        for child in children {
            self.fix_locations_from(child, line);
        }
    }

    /// Structural equality of two subtrees, ignoring line numbers.
    pub fn subtree_eq(&self, a: NodeId, other: &Tree, b: NodeId) -> bool {
        if self.kind(a) != other.kind(b) {
            return false;
        }
        let mut left = self.first_child(a);
        let mut right = other.first_child(b);
        loop {
            match (left, right) {
                (None, None) => return true,
                (Some(l), Some(r)) => {
                    if !self.subtree_eq(l, other, r) {
                        return false;
                    }
                    left = self.next_sibling(l);
                    right = other.next_sibling(r);
                }
                _ => return false,
            }
        }
    }

    /// Renders the tree with box-drawing characters, for debugging.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.pretty_node(self.root, "", "", &mut out);
        out
    }

    fn pretty_node(&self, id: NodeId, lead: &str, child_lead: &str, out: &mut String) {
        let line = self.line(id).unwrap_or(0);
        let _ = writeln!(out, "[{line:04}]{lead}{}", self.kind(id));
        let mut cursor = self.first_child(id);
        while let Some(child) = cursor {
            let next = self.next_sibling(child);
            let (branch, extend) = if next.is_some() {
                ("├─ ", "│  ")
            } else {
                ("└─ ", "   ")
            };
            self.pretty_node(
                child,
                &format!("{child_lead}{branch}"),
                &format!("{child_lead}{extend}"),
                out,
            );
            cursor = next;
        }
    }

    // Convenience allocators mirroring the variant constructors.

    pub fn fragment(&mut self) -> NodeId {
        // Fragment carries no fields, so validation cannot fail.
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Slot::new(NodeKind::Fragment));
        id
    }

    pub fn paragraph(&mut self) -> NodeId {
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Slot::new(NodeKind::Paragraph));
        id
    }

    pub fn text(&mut self, content: impl Into<String>) -> NodeId {
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Slot::new(NodeKind::text(content)));
        id
    }

    pub fn header(&mut self, level: u8) -> Result<NodeId, AstError> {
        self.alloc(NodeKind::header(level)?)
    }
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new()
    }
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.subtree_eq(self.root, other, other.root)
    }
}

/// Iterator over a node's direct children.
pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree.next_sibling(id);
        Some(id)
    }
}

/// Depth-first pre-order iterator over a subtree.
pub struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let children: Vec<NodeId> = self.tree.children(id).collect();
        for child in children.into_iter().rev() {
            self.stack.push(child);
        }
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn paragraph_of(tree: &mut Tree, text: &str) -> NodeId {
        let para = tree.paragraph();
        let content = tree.text(text);
        tree.append(para, content).unwrap();
        para
    }

    #[test]
    fn test_append_and_children() {
        let mut tree = Tree::new();
        let a = paragraph_of(&mut tree, "a");
        let b = paragraph_of(&mut tree, "b");
        tree.append(tree.root(), a).unwrap();
        tree.append(tree.root(), b).unwrap();
        let children: Vec<NodeId> = tree.children(tree.root()).collect();
        assert_eq!(children, vec![a, b]);
        assert_eq!(tree.parent(a), Some(tree.root()));
        assert_eq!(tree.next_sibling(a), Some(b));
        assert_eq!(tree.prev_sibling(b), Some(a));
    }

    #[test]
    fn test_append_rejects_invalid_child() {
        let mut tree = Tree::new();
        let list = tree.alloc(NodeKind::list(None)).unwrap();
        let text = tree.text("not an item");
        assert_eq!(
            tree.append(list, text),
            Err(AstError::InvalidChild {
                parent: NodeType::List,
                child: NodeType::Text,
            })
        );
    }

    #[test]
    fn test_append_rejects_attached_node() {
        let mut tree = Tree::new();
        let para = tree.paragraph();
        tree.append(tree.root(), para).unwrap();
        let other = tree.paragraph();
        tree.append(tree.root(), other).unwrap();
        assert_eq!(tree.append(other, para), Err(AstError::AlreadyAttached));
    }

    #[test]
    fn test_append_rejects_cycle() {
        let mut tree = Tree::new();
        let quote = tree.alloc(NodeKind::BlockQuote).unwrap();
        let inner = tree.alloc(NodeKind::BlockQuote).unwrap();
        tree.append(quote, inner).unwrap();
        assert_eq!(tree.append(inner, quote), Err(AstError::WouldCycle));
    }

    #[test]
    fn test_unlink_and_reattach() {
        let mut tree = Tree::new();
        let a = paragraph_of(&mut tree, "a");
        let b = paragraph_of(&mut tree, "b");
        let c = paragraph_of(&mut tree, "c");
        tree.extend(tree.root(), [a, b, c]).unwrap();

        tree.unlink(b);
        let children: Vec<NodeId> = tree.children(tree.root()).collect();
        assert_eq!(children, vec![a, c]);
        assert_eq!(tree.parent(b), None);
        // The subtree below the unlinked node is untouched.
        assert_eq!(tree.child_count(b), 1);

        tree.append(tree.root(), b).unwrap();
        let children: Vec<NodeId> = tree.children(tree.root()).collect();
        assert_eq!(children, vec![a, c, b]);
    }

    #[test]
    fn test_replace() {
        let mut tree = Tree::new();
        let a = paragraph_of(&mut tree, "a");
        let b = paragraph_of(&mut tree, "b");
        let c = paragraph_of(&mut tree, "c");
        tree.extend(tree.root(), [a, b, c]).unwrap();

        let swapped = paragraph_of(&mut tree, "swapped");
        tree.replace(b, swapped).unwrap();
        let children: Vec<NodeId> = tree.children(tree.root()).collect();
        assert_eq!(children, vec![a, swapped, c]);
        assert_eq!(tree.parent(b), None);
    }

    #[test]
    fn test_replace_requires_attached_anchor() {
        let mut tree = Tree::new();
        let loose = tree.paragraph();
        let new = tree.paragraph();
        assert_eq!(tree.replace(loose, new), Err(AstError::Detached));
    }

    #[test]
    fn test_sibling_inserts() {
        let mut tree = Tree::new();
        let b = paragraph_of(&mut tree, "b");
        tree.append(tree.root(), b).unwrap();

        let a = paragraph_of(&mut tree, "a");
        let c = paragraph_of(&mut tree, "c");
        tree.insert_before(b, a).unwrap();
        tree.insert_after(b, c).unwrap();
        let children: Vec<NodeId> = tree.children(tree.root()).collect();
        assert_eq!(children, vec![a, b, c]);
    }

    #[test]
    fn test_descendants_preorder() {
        let mut tree = Tree::new();
        let quote = tree.alloc(NodeKind::BlockQuote).unwrap();
        let para = paragraph_of(&mut tree, "hello");
        tree.append(quote, para).unwrap();
        tree.append(tree.root(), quote).unwrap();
        let tail = paragraph_of(&mut tree, "tail");
        tree.append(tree.root(), tail).unwrap();

        let types: Vec<NodeType> = tree
            .descendants(tree.root())
            .map(|id| tree.node_type(id))
            .collect();
        assert_eq!(
            types,
            vec![
                NodeType::BlockQuote,
                NodeType::Paragraph,
                NodeType::Text,
                NodeType::Paragraph,
                NodeType::Text,
            ]
        );
    }

    #[test]
    fn test_tidy_collapses_solitary_fragment() {
        let mut tree = Tree::new();
        let para = tree.paragraph();
        let frag = tree.fragment();
        let text = tree.text("hello");
        tree.append(frag, text).unwrap();
        tree.append(para, frag).unwrap();
        tree.append(tree.root(), para).unwrap();

        tree.tidy().unwrap();
        let children: Vec<NodeId> = tree.children(para).collect();
        assert_eq!(children, vec![text]);
    }

    #[test]
    fn test_tidy_collapses_fragment_inside_list_item() {
        let mut tree = Tree::new();
        let list = tree.alloc(NodeKind::list(None)).unwrap();
        let frag = tree.fragment();
        let para = tree.paragraph();
        tree.append(frag, para).unwrap();
        let item = tree.alloc(NodeKind::list_item('-').unwrap()).unwrap();
        tree.append(item, frag).unwrap();
        tree.append(list, item).unwrap();
        tree.append(tree.root(), list).unwrap();

        tree.tidy().unwrap();
        let children: Vec<NodeId> = tree.children(item).collect();
        assert_eq!(children, vec![para]);
    }

    #[test]
    fn test_tidy_drops_empty_text() {
        let mut tree = Tree::new();
        let para = tree.paragraph();
        let empty = tree.text("");
        let kept = tree.text("kept");
        tree.extend(para, [empty, kept]).unwrap();
        tree.append(tree.root(), para).unwrap();

        tree.tidy().unwrap();
        let children: Vec<NodeId> = tree.children(para).collect();
        assert_eq!(children, vec![kept]);
    }

    #[test]
    fn test_tidy_merges_adjacent_text() {
        let mut tree = Tree::new();
        let para = tree.paragraph();
        let a = tree.text("Hello, ");
        let b = tree.text("world");
        let c = tree.text("!");
        tree.extend(para, [a, b, c]).unwrap();
        tree.append(tree.root(), para).unwrap();

        tree.tidy().unwrap();
        assert_eq!(tree.child_count(para), 1);
        assert_eq!(
            tree.kind(tree.first_child(para).unwrap()),
            &NodeKind::text("Hello, world!")
        );
    }

    #[test]
    fn test_tidy_collapses_fragment_left_solitary_by_text_drop() {
        let mut tree = Tree::new();
        let para = tree.paragraph();
        let frag = tree.fragment();
        let text = tree.text("x");
        tree.append(frag, text).unwrap();
        let empty = tree.text("");
        tree.extend(para, [frag, empty]).unwrap();
        tree.append(tree.root(), para).unwrap();

        tree.tidy().unwrap();
        // Dropping the empty text leaves the fragment as the sole child, and
        // it must dissolve in the same pass.
        let children: Vec<NodeId> = tree.children(para).collect();
        assert_eq!(children, vec![text]);

        let once = tree.clone();
        tree.tidy().unwrap();
        assert_eq!(tree, once);
    }

    #[test]
    fn test_tidy_is_idempotent() {
        let mut tree = Tree::new();
        let para = tree.paragraph();
        let a = tree.text("a");
        let b = tree.text("");
        let c = tree.text("c");
        tree.extend(para, [a, b, c]).unwrap();
        tree.append(tree.root(), para).unwrap();

        tree.tidy().unwrap();
        let once = tree.clone();
        tree.tidy().unwrap();
        assert_eq!(tree, once);
    }

    #[test]
    fn test_fix_missing_locations() {
        let mut tree = Tree::new();
        let para = tree.paragraph();
        let text = tree.text("x");
        tree.append(para, text).unwrap();
        tree.append(tree.root(), para).unwrap();
        tree.set_line(para, Some(4));

        tree.fix_missing_locations();
        assert_eq!(tree.line(tree.root()), Some(0));
        assert_eq!(tree.line(para), Some(4));
        assert_eq!(tree.line(text), Some(4));
    }

    #[test]
    fn test_fix_missing_locations_keeps_existing() {
        let mut tree = Tree::new();
        let para = tree.paragraph();
        let text = tree.text("x");
        tree.append(para, text).unwrap();
        tree.append(tree.root(), para).unwrap();
        tree.set_line(para, Some(4));
        tree.set_line(text, Some(9));

        tree.fix_missing_locations();
        assert_eq!(tree.line(text), Some(9));
    }

    #[test]
    fn test_subtree_eq_ignores_lines() {
        let mut left = Tree::new();
        let para = paragraph_of(&mut left, "same");
        left.append(left.root(), para).unwrap();
        left.set_line(para, Some(10));

        let mut right = Tree::new();
        let para = paragraph_of(&mut right, "same");
        right.append(right.root(), para).unwrap();

        assert_eq!(left, right);
    }

    #[test]
    fn test_pretty_output() {
        let mut tree = Tree::new();
        let header = tree.header(1).unwrap();
        let text = tree.text("Hello");
        tree.append(header, text).unwrap();
        tree.append(tree.root(), header).unwrap();
        let para = paragraph_of(&mut tree, "world");
        tree.append(tree.root(), para).unwrap();
        tree.set_line(para, Some(2));
        tree.fix_missing_locations();

        assert_eq!(
            tree.pretty(),
            "[0000]Fragment\n\
             [0000]├─ Header(1)\n\
             [0000]│  └─ Text(\"Hello\")\n\
             [0002]└─ Paragraph\n\
             [0002]   └─ Text(\"world\")\n"
        );
    }
}
