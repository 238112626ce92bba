//! Tree queries.
//!
//! A [`Query`] is a chain of segments, each matching nodes by variant and an
//! optional predicate, with an optional index or slice applied to the
//! matches. Segments after the first search below each node the previous
//! segment matched, so `Query::kind(List).then(ListItem)` reads like a path.
//! Matches come back in depth-first pre-order.

use crate::node::NodeType;
use crate::tree::{NodeId, Tree};

/// How far below the base node a query segment looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Depth {
    /// Direct children only.
    #[default]
    Immediate,
    /// At most this many levels down; `Limit(1)` equals `Immediate`.
    Limit(u32),
    /// The whole subtree.
    Unbounded,
}

impl Depth {
    /// Remaining levels as a countdown, `None` meaning unlimited.
    fn budget(self) -> Option<u32> {
        match self {
            Depth::Immediate => Some(1),
            Depth::Limit(n) => Some(n.max(1)),
            Depth::Unbounded => None,
        }
    }
}

/// Narrows a segment's matches to one index or a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Select {
    Index(usize),
    Slice {
        start: usize,
        end: Option<usize>,
        step: usize,
    },
}

impl Select {
    pub fn index(i: usize) -> Self {
        Select::Index(i)
    }

    /// Slice with unit step; `end` of `None` runs to the last match.
    pub fn slice(start: usize, end: Option<usize>) -> Self {
        Select::Slice {
            start,
            end,
            step: 1,
        }
    }

    /// Slice with an explicit step; a step of zero is treated as one.
    pub fn slice_step(start: usize, end: Option<usize>, step: usize) -> Self {
        Select::Slice {
            start,
            end,
            step: step.max(1),
        }
    }

    fn apply(self, matches: Vec<NodeId>) -> Vec<NodeId> {
        match self {
            Select::Index(i) => matches.into_iter().skip(i).take(1).collect(),
            Select::Slice { start, end, step } => {
                let end = end.unwrap_or(matches.len()).min(matches.len());
                if start >= end {
                    return Vec::new();
                }
                matches[start..end]
                    .iter()
                    .copied()
                    .step_by(step.max(1))
                    .collect()
            }
        }
    }
}

type Predicate = Box<dyn Fn(&Tree, NodeId) -> bool>;

struct Segment {
    node_type: Option<NodeType>,
    predicate: Option<Predicate>,
    select: Option<Select>,
}

impl Segment {
    fn new(node_type: Option<NodeType>) -> Self {
        Segment {
            node_type,
            predicate: None,
            select: None,
        }
    }

    fn matches(&self, tree: &Tree, id: NodeId) -> bool {
        if let Some(node_type) = self.node_type {
            if tree.node_type(id) != node_type {
                return false;
            }
        }
        match &self.predicate {
            Some(predicate) => predicate(tree, id),
            None => true,
        }
    }
}

/// A builder describing what to find and how deep to look.
pub struct Query {
    depth: Depth,
    segments: Vec<Segment>,
}

impl Query {
    /// Matches any node.
    pub fn any() -> Self {
        Query {
            depth: Depth::default(),
            segments: vec![Segment::new(None)],
        }
    }

    /// Matches nodes of one variant.
    pub fn kind(node_type: NodeType) -> Self {
        Query {
            depth: Depth::default(),
            segments: vec![Segment::new(Some(node_type))],
        }
    }

    /// Search depth, shared by every segment.
    pub fn depth(mut self, depth: Depth) -> Self {
        self.depth = depth;
        self
    }

    /// Extra predicate on the most recent segment.
    pub fn filter(mut self, predicate: impl Fn(&Tree, NodeId) -> bool + 'static) -> Self {
        if let Some(segment) = self.segments.last_mut() {
            segment.predicate = Some(Box::new(predicate));
        }
        self
    }

    /// Index or slice applied to the most recent segment's matches.
    pub fn select(mut self, select: Select) -> Self {
        if let Some(segment) = self.segments.last_mut() {
            segment.select = Some(select);
        }
        self
    }

    /// Continues the search below each match, narrowed to one variant.
    pub fn then(mut self, node_type: NodeType) -> Self {
        self.segments.push(Segment::new(Some(node_type)));
        self
    }

    /// Continues the search below each match, unrestricted.
    pub fn then_any(mut self) -> Self {
        self.segments.push(Segment::new(None));
        self
    }
}

impl Tree {
    /// All nodes below `base` matching `query`, in pre-order.
    pub fn find(&self, base: NodeId, query: &Query) -> Vec<NodeId> {
        let mut current = vec![base];
        for segment in &query.segments {
            let mut matched = Vec::new();
            for &id in &current {
                self.collect_matches(id, segment, query.depth.budget(), &mut matched);
            }
            if let Some(select) = segment.select {
                matched = select.apply(matched);
            }
            current = matched;
        }
        current
    }

    /// The first match below `base`, if any.
    pub fn find_one(&self, base: NodeId, query: &Query) -> Option<NodeId> {
        self.find(base, query).into_iter().next()
    }

    fn collect_matches(
        &self,
        base: NodeId,
        segment: &Segment,
        budget: Option<u32>,
        out: &mut Vec<NodeId>,
    ) {
        let deeper = match budget {
            Some(0) => return,
            Some(n) => Some(n - 1),
            None => None,
        };
        for child in self.children(base) {
            if segment.matches(self, child) {
                out.push(child);
            }
            self.collect_matches(child, segment, deeper, out);
        }
    }
}
