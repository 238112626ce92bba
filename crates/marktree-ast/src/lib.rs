//! marktree-ast: a mutable document tree for markdown content
//!
//! This crate provides:
//! - Typed node variants with block/inline and leaf/container classification
//! - An arena-backed tree with O(1) unlink, replace, and sibling insertion
//! - Path-style queries with depth policies and slice selectors
//! - The `tidy` normalization pass and line-number backfill
//!
//! # Example
//!
//! ```
//! use marktree_ast::{NodeKind, Tree};
//!
//! let mut tree = Tree::new();
//! let header = tree.alloc(NodeKind::header(1).unwrap()).unwrap();
//! let text = tree.alloc(NodeKind::text("Hello")).unwrap();
//! let root = tree.root();
//! tree.append(header, text).unwrap();
//! tree.append(root, header).unwrap();
//! assert_eq!(tree.child_count(tree.root()), 1);
//! ```

pub mod error;
pub mod node;
pub mod query;
pub mod tree;

pub use error::AstError;
pub use node::{NodeKind, NodeType, Role, Shape};
pub use query::{Depth, Query, Select};
pub use tree::{NodeId, Tree};
