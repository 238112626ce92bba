//! marktree-core: flat-event reconstruction and renderers
//!
//! This crate sits between a tokenizer backend and the document tree:
//! - [`event`] defines the backend-neutral flat event stream
//! - [`reconstruct`] rebuilds a [`Tree`] from that stream without recursion
//! - [`render`] turns a tree back into markdown, JSON, or plain text

pub mod event;
pub mod reconstruct;
pub mod render;

pub use event::{Attrs, Event};
pub use reconstruct::{reconstruct, ReconstructError};
pub use render::{to_json, to_markdown, to_text, JsonOptions, TextOptions};

pub use marktree_ast::{AstError, Depth, NodeId, NodeKind, NodeType, Query, Select, Tree};
