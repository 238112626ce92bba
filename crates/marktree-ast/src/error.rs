//! Errors raised by tree construction and mutation.

use crate::node::NodeType;
use thiserror::Error;

/// Tree construction and mutation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AstError {
    #[error("nodes of type {parent} do not allow children of type {child}")]
    InvalidChild { parent: NodeType, child: NodeType },

    #[error("header level must be between 1 and 6, got {0}")]
    HeaderLevel(u8),

    #[error("bullet must be one of '-', '+', '*', or '.', got {0:?}")]
    InvalidBullet(char),

    #[error("only '`' or '~' are valid characters for fencing, got {0:?}")]
    InvalidFenceChar(char),

    #[error("thematic breaks must be one of '-', '_', or '*', got {0:?}")]
    InvalidBreakChar(char),

    #[error("node is already attached to a parent; unlink it first")]
    AlreadyAttached,

    #[error("node has no parent, so its tree position is undefined")]
    Detached,

    #[error("attaching here would place a node inside its own subtree")]
    WouldCycle,
}
