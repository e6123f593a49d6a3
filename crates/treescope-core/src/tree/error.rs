use thiserror::Error;

use crate::tree::ids::{NodeIndex, NodeKey};

/// Structural errors raised while building or querying a hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Attempted to access a node index that does not exist in the arena.
    #[error("missing node with index {}", index.index())]
    MissingNode { index: NodeIndex },

    /// No node in the hierarchy resolves to this key.
    #[error("no node with key '{key}'")]
    UnknownKey { key: NodeKey },

    /// Two nodes carry the same explicit id.
    #[error("duplicate node id '{key}'")]
    DuplicateKey { key: NodeKey },

    /// A parent-chain walk did not reach the root within the node count bound.
    #[error("parent chain from node {} does not terminate within {bound} steps", start.index())]
    CyclicParentChain { start: NodeIndex, bound: usize },

    /// A node is not exactly one level below its parent.
    #[error("node {} has depth {depth} but its parent has depth {parent_depth}", index.index())]
    DepthMismatch {
        index: NodeIndex,
        depth: usize,
        parent_depth: usize,
    },

    /// A node path segment is not a child index.
    #[error("invalid node path '{path}': segment '{segment}' is not an index")]
    InvalidPath { path: String, segment: String },

    /// A node path walks past the children of an existing node.
    #[error("node path index {child_index} out of range at depth {depth} ({available} children)")]
    PathOutOfRange {
        depth: usize,
        child_index: usize,
        available: usize,
    },
}
