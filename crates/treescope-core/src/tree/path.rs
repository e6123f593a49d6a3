use std::fmt;
use std::str::FromStr;

use crate::tree::{error::TreeError, hierarchy::Hierarchy, ids::NodeIndex};

/// Deep-link address of a node: child indices from the root, e.g. `"0-2-1"`.
/// The empty path addresses the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        NodePath(Vec::new())
    }

    pub fn segments(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(index);
        NodePath(segments)
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(value: Vec<usize>) -> Self {
        NodePath(value)
    }
}

impl FromStr for NodePath {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(NodePath::root());
        }
        trimmed
            .split('-')
            .map(|segment| {
                segment.parse::<usize>().map_err(|_| TreeError::InvalidPath {
                    path: s.to_string(),
                    segment: segment.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(NodePath)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl Hierarchy {
    /// Follow `path` from the root.
    pub fn resolve_path(&self, path: &NodePath) -> Result<NodeIndex, TreeError> {
        let mut current = self.root_index();
        for (depth, &child_index) in path.segments().iter().enumerate() {
            let node = self.node(current)?;
            current = *node
                .children()
                .get(child_index)
                .ok_or(TreeError::PathOutOfRange {
                    depth,
                    child_index,
                    available: node.children().len(),
                })?;
        }
        Ok(current)
    }

    /// Child-index path from the root to `index`.
    pub fn path_of(&self, index: NodeIndex) -> Result<NodePath, TreeError> {
        let node = self.node(index)?;
        let mut segments = Vec::with_capacity(node.depth());
        if node.parent().is_some() {
            segments.push(node.sibling_index());
        }
        for ancestor in self.ancestors(index) {
            if ancestor.parent().is_some() {
                segments.push(ancestor.sibling_index());
            }
        }
        segments.reverse();
        Ok(NodePath(segments))
    }
}
