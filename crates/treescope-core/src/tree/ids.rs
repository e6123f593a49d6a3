use std::fmt;

use serde::{Deserialize, Serialize};

/// A wrapper for an integer index used to address nodes inside a hierarchy arena.
/// Only meaningful for the hierarchy that produced it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Get the arena slot without exposing the inner value for mutation
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for NodeIndex {
    fn from(value: usize) -> Self {
        NodeIndex(value)
    }
}

/// Stable identity of a node across re-renders of the same data.
/// Either an explicit `id` from the document or a structural key derived from
/// the ancestor chain, sibling index and a bounded prefix of the state string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(String);

impl NodeKey {
    pub fn new(value: impl Into<String>) -> Self {
        NodeKey(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `other` has the shape of a structural key derived below this
    /// one: `{self}-{sibling index}-{state prefix}`.
    pub fn is_structural_prefix_of(&self, other: &NodeKey) -> bool {
        let Some(rest) = other
            .0
            .strip_prefix(self.0.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
        else {
            return false;
        };
        match rest.split_once('-') {
            Some((sibling, _)) => {
                !sibling.is_empty() && sibling.bytes().all(|b| b.is_ascii_digit())
            }
            None => false,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeKey {
    fn from(value: &str) -> Self {
        NodeKey(value.to_string())
    }
}

impl From<String> for NodeKey {
    fn from(value: String) -> Self {
        NodeKey(value)
    }
}
