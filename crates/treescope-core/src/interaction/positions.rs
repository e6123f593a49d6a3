use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::Point;
use crate::tree::{
    hierarchy::Hierarchy,
    ids::{NodeIndex, NodeKey},
};

/// User-placed position of one node in layout space (before the axis swap),
/// together with the algorithmic position it replaced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomPosition {
    pub x: f64,
    pub y: f64,
    pub original_x: f64,
    pub original_y: f64,
}

impl CustomPosition {
    pub fn layout_point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn original_point(&self) -> Point {
        Point::new(self.original_x, self.original_y)
    }
}

/// In-memory store of dragged positions keyed by node identity.
/// The rendering layer reads from it; it is never reconstructed from drawn output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionStore {
    entries: HashMap<NodeKey, CustomPosition>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &NodeKey) -> Option<&CustomPosition> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeKey, &CustomPosition)> {
        self.entries.iter()
    }

    /// Record `layout` for `key`. A node moved twice keeps its first original.
    pub fn commit(&mut self, key: NodeKey, layout: Point, original: Point) {
        let original = self
            .entries
            .get(&key)
            .map(CustomPosition::original_point)
            .unwrap_or(original);
        self.entries.insert(
            key,
            CustomPosition {
                x: layout.x,
                y: layout.y,
                original_x: original.x,
                original_y: original.y,
            },
        );
    }

    /// Remove `index` and its whole branch: every descendant in the current
    /// hierarchy plus any stored key structurally derived from it. Keys that
    /// are explicit ids in `hierarchy` are only dropped as descendants.
    /// Returns how many entries were dropped.
    pub fn reset_node(&mut self, index: NodeIndex, hierarchy: &Hierarchy) -> usize {
        let Some(node) = hierarchy.get(index) else {
            return 0;
        };
        let before = self.entries.len();
        let key = node.key().clone();
        self.entries.remove(&key);
        for descendant in hierarchy.descendants(index) {
            self.entries.remove(descendant.key());
        }
        self.entries.retain(|stored, _| {
            let explicit = hierarchy
                .find(stored)
                .is_some_and(|node| node.has_explicit_id());
            explicit || !key.is_structural_prefix_of(stored)
        });
        let removed = before - self.entries.len();
        debug!(key = %key, removed, "reset custom positions");
        removed
    }

    pub fn reset_all(&mut self) {
        self.entries.clear();
    }

    /// JSON object mapping node keys to positions, for carrying a layout across sessions.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
