use std::collections::HashMap;

use crate::geometry::Point;
use crate::tree::ids::NodeIndex;

/// One active drag gesture: the grabbed node plus the rendered descendants
/// that travel with it.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    node: NodeIndex,
    moved: Vec<NodeIndex>,
    start: HashMap<NodeIndex, Point>,
    travel: Point,
}

/// How a gesture ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// The pointer barely moved; treat as a click on `node`.
    Click { node: NodeIndex },
    /// Positions of `moved` nodes were committed to the position store.
    Committed { node: NodeIndex, moved: usize },
    /// No drag was active.
    Idle,
}

impl DragSession {
    pub(crate) fn new(node: NodeIndex, moved: Vec<NodeIndex>, start: HashMap<NodeIndex, Point>) -> Self {
        DragSession {
            node,
            moved,
            start,
            travel: Point::ORIGIN,
        }
    }

    pub fn node(&self) -> NodeIndex {
        self.node
    }

    /// The grabbed node first, then its rendered descendants in preorder.
    pub fn moved(&self) -> &[NodeIndex] {
        &self.moved
    }

    /// Net pointer travel since the gesture started.
    pub fn travel(&self) -> Point {
        self.travel
    }

    pub(crate) fn record(&mut self, delta: Point) {
        self.travel += delta;
    }

    /// Screen position of `index` when the gesture started.
    pub fn start_position(&self, index: NodeIndex) -> Option<Point> {
        self.start.get(&index).copied()
    }
}
