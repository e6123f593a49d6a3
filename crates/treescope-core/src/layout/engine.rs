use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::config::ViewportConfig;
use crate::geometry::Point;
use crate::interaction::positions::PositionStore;
use crate::layout::{
    sizing::{SizeClass, SizeProfile},
    tidy::tidy_positions,
};
use crate::tree::{
    error::TreeError,
    hierarchy::Hierarchy,
    ids::{NodeIndex, NodeKey},
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("invalid layout parameters: {0}")]
    InvalidParams(String),
    #[error("nothing to lay out: the visible set is empty")]
    EmptyVisibleSet,
    #[error("visible node {} has a parent outside the visible set", index.index())]
    DetachedNode { index: NodeIndex },
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Canvas extents for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Canvas height; scaled per size class to get the sibling-axis extent.
    pub height: f64,
    /// Extent of the depth axis.
    pub depth_extent: f64,
}

impl LayoutParams {
    pub fn from_viewport(viewport: &ViewportConfig) -> Self {
        LayoutParams {
            height: viewport.height,
            depth_extent: viewport.width - viewport.margin_left - viewport.margin_right,
        }
    }

    fn validate(&self) -> Result<(), LayoutError> {
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(LayoutError::InvalidParams(format!(
                "height must be finite and > 0, got {}",
                self.height
            )));
        }
        if !self.depth_extent.is_finite() || self.depth_extent <= 0.0 {
            return Err(LayoutError::InvalidParams(format!(
                "depth extent must be finite and > 0, got {}",
                self.depth_extent
            )));
        }
        Ok(())
    }
}

/// A visible node with its final geometry.
///
/// `layout` is in layout space: `x` along siblings, `y` along depth. The tree
/// is drawn horizontally, so screen coordinates swap the axes.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    pub index: NodeIndex,
    pub key: NodeKey,
    pub depth: usize,
    pub layout: Point,
    /// Position computed by the algorithm, before any custom override.
    pub algorithmic: Point,
    pub radius: f64,
    pub custom: bool,
}

impl PositionedNode {
    pub fn screen(&self) -> Point {
        self.layout.swapped()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkGeometry {
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub source_point: Point,
    pub target_point: Point,
    pub is_playout: bool,
}

/// Result of one layout pass over the visible nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeLayout {
    nodes: Vec<PositionedNode>,
    slots: HashMap<NodeIndex, usize>,
    links: Vec<LinkGeometry>,
    size_class: SizeClass,
}

impl TreeLayout {
    /// Positioned nodes in preorder.
    pub fn nodes(&self) -> &[PositionedNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[LinkGeometry] {
        &self.links
    }

    pub fn size_class(&self) -> SizeClass {
        self.size_class
    }

    pub fn node(&self, index: NodeIndex) -> Option<&PositionedNode> {
        self.slots.get(&index).map(|slot| &self.nodes[*slot])
    }

    pub fn screen_position(&self, index: NodeIndex) -> Option<Point> {
        self.node(index).map(PositionedNode::screen)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Bounding box of node centres in screen space: (min, max).
    pub fn screen_bounds(&self) -> (Point, Point) {
        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for node in &self.nodes {
            let p = node.screen();
            min.x = min.x.min(p.x - node.radius);
            min.y = min.y.min(p.y - node.radius);
            max.x = max.x.max(p.x + node.radius);
            max.y = max.y.max(p.y + node.radius);
        }
        (min, max)
    }
}

/// Lay out `visible` (preorder, closed under ancestors) as a horizontal tree
/// and apply custom positions on top.
pub fn layout(
    hierarchy: &Hierarchy,
    visible: &[NodeIndex],
    params: LayoutParams,
    positions: &PositionStore,
) -> Result<TreeLayout, LayoutError> {
    params.validate()?;
    if visible.is_empty() {
        return Err(LayoutError::EmptyVisibleSet);
    }

    // Local preorder numbering of the visible subset.
    let mut local: HashMap<NodeIndex, usize> = HashMap::with_capacity(visible.len());
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); visible.len()];
    let mut max_depth = 0;
    for (slot, &index) in visible.iter().enumerate() {
        let node = hierarchy.node(index)?;
        max_depth = max_depth.max(node.depth());
        if slot > 0 {
            let parent = node.parent().ok_or(LayoutError::DetachedNode { index })?;
            let parent_slot = *local
                .get(&parent)
                .ok_or(LayoutError::DetachedNode { index })?;
            children[parent_slot].push(slot);
        }
        local.insert(index, slot);
    }

    let size_class = SizeClass::classify(visible.len(), max_depth);
    let profile: SizeProfile = size_class.profile();
    let nodes_by_slot = visible
        .iter()
        .map(|index| hierarchy.node(*index))
        .collect::<Result<Vec<_>, _>>()?;

    let raw = tidy_positions(&children, |a, b| {
        profile.separation(nodes_by_slot[a], nodes_by_slot[b])
    });

    // Fit the breadth axis to the canvas, leaving half a separation at each end.
    let (mut left, mut right) = (0, 0);
    for (slot, &x) in raw.iter().enumerate() {
        if x < raw[left] {
            left = slot;
        }
        if x > raw[right] {
            right = slot;
        }
    }
    let half_gap = if left == right {
        1.0
    } else {
        profile.separation(nodes_by_slot[left], nodes_by_slot[right]) / 2.0
    };
    let tx = half_gap - raw[left];
    let breadth = params.height * profile.vertical_multiplier;
    let kx = breadth / (raw[right] + half_gap + tx);
    let ky = params.depth_extent / max_depth.max(1) as f64;

    let root_visits = hierarchy.root().num_visits();
    let mut nodes = Vec::with_capacity(visible.len());
    let mut slots = HashMap::with_capacity(visible.len());
    let mut custom_count = 0;
    for (slot, node) in nodes_by_slot.iter().enumerate() {
        let algorithmic = Point::new((raw[slot] + tx) * kx, node.depth() as f64 * ky);
        let (layout, custom) = match positions.get(node.key()) {
            Some(custom) => (custom.layout_point(), true),
            None => (algorithmic, false),
        };
        custom_count += usize::from(custom);
        slots.insert(node.index(), slot);
        nodes.push(PositionedNode {
            index: node.index(),
            key: node.key().clone(),
            depth: node.depth(),
            layout,
            algorithmic,
            radius: profile.node_radius(node.num_visits(), root_visits),
            custom,
        });
    }

    let mut links = Vec::with_capacity(visible.len().saturating_sub(1));
    for positioned in nodes.iter().skip(1) {
        let node = hierarchy.node(positioned.index)?;
        let parent = node
            .parent()
            .ok_or(LayoutError::DetachedNode { index: node.index() })?;
        let parent_slot = *slots
            .get(&parent)
            .ok_or(LayoutError::DetachedNode { index: node.index() })?;
        links.push(LinkGeometry {
            source: parent,
            target: node.index(),
            source_point: nodes[parent_slot].screen(),
            target_point: positioned.screen(),
            is_playout: node.is_playout(),
        });
    }

    debug!(
        nodes = nodes.len(),
        ?size_class,
        custom = custom_count,
        "computed layout"
    );

    Ok(TreeLayout {
        nodes,
        slots,
        links,
        size_class,
    })
}
