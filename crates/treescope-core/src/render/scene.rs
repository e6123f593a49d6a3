use tracing::debug;

use crate::config::ViewportConfig;
use crate::geometry::{Point, horizontal_link_path};
use crate::interaction::{InteractionController, viewport::ZoomTransform};
use crate::layout::engine::{LinkGeometry, TreeLayout};
use crate::tree::{
    hierarchy::{Hierarchy, HierarchyNode},
    ids::{NodeIndex, NodeKey},
};
use crate::visibility::{flags::NodeFlags, state::Visibility};

/// Characters of the state string shown next to a node.
const LABEL_LEN: usize = 12;
/// Screen-space gap between a circle and its badge or plus sign.
const OVERLAY_GAP: f64 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeGlyph {
    pub index: NodeIndex,
    pub key: NodeKey,
    pub center: Point,
    pub radius: f64,
    pub class: &'static str,
    pub opacity: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgePath {
    pub source: NodeIndex,
    pub target: NodeIndex,
    /// SVG path data.
    pub d: String,
    pub class: &'static str,
    pub opacity: f64,
}

/// Relative-visit percentage drawn beside a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub index: NodeIndex,
    pub at: Point,
    pub text: String,
    /// Inverse zoom; keeps the badge the same size on screen.
    pub scale: f64,
}

/// Marker on nodes whose children are withheld.
#[derive(Debug, Clone, PartialEq)]
pub struct PlusSign {
    pub index: NodeIndex,
    pub at: Point,
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub at: Point,
    pub text: String,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    pub from: Point,
    pub to: Point,
}

/// Everything needed to draw one frame. Nodes are in paint order.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub transform: ZoomTransform,
    pub edges: Vec<EdgePath>,
    pub nodes: Vec<NodeGlyph>,
    pub badges: Vec<Badge>,
    pub plus_signs: Vec<PlusSign>,
    pub annotation: Option<Annotation>,
    pub arrow: Option<Arrow>,
}

impl Scene {
    pub fn empty(viewport: &ViewportConfig, transform: ZoomTransform) -> Self {
        Scene {
            width: viewport.width,
            height: viewport.height,
            transform,
            edges: Vec::new(),
            nodes: Vec::new(),
            badges: Vec::new(),
            plus_signs: Vec::new(),
            annotation: None,
            arrow: None,
        }
    }

    pub fn node(&self, index: NodeIndex) -> Option<&NodeGlyph> {
        self.nodes.iter().find(|glyph| glyph.index == index)
    }

    pub fn badge(&self, index: NodeIndex) -> Option<&Badge> {
        self.badges.iter().find(|badge| badge.index == index)
    }

    pub fn has_plus_sign(&self, index: NodeIndex) -> bool {
        self.plus_signs.iter().any(|plus| plus.index == index)
    }
}

pub(crate) fn node_label(node: &HierarchyNode) -> String {
    node.state().chars().take(LABEL_LEN).collect()
}

pub(crate) fn edge_path(link: &LinkGeometry, opacity: f64) -> EdgePath {
    EdgePath {
        source: link.source,
        target: link.target,
        d: horizontal_link_path(link.source_point, link.target_point),
        class: if link.is_playout { "link-playout" } else { "link" },
        opacity,
    }
}

pub(crate) fn badge_text(relative_visits: f64) -> String {
    format!("{relative_visits:.0}%")
}

/// Project the current layout, flags and live positions into a scene.
pub fn build_scene(
    hierarchy: &Hierarchy,
    visibility: &Visibility,
    layout: &TreeLayout,
    controller: &InteractionController,
    viewport: &ViewportConfig,
) -> Scene {
    let transform = controller.viewport().current();
    let scale = controller.viewport().overlay_scale();
    let mut scene = Scene::empty(viewport, transform);

    scene.edges = controller
        .live_links(layout)
        .iter()
        .map(|link| edge_path(link, 1.0))
        .collect();

    for &index in controller.z_order() {
        let (Some(positioned), Some(node)) = (layout.node(index), hierarchy.get(index)) else {
            continue;
        };
        let center = controller
            .live_position(index)
            .unwrap_or_else(|| positioned.screen());
        let flags = visibility.flags(index);
        scene.nodes.push(NodeGlyph {
            index,
            key: node.key().clone(),
            center,
            radius: positioned.radius,
            class: flags.primary_state().css_class(),
            opacity: 1.0,
            label: node_label(node),
        });

        let offset = positioned.radius + OVERLAY_GAP * scale;
        if node.depth() > 0 {
            scene.badges.push(Badge {
                index,
                at: center + Point::new(0.0, -offset),
                text: badge_text(node.relative_visits()),
                scale,
            });
        }
        if flags.contains(NodeFlags::HAS_HIDDEN_CHILDREN) {
            scene.plus_signs.push(PlusSign {
                index,
                at: center + Point::new(offset, 0.0),
                scale,
            });
        }
    }

    debug!(
        nodes = scene.nodes.len(),
        edges = scene.edges.len(),
        "built scene"
    );
    scene
}
