pub mod drag;
pub mod menu;
pub mod positions;
pub mod viewport;

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::InteractionConfig;
use crate::geometry::Point;
use crate::interaction::{
    drag::{DragOutcome, DragSession},
    menu::ContextMenu,
    positions::PositionStore,
    viewport::Viewport,
};
use crate::layout::engine::{LinkGeometry, TreeLayout};
use crate::tree::{error::TreeError, hierarchy::Hierarchy, ids::NodeIndex};
use crate::visibility::flags::NodeFlags;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InteractionError {
    #[error("node {} is not rendered", index.index())]
    NotRendered { index: NodeIndex },
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// What a click on a node should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    ToggleExpansion,
    ToggleFilterOverride,
}

/// Children withheld only by the filter are revealed through an override;
/// everything else with children toggles manual expansion. Leaves do nothing.
pub fn click_action(flags: NodeFlags, manually_hidden: bool, filtered: bool) -> Option<ClickAction> {
    if flags.contains(NodeFlags::LEAF) {
        return None;
    }
    if filtered && !manually_hidden {
        Some(ClickAction::ToggleFilterOverride)
    } else {
        Some(ClickAction::ToggleExpansion)
    }
}

/// Pointer-driven state of one view: drag, pan/zoom, context menu and the
/// live screen positions of rendered nodes.
#[derive(Debug, Clone)]
pub struct InteractionController {
    positions: PositionStore,
    viewport: Viewport,
    menu: ContextMenu,
    drag: Option<DragSession>,
    live: HashMap<NodeIndex, Point>,
    z_order: Vec<NodeIndex>,
    click_threshold: f64,
}

impl InteractionController {
    pub fn new(config: &InteractionConfig) -> Self {
        InteractionController {
            positions: PositionStore::new(),
            viewport: Viewport::new(config),
            menu: ContextMenu::default(),
            drag: None,
            live: HashMap::new(),
            z_order: Vec::new(),
            click_threshold: config.click_threshold,
        }
    }

    pub fn positions(&self) -> &PositionStore {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut PositionStore {
        &mut self.positions
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn menu(&self) -> &ContextMenu {
        &self.menu
    }

    pub fn menu_mut(&mut self) -> &mut ContextMenu {
        &mut self.menu
    }

    pub fn active_drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Current screen position of a rendered node, including in-flight drag offsets.
    pub fn live_position(&self, index: NodeIndex) -> Option<Point> {
        self.live.get(&index).copied()
    }

    /// Paint order; later entries are drawn on top.
    pub fn z_order(&self) -> &[NodeIndex] {
        &self.z_order
    }

    /// Take the positions of a fresh layout pass as the rendered state.
    /// An in-flight drag is dropped since its nodes may no longer be rendered.
    pub fn sync_layout(&mut self, layout: &TreeLayout) {
        self.drag = None;
        self.live = layout
            .nodes()
            .iter()
            .map(|node| (node.index, node.screen()))
            .collect();
        self.z_order = layout.nodes().iter().map(|node| node.index).collect();
    }

    /// Grab `index`: raise it to the top and collect its rendered descendants.
    /// A gesture still in flight is cancelled first.
    pub fn drag_start(
        &mut self,
        index: NodeIndex,
        hierarchy: &Hierarchy,
    ) -> Result<(), InteractionError> {
        self.drag_cancel();
        let origin = self
            .live_position(index)
            .ok_or(InteractionError::NotRendered { index })?;
        hierarchy.node(index)?;

        let mut moved = vec![index];
        let mut start = HashMap::from([(index, origin)]);
        for &rendered in &self.z_order {
            if hierarchy.is_descendant_of(rendered, index) {
                if let Some(position) = self.live.get(&rendered) {
                    moved.push(rendered);
                    start.insert(rendered, *position);
                }
            }
        }
        // Keep descendants in preorder regardless of paint order.
        moved[1..].sort();

        self.z_order.retain(|entry| *entry != index);
        self.z_order.push(index);
        self.menu.close();
        debug!(node = index.index(), moved = moved.len(), "drag started");
        self.drag = Some(DragSession::new(index, moved, start));
        Ok(())
    }

    /// Shift the grabbed node and every descendant by the pointer delta.
    /// Returns false when no drag is active.
    pub fn drag_move(&mut self, delta: Point) -> bool {
        let Some(session) = self.drag.as_mut() else {
            return false;
        };
        session.record(delta);
        for index in session.moved() {
            if let Some(position) = self.live.get_mut(index) {
                *position += delta;
            }
        }
        true
    }

    /// Finish the gesture. Short travel resolves as a click and restores the
    /// rendered positions; otherwise final positions are committed with their
    /// pre-drag coordinates as originals.
    pub fn drag_end(&mut self, hierarchy: &Hierarchy) -> DragOutcome {
        let Some(session) = self.drag.take() else {
            return DragOutcome::Idle;
        };
        if session.travel().length() < self.click_threshold {
            self.restore(&session);
            return DragOutcome::Click {
                node: session.node(),
            };
        }

        let mut committed = 0;
        for &index in session.moved() {
            let (Some(node), Some(current), Some(before)) = (
                hierarchy.get(index),
                self.live.get(&index).copied(),
                session.start_position(index),
            ) else {
                continue;
            };
            self.positions
                .commit(node.key().clone(), current.swapped(), before.swapped());
            committed += 1;
        }
        info!(
            node = session.node().index(),
            moved = committed,
            "committed drag positions"
        );
        DragOutcome::Committed {
            node: session.node(),
            moved: committed,
        }
    }

    /// Abort the gesture and put every moved node back.
    pub fn drag_cancel(&mut self) {
        if let Some(session) = self.drag.take() {
            self.restore(&session);
        }
    }

    fn restore(&mut self, session: &DragSession) {
        for &index in session.moved() {
            if let (Some(position), Some(start)) =
                (self.live.get_mut(&index), session.start_position(index))
            {
                *position = start;
            }
        }
    }

    /// Link geometry with endpoints read from the live node positions.
    pub fn live_links(&self, layout: &TreeLayout) -> Vec<LinkGeometry> {
        layout
            .links()
            .iter()
            .map(|link| LinkGeometry {
                source_point: self.live_position(link.source).unwrap_or(link.source_point),
                target_point: self.live_position(link.target).unwrap_or(link.target_point),
                ..link.clone()
            })
            .collect()
    }
}
