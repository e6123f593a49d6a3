use crate::geometry::Point;
use crate::tree::ids::{NodeIndex, NodeKey};
use crate::visibility::flags::NodeFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ToggleChildren,
    ToggleFilterOverride,
    ResetPosition,
    Inspect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenMenu {
    pub node: NodeIndex,
    pub key: NodeKey,
    pub at: Point,
    pub actions: Vec<MenuAction>,
}

/// Context menu state; at most one menu is open.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextMenu {
    open: Option<OpenMenu>,
}

/// What the node's filter situation allows in the menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuContext {
    pub flags: NodeFlags,
    /// The node has children failing the filter, or an override to remove.
    pub filter_relevant: bool,
    pub has_custom_position: bool,
}

impl ContextMenu {
    pub fn open(&mut self, node: NodeIndex, key: NodeKey, at: Point, context: MenuContext) {
        self.open = Some(OpenMenu {
            node,
            key,
            at,
            actions: actions_for(context),
        });
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn current(&self) -> Option<&OpenMenu> {
        self.open.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }
}

pub fn actions_for(context: MenuContext) -> Vec<MenuAction> {
    let mut actions = Vec::new();
    if !context.flags.contains(NodeFlags::LEAF) {
        actions.push(MenuAction::ToggleChildren);
    }
    if context.filter_relevant || context.flags.contains(NodeFlags::FILTERED) {
        actions.push(MenuAction::ToggleFilterOverride);
    }
    if context.has_custom_position {
        actions.push(MenuAction::ResetPosition);
    }
    actions.push(MenuAction::Inspect);
    actions
}
