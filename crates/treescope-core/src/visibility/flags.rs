use bitflags::bitflags;

bitflags! {
    /// Everything the visibility engine knows about one node.
    #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Shown in the current view.
        const VISIBLE             = 1 << 0;
        /// Children are shown.
        const EXPANDED            = 1 << 1;
        /// Some children are withheld, manually or by the filter.
        const HAS_HIDDEN_CHILDREN = 1 << 2;
        /// Children are withheld because of the max-depth cutoff.
        const DEPTH_LIMITED       = 1 << 3;
        /// The node itself fails the committed filter.
        const FILTERED            = 1 << 4;
        /// An ancestor withholds this node.
        const PARENT_HIDDEN       = 1 << 5;
        /// A filter override is active on this node.
        const OVERRIDDEN          = 1 << 6;
        /// The node has no children at all.
        const LEAF                = 1 << 7;
    }
}

/// Single render-priority state derived from `NodeFlags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    Visible,
    Expanded,
    HasHiddenChildren,
    DepthLimited,
    Filtered,
    ParentHidden,
}

impl NodeFlags {
    pub fn primary_state(self) -> NodeState {
        if self.contains(NodeFlags::PARENT_HIDDEN) || !self.contains(NodeFlags::VISIBLE) {
            NodeState::ParentHidden
        } else if self.contains(NodeFlags::LEAF) {
            NodeState::Visible
        } else if self.contains(NodeFlags::DEPTH_LIMITED) {
            NodeState::DepthLimited
        } else if self.contains(NodeFlags::HAS_HIDDEN_CHILDREN) {
            NodeState::HasHiddenChildren
        } else if self.contains(NodeFlags::FILTERED) {
            NodeState::Filtered
        } else if self.contains(NodeFlags::EXPANDED) {
            NodeState::Expanded
        } else {
            NodeState::Visible
        }
    }
}

impl NodeState {
    /// Class name used by the rendering adapter.
    pub fn css_class(self) -> &'static str {
        match self {
            NodeState::Visible => "node-visible",
            NodeState::Expanded => "node-expanded",
            NodeState::HasHiddenChildren => "node-collapsed",
            NodeState::DepthLimited => "node-depth-limited",
            NodeState::Filtered => "node-filtered",
            NodeState::ParentHidden => "node-hidden",
        }
    }
}
