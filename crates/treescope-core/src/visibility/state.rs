use std::collections::HashSet;

use tracing::{debug, info};

use crate::tree::{
    error::TreeError,
    hierarchy::{Hierarchy, HierarchyNode},
    ids::{NodeIndex, NodeKey},
};
use crate::visibility::{
    filters::{FilterError, FilterSettings},
    flags::NodeFlags,
};

/// Outcome of `FilterState::toggle_node_expansion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionChange {
    Collapsed,
    Expanded,
}

/// Session-scoped hide/filter/override state for one tree view.
///
/// Committed filters only take effect after `apply_filters`; overrides belong to
/// one filter generation and are cleared whenever filters are re-applied.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    draft: FilterSettings,
    applied: FilterSettings,
    is_filters_applied: bool,
    hidden_children: HashSet<NodeKey>,
    filtered_children: HashSet<NodeKey>,
    override_filter: HashSet<NodeKey>,
}

/// Per-node visibility and flags for one hierarchy, indexed by arena slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Visibility {
    flags: Vec<NodeFlags>,
    visible: Vec<NodeIndex>,
}

impl Visibility {
    pub fn is_visible(&self, index: NodeIndex) -> bool {
        self.flags(index).contains(NodeFlags::VISIBLE)
    }

    pub fn flags(&self, index: NodeIndex) -> NodeFlags {
        self.flags.get(index.index()).copied().unwrap_or_default()
    }

    /// Visible nodes in preorder. Closed under ancestors.
    pub fn visible_nodes(&self) -> &[NodeIndex] {
        &self.visible
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &FilterSettings {
        &self.draft
    }

    /// Editable draft; has no effect until `apply_draft`.
    pub fn draft_mut(&mut self) -> &mut FilterSettings {
        &mut self.draft
    }

    pub fn applied(&self) -> &FilterSettings {
        &self.applied
    }

    pub fn is_filters_applied(&self) -> bool {
        self.is_filters_applied
    }

    pub fn hidden_children_ids(&self) -> &HashSet<NodeKey> {
        &self.hidden_children
    }

    pub fn filtered_children_ids(&self) -> &HashSet<NodeKey> {
        &self.filtered_children
    }

    pub fn override_filter_ids(&self) -> &HashSet<NodeKey> {
        &self.override_filter
    }

    pub fn is_hidden(&self, key: &NodeKey) -> bool {
        self.hidden_children.contains(key)
    }

    pub fn has_override(&self, key: &NodeKey) -> bool {
        self.override_filter.contains(key)
    }

    /// Whether `key` has a child failing the committed filter.
    pub fn is_filtered(&self, key: &NodeKey) -> bool {
        self.filtered_children.contains(key)
    }

    /// Commit `settings` as the active filter generation.
    pub fn apply_filters(
        &mut self,
        settings: FilterSettings,
        hierarchy: &Hierarchy,
    ) -> Result<(), FilterError> {
        settings.validate()?;
        self.draft = settings.clone();
        self.applied = settings;
        self.is_filters_applied = true;
        self.override_filter.clear();
        self.recompute_filtered(hierarchy);
        info!(
            max_depth = ?self.applied.max_depth,
            depth_filters = self.applied.depth_filters.len(),
            filtered = self.filtered_children.len(),
            "filters applied"
        );
        Ok(())
    }

    /// Commit the current draft.
    pub fn apply_draft(&mut self, hierarchy: &Hierarchy) -> Result<(), FilterError> {
        self.apply_filters(self.draft.clone(), hierarchy)
    }

    /// Drop filters, manual hides, filtered markers and overrides together.
    pub fn reset_filters(&mut self) {
        *self = FilterState::default();
        info!("filters reset");
    }

    /// Rebuild `filtered_children_ids` over the whole tree, e.g. after new data arrives.
    pub fn recompute_filtered(&mut self, hierarchy: &Hierarchy) {
        self.filtered_children.clear();
        if !self.is_filters_applied {
            return;
        }
        for node in hierarchy.iter() {
            if hierarchy
                .children_of(node.index())
                .any(|child| self.applied.rejects(child))
            {
                self.filtered_children.insert(node.key().clone());
            }
        }
        debug!(filtered = self.filtered_children.len(), "recomputed filtered set");
    }

    /// Whether the committed filter rejects `node` itself.
    pub fn rejects(&self, node: &HierarchyNode) -> bool {
        self.is_filters_applied && self.applied.rejects(node)
    }

    /// Hide or show the children of `index`.
    ///
    /// Symmetric: hiding adds the node and every descendant key, showing removes
    /// the node and every descendant key. Grandchildren hidden independently are
    /// shown again too.
    pub fn toggle_node_expansion(
        &mut self,
        index: NodeIndex,
        hierarchy: &Hierarchy,
    ) -> Result<ExpansionChange, TreeError> {
        let node = hierarchy.node(index)?;
        let change = if self.hidden_children.remove(node.key()) {
            for descendant in hierarchy.descendants(index) {
                self.hidden_children.remove(descendant.key());
            }
            ExpansionChange::Expanded
        } else {
            self.hidden_children.insert(node.key().clone());
            for descendant in hierarchy.descendants(index) {
                self.hidden_children.insert(descendant.key().clone());
            }
            ExpansionChange::Collapsed
        };
        debug!(key = %node.key(), ?change, "toggled expansion");
        Ok(change)
    }

    /// Flip the filter override on `index`. Removing an override also removes
    /// every override below it. Returns whether the override is now active.
    pub fn toggle_filter_override(
        &mut self,
        index: NodeIndex,
        hierarchy: &Hierarchy,
    ) -> Result<bool, TreeError> {
        let node = hierarchy.node(index)?;
        if self.override_filter.remove(node.key()) {
            for descendant in hierarchy.descendants(index) {
                self.override_filter.remove(descendant.key());
            }
            debug!(key = %node.key(), "override removed");
            Ok(false)
        } else {
            self.override_filter.insert(node.key().clone());
            debug!(key = %node.key(), "override added");
            Ok(true)
        }
    }

    /// Whether `child` may be shown given its direct parent.
    fn edge_passes(&self, parent: &HierarchyNode, child: &HierarchyNode) -> bool {
        let parent_override = self.override_filter.contains(parent.key());
        if self.hidden_children.contains(parent.key()) && !parent_override {
            return false;
        }
        if self.rejects(child) && !parent_override && !self.override_filter.contains(child.key())
        {
            return false;
        }
        true
    }

    /// Walk from `index` to the root; the first unmitigated hide or filter hides the node.
    pub fn should_show_node(
        &self,
        index: NodeIndex,
        hierarchy: &Hierarchy,
    ) -> Result<bool, TreeError> {
        let bound = hierarchy.len();
        let mut current = hierarchy.node(index)?;
        let mut steps = 0;
        while let Some(parent_index) = current.parent() {
            let parent = hierarchy.node(parent_index)?;
            if !self.edge_passes(parent, current) {
                return Ok(false);
            }
            steps += 1;
            if steps > bound {
                return Err(TreeError::CyclicParentChain { start: index, bound });
            }
            current = parent;
        }
        Ok(true)
    }

    /// Compute visibility and flags for every node in one preorder pass.
    pub fn evaluate(&self, hierarchy: &Hierarchy) -> Visibility {
        let mut flags = vec![NodeFlags::empty(); hierarchy.len()];
        let mut visible = Vec::new();

        for node in hierarchy.iter() {
            let slot = node.index().index();
            let shown = match node.parent() {
                None => true,
                Some(parent) => {
                    let parent_shown = flags
                        .get(parent.index())
                        .is_some_and(|f| f.contains(NodeFlags::VISIBLE));
                    parent_shown
                        && hierarchy
                            .get(parent)
                            .is_some_and(|parent| self.edge_passes(parent, node))
                }
            };

            let mut node_flags = self.own_flags(node);
            if shown {
                node_flags |= NodeFlags::VISIBLE;
                visible.push(node.index());
            } else {
                node_flags |= NodeFlags::PARENT_HIDDEN;
            }
            flags[slot] = node_flags;
        }

        debug!(
            visible = visible.len(),
            total = hierarchy.len(),
            "evaluated visibility"
        );
        Visibility { flags, visible }
    }

    /// Flags that depend only on the node and the filter state, not on ancestors.
    fn own_flags(&self, node: &HierarchyNode) -> NodeFlags {
        let mut flags = NodeFlags::empty();
        let key = node.key();
        let overridden = self.override_filter.contains(key);
        if overridden {
            flags |= NodeFlags::OVERRIDDEN;
        }
        if self.rejects(node) {
            flags |= NodeFlags::FILTERED;
        }
        if !node.has_children() {
            return flags | NodeFlags::LEAF;
        }

        let manually_hidden = self.hidden_children.contains(key);
        let filtered = self.filtered_children.contains(key);
        if manually_hidden || (filtered && !overridden) {
            flags |= NodeFlags::HAS_HIDDEN_CHILDREN;
        }
        if filtered
            && !overridden
            && !manually_hidden
            && self.applied.exceeds_max_depth(node.depth() + 1)
        {
            flags |= NodeFlags::DEPTH_LIMITED;
        }
        if !manually_hidden && (!filtered || overridden) {
            flags |= NodeFlags::EXPANDED;
        }
        flags
    }
}
