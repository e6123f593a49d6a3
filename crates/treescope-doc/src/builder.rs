use treescope_core::{
    ActionStatistics, Hierarchy, IdentityConfig, NodePath, RoleActions, TreeError, TreeNode,
};

use crate::DocumentError;

#[derive(Debug, Clone)]
/// Programmatic construction of tree documents, addressed by node paths.
///
/// Relative visits are derived from the parent's visit count when a child is added.
pub struct TreeBuilder {
    root: TreeNode,
}

impl TreeBuilder {
    /// Start a tree whose root holds `num_visits` visits.
    pub fn new(state: impl Into<String>, num_visits: u64) -> Self {
        TreeBuilder {
            root: TreeNode::new(state, num_visits, 100.0),
        }
    }

    /// Append a child below the node at `parent` (e.g. `""` for the root, `"0-1"`).
    pub fn add_child(
        &mut self,
        parent: &str,
        state: impl Into<String>,
        num_visits: u64,
    ) -> Result<&mut Self, DocumentError> {
        let parent = self.node_mut(parent)?;
        let relative = if parent.statistics.num_visits == 0 {
            0.0
        } else {
            (num_visits as f64 / parent.statistics.num_visits as f64 * 100.0).min(100.0)
        };
        parent
            .children
            .push(TreeNode::new(state, num_visits, relative));
        Ok(self)
    }

    /// Give the node at `path` an explicit id.
    pub fn set_id(&mut self, path: &str, id: impl Into<String>) -> Result<&mut Self, DocumentError> {
        self.node_mut(path)?.id = Some(id.into());
        Ok(self)
    }

    /// Mark the node at `path` as produced by a playout.
    pub fn mark_playout(&mut self, path: &str) -> Result<&mut Self, DocumentError> {
        self.node_mut(path)?.is_playout = true;
        Ok(self)
    }

    /// Record usage statistics of `action` for `role` on the node at `path`.
    pub fn add_action_stats(
        &mut self,
        path: &str,
        role: impl Into<String>,
        action: impl Into<String>,
        average_action_score: f64,
        action_num_used: u64,
    ) -> Result<&mut Self, DocumentError> {
        if !average_action_score.is_finite() {
            return Err(DocumentError::InvalidField {
                path: path.to_string(),
                field: "averageActionScore",
                reason: "must be finite".to_string(),
            });
        }
        let role = role.into();
        let statistics = &mut self.node_mut(path)?.statistics;
        let entry = match statistics
            .statistics_for_actions
            .iter()
            .position(|r| r.role == role)
        {
            Some(slot) => &mut statistics.statistics_for_actions[slot],
            None => {
                statistics.statistics_for_actions.push(RoleActions {
                    role,
                    actions: Vec::new(),
                });
                let last = statistics.statistics_for_actions.len() - 1;
                &mut statistics.statistics_for_actions[last]
            }
        };
        entry.actions.push(ActionStatistics {
            action: action.into(),
            average_action_score,
            action_num_used,
        });
        Ok(self)
    }

    /// Finish the tree, rejecting duplicated explicit ids.
    pub fn build(&self) -> Result<TreeNode, DocumentError> {
        Hierarchy::build(&self.root, &IdentityConfig::default())?;
        Ok(self.root.clone())
    }

    fn node_mut(&mut self, path: &str) -> Result<&mut TreeNode, DocumentError> {
        let path: NodePath = path.parse()?;
        let mut current = &mut self.root;
        for (depth, &child_index) in path.segments().iter().enumerate() {
            let available = current.children.len();
            current = current
                .children
                .get_mut(child_index)
                .ok_or(TreeError::PathOutOfRange {
                    depth,
                    child_index,
                    available,
                })?;
        }
        Ok(current)
    }
}
