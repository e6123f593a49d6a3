use serde::{Deserialize, Serialize};

/// One game state of an externally produced MCTS tree, as found in the input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub state: String,
    pub statistics: Statistics,
    #[serde(default)]
    pub children: Vec<TreeNode>,
    #[serde(default)]
    pub is_playout: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub num_visits: u64,
    /// Visit share in percent, `[0, 100]`.
    pub relative_visits: f64,
    #[serde(default)]
    pub statistics_for_actions: Vec<RoleActions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleActions {
    pub role: String,
    pub actions: Vec<ActionStatistics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionStatistics {
    pub action: String,
    pub average_action_score: f64,
    pub action_num_used: u64,
}

impl TreeNode {
    /// Create a childless node with the given visit statistics.
    pub fn new(state: impl Into<String>, num_visits: u64, relative_visits: f64) -> Self {
        TreeNode {
            state: state.into(),
            statistics: Statistics {
                num_visits,
                relative_visits,
                statistics_for_actions: Vec::new(),
            },
            children: Vec::new(),
            is_playout: false,
            id: None,
        }
    }

    /// Builder-style helper attaching an explicit id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder-style helper appending a child.
    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    /// Count all nodes in this subtree without recursion.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

impl Statistics {
    /// The action with the most uses for a role, ties resolved by first occurrence.
    pub fn most_used_action(&self, role: &str) -> Option<&ActionStatistics> {
        let role = self.statistics_for_actions.iter().find(|r| r.role == role)?;
        let mut best: Option<&ActionStatistics> = None;
        for action in &role.actions {
            best = match best {
                Some(current) if current.action_num_used >= action.action_num_used => {
                    Some(current)
                }
                _ => Some(action),
            };
        }
        best
    }
}

/// One snapshot of tree growth during a turn, as served by the session API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthStep {
    pub tree: TreeNode,
    pub turn: u32,
    pub step_number: u32,
    #[serde(default)]
    pub patch_number: u32,
}
