mod interaction_tests;
mod property_visibility_tests;
mod transition_tests;
mod view_tests;

use serde_json::json;

use crate::{Hierarchy, IdentityConfig, TreeNode};

/// `A(10) -> [B(6, 60%), C(4, 40%)]`.
pub(crate) fn two_children() -> TreeNode {
    serde_json::from_value(json!({
        "state": "A",
        "statistics": { "numVisits": 10, "relativeVisits": 100 },
        "children": [
            { "state": "B", "statistics": { "numVisits": 6, "relativeVisits": 60 }, "children": [] },
            { "state": "C", "statistics": { "numVisits": 4, "relativeVisits": 40 }, "children": [] }
        ]
    }))
    .expect("fixture should deserialize")
}

/// `A -> [B -> [D], C -> [E]]`; preorder A=0, B=1, D=2, C=3, E=4.
pub(crate) fn small_tree() -> TreeNode {
    TreeNode::new("A", 20, 100.0)
        .with_child(TreeNode::new("B", 12, 60.0).with_child(TreeNode::new("D", 5, 40.0)))
        .with_child(TreeNode::new("C", 8, 40.0).with_child(TreeNode::new("E", 2, 25.0)))
}

/// `R -> [A -> [A1 -> [A1a], A2], B -> [B1]]`; preorder R=0, A=1, A1=2, A1a=3, A2=4, B=5, B1=6.
pub(crate) fn turn_tree() -> TreeNode {
    TreeNode::new("R", 100, 100.0)
        .with_child(
            TreeNode::new("A", 70, 70.0)
                .with_child(TreeNode::new("A1", 50, 71.0).with_child(TreeNode::new("A1a", 20, 40.0)))
                .with_child(TreeNode::new("A2", 20, 29.0)),
        )
        .with_child(TreeNode::new("B", 30, 30.0).with_child(TreeNode::new("B1", 30, 100.0)))
}

pub(crate) fn hierarchy(tree: &TreeNode) -> Hierarchy {
    Hierarchy::build(tree, &IdentityConfig::default()).expect("hierarchy should build")
}

/// Build a tree from `(parent selector, relative visits)` pairs: node `i + 1`
/// hangs below node `selector % (i + 1)`.
pub(crate) fn tree_from_parents(parents: &[(usize, u8)]) -> TreeNode {
    let count = parents.len() + 1;
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut relative = vec![100.0; count];
    for (i, (selector, pct)) in parents.iter().enumerate() {
        let node = i + 1;
        children[selector % node].push(node);
        relative[node] = f64::from(pct % 101);
    }

    fn build(node: usize, children: &[Vec<usize>], relative: &[f64]) -> TreeNode {
        let mut tree = TreeNode::new(format!("s{node}"), 1 + relative[node] as u64, relative[node]);
        for &child in &children[node] {
            tree.children.push(build(child, children, relative));
        }
        tree
    }

    build(0, &children, &relative)
}

pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
