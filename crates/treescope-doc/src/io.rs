use std::{fs, path::Path};

use serde_json::Value;
use tracing::debug;
use treescope_core::{GrowthStep, TreeNode};

use crate::{
    DocumentError,
    schema::{validate_tree, validate_tree_at},
};

/// Validate and deserialize a tree document from JSON text.
pub fn parse_tree_str(json: &str) -> Result<TreeNode, DocumentError> {
    let value: Value = serde_json::from_str(json)?;
    parse_tree_value(value)
}

/// Validate and deserialize an already parsed JSON value.
pub fn parse_tree_value(value: Value) -> Result<TreeNode, DocumentError> {
    validate_tree(&value)?;
    let tree: TreeNode = serde_json::from_value(value)?;
    debug!(nodes = tree.node_count(), "parsed tree document");
    Ok(tree)
}

/// Load a tree document from a JSON file.
pub fn load_tree(path: impl AsRef<Path>) -> Result<TreeNode, DocumentError> {
    let json = fs::read_to_string(path)?;
    parse_tree_str(&json)
}

/// Write a tree document as pretty-printed JSON.
pub fn save_tree(path: impl AsRef<Path>, tree: &TreeNode) -> Result<(), DocumentError> {
    let json = serde_json::to_string_pretty(tree)?;
    fs::write(path, json)?;
    Ok(())
}

/// Parse a JSON array of growth steps (`{ tree, turn, stepNumber, patchNumber }`).
/// Each tree is validated under the path `steps[i].tree`.
pub fn parse_growth_steps(json: &str) -> Result<Vec<GrowthStep>, DocumentError> {
    let value: Value = serde_json::from_str(json)?;
    let steps = value
        .as_array()
        .ok_or_else(|| DocumentError::InvalidField {
            path: "steps".to_string(),
            field: "steps",
            reason: "must be an array".to_string(),
        })?;
    for (i, step) in steps.iter().enumerate() {
        let path = format!("steps[{i}]");
        let tree = step
            .get("tree")
            .ok_or_else(|| DocumentError::MissingField {
                path: path.clone(),
                field: "tree",
            })?;
        validate_tree_at(tree, &format!("{path}.tree"))?;
    }
    let steps: Vec<GrowthStep> = serde_json::from_value(value)?;
    debug!(steps = steps.len(), "parsed growth steps");
    Ok(steps)
}

pub fn load_growth_steps(path: impl AsRef<Path>) -> Result<Vec<GrowthStep>, DocumentError> {
    let json = fs::read_to_string(path)?;
    parse_growth_steps(&json)
}
