use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tree::hierarchy::HierarchyNode;

/// Percentage and depth filters, either as a draft or as the committed generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSettings {
    /// Nodes deeper than this are filtered out.
    pub max_depth: Option<usize>,
    /// Minimum relative-visit percentage per depth; 0 disables the depth.
    pub depth_filters: BTreeMap<usize, f64>,
}

impl FilterSettings {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_depth_filter(mut self, depth: usize, min_percentage: f64) -> Self {
        self.depth_filters.insert(depth, min_percentage);
        self
    }

    /// Active threshold at `depth`, if any.
    pub fn threshold_at(&self, depth: usize) -> Option<f64> {
        self.depth_filters
            .get(&depth)
            .copied()
            .filter(|threshold| *threshold > 0.0)
    }

    /// Whether `node` fails the depth cutoff or its depth's percentage threshold.
    pub fn rejects(&self, node: &HierarchyNode) -> bool {
        if self.exceeds_max_depth(node.depth()) {
            return true;
        }
        match self.threshold_at(node.depth()) {
            Some(threshold) => node.relative_visits() < threshold,
            None => false,
        }
    }

    pub fn exceeds_max_depth(&self, depth: usize) -> bool {
        self.max_depth.is_some_and(|max| depth > max)
    }

    /// No cutoff and no active threshold.
    pub fn is_noop(&self) -> bool {
        self.max_depth.is_none() && self.depth_filters.values().all(|t| *t <= 0.0)
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        for (&depth, &threshold) in &self.depth_filters {
            if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
                return Err(FilterError::InvalidThreshold { depth, threshold });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("threshold {threshold} at depth {depth} must be a percentage in [0, 100]")]
    InvalidThreshold { depth: usize, threshold: f64 },
}
