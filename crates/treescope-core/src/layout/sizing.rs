use crate::tree::hierarchy::HierarchyNode;

/// Divisor applied to the square root of a pair's visits before it widens separation.
pub const VISIT_SEPARATION_SCALE: f64 = 100.0;

/// Below this many root visits every node renders near its maximum radius.
pub const LOW_VISIT_THRESHOLD: u64 = 10;

/// Size classes drive spacing so a handful of nodes does not look like a sparse scatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    Tiny,
    Small,
    Normal,
}

/// Spacing and radius settings for one size class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeProfile {
    /// Fraction of the canvas height used for the sibling axis.
    pub vertical_multiplier: f64,
    pub sibling_separation: f64,
    pub cousin_separation: f64,
    pub radius_min: f64,
    pub radius_max: f64,
    /// Whether heavily visited pairs get extra separation.
    pub visit_weighted: bool,
}

impl SizeClass {
    pub fn classify(node_count: usize, max_depth: usize) -> Self {
        if node_count < 20 || max_depth < 2 {
            SizeClass::Tiny
        } else if node_count < 50 || max_depth < 3 {
            SizeClass::Small
        } else {
            SizeClass::Normal
        }
    }

    pub fn profile(self) -> SizeProfile {
        match self {
            SizeClass::Tiny => SizeProfile {
                vertical_multiplier: 0.5,
                sibling_separation: 2.5,
                cousin_separation: 3.0,
                radius_min: 14.0,
                radius_max: 30.0,
                visit_weighted: false,
            },
            SizeClass::Small => SizeProfile {
                vertical_multiplier: 0.8,
                sibling_separation: 1.6,
                cousin_separation: 2.0,
                radius_min: 9.0,
                radius_max: 24.0,
                visit_weighted: true,
            },
            SizeClass::Normal => SizeProfile {
                vertical_multiplier: 1.2,
                sibling_separation: 1.0,
                cousin_separation: 1.5,
                radius_min: 4.0,
                radius_max: 18.0,
                visit_weighted: true,
            },
        }
    }
}

impl SizeProfile {
    /// Relative gap between two neighbouring nodes on one level.
    pub fn separation(&self, a: &HierarchyNode, b: &HierarchyNode) -> f64 {
        let base = if a.parent().is_some() && a.parent() == b.parent() {
            self.sibling_separation
        } else {
            self.cousin_separation
        };
        if !self.visit_weighted {
            return base;
        }
        let visits = a.num_visits().saturating_add(b.num_visits()) as f64;
        base + visits.sqrt() / VISIT_SEPARATION_SCALE
    }

    /// Circle radius from the node's share of root visits, clamped to the class range.
    pub fn node_radius(&self, num_visits: u64, root_visits: u64) -> f64 {
        if root_visits < LOW_VISIT_THRESHOLD {
            return self.radius_max * 0.9;
        }
        let share = (num_visits as f64 / root_visits as f64).clamp(0.0, 1.0);
        let radius = self.radius_min + (self.radius_max - self.radius_min) * share.sqrt();
        radius.clamp(self.radius_min, self.radius_max)
    }
}
