pub mod config;
mod geometry;
pub mod interaction;
pub mod layout;
pub mod render;
pub mod transition;
pub mod tree;
mod view;
pub mod visibility;

#[cfg(test)]
mod tests;

pub use config::{
    IdentityConfig, InteractionConfig, TransitionConfig, ViewConfig, ViewConfigError,
    ViewportConfig,
};
pub use geometry::{Point, horizontal_link_path};
pub use interaction::{
    ClickAction, InteractionController, InteractionError,
    drag::{DragOutcome, DragSession},
    menu::{ContextMenu, MenuAction, MenuContext, OpenMenu},
    positions::{CustomPosition, PositionStore},
    viewport::{TransformOrigin, Viewport, ZoomTransform},
};
pub use layout::engine::{LayoutError, LayoutParams, LinkGeometry, PositionedNode, TreeLayout};
pub use layout::sizing::{SizeClass, SizeProfile};
pub use render::{Scene, build_scene, transition_frame};
pub use transition::{
    TickResult, Transition, TransitionError, TransitionPhase,
    animation::{AnimationTask, Clock, ManualClock, SystemClock, TickHandle},
    choreography::Stage,
    plan::{MatchKind, TransitionPlan, plan_transition},
    timeline::{GrowthTimeline, StepChange},
};
pub use tree::document::{ActionStatistics, GrowthStep, RoleActions, Statistics, TreeNode};
pub use tree::error::TreeError;
pub use tree::hierarchy::{Hierarchy, HierarchyNode, backfill_ids};
pub use tree::ids::{NodeIndex, NodeKey};
pub use tree::path::NodePath;
pub use view::{ErrorPanel, RenderOutcome, TreeView, ViewChange, ViewError};
pub use visibility::filters::{FilterError, FilterSettings};
pub use visibility::flags::{NodeFlags, NodeState};
pub use visibility::state::{ExpansionChange, FilterState, Visibility};
