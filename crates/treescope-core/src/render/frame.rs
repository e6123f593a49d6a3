use tracing::debug;

use crate::config::ViewportConfig;
use crate::geometry::Point;
use crate::interaction::{positions::PositionStore, viewport::Viewport};
use crate::layout::engine::{LayoutError, LayoutParams, layout};
use crate::render::scene::{
    Annotation, Arrow, Badge, NodeGlyph, Scene, badge_text, edge_path, node_label,
};
use crate::transition::{Transition, choreography::Stage};
use crate::tree::ids::NodeIndex;
use crate::visibility::flags::NodeState;

const KEPT_CLASS: &str = "node-kept";
const PRUNED_CLASS: &str = "node-pruned";
const SELECTED_CLASS: &str = "node-new-root";

/// Draw the previous tree at the transition's current progress.
///
/// Returns `Ok(None)` for a skipped transition: there is no previous tree to
/// animate. Kept nodes turn green as `HighlightKept` runs, pruned nodes and
/// their edges fade with `FadePruned`, the annotation travels from the old
/// root to the selected node during `MoveAnnotation`, and the arrow grows
/// during `DrawArrow`.
pub fn transition_frame(
    transition: &Transition,
    viewport: &ViewportConfig,
) -> Result<Option<Scene>, LayoutError> {
    let (Some(previous), Some(plan)) = (transition.previous(), transition.plan()) else {
        return Ok(None);
    };

    let all: Vec<NodeIndex> = previous.iter().map(|node| node.index()).collect();
    let params = LayoutParams::from_viewport(viewport);
    let tree_layout = layout(previous, &all, params, &PositionStore::new())?;

    let highlight = transition.stage_progress(Stage::HighlightKept);
    let fade = transition.stage_progress(Stage::FadePruned);
    let pruned_opacity = 1.0 - fade;

    let transform = Viewport::initial_transform(previous.len(), viewport);
    let scale = 1.0 / transform.k;
    let mut scene = Scene::empty(viewport, transform);

    scene.edges = tree_layout
        .links()
        .iter()
        .map(|link| {
            let opacity = if plan.is_kept(link.target) {
                1.0
            } else {
                pruned_opacity
            };
            edge_path(link, opacity)
        })
        .collect();

    for positioned in tree_layout.nodes() {
        let Some(node) = previous.get(positioned.index) else {
            continue;
        };
        let kept = plan.is_kept(positioned.index);
        let class = if positioned.index == plan.selected() && highlight > 0.0 {
            SELECTED_CLASS
        } else if kept && highlight > 0.0 {
            KEPT_CLASS
        } else if kept {
            NodeState::Visible.css_class()
        } else {
            PRUNED_CLASS
        };
        let opacity = if kept { 1.0 } else { pruned_opacity };
        let center = positioned.screen();
        scene.nodes.push(NodeGlyph {
            index: positioned.index,
            key: node.key().clone(),
            center,
            radius: positioned.radius,
            class,
            opacity,
            label: node_label(node),
        });
        if kept && node.depth() > 0 {
            scene.badges.push(Badge {
                index: positioned.index,
                at: center + Point::new(0.0, -(positioned.radius + 4.0 * scale)),
                text: badge_text(node.relative_visits()),
                scale,
            });
        }
    }

    let from = tree_layout
        .screen_position(previous.root_index())
        .unwrap_or(Point::ORIGIN);
    let to = tree_layout
        .screen_position(plan.selected())
        .unwrap_or(from);

    let travel = transition.stage_progress(Stage::MoveAnnotation);
    let annotation_visible = transition.stage_progress(Stage::HighlightKept);
    scene.annotation = Some(Annotation {
        at: from.lerp(to, travel),
        text: "new root".to_string(),
        opacity: annotation_visible,
    });

    let drawn = transition.stage_progress(Stage::DrawArrow);
    if drawn > 0.0 {
        scene.arrow = Some(Arrow {
            from,
            to: from.lerp(to, drawn),
        });
    }

    debug!(
        progress = transition.progress(),
        kept = plan.kept_count(),
        pruned = plan.pruned_count(),
        "built transition frame"
    );
    Ok(Some(scene))
}
