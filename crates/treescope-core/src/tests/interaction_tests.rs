use crate::interaction::menu::actions_for;
use crate::tests::{assert_close, hierarchy, small_tree};
use crate::{
    ClickAction, DragOutcome, InteractionConfig, InteractionController, InteractionError,
    LayoutParams, MenuAction, MenuContext, NodeFlags, NodeIndex, NodeKey, Point, PositionStore,
    TransformOrigin, Viewport, ViewportConfig, ZoomTransform, interaction::click_action,
    layout::engine::layout,
};

fn rendered(tree: &crate::TreeNode) -> (crate::Hierarchy, crate::TreeLayout, InteractionController) {
    let h = hierarchy(tree);
    let visible: Vec<NodeIndex> = h.iter().map(|node| node.index()).collect();
    let mut controller = InteractionController::new(&InteractionConfig::default());
    let result = layout(
        &h,
        &visible,
        LayoutParams::from_viewport(&ViewportConfig::default()),
        controller.positions(),
    )
    .expect("layout");
    controller.sync_layout(&result);
    (h, result, controller)
}

#[test]
fn drag_moves_the_node_and_its_rendered_descendants() {
    let tree = small_tree();
    let (h, result, mut controller) = rendered(&tree);
    let b = NodeIndex::from(1);
    let d = NodeIndex::from(2);
    let c = NodeIndex::from(3);

    controller.drag_start(b, &h).expect("B is rendered");
    assert_eq!(controller.z_order().last(), Some(&b));
    assert!(controller.drag_move(Point::new(4.0, -2.0)));
    assert!(controller.drag_move(Point::new(6.0, -3.0)));

    let before_d = result.screen_position(d).expect("D placed");
    let live_d = controller.live_position(d).expect("D live");
    assert_close(live_d.x - before_d.x, 10.0);
    assert_close(live_d.y - before_d.y, -5.0);
    assert_eq!(controller.live_position(c), result.screen_position(c));

    // Edges into moved nodes follow the live positions.
    let links = controller.live_links(&result);
    let b_to_d = links
        .iter()
        .find(|link| link.target == d)
        .expect("B-D link");
    assert_eq!(Some(b_to_d.source_point), controller.live_position(b));

    let outcome = controller.drag_end(&h);
    assert_eq!(outcome, DragOutcome::Committed { node: b, moved: 2 });

    for index in [b, d] {
        let key = h.node(index).expect("node").key();
        let stored = controller.positions().get(key).expect("position committed");
        let offset = stored.layout_point().swapped() - stored.original_point().swapped();
        assert_close(offset.x, 10.0);
        assert_close(offset.y, -5.0);
        assert_eq!(
            stored.original_point(),
            result.node(index).expect("placed").layout
        );
    }
    assert!(!controller.positions().contains(h.node(c).expect("C").key()));
}

#[test]
fn short_travel_resolves_as_a_click_and_restores_positions() {
    let tree = small_tree();
    let (h, result, mut controller) = rendered(&tree);
    let b = NodeIndex::from(1);

    controller.drag_start(b, &h).expect("B is rendered");
    controller.drag_move(Point::new(1.0, 1.0));
    assert_eq!(controller.drag_end(&h), DragOutcome::Click { node: b });
    assert!(controller.positions().is_empty());
    assert_eq!(controller.live_position(b), result.screen_position(b));
}

#[test]
fn a_new_drag_cancels_the_previous_one() {
    let tree = small_tree();
    let (h, result, mut controller) = rendered(&tree);
    let b = NodeIndex::from(1);
    let c = NodeIndex::from(3);

    controller.drag_start(b, &h).expect("B is rendered");
    controller.drag_move(Point::new(30.0, 0.0));
    controller.drag_start(c, &h).expect("C is rendered");

    assert_eq!(controller.live_position(b), result.screen_position(b));
    assert_eq!(controller.active_drag().map(|s| s.node()), Some(c));
    assert_eq!(controller.drag_end(&h), DragOutcome::Click { node: c });
    assert_eq!(controller.drag_end(&h), DragOutcome::Idle);
    assert!(!controller.drag_move(Point::new(1.0, 0.0)));
}

#[test]
fn dragging_an_unrendered_node_fails() {
    let tree = small_tree();
    let h = hierarchy(&tree);
    let mut controller = InteractionController::new(&InteractionConfig::default());
    assert_eq!(
        controller.drag_start(NodeIndex::from(1), &h),
        Err(InteractionError::NotRendered {
            index: NodeIndex::from(1)
        })
    );
}

#[test]
fn repeated_commits_keep_the_first_original() {
    let mut store = PositionStore::new();
    let key = NodeKey::from("root-A-0-B");
    store.commit(key.clone(), Point::new(10.0, 10.0), Point::new(1.0, 2.0));
    store.commit(key.clone(), Point::new(20.0, 20.0), Point::new(10.0, 10.0));
    let stored = store.get(&key).expect("stored");
    assert_eq!(stored.layout_point(), Point::new(20.0, 20.0));
    assert_eq!(stored.original_point(), Point::new(1.0, 2.0));
}

#[test]
fn resetting_a_node_drops_its_whole_branch() {
    let tree = small_tree();
    let h = hierarchy(&tree);
    let mut store = PositionStore::new();
    for key in ["root-A-0-B", "root-A-0-B-0-D", "root-A-0-B-3-gone", "root-A-1-C"] {
        store.commit(NodeKey::from(key), Point::ORIGIN, Point::ORIGIN);
    }

    assert_eq!(store.reset_node(NodeIndex::from(1), &h), 3);
    assert_eq!(store.len(), 1);
    assert!(store.contains(&NodeKey::from("root-A-1-C")));
}

#[test]
fn resetting_an_explicit_id_keeps_siblings_whose_ids_share_its_prefix() {
    let tree = crate::TreeNode::new("A", 3, 100.0)
        .with_child(crate::TreeNode::new("B", 2, 66.0).with_id("n"))
        .with_child(crate::TreeNode::new("C", 1, 33.0).with_id("n-1"));
    let h = hierarchy(&tree);
    let mut store = PositionStore::new();
    for key in ["n", "n-1"] {
        store.commit(NodeKey::from(key), Point::ORIGIN, Point::ORIGIN);
    }

    assert_eq!(store.reset_node(NodeIndex::from(1), &h), 1);
    assert!(!store.contains(&NodeKey::from("n")));
    assert!(store.contains(&NodeKey::from("n-1")));
}

#[test]
fn structural_prefix_requires_a_sibling_index_segment() {
    let parent = NodeKey::from("n");
    assert!(parent.is_structural_prefix_of(&NodeKey::from("n-0-B")));
    assert!(parent.is_structural_prefix_of(&NodeKey::from("n-12-")));
    assert!(!parent.is_structural_prefix_of(&NodeKey::from("n-1")));
    assert!(!parent.is_structural_prefix_of(&NodeKey::from("n-x-B")));
    assert!(!parent.is_structural_prefix_of(&NodeKey::from("nn-0-B")));
    assert!(!parent.is_structural_prefix_of(&parent));
}

#[test]
fn click_semantics_depend_on_why_children_are_hidden() {
    assert_eq!(click_action(NodeFlags::LEAF | NodeFlags::VISIBLE, false, false), None);
    assert_eq!(
        click_action(NodeFlags::VISIBLE, false, true),
        Some(ClickAction::ToggleFilterOverride)
    );
    assert_eq!(
        click_action(NodeFlags::VISIBLE, true, true),
        Some(ClickAction::ToggleExpansion)
    );
    assert_eq!(
        click_action(NodeFlags::VISIBLE | NodeFlags::EXPANDED, false, false),
        Some(ClickAction::ToggleExpansion)
    );
}

#[test]
fn menu_actions_follow_node_flags() {
    let leaf = MenuContext {
        flags: NodeFlags::VISIBLE | NodeFlags::LEAF,
        ..MenuContext::default()
    };
    assert_eq!(actions_for(leaf), vec![MenuAction::Inspect]);

    let busy = MenuContext {
        flags: NodeFlags::VISIBLE | NodeFlags::HAS_HIDDEN_CHILDREN,
        filter_relevant: true,
        has_custom_position: true,
    };
    assert_eq!(
        actions_for(busy),
        vec![
            MenuAction::ToggleChildren,
            MenuAction::ToggleFilterOverride,
            MenuAction::ResetPosition,
            MenuAction::Inspect,
        ]
    );
}

#[test]
fn initial_zoom_shrinks_with_node_count() {
    let viewport = ViewportConfig::default();
    let small = Viewport::initial_transform(10, &viewport);
    assert_eq!(
        small,
        ZoomTransform {
            x: 80.0,
            y: 0.0,
            k: 1.0
        }
    );

    let large = Viewport::initial_transform(100, &viewport);
    assert_close(large.k, 0.7);
    assert_close(large.x, 56.0);
    assert_close(large.y, 120.0);
    assert_close(Viewport::initial_transform(1000, &viewport).k, 0.35);
}

#[test]
fn only_user_transforms_become_the_baseline() {
    let config = InteractionConfig::default();
    let viewport = ViewportConfig::default();
    let mut view = Viewport::new(&config);

    let first = view.establish(10, &viewport);
    assert_eq!(view.baseline(), None);
    assert_eq!(view.current(), first);

    view.set_transform(
        ZoomTransform {
            x: 5.0,
            y: 5.0,
            k: 2.0,
        },
        TransformOrigin::Programmatic,
    );
    assert_eq!(view.baseline(), None);

    view.pan(Point::new(10.0, -4.0));
    let saved = view.current();
    assert_eq!(saved, ZoomTransform { x: 15.0, y: 1.0, k: 2.0 });
    assert_eq!(view.baseline(), Some(saved));

    // A later render with a different node count reuses the user's transform.
    assert_eq!(view.establish(400, &viewport), saved);
    assert_close(view.overlay_scale(), 0.5);

    view.reset();
    assert_eq!(view.establish(10, &viewport), first);
}

#[test]
fn zoom_keeps_the_focus_point_fixed_and_clamps() {
    let config = InteractionConfig::default();
    let mut view = Viewport::new(&config);
    let focus = Point::new(300.0, 200.0);
    let anchor = view.current().invert(focus);

    view.zoom_at(focus, 2.0);
    let after = view.current().apply(anchor);
    assert_close(after.x, focus.x);
    assert_close(after.y, focus.y);
    assert_close(view.current().k, 2.0);

    view.zoom_at(focus, 100.0);
    assert_close(view.current().k, config.max_zoom);
    view.zoom_at(focus, -1.0);
    assert_close(view.current().k, config.max_zoom);
}

#[test]
fn position_store_serializes_as_a_key_map() {
    let mut store = PositionStore::new();
    store.commit(
        NodeKey::from("root-A"),
        Point::new(1.5, 2.0),
        Point::new(0.0, 0.0),
    );
    let json = store.to_json().expect("serializes");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(
        value,
        serde_json::json!({
            "root-A": { "x": 1.5, "y": 2.0, "originalX": 0.0, "originalY": 0.0 }
        })
    );
    assert_eq!(PositionStore::from_json(&json).expect("parses"), store);
}
