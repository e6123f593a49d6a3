use crate::tests::{assert_close, small_tree, two_children};
use crate::{
    DragOutcome, ExpansionChange, FilterSettings, MenuAction, NodeIndex, NodePath, Point,
    RenderOutcome, TreeError, TreeView, ViewChange, ViewConfig, ViewError,
};

fn loaded(tree: crate::TreeNode) -> TreeView {
    let mut view = TreeView::new(ViewConfig::default()).expect("valid config");
    view.load(tree).expect("tree loads");
    view
}

#[test]
fn drag_commits_the_node_and_its_child() {
    let mut view = loaded(small_tree());
    view.render().expect("render succeeds");
    let before = view.layout().expect("layout");
    let b = NodeIndex::from(1);
    let d = NodeIndex::from(2);

    view.drag_start(b).expect("B is rendered");
    view.drag_move(Point::new(10.0, -5.0));
    let (outcome, change) = view.drag_end().expect("drag ends");
    assert_eq!(outcome, DragOutcome::Committed { node: b, moved: 2 });
    assert_eq!(change, ViewChange::Unchanged);

    let positions = view.interaction().positions();
    assert_eq!(positions.len(), 2);
    let after = view.layout().expect("layout");
    for index in [b, d] {
        let old = before.screen_position(index).expect("placed before");
        let new = after.screen_position(index).expect("placed after");
        assert_close(new.x - old.x, 10.0);
        assert_close(new.y - old.y, -5.0);
    }

    // A second render keeps the committed positions.
    view.render().expect("render succeeds");
    assert_eq!(view.layout().expect("layout"), after);

    assert_eq!(view.reset_node_position(b), Ok(2));
    assert_eq!(view.layout().expect("layout"), before);
}

#[test]
fn short_drag_acts_as_a_click() {
    let mut view = loaded(small_tree());
    view.render().expect("render succeeds");
    view.drag_start(NodeIndex::from(1)).expect("B is rendered");
    view.drag_move(Point::new(0.5, 0.5));

    let (outcome, change) = view.drag_end().expect("drag ends");
    assert_eq!(
        outcome,
        DragOutcome::Click {
            node: NodeIndex::from(1)
        }
    );
    assert_eq!(change, ViewChange::Expansion(ExpansionChange::Collapsed));
    assert!(view.interaction().positions().is_empty());
    assert_eq!(view.should_show_node(NodeIndex::from(2)), Ok(false));
}

#[test]
fn clicking_a_filtered_parent_toggles_its_override() {
    let mut view = loaded(two_children());
    view.apply_filters(FilterSettings::default().with_depth_filter(1, 50.0))
        .expect("filters apply");
    let c = NodeIndex::from(2);
    assert_eq!(view.should_show_node(c), Ok(false));

    assert_eq!(view.click(NodeIndex::from(0)), Ok(ViewChange::Override(true)));
    assert_eq!(view.should_show_node(c), Ok(true));
    assert_eq!(view.click(NodeIndex::from(0)), Ok(ViewChange::Override(false)));
    assert_eq!(view.should_show_node(c), Ok(false));

    assert_eq!(view.click(NodeIndex::from(1)), Ok(ViewChange::Unchanged));
}

#[test]
fn context_menu_runs_actions_on_its_node() {
    let mut view = loaded(small_tree());
    view.render().expect("render succeeds");
    let e = NodeIndex::from(4);

    let menu = view
        .open_context_menu(e, Point::new(5.0, 5.0))
        .expect("menu opens");
    assert_eq!(menu.actions, vec![MenuAction::Inspect]);
    assert_eq!(
        view.run_menu_action(MenuAction::Inspect),
        Ok(ViewChange::Inspect("1-0".parse::<NodePath>().expect("path")))
    );
    assert!(!view.interaction().menu().is_open());
    assert_eq!(
        view.run_menu_action(MenuAction::Inspect),
        Err(ViewError::NoMenu)
    );

    view.open_context_menu(NodeIndex::from(3), Point::ORIGIN)
        .expect("menu opens");
    assert_eq!(
        view.run_menu_action(MenuAction::ToggleChildren),
        Ok(ViewChange::Expansion(ExpansionChange::Collapsed))
    );
    assert_eq!(view.should_show_node(e), Ok(false));
}

#[test]
fn deep_links_resolve_through_the_view() {
    let view = loaded(small_tree());
    assert_eq!(view.node_at_path("0-0"), Ok(NodeIndex::from(2)));
    assert_eq!(view.node_at_path(""), Ok(NodeIndex::from(0)));
    assert_eq!(
        view.node_at_path("2"),
        Err(ViewError::Tree(TreeError::PathOutOfRange {
            depth: 0,
            child_index: 2,
            available: 2,
        }))
    );
}

#[test]
fn render_failures_become_an_error_panel() {
    let mut empty = TreeView::new(ViewConfig::default()).expect("valid config");
    match empty.render_or_panel() {
        RenderOutcome::Error(panel) => {
            assert_eq!(panel.message, "no tree is loaded");
            assert_eq!(panel.reset_label, "Reset view");
        }
        RenderOutcome::Scene(_) => panic!("nothing to render"),
    }
}

#[test]
fn views_reject_invalid_configs() {
    let mut config = ViewConfig::default();
    config.viewport.height = 0.0;
    assert_eq!(
        TreeView::new(config).err(),
        Some(ViewError::Config(
            "invalid view config: viewport.height must be finite and > 0".to_string()
        ))
    );

    let mut config = ViewConfig::default();
    config.identity.state_prefix_len = 0;
    assert!(matches!(TreeView::new(config), Err(ViewError::Config(_))));

    let mut config = ViewConfig::default();
    config.interaction.min_zoom = config.interaction.max_zoom;
    assert!(matches!(TreeView::new(config), Err(ViewError::Config(_))));
}

#[test]
fn loading_a_new_tree_starts_a_fresh_session() {
    let mut view = loaded(small_tree());
    view.render().expect("render succeeds");
    view.toggle_node_expansion(NodeIndex::from(1)).expect("B");
    view.drag_start(NodeIndex::from(3)).expect("C is rendered");
    view.drag_move(Point::new(20.0, 0.0));
    view.drag_end().expect("drag ends");
    view.interaction_mut()
        .viewport_mut()
        .pan(Point::new(3.0, 3.0));

    // Refreshing the same session keeps everything.
    view.refresh(small_tree()).expect("tree refreshes");
    assert!(!view.filters().hidden_children_ids().is_empty());
    assert!(!view.interaction().positions().is_empty());
    assert!(view.interaction().viewport().baseline().is_some());

    view.load(small_tree()).expect("tree loads");
    assert!(view.filters().hidden_children_ids().is_empty());
    assert!(view.interaction().positions().is_empty());
    assert!(view.interaction().viewport().baseline().is_none());
}

#[test]
fn reset_view_clears_session_state() {
    let mut view = loaded(two_children());
    view.apply_filters(FilterSettings::default().with_depth_filter(1, 50.0))
        .expect("filters apply");
    view.render().expect("render succeeds");
    view.drag_start(NodeIndex::from(1)).expect("B is rendered");
    view.drag_move(Point::new(0.0, 40.0));
    view.drag_end().expect("drag ends");

    view.reset_view();
    assert!(!view.filters().is_filters_applied());
    assert!(view.interaction().positions().is_empty());
    assert_eq!(view.visibility().expect("loaded").visible_count(), 3);
}
