use proptest::prelude::*;

use crate::tests::{hierarchy, tree_from_parents};
use crate::{FilterSettings, FilterState, Hierarchy, NodeIndex, TreeNode};

#[derive(Debug, Clone)]
struct Scenario {
    tree: TreeNode,
    threshold: Option<(usize, u8)>,
    max_depth: Option<usize>,
    hides: Vec<usize>,
    overrides: Vec<usize>,
}

fn scenario() -> impl Strategy<Value = Scenario> {
    (
        proptest::collection::vec((0usize..64, 0u8..=100), 0..30),
        proptest::option::of((1usize..4, 0u8..=100)),
        proptest::option::of(0usize..4),
        proptest::collection::vec(0usize..64, 0..4),
        proptest::collection::vec(0usize..64, 0..4),
    )
        .prop_map(|(parents, threshold, max_depth, hides, overrides)| Scenario {
            tree: tree_from_parents(&parents),
            threshold,
            max_depth,
            hides,
            overrides,
        })
}

fn settings(scenario: &Scenario) -> FilterSettings {
    let mut settings = FilterSettings::default();
    if let Some((depth, pct)) = scenario.threshold {
        settings = settings.with_depth_filter(depth, f64::from(pct));
    }
    settings.max_depth = scenario.max_depth;
    settings
}

fn prepare(scenario: &Scenario, h: &Hierarchy) -> FilterState {
    let mut state = FilterState::new();
    state.apply_filters(settings(scenario), h).expect("filters apply");
    for pick in &scenario.hides {
        let index = NodeIndex::from(pick % h.len());
        state.toggle_node_expansion(index, h).expect("node exists");
    }
    for pick in &scenario.overrides {
        let index = NodeIndex::from(pick % h.len());
        state.toggle_filter_override(index, h).expect("node exists");
    }
    state
}

proptest! {
    #[test]
    fn single_pass_agrees_with_the_ancestor_walk(scenario in scenario()) {
        let h = hierarchy(&scenario.tree);
        let state = prepare(&scenario, &h);
        let visibility = state.evaluate(&h);
        for node in h.iter() {
            let walked = state.should_show_node(node.index(), &h).expect("walk succeeds");
            prop_assert_eq!(visibility.is_visible(node.index()), walked);
        }
        // Visible set is closed under ancestors.
        for &index in visibility.visible_nodes() {
            if let Some(parent) = h.parent_of(index) {
                prop_assert!(visibility.is_visible(parent.index()));
            }
        }
    }

    #[test]
    fn hidden_ancestor_without_override_hides_the_subtree(scenario in scenario()) {
        let h = hierarchy(&scenario.tree);
        let state = prepare(&scenario, &h);
        let visibility = state.evaluate(&h);
        for node in h.iter() {
            let hidden = state.is_hidden(node.key());
            if !hidden {
                continue;
            }
            for descendant in h.descendants(node.index()) {
                // Overrides anywhere from the hidden node down to the descendant's parent.
                let mitigated = state.has_override(node.key())
                    || h.ancestors(descendant.index())
                        .take_while(|a| a.index() != node.index())
                        .any(|a| state.has_override(a.key()));
                if !mitigated {
                    prop_assert!(!visibility.is_visible(descendant.index()));
                }
            }
        }
    }

    #[test]
    fn removing_an_override_clears_the_subtree(scenario in scenario()) {
        let h = hierarchy(&scenario.tree);
        let mut state = prepare(&scenario, &h);
        for node in h.iter() {
            if state.has_override(node.key()) {
                state.toggle_filter_override(node.index(), &h).expect("node exists");
                for descendant in h.descendants(node.index()) {
                    prop_assert!(!state.has_override(descendant.key()));
                }
            }
        }
    }

    #[test]
    fn applying_the_same_filters_twice_is_idempotent(scenario in scenario()) {
        let h = hierarchy(&scenario.tree);
        let mut state = FilterState::new();
        state.apply_filters(settings(&scenario), &h).expect("filters apply");
        let first = state.filtered_children_ids().clone();
        let first_visibility = state.evaluate(&h);
        state.apply_filters(settings(&scenario), &h).expect("filters apply");
        prop_assert_eq!(&first, state.filtered_children_ids());
        prop_assert_eq!(first_visibility, state.evaluate(&h));
    }

    #[test]
    fn reset_shows_every_node(scenario in scenario()) {
        let h = hierarchy(&scenario.tree);
        let mut state = prepare(&scenario, &h);
        state.reset_filters();
        for node in h.iter() {
            prop_assert_eq!(state.should_show_node(node.index(), &h), Ok(true));
        }
    }
}
