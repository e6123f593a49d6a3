use std::time::Duration;

use crate::tests::{assert_close, hierarchy, turn_tree};
use crate::{
    AnimationTask, Clock, GrowthStep, GrowthTimeline, IdentityConfig, ManualClock, MatchKind,
    NodeIndex, Stage, StepChange, TickHandle, TickResult, Transition, TransitionConfig,
    TransitionError, TransitionPhase, TreeNode, plan_transition,
};

fn config() -> TransitionConfig {
    TransitionConfig {
        duration_ms: 1000,
        poll_interval_ms: 50,
    }
}

/// Next tree rooted at `A1`, two plies below the previous root.
fn advanced_tree() -> TreeNode {
    TreeNode::new("A1", 80, 100.0).with_child(TreeNode::new("A1a", 80, 100.0))
}

fn transition() -> Transition {
    Transition::new(
        Some(&turn_tree()),
        Some(&advanced_tree()),
        &IdentityConfig::default(),
        config(),
    )
    .expect("transition builds")
}

#[test]
fn depth_two_match_keeps_exactly_its_subtree() {
    let previous = hierarchy(&turn_tree());
    let next = hierarchy(&advanced_tree());
    let plan = plan_transition(&previous, &next);

    assert_eq!(plan.selected(), NodeIndex::from(2));
    assert_eq!(plan.match_kind(), MatchKind::State);
    let kept: Vec<&str> = plan
        .kept_nodes()
        .map(|i| previous.node(i).expect("node").state())
        .collect();
    assert_eq!(kept, vec!["A1", "A1a"]);
    let pruned: Vec<&str> = plan
        .pruned_nodes()
        .map(|i| previous.node(i).expect("node").state())
        .collect();
    assert_eq!(pruned, vec!["R", "A", "A2", "B", "B1"]);
}

#[test]
fn explicit_ids_match_before_states() {
    let mut previous_tree = turn_tree();
    previous_tree.children[1].id = Some("target".to_string());
    let next_tree = TreeNode::new("A1", 10, 100.0).with_id("target");
    let plan = plan_transition(&hierarchy(&previous_tree), &hierarchy(&next_tree));
    assert_eq!(plan.selected(), NodeIndex::from(5));
    assert_eq!(plan.match_kind(), MatchKind::Id);
}

#[test]
fn unmatched_roots_fall_back_to_first_child_then_previous_root() {
    let previous = hierarchy(&turn_tree());
    let next = hierarchy(&TreeNode::new("unseen", 1, 100.0));
    let plan = plan_transition(&previous, &next);
    assert_eq!(plan.selected(), NodeIndex::from(1));
    assert_eq!(plan.match_kind(), MatchKind::FirstChild);

    let lone = hierarchy(&TreeNode::new("R", 1, 100.0));
    let plan = plan_transition(&lone, &next);
    assert_eq!(plan.selected(), lone.root_index());
    assert_eq!(plan.match_kind(), MatchKind::PreviousRoot);
    assert_eq!(plan.pruned_count(), 0);
}

#[test]
fn state_match_prefers_a_descendant_over_the_previous_root() {
    let previous = hierarchy(
        &TreeNode::new("S", 10, 100.0)
            .with_child(TreeNode::new("T", 5, 50.0))
            .with_child(TreeNode::new("S", 5, 50.0)),
    );
    let next = hierarchy(&TreeNode::new("S", 5, 100.0));
    let plan = plan_transition(&previous, &next);
    assert_eq!(plan.selected(), NodeIndex::from(2));
}

#[test]
fn animation_runs_from_init_to_complete() {
    let clock = ManualClock::new();
    let mut transition = transition();
    assert_eq!(transition.phase(), TransitionPhase::Init);

    let handle = transition.start(clock.now()).expect("starts from init");
    assert!(transition.is_animating());

    clock.advance(Duration::from_millis(500));
    assert_eq!(transition.tick(handle, clock.now()), TickResult::Progress(0.5));
    assert_close(transition.progress_percent(), 50.0);

    // Inside the poll interval the sample is reused.
    clock.advance(Duration::from_millis(10));
    assert_eq!(transition.tick(handle, clock.now()), TickResult::Progress(0.5));

    assert!(matches!(
        transition.continue_to_next(),
        Err(TransitionError::InvalidPhase { .. })
    ));

    clock.advance(Duration::from_millis(600));
    assert_eq!(transition.tick(handle, clock.now()), TickResult::Completed);
    assert_eq!(transition.phase(), TransitionPhase::Complete);
    assert_close(transition.progress(), 1.0);
    assert_eq!(transition.continue_to_next(), Ok(()));
    assert!(transition.is_continued());
}

#[test]
fn restart_cancels_the_running_animation() {
    let clock = ManualClock::new();
    let mut transition = transition();
    let first = transition.start(clock.now()).expect("starts");
    clock.advance(Duration::from_millis(300));
    transition.tick(first, clock.now());

    transition.restart();
    assert_eq!(transition.phase(), TransitionPhase::Init);
    assert_close(transition.progress(), 0.0);
    assert_eq!(transition.tick(first, clock.now()), TickResult::Stale);

    let second = transition.start(clock.now()).expect("starts again");
    assert_ne!(first, second);
    clock.advance(Duration::from_millis(2000));
    assert_eq!(transition.tick(first, clock.now()), TickResult::Stale);
    assert_eq!(transition.tick(second, clock.now()), TickResult::Completed);
}

#[test]
fn start_is_only_accepted_from_init() {
    let clock = ManualClock::new();
    let mut transition = transition();
    transition.start(clock.now()).expect("starts");
    assert_eq!(
        transition.start(clock.now()),
        Err(TransitionError::InvalidPhase {
            action: "start",
            phase: TransitionPhase::Animating,
        })
    );
}

#[test]
fn skip_completes_immediately_and_silences_the_timer() {
    let clock = ManualClock::new();
    let mut transition = transition();
    let handle = transition.start(clock.now()).expect("starts");
    transition.skip();
    assert_eq!(transition.phase(), TransitionPhase::Complete);
    assert_eq!(transition.tick(handle, clock.now()), TickResult::Stale);
    assert_eq!(transition.continue_to_next(), Ok(()));
}

#[test]
fn missing_tree_skips_the_animation() {
    let transition = Transition::new(
        None,
        Some(&advanced_tree()),
        &IdentityConfig::default(),
        config(),
    )
    .expect("transition builds");
    assert!(transition.is_skipped());
    assert_eq!(transition.phase(), TransitionPhase::Complete);
    assert!(transition.plan().is_none());
    assert_close(transition.progress_percent(), 100.0);
}

#[test]
fn cancelled_task_never_reports_progress() {
    let clock = ManualClock::new();
    let mut task = AnimationTask::start(
        TickHandle::new(1),
        clock.now(),
        Duration::from_millis(100),
        Duration::from_millis(10),
    );
    clock.advance(Duration::from_millis(50));
    assert_eq!(task.sample(clock.now()), Some(0.5));
    assert!(task.next_due().is_some());

    task.cancel();
    clock.advance(Duration::from_millis(50));
    assert_eq!(task.sample(clock.now()), None);
    assert!(task.is_cancelled());
    assert_eq!(task.next_due(), None);
}

#[test]
fn stages_overlap_on_a_fixed_schedule() {
    assert_close(Stage::HighlightKept.local_progress(0.15), 0.5);
    assert_close(Stage::FadePruned.local_progress(0.1), 0.0);
    assert_close(Stage::MoveAnnotation.local_progress(0.65), 0.5);
    assert_close(Stage::DrawArrow.local_progress(1.0), 1.0);
    for stage in Stage::ALL {
        let (start, end) = stage.window();
        assert!(start < end && end <= 1.0);
    }
}

fn step(tree: TreeNode, turn: u32, step_number: u32) -> GrowthStep {
    GrowthStep {
        tree,
        turn,
        step_number,
        patch_number: 0,
    }
}

#[test]
fn timeline_orders_steps_and_flags_turn_boundaries() {
    let mut timeline = GrowthTimeline::new(vec![
        step(advanced_tree(), 2, 1),
        step(turn_tree(), 1, 2),
        step(TreeNode::new("R", 1, 100.0), 1, 1),
    ])
    .expect("timeline builds");

    assert_eq!(timeline.turns(), vec![1, 2]);
    assert_eq!(timeline.current().step_number, 1);
    assert_eq!(timeline.back(), StepChange::AtStart);
    assert_eq!(timeline.advance(), StepChange::Growth { from: 0, to: 1 });

    let change = timeline.advance();
    assert_eq!(change, StepChange::TurnAdvance { from: 1, to: 2 });
    let transition = timeline
        .transition_for(change, &IdentityConfig::default(), config())
        .expect("transition builds")
        .expect("turn advance animates");
    let plan = transition.plan().expect("both trees present");
    assert_eq!(plan.selected(), NodeIndex::from(2));

    assert_eq!(timeline.advance(), StepChange::AtEnd);
    assert_eq!(timeline.back(), StepChange::TurnRewind { from: 2, to: 1 });
    assert!(
        timeline
            .transition_for(
                StepChange::Growth { from: 0, to: 1 },
                &IdentityConfig::default(),
                config()
            )
            .expect("no error")
            .is_none()
    );

    assert_eq!(timeline.seek(2, 1).map(|s| s.turn), Ok(2));
    assert_eq!(
        timeline.seek(3, 1).map(|s| s.turn),
        Err(TransitionError::UnknownStep { turn: 3, step: 1 })
    );
    assert!(matches!(
        GrowthTimeline::new(Vec::new()),
        Err(TransitionError::EmptyTimeline)
    ));
}
