pub mod animation;
pub mod choreography;
pub mod plan;
pub mod timeline;

use std::fmt;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{IdentityConfig, TransitionConfig};
use crate::transition::{
    animation::{AnimationTask, TickHandle},
    choreography::Stage,
    plan::{TransitionPlan, plan_transition},
};
use crate::tree::{document::TreeNode, error::TreeError, hierarchy::Hierarchy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Init,
    Animating,
    Complete,
}

impl fmt::Display for TransitionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransitionPhase::Init => "init",
            TransitionPhase::Animating => "animating",
            TransitionPhase::Complete => "complete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    #[error("cannot {action} while {phase}")]
    InvalidPhase {
        action: &'static str,
        phase: TransitionPhase,
    },
    #[error("animation is at {percent:.0}%, continue needs 100%")]
    NotComplete { percent: f64 },
    #[error("growth timeline has no steps")]
    EmptyTimeline,
    #[error("no growth step for turn {turn}, step {step}")]
    UnknownStep { turn: u32, step: u32 },
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Result of feeding one timer tick into a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickResult {
    /// The tick belongs to a cancelled or replaced run.
    Stale,
    Progress(f64),
    Completed,
}

/// One previous-tree → next-tree turn advance and its animation state.
///
/// `INIT → ANIMATING → COMPLETE`; `restart` returns to `INIT` from any phase,
/// `continue_to_next` is only accepted once complete.
#[derive(Debug, Clone)]
pub struct Transition {
    previous: Option<Hierarchy>,
    next: Option<Hierarchy>,
    plan: Option<TransitionPlan>,
    phase: TransitionPhase,
    progress: f64,
    generation: u64,
    task: Option<AnimationTask>,
    config: TransitionConfig,
    skipped: bool,
    continued: bool,
}

impl Transition {
    /// Build both hierarchies independently and classify the previous tree.
    /// A missing side skips the animation: the transition starts out complete.
    pub fn new(
        previous: Option<&TreeNode>,
        next: Option<&TreeNode>,
        identity: &IdentityConfig,
        config: TransitionConfig,
    ) -> Result<Self, TransitionError> {
        let previous = previous
            .map(|tree| Hierarchy::build(tree, identity))
            .transpose()?;
        let next = next.map(|tree| Hierarchy::build(tree, identity)).transpose()?;
        Ok(Self::from_hierarchies(previous, next, config))
    }

    pub fn from_hierarchies(
        previous: Option<Hierarchy>,
        next: Option<Hierarchy>,
        config: TransitionConfig,
    ) -> Self {
        let mut transition = Transition {
            previous,
            next,
            plan: None,
            phase: TransitionPhase::Init,
            progress: 0.0,
            generation: 0,
            task: None,
            config,
            skipped: false,
            continued: false,
        };
        transition.initialize();
        transition
    }

    fn initialize(&mut self) {
        self.phase = TransitionPhase::Init;
        self.progress = 0.0;
        self.continued = false;
        self.plan = match (&self.previous, &self.next) {
            (Some(previous), Some(next)) => Some(plan_transition(previous, next)),
            _ => None,
        };
        if self.plan.is_none() {
            warn!("transition is missing a tree; skipping animation");
            self.skipped = true;
            self.phase = TransitionPhase::Complete;
            self.progress = 1.0;
        }
    }

    /// Begin animating. Returns the handle the driving timer must pass to `tick`.
    pub fn start(&mut self, now: Instant) -> Result<TickHandle, TransitionError> {
        if self.phase != TransitionPhase::Init {
            return Err(TransitionError::InvalidPhase {
                action: "start",
                phase: self.phase,
            });
        }
        self.generation += 1;
        let handle = TickHandle::new(self.generation);
        self.task = Some(AnimationTask::start(
            handle,
            now,
            self.config.duration(),
            self.config.poll_interval(),
        ));
        self.phase = TransitionPhase::Animating;
        info!(generation = self.generation, "transition animating");
        Ok(handle)
    }

    /// Advance the animation from a timer tick.
    pub fn tick(&mut self, handle: TickHandle, now: Instant) -> TickResult {
        let Some(task) = self.task.as_mut() else {
            return TickResult::Stale;
        };
        if handle != task.handle() || self.phase != TransitionPhase::Animating {
            warn!(
                tick = handle.generation(),
                current = self.generation,
                "ignoring stale animation tick"
            );
            return TickResult::Stale;
        }
        let Some(progress) = task.sample(now) else {
            return TickResult::Stale;
        };
        self.progress = progress;
        if task.is_finished() {
            self.task = None;
            self.phase = TransitionPhase::Complete;
            info!("transition complete");
            TickResult::Completed
        } else {
            TickResult::Progress(progress)
        }
    }

    /// Cancel any running animation and start over from classification.
    pub fn restart(&mut self) {
        self.cancel_task();
        self.skipped = false;
        self.initialize();
        info!(generation = self.generation, "transition restarted");
    }

    /// Jump straight to the end.
    pub fn skip(&mut self) {
        self.cancel_task();
        self.progress = 1.0;
        self.phase = TransitionPhase::Complete;
    }

    /// Stop the running animation without changing phase semantics; later
    /// ticks from its timer are ignored.
    pub fn cancel_task(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }
        // Invalidate handles even when no task was running.
        self.generation += 1;
    }

    /// Accept the new tree. Only allowed once the animation has fully completed.
    pub fn continue_to_next(&mut self) -> Result<(), TransitionError> {
        if self.phase != TransitionPhase::Complete {
            return Err(TransitionError::InvalidPhase {
                action: "continue",
                phase: self.phase,
            });
        }
        if self.progress < 1.0 {
            return Err(TransitionError::NotComplete {
                percent: self.progress_percent(),
            });
        }
        self.continued = true;
        Ok(())
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress * 100.0
    }

    pub fn stage_progress(&self, stage: Stage) -> f64 {
        stage.local_progress(self.progress)
    }

    pub fn plan(&self) -> Option<&TransitionPlan> {
        self.plan.as_ref()
    }

    pub fn previous(&self) -> Option<&Hierarchy> {
        self.previous.as_ref()
    }

    pub fn next(&self) -> Option<&Hierarchy> {
        self.next.as_ref()
    }

    /// True when a tree was missing and no animation will run.
    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    pub fn is_continued(&self) -> bool {
        self.continued
    }

    pub fn is_animating(&self) -> bool {
        self.phase == TransitionPhase::Animating
    }
}
