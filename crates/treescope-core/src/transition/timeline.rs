use tracing::debug;

use crate::config::{IdentityConfig, TransitionConfig};
use crate::transition::{Transition, TransitionError};
use crate::tree::document::GrowthStep;

/// What moving the cursor did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepChange {
    /// Moved within one turn; just swap the displayed tree.
    Growth { from: usize, to: usize },
    /// Crossed a turn boundary; animate the prune.
    TurnAdvance { from: usize, to: usize },
    /// Went back across a turn boundary; no animation.
    TurnRewind { from: usize, to: usize },
    AtEnd,
    AtStart,
}

/// Ordered tree-growth snapshots across turns with a cursor.
#[derive(Debug, Clone)]
pub struct GrowthTimeline {
    steps: Vec<GrowthStep>,
    cursor: usize,
}

impl GrowthTimeline {
    /// Order steps by turn, step and patch number.
    pub fn new(mut steps: Vec<GrowthStep>) -> Result<Self, TransitionError> {
        if steps.is_empty() {
            return Err(TransitionError::EmptyTimeline);
        }
        steps.sort_by_key(|step| (step.turn, step.step_number, step.patch_number));
        Ok(GrowthTimeline { steps, cursor: 0 })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> &GrowthStep {
        &self.steps[self.cursor]
    }

    pub fn steps(&self) -> &[GrowthStep] {
        &self.steps
    }

    /// Distinct turns in order.
    pub fn turns(&self) -> Vec<u32> {
        let mut turns: Vec<u32> = self.steps.iter().map(|step| step.turn).collect();
        turns.dedup();
        turns
    }

    pub fn advance(&mut self) -> StepChange {
        if self.cursor + 1 >= self.steps.len() {
            return StepChange::AtEnd;
        }
        let from = self.cursor;
        self.cursor += 1;
        let change = if self.steps[from].turn == self.steps[self.cursor].turn {
            StepChange::Growth {
                from,
                to: self.cursor,
            }
        } else {
            StepChange::TurnAdvance {
                from,
                to: self.cursor,
            }
        };
        debug!(?change, "timeline advanced");
        change
    }

    pub fn back(&mut self) -> StepChange {
        if self.cursor == 0 {
            return StepChange::AtStart;
        }
        let from = self.cursor;
        self.cursor -= 1;
        if self.steps[from].turn == self.steps[self.cursor].turn {
            StepChange::Growth {
                from,
                to: self.cursor,
            }
        } else {
            StepChange::TurnRewind {
                from,
                to: self.cursor,
            }
        }
    }

    /// Jump to the given turn and step number.
    pub fn seek(&mut self, turn: u32, step: u32) -> Result<&GrowthStep, TransitionError> {
        let position = self
            .steps
            .iter()
            .position(|candidate| candidate.turn == turn && candidate.step_number == step)
            .ok_or(TransitionError::UnknownStep { turn, step })?;
        self.cursor = position;
        Ok(&self.steps[position])
    }

    /// Transition for a turn advance; `None` for any other change.
    pub fn transition_for(
        &self,
        change: StepChange,
        identity: &IdentityConfig,
        config: TransitionConfig,
    ) -> Result<Option<Transition>, TransitionError> {
        let StepChange::TurnAdvance { from, to } = change else {
            return Ok(None);
        };
        let previous = self.steps.get(from).map(|step| &step.tree);
        let next = self.steps.get(to).map(|step| &step.tree);
        Transition::new(previous, next, identity, config).map(Some)
    }
}
