use tracing::debug;

use crate::tree::{hierarchy::Hierarchy, ids::NodeIndex};

/// How the new root was found in the previous tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Same explicit id.
    Id,
    /// Same state string.
    State,
    /// No match; the first child of the previous root stands in.
    FirstChild,
    /// No match and no children; the previous root itself.
    PreviousRoot,
}

/// Classification of every previous-tree node for one turn advance.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
    selected: NodeIndex,
    match_kind: MatchKind,
    kept: Vec<bool>,
}

impl TransitionPlan {
    /// Previous-tree node that becomes the new root.
    pub fn selected(&self) -> NodeIndex {
        self.selected
    }

    pub fn match_kind(&self) -> MatchKind {
        self.match_kind
    }

    pub fn is_kept(&self, index: NodeIndex) -> bool {
        self.kept.get(index.index()).copied().unwrap_or(false)
    }

    pub fn is_pruned(&self, index: NodeIndex) -> bool {
        !self.is_kept(index)
    }

    pub fn kept_nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.kept
            .iter()
            .enumerate()
            .filter(|(_, kept)| **kept)
            .map(|(slot, _)| NodeIndex::from(slot))
    }

    pub fn pruned_nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.kept
            .iter()
            .enumerate()
            .filter(|(_, kept)| !**kept)
            .map(|(slot, _)| NodeIndex::from(slot))
    }

    pub fn kept_count(&self) -> usize {
        self.kept.iter().filter(|kept| **kept).count()
    }

    pub fn pruned_count(&self) -> usize {
        self.kept.len() - self.kept_count()
    }
}

/// Find the previous-tree node matching `next`'s root and split the previous
/// tree into the kept subtree below it and the pruned remainder.
pub fn plan_transition(previous: &Hierarchy, next: &Hierarchy) -> TransitionPlan {
    let (selected, match_kind) = select_new_root(previous, next);
    let kept = previous
        .iter()
        .map(|node| node.index() == selected || previous.is_descendant_of(node.index(), selected))
        .collect();
    let plan = TransitionPlan {
        selected,
        match_kind,
        kept,
    };
    debug!(
        selected = selected.index(),
        ?match_kind,
        kept = plan.kept_count(),
        pruned = plan.pruned_count(),
        "planned transition"
    );
    plan
}

fn select_new_root(previous: &Hierarchy, next: &Hierarchy) -> (NodeIndex, MatchKind) {
    let next_root = next.root();

    if next_root.has_explicit_id() {
        if let Some(found) = previous
            .find(next_root.key())
            .filter(|node| node.has_explicit_id())
        {
            return (found.index(), MatchKind::Id);
        }
    }

    // Prefer a proper descendant; the previous root only matches when nothing else does.
    let by_state = previous
        .iter()
        .skip(1)
        .find(|node| node.state() == next_root.state())
        .or_else(|| Some(previous.root()).filter(|root| root.state() == next_root.state()));
    if let Some(found) = by_state {
        return (found.index(), MatchKind::State);
    }

    match previous.root().children().first() {
        Some(first) => (*first, MatchKind::FirstChild),
        None => (previous.root_index(), MatchKind::PreviousRoot),
    }
}
