/// Visual stages of a turn-advance animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    HighlightKept,
    FadePruned,
    MoveAnnotation,
    DrawArrow,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::HighlightKept,
        Stage::FadePruned,
        Stage::MoveAnnotation,
        Stage::DrawArrow,
    ];

    /// Start and end of the stage as fractions of the whole animation.
    pub fn window(self) -> (f64, f64) {
        match self {
            Stage::HighlightKept => (0.0, 0.3),
            Stage::FadePruned => (0.2, 0.6),
            Stage::MoveAnnotation => (0.4, 0.9),
            Stage::DrawArrow => (0.7, 1.0),
        }
    }

    /// Progress of this stage, in `[0, 1]`, at overall progress `global`.
    pub fn local_progress(self, global: f64) -> f64 {
        let (start, end) = self.window();
        ((global - start) / (end - start)).clamp(0.0, 1.0)
    }
}
