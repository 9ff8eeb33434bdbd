use serde::{Deserialize, Serialize};

use crate::model::{GroupSlot, Session};

//
// ─── POSITION ──────────────────────────────────────────────────────────────────
//

/// Decomposed cursor location: which stage, which group in it, which phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CursorPosition {
    pub stage_index: usize,
    pub group_index: usize,
    pub phase_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

/// What a single cursor operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    /// Already at the boundary; nothing changed.
    Unchanged,
    /// Moved within the same group.
    Moved,
    /// Moved into a different group (and possibly a different stage).
    CrossedGroup {
        from: CursorPosition,
        to: CursorPosition,
        direction: Direction,
    },
}

impl CursorMove {
    #[must_use]
    pub fn changed(&self) -> bool {
        !matches!(self, CursorMove::Unchanged)
    }

    #[must_use]
    pub fn crossed_group(&self) -> bool {
        matches!(self, CursorMove::CrossedGroup { .. })
    }
}

//
// ─── CURSOR ────────────────────────────────────────────────────────────────────
//

/// Position tracker over a built session.
///
/// `completed_steps` is the only state. The (stage, group, phase) triple is
/// always its decomposition: `completed_steps / steps_per_group` picks the
/// group in stage-then-group order (the last group once complete) and
/// `completed_steps % steps_per_group` is the phase.
///
/// # Examples
///
/// ```
/// # use study_core::builder::SessionBuilder;
/// # use study_core::cursor::ProgressCursor;
/// # use study_core::model::Item;
/// let items: Vec<_> = (1..=6).map(|i| Item::text(format!("v{i}"))).collect();
/// let session = SessionBuilder::with_group_size(2)?.build(items)?;
/// let mut cursor = ProgressCursor::new(&session);
///
/// for _ in 0..5 {
///     cursor.advance();
/// }
/// assert_eq!(cursor.position().group_index, 1);
/// assert_eq!(cursor.position().phase_index, 1);
/// # Ok::<(), study_core::builder::SessionBuildError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressCursor {
    slots: Vec<GroupSlot>,
    steps_per_group: usize,
    total_steps: usize,
    completed_steps: usize,
}

impl ProgressCursor {
    #[must_use]
    pub fn new<P>(session: &Session<P>) -> Self {
        Self {
            slots: session.group_slots().to_vec(),
            steps_per_group: session.steps_per_group(),
            total_steps: session.total_steps(),
            completed_steps: 0,
        }
    }

    #[must_use]
    pub fn completed_steps(&self) -> usize {
        self.completed_steps
    }

    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    #[must_use]
    pub fn steps_per_group(&self) -> usize {
        self.steps_per_group
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_steps == self.total_steps()
    }

    #[must_use]
    pub fn is_at_start(&self) -> bool {
        self.completed_steps == 0
    }

    /// Index of the current group in stage-then-group order.
    #[must_use]
    pub fn group_ordinal(&self) -> usize {
        (self.completed_steps / self.steps_per_group).min(self.slots.len().saturating_sub(1))
    }

    #[must_use]
    pub fn position(&self) -> CursorPosition {
        let slot = self.slots.get(self.group_ordinal()).copied().unwrap_or(GroupSlot {
            stage_index: 0,
            group_index: 0,
        });
        CursorPosition {
            stage_index: slot.stage_index,
            group_index: slot.group_index,
            phase_index: self.completed_steps % self.steps_per_group,
        }
    }

    /// Percentage of steps completed, rounded half up.
    #[must_use]
    pub fn progress_percentage(&self) -> u8 {
        let total = self.total_steps as u128;
        if total == 0 {
            return 0;
        }
        let completed = self.completed_steps as u128;
        let rounded = (200 * completed + total) / (2 * total);
        u8::try_from(rounded).unwrap_or(100)
    }

    /// Move forward one step. No-op once complete.
    pub fn advance(&mut self) -> CursorMove {
        if self.is_complete() {
            return CursorMove::Unchanged;
        }
        self.step_to(self.completed_steps + 1, Direction::Forward)
    }

    /// Move back one step. No-op at the start.
    pub fn retreat(&mut self) -> CursorMove {
        if self.is_at_start() {
            return CursorMove::Unchanged;
        }
        self.step_to(self.completed_steps - 1, Direction::Backward)
    }

    /// Teleport to `target`, clamped to `[0, total_steps]`.
    ///
    /// Never reports `CrossedGroup`, even when the group changes.
    pub fn jump_to_step(&mut self, target: usize) -> CursorMove {
        let target = target.min(self.total_steps());
        if target == self.completed_steps {
            return CursorMove::Unchanged;
        }
        self.completed_steps = target;
        CursorMove::Moved
    }

    fn step_to(&mut self, target: usize, direction: Direction) -> CursorMove {
        let from = self.position();
        self.completed_steps = target;
        let to = self.position();

        if (from.stage_index, from.group_index) == (to.stage_index, to.group_index) {
            CursorMove::Moved
        } else {
            CursorMove::CrossedGroup {
                from,
                to,
                direction,
            }
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
