use chrono::{DateTime, Utc};
use serde::Serialize;

use study_core::cursor::Direction;
use study_core::markers::ProgressMarker;
use study_core::model::{Item, ItemId, StageKind};

use crate::error::HookResult;

/// Borrowed view of one group for collaborators and UI.
#[derive(Debug)]
pub struct GroupView<'a, P> {
    pub stage_index: usize,
    pub group_index: usize,
    /// Position in stage-then-group order across the whole session.
    pub ordinal: usize,
    pub kind: StageKind,
    pub level: usize,
    pub items: &'a [Item<P>],
}

impl<P> Clone for GroupView<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for GroupView<'_, P> {}

impl<P> GroupView<'_, P> {
    #[must_use]
    pub fn item_ids(&self) -> Vec<&ItemId> {
        self.items.iter().map(Item::id).collect()
    }
}

/// Everything a persistence collaborator needs once a session is fully studied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionReport {
    pub item_ids: Vec<ItemId>,
    pub total_steps: usize,
    pub stage_count: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Extension points the scheduler calls after `next()`/`previous()`.
///
/// Hooks only see shared borrows of session data. An `Err` is logged and
/// otherwise ignored, so a failing collaborator cannot disturb the cursor.
pub trait SessionHooks<P> {
    /// The cursor moved into a different group or stage by a single step.
    ///
    /// Typical use: discard a per-group resource such as an in-progress recording.
    ///
    /// # Errors
    ///
    /// Implementations may report their own failures; the scheduler logs them.
    fn on_group_boundary_crossed(
        &mut self,
        previous: GroupView<'_, P>,
        new: GroupView<'_, P>,
        direction: Direction,
    ) -> HookResult;

    /// Fired at most once per session, the first time `next()` completes it.
    ///
    /// # Errors
    ///
    /// Implementations may report their own failures; the scheduler logs them.
    fn on_session_complete(&mut self, report: &CompletionReport) -> HookResult;

    /// Markers that became completed on this step, in timeline order.
    ///
    /// # Errors
    ///
    /// Implementations may report their own failures; the scheduler logs them.
    fn on_markers_crossed(&mut self, crossed: &[ProgressMarker]) -> HookResult {
        let _ = crossed;
        Ok(())
    }
}

/// Hooks that ignore every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl<P> SessionHooks<P> for NoopHooks {
    fn on_group_boundary_crossed(
        &mut self,
        _previous: GroupView<'_, P>,
        _new: GroupView<'_, P>,
        _direction: Direction,
    ) -> HookResult {
        Ok(())
    }

    fn on_session_complete(&mut self, _report: &CompletionReport) -> HookResult {
        Ok(())
    }
}
