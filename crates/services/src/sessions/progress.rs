use serde::Serialize;

use study_core::cursor::{CursorPosition, ProgressCursor};
use study_core::markers::MarkerTracker;
use study_core::model::Session;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub completed_steps: usize,
    pub total_steps: usize,
    pub percentage: u8,
    pub position: CursorPosition,
    pub stage_count: usize,
    pub group_count: usize,
    pub is_complete: bool,
    pub markers_completed: usize,
    pub markers_total: usize,
}

impl SessionProgress {
    pub(crate) fn capture<P>(
        session: &Session<P>,
        cursor: &ProgressCursor,
        markers: &MarkerTracker,
    ) -> Self {
        Self {
            completed_steps: cursor.completed_steps(),
            total_steps: cursor.total_steps(),
            percentage: cursor.progress_percentage(),
            position: cursor.position(),
            stage_count: session.stage_count(),
            group_count: session.group_count(),
            is_complete: cursor.is_complete(),
            markers_completed: markers.completed_count(),
            markers_total: markers.markers().len(),
        }
    }
}
