use serde::{Deserialize, Serialize};

use crate::cursor::ProgressCursor;
use crate::model::{MarkerId, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// A group finished.
    Checkpoint,
    /// Every group of a non-terminal stage finished.
    Transition,
    /// The terminal group finished; the session is done.
    Terminal,
}

/// Read-only checkpoint on the step timeline.
///
/// `completed` is recomputed from the cursor on every refresh and has no
/// public setter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressMarker {
    id: MarkerId,
    threshold_steps: usize,
    kind: MarkerKind,
    stage_index: usize,
    completed: bool,
}

impl ProgressMarker {
    fn new(id: MarkerId, threshold_steps: usize, kind: MarkerKind, stage_index: usize) -> Self {
        Self {
            id,
            threshold_steps,
            kind,
            stage_index,
            completed: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> &MarkerId {
        &self.id
    }

    #[must_use]
    pub fn threshold_steps(&self) -> usize {
        self.threshold_steps
    }

    #[must_use]
    pub fn kind(&self) -> MarkerKind {
        self.kind
    }

    /// Stage whose progress this marker belongs to.
    #[must_use]
    pub fn stage_index(&self) -> usize {
        self.stage_index
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }
}

/// Derive the static marker timeline of a session.
///
/// One checkpoint per group at `(ordinal + 1) * steps_per_group`, one
/// transition after every non-terminal stage, and the terminal group's
/// checkpoint reclassified as `Terminal`. Ordered by threshold; a stage's
/// last checkpoint precedes its transition.
#[must_use]
pub fn derive_markers<P>(session: &Session<P>) -> Vec<ProgressMarker> {
    let steps = session.steps_per_group();
    let last_stage = session.stage_count().saturating_sub(1);
    let mut markers = Vec::with_capacity(session.group_count() + last_stage);
    let mut ordinal = 0;

    for (stage_index, stage) in session.stages().iter().enumerate() {
        for group_index in 0..stage.group_count() {
            ordinal += 1;
            let threshold = ordinal * steps;
            let marker = if stage_index == last_stage {
                ProgressMarker::new(
                    MarkerId::terminal(),
                    threshold,
                    MarkerKind::Terminal,
                    stage_index,
                )
            } else {
                ProgressMarker::new(
                    MarkerId::checkpoint(stage_index, group_index),
                    threshold,
                    MarkerKind::Checkpoint,
                    stage_index,
                )
            };
            markers.push(marker);
        }

        if stage_index != last_stage {
            markers.push(ProgressMarker::new(
                MarkerId::transition(stage_index),
                ordinal * steps,
                MarkerKind::Transition,
                stage_index,
            ));
        }
    }

    markers
}

/// Markers whose `completed` flag flipped from false to true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerRefresh {
    pub crossed: Vec<ProgressMarker>,
}

impl MarkerRefresh {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.crossed.is_empty()
    }
}

/// Projects cursor state onto the marker timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerTracker {
    markers: Vec<ProgressMarker>,
}

impl MarkerTracker {
    #[must_use]
    pub fn new<P>(session: &Session<P>) -> Self {
        Self {
            markers: derive_markers(session),
        }
    }

    #[must_use]
    pub fn markers(&self) -> &[ProgressMarker] {
        &self.markers
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.markers.iter().filter(|m| m.completed).count()
    }

    /// First marker not yet reached.
    #[must_use]
    pub fn next_pending(&self) -> Option<&ProgressMarker> {
        self.markers.iter().find(|m| !m.completed)
    }

    /// Recompute every `completed` flag from the cursor.
    ///
    /// Returns the markers that became completed since the previous refresh.
    /// Markers passed backwards quietly drop their flag and can be crossed
    /// again later.
    pub fn refresh(&mut self, cursor: &ProgressCursor) -> MarkerRefresh {
        let steps = cursor.completed_steps();
        let mut crossed = Vec::new();

        for marker in &mut self.markers {
            let completed = steps >= marker.threshold_steps;
            if completed && !marker.completed {
                crossed.push(ProgressMarker {
                    completed: true,
                    ..marker.clone()
                });
            }
            marker.completed = completed;
        }

        MarkerRefresh { crossed }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SessionBuilder;
    use crate::model::{Item, StudySettings};

    fn session(count: usize, group_size: usize, steps: usize) -> Session<()> {
        let items: Vec<_> = (1..=count).map(|i| Item::new(format!("v{i}"), ())).collect();
        let settings = StudySettings::new(group_size)
            .unwrap()
            .with_steps_per_group(steps)
            .unwrap();
        SessionBuilder::new(settings).build(items).unwrap()
    }

    fn timeline(markers: &[ProgressMarker]) -> Vec<(&str, usize, MarkerKind)> {
        markers
            .iter()
            .map(|m| (m.id().as_str(), m.threshold_steps(), m.kind()))
            .collect()
    }

    #[test]
    fn six_items_timeline() {
        let markers = derive_markers(&session(6, 2, 4));
        assert_eq!(
            timeline(&markers),
            vec![
                ("checkpoint-0-0", 4, MarkerKind::Checkpoint),
                ("checkpoint-0-1", 8, MarkerKind::Checkpoint),
                ("checkpoint-0-2", 12, MarkerKind::Checkpoint),
                ("transition-0", 12, MarkerKind::Transition),
                ("terminal", 16, MarkerKind::Terminal),
            ]
        );
    }

    #[test]
    fn thresholds_follow_steps_per_group() {
        let markers = derive_markers(&session(4, 2, 3));
        let thresholds: Vec<usize> = markers.iter().map(ProgressMarker::threshold_steps).collect();
        assert_eq!(thresholds, vec![3, 6, 6, 9]);
    }

    #[test]
    fn single_item_has_only_terminal() {
        let markers = derive_markers(&session(1, 2, 4));
        assert_eq!(timeline(&markers), vec![("terminal", 4, MarkerKind::Terminal)]);
    }

    #[test]
    fn refresh_reports_each_crossing_once() {
        let session = session(6, 2, 4);
        let mut tracker = MarkerTracker::new(&session);
        let mut cursor = ProgressCursor::new(&session);

        assert!(tracker.refresh(&cursor).is_empty());

        cursor.jump_to_step(12);
        let ids: Vec<String> = tracker
            .refresh(&cursor)
            .crossed
            .iter()
            .map(|m| m.id().to_string())
            .collect();
        assert_eq!(
            ids,
            vec!["checkpoint-0-0", "checkpoint-0-1", "checkpoint-0-2", "transition-0"]
        );
        assert!(tracker.refresh(&cursor).is_empty());
        assert_eq!(tracker.completed_count(), 4);
        assert_eq!(tracker.next_pending().map(ProgressMarker::kind), Some(MarkerKind::Terminal));
    }

    #[test]
    fn retreat_clears_and_recrosses() {
        let session = session(6, 2, 4);
        let mut tracker = MarkerTracker::new(&session);
        let mut cursor = ProgressCursor::new(&session);

        cursor.jump_to_step(4);
        assert_eq!(tracker.refresh(&cursor).crossed.len(), 1);

        cursor.retreat();
        assert!(tracker.refresh(&cursor).is_empty());
        assert!(!tracker.markers()[0].completed());

        cursor.advance();
        let crossed = tracker.refresh(&cursor).crossed;
        assert_eq!(crossed.len(), 1);
        assert!(crossed[0].completed());
    }
}
