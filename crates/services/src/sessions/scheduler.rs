use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use study_core::builder::SessionBuilder;
use study_core::cursor::{CursorMove, CursorPosition, Direction, ProgressCursor};
use study_core::markers::{MarkerTracker, ProgressMarker};
use study_core::model::{Item, Session, StudySettings};

use super::hooks::{CompletionReport, GroupView, SessionHooks};
use super::progress::SessionProgress;
use crate::Clock;
use crate::error::{HookResult, SchedulerError};

//
// ─── STEP OUTCOME ──────────────────────────────────────────────────────────────
//

/// Result of a single navigation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub movement: CursorMove,
    /// Markers completed by this call, in timeline order.
    pub crossed: Vec<ProgressMarker>,
    /// True only on the call that fired `on_session_complete`.
    pub completed_now: bool,
}

impl Default for StepOutcome {
    fn default() -> Self {
        Self {
            movement: CursorMove::Unchanged,
            crossed: Vec::new(),
            completed_now: false,
        }
    }
}

//
// ─── ACTIVE SESSION ────────────────────────────────────────────────────────────
//

struct ActiveSession<P> {
    session: Session<P>,
    cursor: ProgressCursor,
    markers: MarkerTracker,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl<P> ActiveSession<P> {
    fn view(&self, position: CursorPosition) -> Option<GroupView<'_, P>> {
        let stage = self.session.stages().get(position.stage_index)?;
        let group = stage.groups().get(position.group_index)?;
        let ordinal = self
            .session
            .ordinal_of(position.stage_index, position.group_index)?;
        Some(GroupView {
            stage_index: position.stage_index,
            group_index: position.group_index,
            ordinal,
            kind: stage.kind(),
            level: stage.level(),
            items: self.session.items_of(group),
        })
    }

    fn report(&self, completed_at: DateTime<Utc>) -> CompletionReport {
        CompletionReport {
            item_ids: self.session.item_ids(),
            total_steps: self.session.total_steps(),
            stage_count: self.session.stage_count(),
            started_at: self.started_at,
            completed_at,
        }
    }
}

//
// ─── SCHEDULER ─────────────────────────────────────────────────────────────────
//

/// Drives one study attempt: builds the merge plan, walks the cursor and
/// forwards boundary, marker and completion events to `H`.
///
/// Every navigation call is total. Before `start` (or after `reset`) they
/// return an unchanged `StepOutcome`.
///
/// # Examples
///
/// ```
/// # use services::{NoopHooks, StudyScheduler};
/// # use study_core::model::Item;
/// let mut scheduler = StudyScheduler::new(NoopHooks);
/// let items: Vec<_> = (1..=8).map(|i| Item::text(format!("v{i}"))).collect();
/// scheduler.start(items, 2)?;
///
/// while !scheduler.is_complete() {
///     scheduler.next();
/// }
/// assert_eq!(scheduler.progress().map(|p| p.percentage), Some(100));
/// # Ok::<(), services::SchedulerError>(())
/// ```
pub struct StudyScheduler<P, H> {
    clock: Clock,
    hooks: H,
    active: Option<ActiveSession<P>>,
}

impl<P, H: SessionHooks<P>> StudyScheduler<P, H> {
    #[must_use]
    pub fn new(hooks: H) -> Self {
        Self {
            clock: Clock::default(),
            hooks,
            active: None,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Start a session with the default steps per group.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Build` for an empty item list or a zero group size.
    pub fn start(
        &mut self,
        items: impl IntoIterator<Item = Item<P>>,
        group_size: usize,
    ) -> Result<(), SchedulerError> {
        let settings = StudySettings::new(group_size).map_err(|e| SchedulerError::Build(e.into()))?;
        self.start_with(items, settings)
    }

    /// Build a fresh session and replace whatever was active.
    ///
    /// On error the previous session, if any, is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Build` for an empty item list.
    pub fn start_with(
        &mut self,
        items: impl IntoIterator<Item = Item<P>>,
        settings: StudySettings,
    ) -> Result<(), SchedulerError> {
        let session = SessionBuilder::new(settings).build(items)?;
        let cursor = ProgressCursor::new(&session);
        let mut markers = MarkerTracker::new(&session);
        let _ = markers.refresh(&cursor);

        info!(
            items = session.items().len(),
            stages = session.stage_count(),
            groups = session.group_count(),
            total_steps = session.total_steps(),
            "study session started"
        );

        self.active = Some(ActiveSession {
            session,
            cursor,
            markers,
            started_at: self.clock.now(),
            completed_at: None,
        });
        Ok(())
    }

    /// Drop the active session entirely.
    pub fn reset(&mut self) {
        if self.active.take().is_some() {
            debug!("study session reset");
        }
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.cursor.is_complete())
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session<P>> {
        self.active.as_ref().map(|active| &active.session)
    }

    #[must_use]
    pub fn cursor(&self) -> Option<&ProgressCursor> {
        self.active.as_ref().map(|active| &active.cursor)
    }

    #[must_use]
    pub fn markers(&self) -> &[ProgressMarker] {
        self.active
            .as_ref()
            .map(|active| active.markers.markers())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn current_group(&self) -> Option<GroupView<'_, P>> {
        let active = self.active.as_ref()?;
        active.view(active.cursor.position())
    }

    #[must_use]
    pub fn progress(&self) -> Option<SessionProgress> {
        self.active.as_ref().map(|active| {
            SessionProgress::capture(&active.session, &active.cursor, &active.markers)
        })
    }

    /// Advance one step and notify collaborators.
    pub fn next(&mut self) -> StepOutcome {
        let Some(active) = self.active.as_mut() else {
            return StepOutcome::default();
        };

        let movement = active.cursor.advance();
        let crossed = active.markers.refresh(&active.cursor).crossed;

        let completed_now =
            movement.changed() && active.cursor.is_complete() && active.completed_at.is_none();
        if completed_now {
            active.completed_at = Some(self.clock.now());
        }

        notify(&mut self.hooks, active, movement, &crossed, completed_now);
        StepOutcome {
            movement,
            crossed,
            completed_now,
        }
    }

    /// Step back once and notify collaborators.
    pub fn previous(&mut self) -> StepOutcome {
        let Some(active) = self.active.as_mut() else {
            return StepOutcome::default();
        };

        let movement = active.cursor.retreat();
        let crossed = active.markers.refresh(&active.cursor).crossed;

        notify(&mut self.hooks, active, movement, &crossed, false);
        StepOutcome {
            movement,
            crossed,
            completed_now: false,
        }
    }

    /// Teleport to `step` (clamped). Marker flags follow; no hook fires.
    pub fn jump_to(&mut self, step: usize) -> StepOutcome {
        let Some(active) = self.active.as_mut() else {
            return StepOutcome::default();
        };

        let movement = active.cursor.jump_to_step(step);
        let crossed = active.markers.refresh(&active.cursor).crossed;
        debug!(
            requested = step,
            completed_steps = active.cursor.completed_steps(),
            "jumped to step"
        );

        StepOutcome {
            movement,
            crossed,
            completed_now: false,
        }
    }
}

fn notify<P, H: SessionHooks<P>>(
    hooks: &mut H,
    active: &ActiveSession<P>,
    movement: CursorMove,
    crossed: &[ProgressMarker],
    completed_now: bool,
) {
    if let CursorMove::CrossedGroup {
        from,
        to,
        direction,
    } = movement
    {
        debug!(
            from_stage = from.stage_index,
            from_group = from.group_index,
            to_stage = to.stage_index,
            to_group = to.group_index,
            forward = matches!(direction, Direction::Forward),
            "group boundary crossed"
        );
        if let (Some(previous), Some(new)) = (active.view(from), active.view(to)) {
            log_failure(
                "on_group_boundary_crossed",
                hooks.on_group_boundary_crossed(previous, new, direction),
            );
        }
    }

    if !crossed.is_empty() {
        debug!(
            markers = ?crossed.iter().map(|m| m.id().as_str()).collect::<Vec<_>>(),
            "markers crossed"
        );
        log_failure("on_markers_crossed", hooks.on_markers_crossed(crossed));
    }

    if completed_now {
        if let Some(completed_at) = active.completed_at {
            let report = active.report(completed_at);
            info!(
                items = report.item_ids.len(),
                total_steps = report.total_steps,
                "study session complete"
            );
            log_failure("on_session_complete", hooks.on_session_complete(&report));
        }
    }
}

fn log_failure(hook: &'static str, result: HookResult) {
    if let Err(error) = result {
        warn!(hook, error = %error, "session hook failed");
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HookError;
    use study_core::markers::MarkerKind;
    use study_core::time::{fixed_clock, fixed_now};

    #[derive(Default)]
    struct Recorder {
        crossings: Vec<(usize, usize, usize, usize, Direction)>,
        markers: Vec<String>,
        completions: Vec<CompletionReport>,
        fail: bool,
    }

    impl SessionHooks<()> for Recorder {
        fn on_group_boundary_crossed(
            &mut self,
            previous: GroupView<'_, ()>,
            new: GroupView<'_, ()>,
            direction: Direction,
        ) -> HookResult {
            self.crossings.push((
                previous.stage_index,
                previous.group_index,
                new.stage_index,
                new.group_index,
                direction,
            ));
            if self.fail {
                return Err(HookError::from("recording reset failed"));
            }
            Ok(())
        }

        fn on_markers_crossed(&mut self, crossed: &[ProgressMarker]) -> HookResult {
            self.markers.extend(crossed.iter().map(|m| m.id().to_string()));
            Ok(())
        }

        fn on_session_complete(&mut self, report: &CompletionReport) -> HookResult {
            self.completions.push(report.clone());
            if self.fail {
                return Err(HookError::from("save failed"));
            }
            Ok(())
        }
    }

    fn items(n: usize) -> Vec<Item<()>> {
        (1..=n).map(|i| Item::new(format!("v{i}"), ())).collect()
    }

    fn started(n: usize) -> StudyScheduler<(), Recorder> {
        let mut scheduler = StudyScheduler::new(Recorder::default()).with_clock(fixed_clock());
        scheduler.start(items(n), 2).unwrap();
        scheduler
    }

    #[test]
    fn idle_scheduler_is_inert() {
        let mut scheduler: StudyScheduler<(), Recorder> = StudyScheduler::new(Recorder::default());
        assert_eq!(scheduler.next(), StepOutcome::default());
        assert_eq!(scheduler.previous(), StepOutcome::default());
        assert_eq!(scheduler.jump_to(3), StepOutcome::default());
        assert!(scheduler.markers().is_empty());
        assert!(scheduler.current_group().is_none());
        assert!(scheduler.progress().is_none());
        assert!(!scheduler.is_complete());
    }

    #[test]
    fn start_rejects_bad_input_and_keeps_previous_session() {
        let mut scheduler = started(4);
        scheduler.next();

        assert!(matches!(
            scheduler.start(Vec::new(), 2),
            Err(SchedulerError::Build(_))
        ));
        assert!(matches!(
            scheduler.start(items(3), 0),
            Err(SchedulerError::Build(_))
        ));
        assert_eq!(scheduler.progress().unwrap().completed_steps, 1);
    }

    #[test]
    fn next_fires_boundary_hook_on_group_change() {
        let mut scheduler = started(6);
        for _ in 0..4 {
            scheduler.next();
        }
        assert_eq!(scheduler.hooks().crossings, vec![(0, 0, 0, 1, Direction::Forward)]);
        assert_eq!(scheduler.hooks().markers, vec!["checkpoint-0-0"]);

        let group = scheduler.current_group().unwrap();
        assert_eq!(group.item_ids().len(), 2);
        assert_eq!(group.items[0].id.as_str(), "v3");
    }

    #[test]
    fn current_group_ordinal_spans_stages() {
        let mut scheduler = started(6);
        assert_eq!(scheduler.current_group().unwrap().ordinal, 0);

        scheduler.jump_to(9);
        let group = scheduler.current_group().unwrap();
        assert_eq!((group.stage_index, group.group_index, group.ordinal), (0, 2, 2));

        scheduler.jump_to(12);
        let group = scheduler.current_group().unwrap();
        assert_eq!((group.stage_index, group.group_index, group.ordinal), (1, 0, 3));
        assert_eq!(group.ordinal, scheduler.cursor().unwrap().group_ordinal());
    }

    #[test]
    fn previous_fires_backward_crossing() {
        let mut scheduler = started(6);
        scheduler.jump_to(4);
        assert!(scheduler.hooks().crossings.is_empty());

        let outcome = scheduler.previous();
        assert!(outcome.movement.crossed_group());
        assert_eq!(scheduler.hooks().crossings, vec![(0, 1, 0, 0, Direction::Backward)]);
    }

    #[test]
    fn jump_refreshes_markers_without_hooks() {
        let mut scheduler = started(6);
        let outcome = scheduler.jump_to(12);

        assert_eq!(outcome.crossed.len(), 4);
        assert!(scheduler.hooks().markers.is_empty());
        assert_eq!(scheduler.markers().iter().filter(|m| m.completed()).count(), 4);

        let outcome = scheduler.jump_to(99);
        assert_eq!(outcome.crossed.len(), 1);
        assert_eq!(outcome.crossed[0].kind(), MarkerKind::Terminal);
        assert!(scheduler.is_complete());
        assert!(scheduler.hooks().completions.is_empty());
    }

    #[test]
    fn completion_fires_once() {
        let mut scheduler = started(8);
        let mut fired_on = Vec::new();
        for call in 1..=28 {
            if scheduler.next().completed_now {
                fired_on.push(call);
            }
        }
        assert_eq!(fired_on, vec![28]);

        scheduler.previous();
        assert!(!scheduler.is_complete());
        assert!(!scheduler.next().completed_now);
        assert_eq!(scheduler.next(), StepOutcome::default());
        assert_eq!(scheduler.hooks().completions.len(), 1);

        let report = &scheduler.hooks().completions[0];
        assert_eq!(report.item_ids.len(), 8);
        assert_eq!(report.total_steps, 28);
        assert_eq!(report.stage_count, 3);
        assert_eq!(report.started_at, fixed_now());
    }

    #[test]
    fn failing_hooks_do_not_disturb_progress() {
        let mut scheduler = started(6);
        scheduler.hooks_mut().fail = true;

        for _ in 0..16 {
            scheduler.next();
        }
        assert!(scheduler.is_complete());
        assert_eq!(scheduler.hooks().completions.len(), 1);
        assert_eq!(scheduler.progress().unwrap().percentage, 100);
    }

    #[test]
    fn reset_discards_session() {
        let mut scheduler = started(6);
        scheduler.jump_to(16);
        scheduler.reset();

        assert!(!scheduler.is_started());
        assert!(!scheduler.is_complete());
        assert!(scheduler.session().is_none());

        scheduler.start(items(6), 2).unwrap();
        assert_eq!(scheduler.progress().unwrap().completed_steps, 0);
        assert!(scheduler.markers().iter().all(|m| !m.completed()));
    }
}
