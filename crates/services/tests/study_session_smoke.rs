use rstest::rstest;

use services::{CompletionReport, GroupView, HookResult, SessionHooks, StudyScheduler};
use study_core::cursor::Direction;
use study_core::markers::{MarkerKind, ProgressMarker};
use study_core::model::{Item, StudySettings};
use study_core::time::fixed_clock;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Boundary(Vec<String>, Vec<String>, Direction),
    Markers(Vec<MarkerKind>),
    Complete(usize),
}

#[derive(Default)]
struct EventLog(Vec<Event>);

fn ids(view: &GroupView<'_, &'static str>) -> Vec<String> {
    view.item_ids().iter().map(|id| id.to_string()).collect()
}

impl SessionHooks<&'static str> for EventLog {
    fn on_group_boundary_crossed(
        &mut self,
        previous: GroupView<'_, &'static str>,
        new: GroupView<'_, &'static str>,
        direction: Direction,
    ) -> HookResult {
        self.0.push(Event::Boundary(ids(&previous), ids(&new), direction));
        Ok(())
    }

    fn on_markers_crossed(&mut self, crossed: &[ProgressMarker]) -> HookResult {
        self.0
            .push(Event::Markers(crossed.iter().map(ProgressMarker::kind).collect()));
        Ok(())
    }

    fn on_session_complete(&mut self, report: &CompletionReport) -> HookResult {
        self.0.push(Event::Complete(report.item_ids.len()));
        Ok(())
    }
}

fn verses(n: usize) -> Vec<Item<&'static str>> {
    (1..=n)
        .map(|i| Item::new(format!("v{i}"), "verse text"))
        .collect()
}

fn scheduler() -> StudyScheduler<&'static str, EventLog> {
    StudyScheduler::new(EventLog::default()).with_clock(fixed_clock())
}

#[rstest]
#[case(6, 16)]
#[case(8, 28)]
#[case(5, 16)]
#[case(1, 4)]
fn walking_to_the_end_completes_exactly_once(#[case] count: usize, #[case] total: usize) {
    let mut scheduler = scheduler();
    scheduler.start(verses(count), 2).unwrap();

    let mut completed_on = Vec::new();
    for call in 1..=total + 3 {
        let was_complete = scheduler.is_complete();
        let outcome = scheduler.next();
        if outcome.completed_now {
            assert!(!was_complete);
            completed_on.push(call);
        }
    }

    assert_eq!(completed_on, vec![total]);
    assert!(scheduler.is_complete());
    let completions = scheduler
        .hooks()
        .0
        .iter()
        .filter(|e| matches!(e, Event::Complete(_)))
        .count();
    assert_eq!(completions, 1);
}

#[test]
fn hooks_fire_in_order_at_stage_transition() {
    let mut scheduler = scheduler();
    scheduler.start(verses(6), 2).unwrap();
    scheduler.jump_to(11);
    assert!(scheduler.hooks().0.is_empty());

    scheduler.next();
    assert_eq!(
        scheduler.hooks().0,
        vec![
            Event::Boundary(
                vec!["v5".into(), "v6".into()],
                vec!["v1", "v2", "v3", "v4", "v5", "v6"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                Direction::Forward,
            ),
            Event::Markers(vec![MarkerKind::Checkpoint, MarkerKind::Transition]),
        ]
    );

    scheduler.hooks_mut().0.clear();
    for _ in 0..4 {
        scheduler.next();
    }
    assert_eq!(
        scheduler.hooks().0,
        vec![Event::Markers(vec![MarkerKind::Terminal]), Event::Complete(6)]
    );
}

#[test]
fn custom_steps_per_group_shape_the_timeline() {
    let mut scheduler = scheduler();
    let settings = StudySettings::new(2).unwrap().with_steps_per_group(3).unwrap();
    scheduler.start_with(verses(8), settings).unwrap();

    let thresholds: Vec<usize> = scheduler
        .markers()
        .iter()
        .map(ProgressMarker::threshold_steps)
        .collect();
    assert_eq!(thresholds, vec![3, 6, 9, 12, 12, 15, 18, 18, 21]);
    assert_eq!(scheduler.progress().unwrap().total_steps, 21);
}

#[test]
fn progress_snapshot_serializes_for_ui() {
    let mut scheduler = scheduler();
    scheduler.start(verses(6), 2).unwrap();
    scheduler.jump_to(5);

    let json = serde_json::to_value(scheduler.progress().unwrap()).unwrap();
    assert_eq!(json["completed_steps"], 5);
    assert_eq!(json["total_steps"], 16);
    assert_eq!(json["percentage"], 31);
    assert_eq!(json["position"]["group_index"], 1);
    assert_eq!(json["position"]["phase_index"], 1);
    assert_eq!(json["markers_completed"], 1);
    assert_eq!(json["is_complete"], false);
}

#[test]
fn retry_starts_from_scratch() {
    let mut scheduler = scheduler();
    scheduler.start(verses(4), 2).unwrap();
    while !scheduler.is_complete() {
        scheduler.next();
    }

    scheduler.reset();
    scheduler.start(verses(4), 2).unwrap();
    scheduler.hooks_mut().0.clear();

    while !scheduler.is_complete() {
        scheduler.next();
    }
    let completions = scheduler
        .hooks()
        .0
        .iter()
        .filter(|e| matches!(e, Event::Complete(4)))
        .count();
    assert_eq!(completions, 1);
}
