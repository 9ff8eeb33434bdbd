use thiserror::Error;

use crate::model::{Group, Item, Session, SettingsError, Stage, StageKind, StudySettings};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionBuildError {
    #[error("cannot build a session without items")]
    EmptyItems,
    #[error("{groups} groups of {steps_per_group} steps overflow the step counter")]
    TooManySteps {
        groups: usize,
        steps_per_group: usize,
    },
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

//
// ─── BUILDER ───────────────────────────────────────────────────────────────────
//

/// Builds the multi-round merge plan for a list of items.
///
/// Items are first partitioned into consecutive groups of `group_size` (the
/// last group may be shorter). Each following stage joins neighbouring pairs
/// of the previous stage's groups; an odd group left at the end is appended to
/// the last joined group instead of standing alone. Building stops at the first
/// stage holding a single group.
///
/// # Examples
///
/// ```
/// # use study_core::builder::SessionBuilder;
/// # use study_core::model::Item;
/// let items: Vec<_> = (1..=8).map(|i| Item::text(format!("v{i}"))).collect();
/// let session = SessionBuilder::with_group_size(2)?.build(items)?;
///
/// assert_eq!(session.stage_count(), 3);
/// assert_eq!(session.total_steps(), 28);
/// # Ok::<(), study_core::builder::SessionBuildError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SessionBuilder {
    settings: StudySettings,
}

impl SessionBuilder {
    #[must_use]
    pub fn new(settings: StudySettings) -> Self {
        Self { settings }
    }

    /// Shorthand for `SessionBuilder::new(StudySettings::new(group_size)?)`.
    ///
    /// # Errors
    ///
    /// Returns `SessionBuildError::Settings` if `group_size` is zero.
    pub fn with_group_size(group_size: usize) -> Result<Self, SessionBuildError> {
        Ok(Self::new(StudySettings::new(group_size)?))
    }

    #[must_use]
    pub fn settings(&self) -> StudySettings {
        self.settings
    }

    /// Build the session plan.
    ///
    /// # Errors
    ///
    /// Returns `SessionBuildError::EmptyItems` if `items` is empty.
    /// Returns `SessionBuildError::TooManySteps` if the total step count does not fit in `usize`.
    pub fn build<P>(
        self,
        items: impl IntoIterator<Item = Item<P>>,
    ) -> Result<Session<P>, SessionBuildError> {
        let items: Vec<Item<P>> = items.into_iter().collect();
        if items.is_empty() {
            return Err(SessionBuildError::EmptyItems);
        }

        let mut stages = vec![Stage::new(
            StageKind::Initial,
            0,
            partition(items.len(), self.settings.group_size()),
        )];

        loop {
            let Some(current) = stages.last() else {
                break;
            };
            if current.group_count() == 1 {
                break;
            }
            let next = Stage::new(StageKind::Merge, current.level() + 1, merge(current.groups()));
            stages.push(next);
        }

        let groups: usize = stages.iter().map(Stage::group_count).sum();
        let steps_per_group = self.settings.steps_per_group();
        let total_steps = groups
            .checked_mul(steps_per_group)
            .ok_or(SessionBuildError::TooManySteps {
                groups,
                steps_per_group,
            })?;

        Ok(Session::new(items, stages, steps_per_group, total_steps))
    }
}

/// Consecutive groups of `group_size` covering `0..len`.
fn partition(len: usize, group_size: usize) -> Vec<Group> {
    (0..len)
        .step_by(group_size)
        .map(|start| Group::new(start..(start + group_size).min(len)))
        .collect()
}

/// Joins neighbouring pairs; a trailing odd group folds into the last pair.
///
/// Callers only pass two or more groups.
fn merge(groups: &[Group]) -> Vec<Group> {
    let mut merged: Vec<Group> = groups
        .chunks_exact(2)
        .map(|pair| pair[0].joined(&pair[1]))
        .collect();

    if groups.len() % 2 == 1 {
        if let (Some(leftover), Some(last)) = (groups.last(), merged.last_mut()) {
            *last = last.joined(leftover);
        }
    }

    merged
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
