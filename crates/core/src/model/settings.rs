use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of practice phases a group needs when no override is given.
pub const DEFAULT_STEPS_PER_GROUP: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("group size must be >= 1, got {provided}")]
    InvalidGroupSize { provided: usize },

    #[error("steps per group must be >= 1, got {provided}")]
    InvalidStepsPerGroup { provided: usize },
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Shape of a study session: how many items start in each group and how many
/// practice steps every group takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSettings", into = "RawSettings")]
pub struct StudySettings {
    group_size: usize,
    steps_per_group: usize,
}

impl StudySettings {
    /// Creates settings with the default number of steps per group.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidGroupSize` if `group_size` is zero.
    pub fn new(group_size: usize) -> Result<Self, SettingsError> {
        if group_size == 0 {
            return Err(SettingsError::InvalidGroupSize {
                provided: group_size,
            });
        }
        Ok(Self {
            group_size,
            steps_per_group: DEFAULT_STEPS_PER_GROUP,
        })
    }

    /// Overrides the number of practice steps per group.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidStepsPerGroup` if `steps` is zero.
    pub fn with_steps_per_group(mut self, steps: usize) -> Result<Self, SettingsError> {
        if steps == 0 {
            return Err(SettingsError::InvalidStepsPerGroup { provided: steps });
        }
        self.steps_per_group = steps;
        Ok(self)
    }

    #[must_use]
    pub fn group_size(&self) -> usize {
        self.group_size
    }

    #[must_use]
    pub fn steps_per_group(&self) -> usize {
        self.steps_per_group
    }
}

#[derive(Serialize, Deserialize)]
struct RawSettings {
    group_size: usize,
    #[serde(default = "default_steps")]
    steps_per_group: usize,
}

fn default_steps() -> usize {
    DEFAULT_STEPS_PER_GROUP
}

impl TryFrom<RawSettings> for StudySettings {
    type Error = SettingsError;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        StudySettings::new(raw.group_size)?.with_steps_per_group(raw.steps_per_group)
    }
}

impl From<StudySettings> for RawSettings {
    fn from(settings: StudySettings) -> Self {
        Self {
            group_size: settings.group_size,
            steps_per_group: settings.steps_per_group,
        }
    }
}
