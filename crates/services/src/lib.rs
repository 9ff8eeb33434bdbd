#![forbid(unsafe_code)]

pub mod celebration;
pub mod error;
pub mod sessions;

pub use study_core::Clock;

pub use celebration::CelebrationBanner;
pub use error::{HookError, HookResult, SchedulerError};
pub use sessions::{
    CompletionReport, GroupView, NoopHooks, SessionHooks, SessionProgress, StepOutcome,
    StudyScheduler,
};
