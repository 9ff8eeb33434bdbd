mod hooks;
mod progress;
mod scheduler;

// Public API of the session subsystem.
pub use crate::error::SchedulerError;
pub use hooks::{CompletionReport, GroupView, NoopHooks, SessionHooks};
pub use progress::SessionProgress;
pub use scheduler::{StepOutcome, StudyScheduler};
