//! Shared error types for the services crate.

use thiserror::Error;

use study_core::builder::SessionBuildError;

/// Errors emitted by `StudyScheduler`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchedulerError {
    #[error(transparent)]
    Build(#[from] SessionBuildError),
}

/// Failure reported by an injected collaborator hook.
///
/// The scheduler logs these and carries on; they never reach cursor state.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

pub type HookResult = Result<(), HookError>;
