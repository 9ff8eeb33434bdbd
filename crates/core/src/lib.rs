#![forbid(unsafe_code)]

pub mod builder;
pub mod cursor;
pub mod markers;
pub mod model;
pub mod time;

pub use builder::{SessionBuildError, SessionBuilder};
pub use cursor::{CursorMove, CursorPosition, Direction, ProgressCursor};
pub use markers::{MarkerKind, MarkerRefresh, MarkerTracker, ProgressMarker, derive_markers};
pub use time::Clock;
