//! Caller-owned display timer for marker celebrations.
//!
//! The scheduler only reports crossed markers. This banner is what a UI layer
//! keeps next to it to decide whether a "well done" message is still on
//! screen. It never feeds anything back into the scheduler.

use chrono::{DateTime, Duration, Utc};

use study_core::markers::{MarkerKind, ProgressMarker};
use study_core::model::MarkerId;

pub const DEFAULT_CELEBRATION_MS: i64 = 2_000;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Shown {
    marker: MarkerId,
    kind: MarkerKind,
    until: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CelebrationBanner {
    duration: Duration,
    shown: Option<Shown>,
}

impl Default for CelebrationBanner {
    fn default() -> Self {
        Self::new()
    }
}

impl CelebrationBanner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            duration: Duration::milliseconds(DEFAULT_CELEBRATION_MS),
            shown: None,
        }
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Show `marker` from `now`, replacing anything currently visible.
    pub fn show(&mut self, marker: &ProgressMarker, now: DateTime<Utc>) {
        self.shown = Some(Shown {
            marker: marker.id().clone(),
            kind: marker.kind(),
            until: now + self.duration,
        });
    }

    /// Show the furthest marker of a crossed batch, if any.
    pub fn show_latest(&mut self, crossed: &[ProgressMarker], now: DateTime<Utc>) {
        if let Some(marker) = crossed.last() {
            self.show(marker, now);
        }
    }

    pub fn cancel(&mut self) {
        self.shown = None;
    }

    /// Marker still on screen at `now`.
    #[must_use]
    pub fn visible(&self, now: DateTime<Utc>) -> Option<&MarkerId> {
        self.shown
            .as_ref()
            .filter(|shown| now < shown.until)
            .map(|shown| &shown.marker)
    }

    #[must_use]
    pub fn visible_kind(&self, now: DateTime<Utc>) -> Option<MarkerKind> {
        self.shown
            .as_ref()
            .filter(|shown| now < shown.until)
            .map(|shown| shown.kind)
    }
}
