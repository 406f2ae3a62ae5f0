//! Active playback window.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The window the current pipelines play, anchored to the session clock.
///
/// `base` is the clock reading when the segment was built, `start` the media
/// position it begins at. Segments are plain values: every prepare, seek and
/// reconfiguration builds a new one instead of mutating the old.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub base: Duration,
    pub start: Duration,
    pub stop: Option<Duration>,
}

impl Segment {
    /// Open-ended segment beginning at `start`.
    pub fn new(base: Duration, start: Duration) -> Self {
        Self {
            base,
            start,
            stop: None,
        }
    }

    /// Media position for a clock reading: `elapsed - base + start`.
    ///
    /// Readings taken before `base` map to `start`.
    pub fn position_at(&self, elapsed: Duration) -> Duration {
        elapsed.saturating_sub(self.base) + self.start
    }
}
