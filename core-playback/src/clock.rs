//! Session clock.
//!
//! The clock measures how long the current session has actually been playing.
//! It only advances between `start` and `stop`, so pauses and seeks do not
//! count. Clones share the same underlying state: renderers read the clone
//! they were handed while the player starts and stops the original.

use core_async::time::Instant;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct ClockState {
    /// Time accumulated up to the last `stop`.
    captured: Duration,
    /// Set while running.
    started_at: Option<Instant>,
}

/// Monotonic, pausable elapsed-time source.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    state: Arc<Mutex<ClockState>>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes counting from the last captured value. No-op while running.
    pub fn start(&self) {
        let mut state = self.state.lock();
        if state.started_at.is_none() {
            state.started_at = Some(Instant::now());
        }
    }

    /// Freezes the clock at its current value. No-op while stopped.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if let Some(started_at) = state.started_at.take() {
            state.captured += started_at.elapsed();
        }
    }

    pub fn elapsed(&self) -> Duration {
        let state = self.state.lock();
        match state.started_at {
            Some(started_at) => state.captured + started_at.elapsed(),
            None => state.captured,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().started_at.is_some()
    }
}
