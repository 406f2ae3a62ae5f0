//! Time primitives.
//!
//! `Instant` is monotonic and is what the playback clock measures wall time
//! with; `sleep`/`timeout` integrate with tokio's timer wheel.

pub use std::time::{Duration, Instant};
pub use tokio::time::{interval, sleep, sleep_until, timeout, Interval, Sleep, Timeout};

