//! # Player Event Bus
//!
//! Broadcasts what the playback engine does to any number of observers (UI
//! view-models, analytics, test harnesses) over `tokio::sync::broadcast`.
//!
//! ## Usage
//!
//! ```rust
//! use bridge_traits::{ContentType, PlaybackState};
//! use core_runtime::events::{EventBus, PlayerEvent};
//!
//! # core_async::runtime::block_on(async {
//! let bus = EventBus::new(16);
//! let mut events = bus.subscribe();
//!
//! bus.emit(PlayerEvent::ContentTypeReady {
//!     content_type: ContentType::Video,
//! })
//! .ok();
//!
//! let event = events.recv().await.unwrap();
//! assert!(matches!(event, PlayerEvent::ContentTypeReady { .. }));
//! # });
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber fell `n` events behind; it
//!   keeps receiving newer events.
//! - **`RecvError::Closed`**: the player was dropped.
//!
//! Emitting with no subscribers returns an error the engine ignores: events are
//! informational and never fail a playback operation.

use bridge_traits::{ContentType, PlaybackState};
use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 64;

/// Which pipeline of a stream holder an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pipeline {
    Loading,
    Pushing,
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pipeline::Loading => f.write_str("loading"),
            Pipeline::Pushing => f.write_str("pushing"),
        }
    }
}

/// Events published by the playback engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlayerEvent {
    StateChanged {
        from: PlaybackState,
        to: PlaybackState,
    },
    /// The platform reported a content type ready and its pushing pipeline
    /// was started.
    ContentTypeReady { content_type: ContentType },
    SeekCompleted { position: Duration },
    /// A track switch finished.
    StreamGroupsChanged {
        content_types: Vec<ContentType>,
        platform_rebuilt: bool,
    },
    /// A pipeline failed for a reason other than being stopped.
    PipelineFailed {
        content_type: ContentType,
        pipeline: Pipeline,
        message: String,
    },
}

impl PlayerEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            PlayerEvent::StateChanged { .. } => "Playback state changed",
            PlayerEvent::ContentTypeReady { .. } => "Content type ready",
            PlayerEvent::SeekCompleted { .. } => "Seek completed",
            PlayerEvent::StreamGroupsChanged { .. } => "Stream groups changed",
            PlayerEvent::PipelineFailed { .. } => "Pipeline failed",
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            PlayerEvent::PipelineFailed { .. } => EventSeverity::Warning,
            PlayerEvent::StateChanged { .. } | PlayerEvent::StreamGroupsChanged { .. } => {
                EventSeverity::Info
            }
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Broadcast channel for [`PlayerEvent`]s.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PlayerEvent>,
}

impl EventBus {
    /// Create a bus that buffers up to `capacity` events per slow subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes `event`, returning the number of subscribers that saw it.
    pub fn emit(&self, event: PlayerEvent) -> Result<usize, SendError<PlayerEvent>> {
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> Receiver<PlayerEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
