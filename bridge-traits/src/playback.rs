//! Platform playback traits and lifecycle types.
//!
//! A [`PlatformPlayer`] wraps the host's native decoder/renderer. The engine
//! opens it with one [`StreamConfig`] per active content type, prepares it,
//! feeds it packets and drives start/pause/resume/seek. Readiness is reported
//! per content type through a [`ReadyNotifier`] rather than a platform event.

use crate::{
    error::Result,
    media::{ContentType, Packet, StreamConfig, WindowHandle},
};
use core_async::sync::mpsc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// State reported by the native decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformState {
    /// No decoder instance exists.
    None,
    /// Decoder exists but has not been prepared.
    Idle,
    Ready,
    Playing,
    Paused,
}

/// Lifecycle of the playback engine as seen by the host.
///
/// `Seeking` and `Reconfiguring` are transient: every operation that enters
/// them leaves again through one of the stable states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Uninitialized,
    Preparing,
    Ready,
    Playing,
    Paused,
    Seeking,
    Reconfiguring,
    Disposed,
}

impl PlaybackState {
    /// Returns `true` for states an operation may rest in.
    pub fn is_stable(&self) -> bool {
        !matches!(
            self,
            PlaybackState::Preparing | PlaybackState::Seeking | PlaybackState::Reconfiguring
        )
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Static platform capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlatformCapabilities {
    /// The decoder can swap the active audio track without being rebuilt.
    pub supports_seamless_audio_change: bool,
}

impl PlatformCapabilities {
    pub fn seamless_audio() -> Self {
        Self {
            supports_seamless_audio_change: true,
        }
    }
}

/// Outcome of handing a packet to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    Accepted,
    /// Decoder queue is full; retry the same packet later.
    Full,
}

/// Sending half of the readiness channel, handed to the platform.
#[derive(Debug, Clone)]
pub struct ReadyNotifier {
    tx: mpsc::UnboundedSender<ContentType>,
}

impl ReadyNotifier {
    /// Reports that `content_type` can accept packets.
    ///
    /// Returns `false` when the engine no longer listens, which happens once
    /// the prepare or seek call it belonged to has completed.
    pub fn notify(&self, content_type: ContentType) -> bool {
        self.tx.send(content_type).is_ok()
    }
}

/// Receiving half of the readiness channel, drained by the engine.
#[derive(Debug)]
pub struct ReadyReceiver {
    rx: mpsc::UnboundedReceiver<ContentType>,
}

impl ReadyReceiver {
    /// Waits for the next readiness report. `None` once every notifier is gone.
    pub async fn recv(&mut self) -> Option<ContentType> {
        self.rx.recv().await
    }

    /// Takes a report that is already queued, if any.
    pub fn try_recv(&mut self) -> Option<ContentType> {
        self.rx.try_recv().ok()
    }
}

/// Creates a connected notifier/receiver pair.
pub fn ready_channel() -> (ReadyNotifier, ReadyReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ReadyNotifier { tx }, ReadyReceiver { rx })
}

/// Native decode/render engine.
///
/// `prepare` and `seek` must report every opened content type through the
/// notifier before (or at the latest when) their future resolves. A content
/// type that is never reported simply never starts pushing.
#[async_trait::async_trait]
pub trait PlatformPlayer: Send + Sync {
    /// Opens the decoder on `window` for the given stream configurations.
    fn open(&self, window: WindowHandle, configs: Vec<StreamConfig>) -> Result<()>;

    /// Prepares the opened decoder, reporting readiness per content type.
    async fn prepare(&self, ready: ReadyNotifier) -> Result<()>;

    /// Repositions the decoder, reporting readiness per content type again.
    async fn seek(&self, position: Duration, ready: ReadyNotifier) -> Result<()>;

    fn start(&self) -> Result<()>;

    fn pause(&self) -> Result<()>;

    fn resume(&self) -> Result<()>;

    fn stop(&self) -> Result<()>;

    fn state(&self) -> PlatformState;

    /// Current presentation position.
    fn position(&self) -> Result<Duration>;

    /// Queues one packet for decoding.
    fn submit_packet(&self, packet: &Packet) -> Result<SubmitStatus>;

    /// Releases native resources. Further calls are undefined.
    fn dispose(&self);
}

/// Creates platform players and reports what they can do.
pub trait PlatformPlayerFactory: Send + Sync {
    fn create(&self) -> Result<std::sync::Arc<dyn PlatformPlayer>>;

    fn capabilities(&self) -> PlatformCapabilities;
}
