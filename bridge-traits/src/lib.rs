//! # Host Bridge Traits
//!
//! Contracts between the playback engine and the host platform.
//!
//! ## Overview
//!
//! The engine never talks to a decoder, a window or a logging backend
//! directly. Each host ships adapters for the traits below and injects them at
//! construction time:
//!
//! - [`PlatformPlayer`](playback::PlatformPlayer) - the native decode/render
//!   engine: open, prepare, seek, start/pause/resume, packet submission
//! - [`PlatformPlayerFactory`](playback::PlatformPlayerFactory) - creates
//!   (and re-creates, on track switches) platform players and reports
//!   [`PlatformCapabilities`](playback::PlatformCapabilities)
//! - [`LoggerSink`](logging::LoggerSink) - mirrors structured logs into the
//!   host logging pipeline
//!
//! Value types shared by both sides of the boundary (content types, decoder
//! configurations, packets) live in [`media`].
//!
//! ## Readiness
//!
//! Platform preparation is asynchronous per content type. Instead of
//! subscribing to platform events, the engine hands a
//! [`ReadyNotifier`](playback::ReadyNotifier) to `prepare`/`seek`; the platform
//! reports each content type through it, and the engine drains the matching
//! [`ReadyReceiver`](playback::ReadyReceiver) while it drives the call.
//!
//! ## Thread Safety
//!
//! Every trait requires `Send + Sync`: pipeline tasks run on the multi-threaded
//! runtime and share the platform handle.

pub mod error;
pub mod logging;
pub mod media;
pub mod playback;

pub use error::{BridgeError, Result};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use media::{
    AudioCodec, AudioConfig, ContentType, Packet, StreamConfig, VideoCodec, VideoConfig,
    WindowHandle,
};
pub use playback::{
    ready_channel, PlatformCapabilities, PlatformPlayer, PlatformPlayerFactory, PlatformState,
    PlaybackState, ReadyNotifier, ReadyReceiver, SubmitStatus,
};
