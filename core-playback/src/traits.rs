//! # Engine Collaborator Traits
//!
//! The engine orchestrates three collaborators it does not implement itself:
//!
//! - **[`StreamProvider`]** resolves the timeline and creates one [`Stream`] per
//!   active track.
//! - **[`Stream`]** fetches, demuxes and decrypts chunks of one track and knows
//!   the decoder configuration for it.
//! - **[`StreamRenderer`]** buffers packets handed to it through its
//!   [`ChunkSink`] and feeds them to the platform player in step with the
//!   session [`Clock`].
//!
//! The platform side (`PlatformPlayer`) lives in `bridge-traits`.
//!
//! ## Threading Model
//!
//! Loading and pushing run as separate tokio tasks, so every trait here is
//! `Send + Sync` and shared through `Arc`. A pipeline task only ever holds the
//! `Arc` of its own stream or renderer.
//!
//! ## Cancellation
//!
//! `load_chunks` and `push_packets` run until they are exhausted or their
//! token fires. On cancellation they should return
//! [`PlaybackError::Cancelled`](crate::PlaybackError::Cancelled) (or `Ok`);
//! any other error is reported as a pipeline failure.

use crate::clock::Clock;
use crate::error::Result;
use crate::model::{Period, StreamGroup, Timeline};
use crate::segment::Segment;
use crate::selector::Selector;
use async_trait::async_trait;
use bridge_traits::{ContentType, Packet, PlatformPlayer, StreamConfig};
use core_async::sync::CancellationToken;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Stream
// ============================================================================

/// One selected track.
#[async_trait]
pub trait Stream: Send + Sync {
    fn content_type(&self) -> ContentType;

    /// Loads whatever the stream needs before chunks can be fetched
    /// (initialization segment, index, license).
    async fn prepare(&self) -> Result<()>;

    /// Moves `position` to the nearest point playback can start from, for
    /// example the preceding keyframe.
    fn adjusted_seek_position(&self, position: Duration) -> Duration;

    /// Decoder configuration for the platform player.
    async fn stream_config(&self, token: CancellationToken) -> Result<StreamConfig>;

    /// Pushes packets for `segment` into `sink` until the segment is exhausted
    /// or `token` fires.
    async fn load_chunks(
        &self,
        segment: Segment,
        sink: Arc<dyn ChunkSink>,
        token: CancellationToken,
    ) -> Result<()>;

    fn dispose(&self);
}

// ============================================================================
// Rendering
// ============================================================================

/// Receives packets produced by a loading pipeline.
#[async_trait]
pub trait ChunkSink: Send + Sync {
    /// Buffers one packet. May wait while the buffer is full.
    async fn push_chunk(&self, packet: Packet) -> Result<()>;
}

/// Feeds buffered packets to the platform player.
#[async_trait]
pub trait StreamRenderer: Send + Sync {
    fn content_type(&self) -> ContentType;

    /// The buffer loading pipelines write into.
    fn sink(&self) -> Arc<dyn ChunkSink>;

    /// Submits buffered packets to `platform`, paced by `clock` relative to
    /// `segment`, until `token` fires or `stop` is called.
    async fn push_packets(
        &self,
        segment: Segment,
        clock: Clock,
        platform: Arc<dyn PlatformPlayer>,
        token: CancellationToken,
    ) -> Result<()>;

    /// Asks a running `push_packets` to return.
    fn stop(&self);

    /// Drops buffered packets. Only valid while not pushing.
    fn flush(&self);

    fn is_pushing(&self) -> bool;
}

/// Creates one renderer per content type.
pub trait RendererFactory: Send + Sync {
    fn create_renderer(&self, content_type: ContentType) -> Arc<dyn StreamRenderer>;
}

// ============================================================================
// Stream Provider
// ============================================================================

/// Source of timelines, stream groups and streams.
#[async_trait]
pub trait StreamProvider: Send + Sync {
    /// Resolves the presentation timeline (fetches and parses the manifest).
    async fn prepare(&self) -> Result<Timeline>;

    fn stream_groups(&self, period: &Period) -> Vec<StreamGroup>;

    /// Creates a stream for `group`. `None` means the group's default policy.
    fn create_stream(
        &self,
        period: &Period,
        group: &StreamGroup,
        selector: Option<&Selector>,
    ) -> Result<Arc<dyn Stream>>;

    /// Swaps the selection policy of a live stream.
    fn update_stream(&self, stream: &Arc<dyn Stream>, selector: Option<&Selector>) -> Result<()>;

    /// Called once a stream is no longer used, before it is disposed.
    fn release_stream(&self, stream: &Arc<dyn Stream>);
}
