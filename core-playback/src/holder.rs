//! # Stream Holder
//!
//! Binds one [`Stream`] and one [`StreamRenderer`] for a content type and owns
//! the two pipeline tasks that connect them:
//!
//! - **loading**: `Stream::load_chunks` writes packets into the renderer's sink
//! - **pushing**: `StreamRenderer::push_packets` feeds buffered packets to the
//!   platform player
//!
//! At most one task of each kind is live at a time; starting a pipeline that
//! is already running does nothing. Stopping never aborts a task. It signals
//! cancellation, then awaits the task and classifies how it ended as a
//! [`TaskOutcome`].

use crate::clock::Clock;
use crate::error::{PlaybackError, Result};
use crate::model::StreamGroup;
use crate::segment::Segment;
use crate::selector::Selector;
use crate::traits::{Stream, StreamRenderer};
use bridge_traits::{BridgeError, ContentType, PlatformPlayer};
use core_async::sync::CancellationToken;
use core_async::task::{self, JoinError, JoinHandle};
use futures::FutureExt;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, debug_span, warn, Instrument};

/// How an awaited pipeline task ended.
#[derive(Debug)]
pub enum TaskOutcome {
    /// No task was running.
    Idle,
    Completed,
    /// The task stopped because it was asked to.
    Cancelled,
    Failed(PlaybackError),
}

impl TaskOutcome {
    fn from_join(result: std::result::Result<Result<()>, JoinError>) -> Self {
        match result {
            Ok(Ok(())) => TaskOutcome::Completed,
            Ok(Err(err)) if is_stop_race(&err) => TaskOutcome::Cancelled,
            Ok(Err(err)) => TaskOutcome::Failed(err),
            Err(err) if err.is_cancelled() => TaskOutcome::Cancelled,
            Err(err) => TaskOutcome::Failed(PlaybackError::TaskFailed(err.to_string())),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TaskOutcome::Failed(_))
    }

    pub fn into_error(self) -> Option<PlaybackError> {
        match self {
            TaskOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Errors a pipeline returns because it was being stopped.
///
/// Besides plain cancellation this covers a renderer that submits one last
/// packet while the platform is already leaving the playing state.
fn is_stop_race(err: &PlaybackError) -> bool {
    err.is_cancelled()
        || matches!(
            err,
            PlaybackError::Platform(BridgeError::InvalidState { .. })
        )
}

pub struct StreamHolder {
    content_type: ContentType,
    group: StreamGroup,
    selector: Option<Selector>,
    stream: Arc<dyn Stream>,
    renderer: Arc<dyn StreamRenderer>,
    loading: Option<JoinHandle<Result<()>>>,
    pushing: Option<JoinHandle<Result<()>>>,
    push_token: Option<CancellationToken>,
}

impl StreamHolder {
    pub fn new(
        group: StreamGroup,
        selector: Option<Selector>,
        stream: Arc<dyn Stream>,
        renderer: Arc<dyn StreamRenderer>,
    ) -> Self {
        Self {
            content_type: group.content_type,
            group,
            selector,
            stream,
            renderer,
            loading: None,
            pushing: None,
            push_token: None,
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn group(&self) -> &StreamGroup {
        &self.group
    }

    pub fn selector(&self) -> Option<&Selector> {
        self.selector.as_ref()
    }

    pub fn set_selector(&mut self, selector: Option<Selector>) {
        self.selector = selector;
    }

    pub fn stream(&self) -> &Arc<dyn Stream> {
        &self.stream
    }

    pub fn renderer(&self) -> &Arc<dyn StreamRenderer> {
        &self.renderer
    }

    pub fn is_loading(&self) -> bool {
        task::is_live(self.loading.as_ref())
    }

    /// Live push task or a renderer that still reports pushing.
    pub fn is_pushing(&self) -> bool {
        self.renderer.is_pushing() || task::is_live(self.pushing.as_ref())
    }

    // ========================================================================
    // Pushing
    // ========================================================================

    /// Launches the push task under a child of `token`.
    ///
    /// Returns `false` without doing anything while already pushing.
    pub fn start_pushing_packets(
        &mut self,
        segment: Segment,
        clock: &Clock,
        platform: &Arc<dyn PlatformPlayer>,
        token: &CancellationToken,
    ) -> bool {
        if self.is_pushing() {
            debug!(content_type = %self.content_type, "Pushing already running");
            return false;
        }
        self.reap_finished_push();

        let push_token = token.child_token();
        let renderer = Arc::clone(&self.renderer);
        let platform = Arc::clone(platform);
        let clock = clock.clone();
        let task_token = push_token.clone();

        let handle = task::spawn(
            async move { renderer.push_packets(segment, clock, platform, task_token).await }
                .instrument(debug_span!("pushing", content_type = %self.content_type)),
        );

        debug!(content_type = %self.content_type, start = ?segment.start, "Pushing started");
        self.pushing = Some(handle);
        self.push_token = Some(push_token);
        true
    }

    /// Signals the renderer to stop and waits for the push task to return.
    pub async fn stop_pushing_packets(&mut self) -> TaskOutcome {
        self.renderer.stop();
        if let Some(token) = self.push_token.take() {
            token.cancel();
        }

        let Some(handle) = self.pushing.take() else {
            return TaskOutcome::Idle;
        };

        let outcome = TaskOutcome::from_join(handle.await);
        self.log_outcome("pushing", &outcome);
        outcome
    }

    /// Drops a push task that already returned so a new one can start.
    fn reap_finished_push(&mut self) {
        let Some(handle) = self.pushing.take() else {
            return;
        };
        if let Some(result) = handle.now_or_never() {
            let outcome = TaskOutcome::from_join(result);
            self.log_outcome("pushing", &outcome);
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Launches chunk loading for `segment` into the renderer's sink.
    ///
    /// Returns `false` without doing anything while a loading task is live.
    pub fn load_chunks(&mut self, segment: Segment, token: &CancellationToken) -> bool {
        if self.is_loading() {
            debug!(content_type = %self.content_type, "Loading already running");
            return false;
        }

        let stream = Arc::clone(&self.stream);
        let sink = self.renderer.sink();
        let token = token.clone();

        let handle = task::spawn(
            async move { stream.load_chunks(segment, sink, token).await }
                .instrument(debug_span!("loading", content_type = %self.content_type)),
        );

        debug!(content_type = %self.content_type, start = ?segment.start, "Loading started");
        self.loading = Some(handle);
        true
    }

    /// Waits for the loading task to return. The caller cancels it first.
    pub async fn finish_loading_chunks(&mut self) -> TaskOutcome {
        let Some(handle) = self.loading.take() else {
            return TaskOutcome::Idle;
        };

        let outcome = TaskOutcome::from_join(handle.await);
        self.log_outcome("loading", &outcome);
        outcome
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Drops buffered packets. Refused while a push task is live.
    pub fn flush(&mut self) -> Result<()> {
        if task::is_live(self.pushing.as_ref()) {
            return Err(PlaybackError::Internal(format!(
                "cannot flush {} renderer while pushing",
                self.content_type
            )));
        }
        self.renderer.flush();
        Ok(())
    }

    /// Hands the stream back to the provider and disposes it.
    ///
    /// Pipelines must already be stopped; a task still running here is
    /// detached and only observes its own token.
    pub fn dispose(mut self, release: impl FnOnce(&Arc<dyn Stream>)) {
        if self.is_loading() || task::is_live(self.pushing.as_ref()) {
            warn!(content_type = %self.content_type, "Disposing holder with live pipelines");
        }
        if let Some(token) = self.push_token.take() {
            token.cancel();
        }
        release(&self.stream);
        self.stream.dispose();
        debug!(content_type = %self.content_type, group = %self.group.id, "Holder disposed");
    }

    fn log_outcome(&self, pipeline: &str, outcome: &TaskOutcome) {
        match outcome {
            TaskOutcome::Failed(err) => {
                warn!(content_type = %self.content_type, pipeline, error = %err, "Pipeline failed")
            }
            other => debug!(content_type = %self.content_type, pipeline, outcome = ?other, "Pipeline stopped"),
        }
    }
}

impl fmt::Debug for StreamHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHolder")
            .field("content_type", &self.content_type)
            .field("group", &self.group.id)
            .field("selector", &self.selector)
            .field("loading", &self.is_loading())
            .field("pushing", &self.is_pushing())
            .finish()
    }
}
