//! # Player
//!
//! The orchestrator. Owns the session clock, the active segment, one
//! [`StreamHolder`] per content type and the session cancellation token, and
//! drives the platform player through the lifecycle:
//!
//! ```text
//! Uninitialized -> Preparing -> Ready <-> Playing <-> Paused -> Disposed
//!                                 (Seeking / Reconfiguring are transient)
//! ```
//!
//! Every operation takes `&mut self`: there is exactly one writer, the holder
//! map is never aliased, and a second seek cannot start before the first one
//! returned. Pipeline tasks only ever hold `Arc`s of their own stream and
//! renderer.
//!
//! ## Stopping a session
//!
//! Seek, track switches and dispose stop the running session in a fixed
//! order: stop the clock, swap in a fresh session token (cancelling every
//! pipeline of the old one), wait for all loading tasks, then per holder stop
//! pushing and flush the renderer.
//!
//! ## Readiness
//!
//! The platform reports readiness per content type through a
//! [`ReadyNotifier`](bridge_traits::ReadyNotifier). The player drives the
//! platform's `prepare`/`seek` future and the readiness channel together and
//! starts each content type's pushing pipeline itself, on its own task.

use crate::clock::Clock;
use crate::config::{PlayerConfig, SelectorUpdatePolicy};
use crate::error::{PlaybackError, Result};
use crate::holder::{StreamHolder, TaskOutcome};
use crate::model::{Period, StreamGroup};
use crate::segment::Segment;
use crate::selection::select_default_groups;
use crate::selector::Selector;
use crate::switching::{plan_switch, ActiveTrack, SwitchAction};
use crate::traits::{RendererFactory, StreamProvider};
use crate::validation::verify_stream_groups;
use bridge_traits::{
    ready_channel, ContentType, PlatformCapabilities, PlatformPlayer, PlatformPlayerFactory,
    PlatformState, PlaybackState, ReadyReceiver,
};
use core_async::sync::{renew_token, CancellationToken};
use core_runtime::events::{EventBus, Pipeline, PlayerEvent, Receiver};
use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Adaptive-bitrate playback orchestrator.
pub struct Player {
    id: Uuid,
    config: PlayerConfig,
    provider: Arc<dyn StreamProvider>,
    platform_factory: Arc<dyn PlatformPlayerFactory>,
    renderer_factory: Arc<dyn RendererFactory>,
    capabilities: PlatformCapabilities,
    platform: Option<Arc<dyn PlatformPlayer>>,
    period: Option<Period>,
    holders: BTreeMap<ContentType, StreamHolder>,
    /// Content types the platform reported ready in the current session.
    ready: BTreeSet<ContentType>,
    clock: Clock,
    segment: Option<Segment>,
    session: CancellationToken,
    state: PlaybackState,
    events: EventBus,
}

impl Player {
    /// Creates an unprepared player. Fails if `config` does not validate.
    pub fn new(
        config: PlayerConfig,
        provider: Arc<dyn StreamProvider>,
        platform_factory: Arc<dyn PlatformPlayerFactory>,
        renderer_factory: Arc<dyn RendererFactory>,
    ) -> Result<Self> {
        config.validate()?;
        let capabilities = platform_factory.capabilities();
        let events = EventBus::new(config.event_capacity);

        Ok(Self {
            id: Uuid::new_v4(),
            config,
            provider,
            platform_factory,
            renderer_factory,
            capabilities,
            platform: None,
            period: None,
            holders: BTreeMap::new(),
            ready: BTreeSet::new(),
            clock: Clock::new(),
            segment: None,
            session: CancellationToken::new(),
            state: PlaybackState::Uninitialized,
            events,
        })
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Resolves the timeline, selects default tracks, starts loading and
    /// prepares the platform player.
    ///
    /// On failure everything built so far is torn down and the player returns
    /// to `Uninitialized`, so `prepare` may be retried.
    #[instrument(skip(self), fields(player = %self.id))]
    pub async fn prepare(&mut self) -> Result<()> {
        if self.state != PlaybackState::Uninitialized {
            return Err(self.invalid("prepare"));
        }

        self.set_state(PlaybackState::Preparing);
        match self.try_prepare().await {
            Ok(()) => {
                self.set_state(PlaybackState::Ready);
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "Prepare failed");
                self.teardown().await;
                self.set_state(PlaybackState::Uninitialized);
                Err(err)
            }
        }
    }

    async fn try_prepare(&mut self) -> Result<()> {
        renew_token(&mut self.session);
        self.ready.clear();

        self.platform = Some(self.platform_factory.create()?);
        self.capabilities = self.platform_factory.capabilities();

        let timeline = self.provider.prepare().await?;
        let period = timeline
            .first_period()
            .cloned()
            .ok_or(PlaybackError::EmptyTimeline)?;

        let groups = self.provider.stream_groups(&period);
        let selected =
            select_default_groups(&groups, self.config.preferred_audio_language.as_deref());
        if selected.is_empty() {
            return Err(PlaybackError::NoPlayableGroups(period.id.clone()));
        }
        info!(
            period = %period.id,
            groups = ?selected.iter().map(|g| g.id.as_str()).collect::<Vec<_>>(),
            "Default stream groups selected"
        );

        for group in selected {
            let holder = self.create_holder(&period, group, None)?;
            self.holders.insert(holder.content_type(), holder);
        }
        self.period = Some(period.clone());

        self.prepare_streams().await?;

        let start = self
            .config
            .start_time
            .map_or(period.start, |requested| requested.max(period.start));
        self.update_segment(start);
        self.start_loading();

        self.open_platform().await
    }

    /// Starts or resumes playback. No-op while already playing.
    #[instrument(skip(self), fields(player = %self.id))]
    pub async fn play(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Playing => return Ok(()),
            PlaybackState::Ready | PlaybackState::Paused => {}
            _ => return Err(self.invalid("play")),
        }

        self.resume_playback()?;
        self.set_state(PlaybackState::Playing);
        Ok(())
    }

    /// Pauses the platform, freezes the clock and stops every push task.
    /// No-op while already paused.
    #[instrument(skip(self), fields(player = %self.id))]
    pub async fn pause(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Paused => return Ok(()),
            PlaybackState::Playing => {}
            _ => return Err(self.invalid("pause")),
        }

        self.platform()?.pause()?;
        self.clock.stop();

        let mut outcomes = Vec::with_capacity(self.holders.len());
        for (content_type, holder) in self.holders.iter_mut() {
            outcomes.push((*content_type, Pipeline::Pushing, holder.stop_pushing_packets().await));
        }
        self.report_outcomes(outcomes);

        self.set_state(PlaybackState::Paused);
        Ok(())
    }

    /// Moves playback to `position`, snapped to a video keyframe when video is
    /// active. Playing sessions keep playing afterwards.
    #[instrument(skip(self), fields(player = %self.id))]
    pub async fn seek(&mut self, position: Duration) -> Result<()> {
        self.ensure_prepared("seek")?;

        let previous = self.state;
        self.set_state(PlaybackState::Seeking);
        match self.try_seek(position, previous == PlaybackState::Playing).await {
            Ok(start) => {
                self.set_state(previous);
                self.events
                    .emit(PlayerEvent::SeekCompleted { position: start })
                    .ok();
                info!(requested = ?position, start = ?start, "Seek completed");
                Ok(())
            }
            Err(err) => {
                self.fail_to_paused("seek", &err);
                Err(err)
            }
        }
    }

    async fn try_seek(&mut self, position: Duration, was_playing: bool) -> Result<Duration> {
        self.stop_streaming().await;

        let segment = self.update_segment(position);
        self.start_loading();

        let platform = self.platform()?;
        let (notifier, ready) = ready_channel();
        let operation = platform.seek(segment.start, notifier);
        self.drive_readiness(operation, ready).await?;

        if was_playing {
            self.clock.start();
        }
        Ok(segment.start)
    }

    /// Switches the active tracks.
    ///
    /// `groups[i]` is played with `selectors[i]`; `None` selects the group's
    /// default policy. Content types missing from the request are dropped.
    /// The request is validated before anything changes.
    #[instrument(skip(self, groups, selectors), fields(player = %self.id, groups = groups.len()))]
    pub async fn set_stream_groups(
        &mut self,
        groups: Vec<StreamGroup>,
        selectors: Vec<Option<Selector>>,
    ) -> Result<()> {
        self.ensure_prepared("set_stream_groups")?;
        verify_stream_groups(&groups, &selectors, self.capabilities)?;

        // Nothing has been torn down yet, so a failure here keeps the state.
        let platform = self.platform()?;
        let platform_state = platform.state();
        let position = if self.config.uses_segment_position(platform_state) {
            self.segment.map_or(Duration::ZERO, |s| s.start)
        } else {
            platform.position()?
        };
        if platform_state == PlatformState::Playing {
            platform.pause()?;
        }

        let previous = self.state;
        self.set_state(PlaybackState::Reconfiguring);
        match self
            .try_set_stream_groups(
                platform,
                position,
                &groups,
                &selectors,
                previous == PlaybackState::Playing,
            )
            .await
        {
            Ok(platform_rebuilt) => {
                self.set_state(previous);
                self.events
                    .emit(PlayerEvent::StreamGroupsChanged {
                        content_types: self.holders.keys().copied().collect(),
                        platform_rebuilt,
                    })
                    .ok();
                Ok(())
            }
            Err(err) => {
                self.fail_to_paused("set_stream_groups", &err);
                Err(err)
            }
        }
    }

    async fn try_set_stream_groups(
        &mut self,
        platform: Arc<dyn PlatformPlayer>,
        position: Duration,
        groups: &[StreamGroup],
        selectors: &[Option<Selector>],
        was_playing: bool,
    ) -> Result<bool> {
        self.stop_streaming().await;

        let plan = {
            let active: BTreeMap<ContentType, ActiveTrack<'_>> = self
                .holders
                .iter()
                .map(|(content_type, holder)| {
                    (
                        *content_type,
                        ActiveTrack {
                            group: holder.group(),
                            selector: holder.selector(),
                        },
                    )
                })
                .collect();
            plan_switch(&active, groups, selectors, self.capabilities)
        };
        info!(
            switches = ?plan.switches.iter().map(|s| (s.content_type, s.action)).collect::<Vec<_>>(),
            dropped = ?plan.dropped,
            recreate_platform = plan.recreate_platform,
            "Switching stream groups"
        );

        let period = self
            .period
            .clone()
            .ok_or_else(|| PlaybackError::Internal("prepared player has no period".into()))?;

        for content_type in &plan.dropped {
            if let Some(holder) = self.holders.remove(content_type) {
                self.dispose_holder(holder);
            }
        }

        let mut deferred_updates = Vec::new();
        for switch in &plan.switches {
            let selector = selectors[switch.index].clone();
            match switch.action {
                SwitchAction::Reuse => {
                    let Some(holder) = self.holders.get_mut(&switch.content_type) else {
                        continue;
                    };
                    holder.set_selector(selector);
                    match self.config.selector_update {
                        SelectorUpdatePolicy::Immediate => self
                            .provider
                            .update_stream(holder.stream(), holder.selector())?,
                        SelectorUpdatePolicy::NextChunkBoundary => {
                            deferred_updates.push(switch.content_type)
                        }
                    }
                }
                SwitchAction::Add | SwitchAction::Replace | SwitchAction::Reconfigure => {
                    if let Some(old) = self.holders.remove(&switch.content_type) {
                        self.dispose_holder(old);
                    }
                    let holder =
                        self.create_holder(&period, groups[switch.index].clone(), selector)?;
                    self.holders.insert(switch.content_type, holder);
                }
            }
        }

        self.prepare_streams().await?;
        let segment = self.update_segment(position);
        self.start_loading();

        for content_type in deferred_updates {
            if let Some(holder) = self.holders.get(&content_type) {
                self.provider
                    .update_stream(holder.stream(), holder.selector())?;
            }
        }

        if plan.recreate_platform {
            // A failed create must not leave the disposed decoder in place.
            if let Some(old) = self.platform.take() {
                old.dispose();
            }
            self.platform = Some(self.platform_factory.create()?);
            self.open_platform().await?;
        } else {
            let (notifier, ready) = ready_channel();
            let operation = platform.seek(segment.start, notifier);
            self.drive_readiness(operation, ready).await?;
        }

        if was_playing {
            self.resume_playback()?;
        }
        Ok(plan.recreate_platform)
    }

    /// Stops the session and releases every resource. Safe to call in any
    /// state, more than once.
    #[instrument(skip(self), fields(player = %self.id))]
    pub async fn dispose(&mut self) {
        if self.state == PlaybackState::Disposed {
            return;
        }

        self.teardown().await;
        self.session.cancel();
        self.set_state(PlaybackState::Disposed);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn segment(&self) -> Option<Segment> {
        self.segment
    }

    /// Current media position derived from the clock and the segment.
    pub fn position(&self) -> Duration {
        self.segment
            .map_or(Duration::ZERO, |s| s.position_at(self.clock.elapsed()))
    }

    /// Duration of the current period, if it is bounded.
    pub fn duration(&self) -> Option<Duration> {
        self.period.as_ref().and_then(|p| p.duration)
    }

    /// Every group the provider offers for the current period.
    pub fn stream_groups(&self) -> Vec<StreamGroup> {
        self.period
            .as_ref()
            .map(|p| self.provider.stream_groups(p))
            .unwrap_or_default()
    }

    /// Groups with an active holder, audio first.
    pub fn active_stream_groups(&self) -> Vec<StreamGroup> {
        self.holders.values().map(|h| h.group().clone()).collect()
    }

    pub fn holder(&self, content_type: ContentType) -> Option<&StreamHolder> {
        self.holders.get(&content_type)
    }

    pub fn capabilities(&self) -> PlatformCapabilities {
        self.capabilities
    }

    pub fn subscribe(&self) -> Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    // ========================================================================
    // Session internals
    // ========================================================================

    /// Stops every pipeline of the current session in order.
    async fn stop_streaming(&mut self) {
        self.clock.stop();
        renew_token(&mut self.session);
        self.ready.clear();

        let loading = join_all(self.holders.iter_mut().map(|(content_type, holder)| {
            let content_type = *content_type;
            async move { (content_type, holder.finish_loading_chunks().await) }
        }))
        .await;

        let mut outcomes: Vec<_> = loading
            .into_iter()
            .map(|(content_type, outcome)| (content_type, Pipeline::Loading, outcome))
            .collect();

        for (content_type, holder) in self.holders.iter_mut() {
            outcomes.push((*content_type, Pipeline::Pushing, holder.stop_pushing_packets().await));
            if let Err(err) = holder.flush() {
                warn!(content_type = %content_type, error = %err, "Flush refused");
            }
        }

        debug!("Streaming stopped");
        self.report_outcomes(outcomes);
    }

    async fn teardown(&mut self) {
        self.stop_streaming().await;

        for (_, holder) in std::mem::take(&mut self.holders) {
            self.dispose_holder(holder);
        }
        if let Some(platform) = self.platform.take() {
            platform.dispose();
        }
        self.segment = None;
        self.period = None;
    }

    fn create_holder(
        &self,
        period: &Period,
        group: StreamGroup,
        selector: Option<Selector>,
    ) -> Result<StreamHolder> {
        let stream = self
            .provider
            .create_stream(period, &group, selector.as_ref())?;
        let renderer = self.renderer_factory.create_renderer(group.content_type);
        debug!(content_type = %group.content_type, group = %group.id, "Holder created");
        Ok(StreamHolder::new(group, selector, stream, renderer))
    }

    fn dispose_holder(&self, holder: StreamHolder) {
        let provider = Arc::clone(&self.provider);
        holder.dispose(|stream| provider.release_stream(stream));
    }

    /// Prepares every held stream concurrently. Fails if any one fails.
    async fn prepare_streams(&self) -> Result<()> {
        let results = join_all(self.holders.values().map(|h| h.stream().prepare())).await;
        let errors: Vec<_> = results.into_iter().filter_map(|r| r.err()).collect();
        match PlaybackError::aggregate(errors) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Builds the segment for `requested`, snapped by the video stream and
    /// never before the period start.
    fn update_segment(&mut self, requested: Duration) -> Segment {
        let mut start = match self.holders.get(&ContentType::Video) {
            Some(video) => video.stream().adjusted_seek_position(requested),
            None => requested,
        };
        if let Some(period) = &self.period {
            start = start.max(period.start);
        }

        let segment = Segment::new(self.clock.elapsed(), start);
        debug!(requested = ?requested, start = ?segment.start, base = ?segment.base, "Segment updated");
        self.segment = Some(segment);
        segment
    }

    fn start_loading(&mut self) {
        let Some(segment) = self.segment else {
            return;
        };
        let token = &self.session;
        for holder in self.holders.values_mut() {
            holder.load_chunks(segment, token);
        }
    }

    /// Fetches decoder configs, opens the platform and drives its prepare.
    async fn open_platform(&mut self) -> Result<()> {
        let platform = self.platform()?;
        let token = self.session.clone();

        let results = join_all(
            self.holders
                .values()
                .map(|h| h.stream().stream_config(token.clone())),
        )
        .await;
        let mut configs = Vec::with_capacity(results.len());
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(config) => configs.push(config),
                Err(err) => errors.push(err),
            }
        }
        if let Some(err) = PlaybackError::aggregate(errors) {
            return Err(err);
        }

        platform.open(self.config.window, configs)?;

        let (notifier, ready) = ready_channel();
        let operation = platform.prepare(notifier);
        self.drive_readiness(operation, ready).await
    }

    /// Runs a platform `prepare`/`seek` while starting pipelines for every
    /// content type it reports ready, including reports queued when it
    /// returned.
    async fn drive_readiness<F>(&mut self, operation: F, mut ready: ReadyReceiver) -> Result<()>
    where
        F: Future<Output = bridge_traits::Result<()>>,
    {
        let mut operation = std::pin::pin!(operation);
        let result = loop {
            core_async::select! {
                biased;
                Some(content_type) = ready.recv() => self.on_content_type_ready(content_type),
                result = &mut operation => break result,
            }
        };

        while let Some(content_type) = ready.try_recv() {
            self.on_content_type_ready(content_type);
        }
        result.map_err(PlaybackError::from)
    }

    fn on_content_type_ready(&mut self, content_type: ContentType) {
        if self.session.is_cancelled() {
            debug!(content_type = %content_type, "Ignoring readiness from a stopped session");
            return;
        }
        let (Some(platform), Some(segment)) = (self.platform.clone(), self.segment) else {
            return;
        };
        let Some(holder) = self.holders.get_mut(&content_type) else {
            warn!(content_type = %content_type, "Readiness reported for inactive content type");
            return;
        };

        self.ready.insert(content_type);
        holder.start_pushing_packets(segment, &self.clock, &platform, &self.session);
        self.events
            .emit(PlayerEvent::ContentTypeReady { content_type })
            .ok();
    }

    /// Starts or resumes the platform, the clock and every ready pipeline.
    fn resume_playback(&mut self) -> Result<()> {
        let platform = self.platform()?;
        if platform.state() == PlatformState::Paused {
            platform.resume()?;
        } else {
            platform.start()?;
        }
        self.clock.start();

        if let Some(segment) = self.segment {
            for (content_type, holder) in self.holders.iter_mut() {
                if self.ready.contains(content_type) {
                    holder.start_pushing_packets(segment, &self.clock, &platform, &self.session);
                }
            }
        }
        Ok(())
    }

    fn report_outcomes(&self, outcomes: Vec<(ContentType, Pipeline, TaskOutcome)>) {
        for (content_type, pipeline, outcome) in outcomes {
            if let Some(err) = outcome.into_error() {
                self.events
                    .emit(PlayerEvent::PipelineFailed {
                        content_type,
                        pipeline,
                        message: err.to_string(),
                    })
                    .ok();
            }
        }
    }

    // ========================================================================
    // State helpers
    // ========================================================================

    fn platform(&self) -> Result<Arc<dyn PlatformPlayer>> {
        self.platform
            .clone()
            .ok_or_else(|| PlaybackError::Internal("no platform player".into()))
    }

    fn ensure_prepared(&self, operation: &'static str) -> Result<()> {
        match self.state {
            PlaybackState::Ready | PlaybackState::Playing | PlaybackState::Paused => Ok(()),
            _ => Err(self.invalid(operation)),
        }
    }

    fn invalid(&self, operation: &'static str) -> PlaybackError {
        PlaybackError::InvalidOperation {
            operation,
            state: self.state,
        }
    }

    fn fail_to_paused(&mut self, operation: &'static str, err: &PlaybackError) {
        error!(operation, error = %err, "Operation failed, playback paused");
        self.clock.stop();
        self.set_state(PlaybackState::Paused);
    }

    fn set_state(&mut self, next: PlaybackState) {
        if self.state == next {
            return;
        }
        let previous = std::mem::replace(&mut self.state, next);
        info!(from = %previous, to = %next, "Playback state changed");
        self.events
            .emit(PlayerEvent::StateChanged {
                from: previous,
                to: next,
            })
            .ok();
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.session.cancel();
    }
}
