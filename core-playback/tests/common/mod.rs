//! Recording collaborators shared by the integration tests.
//!
//! Every collaborator appends to one [`Journal`], so tests can assert the
//! relative order of calls across streams, renderers and platform players.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::{
    AudioCodec, AudioConfig, BridgeError, ContentType, Packet, PlatformCapabilities,
    PlatformPlayer, PlatformPlayerFactory, PlatformState, ReadyNotifier, StreamConfig,
    SubmitStatus, VideoCodec, VideoConfig, WindowHandle,
};
use bytes::Bytes;
use core_async::sync::CancellationToken;
use core_playback::{
    ChunkSink, Clock, Period, PlaybackError, Player, PlayerConfig, RendererFactory, Result,
    Segment, Selector, Stream, StreamFormat, StreamGroup, StreamProvider, StreamRenderer,
    StreamRole, Timeline,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const GOP: Duration = Duration::from_secs(4);
pub const CHUNKS_PER_SEGMENT: usize = 3;

// ============================================================================
// Journal
// ============================================================================

#[derive(Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Entries recorded after the first `from`.
    pub fn since(&self, from: usize) -> Vec<String> {
        self.entries.lock().unwrap()[from..].to_vec()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == entry)
            .count()
    }
}

/// Index of the first occurrence of `entry`, panicking with the log if absent.
pub fn position_of(entries: &[String], entry: &str) -> usize {
    entries
        .iter()
        .position(|e| e == entry)
        .unwrap_or_else(|| panic!("'{}' not found in {:#?}", entry, entries))
}

/// Polls `condition` until it holds or two seconds pass.
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..400 {
        if condition() {
            return true;
        }
        core_async::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

// ============================================================================
// Stream
// ============================================================================

pub struct MockStream {
    content_type: ContentType,
    journal: Journal,
    fail_prepare: bool,
    loads: AtomicUsize,
}

impl MockStream {
    pub fn new(content_type: ContentType, journal: Journal, fail_prepare: bool) -> Self {
        Self {
            content_type,
            journal,
            fail_prepare,
            loads: AtomicUsize::new(0),
        }
    }

    fn record(&self, what: &str) {
        self.journal.record(format!("{}:{}", self.content_type, what));
    }
}

#[async_trait]
impl Stream for MockStream {
    fn content_type(&self) -> ContentType {
        self.content_type
    }

    async fn prepare(&self) -> Result<()> {
        self.record("prepare");
        if self.fail_prepare {
            return Err(PlaybackError::stream(self.content_type, "init segment missing"));
        }
        Ok(())
    }

    fn adjusted_seek_position(&self, position: Duration) -> Duration {
        if self.content_type != ContentType::Video {
            return position;
        }
        let gop = GOP.as_millis() as u64;
        Duration::from_millis(position.as_millis() as u64 / gop * gop)
    }

    async fn stream_config(&self, _token: CancellationToken) -> Result<StreamConfig> {
        self.record("config");
        Ok(match self.content_type {
            ContentType::Video => StreamConfig::Video(VideoConfig {
                codec: VideoCodec::H264,
                width: 1920,
                height: 1080,
                frame_rate: (25, 1),
                bitrate: Some(6_000_000),
                codec_data: Vec::new(),
            }),
            _ => StreamConfig::Audio(AudioConfig {
                codec: AudioCodec::Aac,
                sample_rate: 48_000,
                channels: 2,
                bitrate: Some(128_000),
                codec_data: Vec::new(),
            }),
        })
    }

    async fn load_chunks(
        &self,
        segment: Segment,
        sink: Arc<dyn ChunkSink>,
        token: CancellationToken,
    ) -> Result<()> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.record("load_start");
        for i in 0..CHUNKS_PER_SEGMENT {
            let pts = segment.start + Duration::from_secs(i as u64);
            sink.push_chunk(Packet::new(self.content_type, pts, Bytes::from_static(b"chunk")))
                .await?;
        }
        token.cancelled().await;
        self.record("load_end");
        Err(PlaybackError::Cancelled)
    }

    fn dispose(&self) {
        self.record("dispose");
    }
}

// ============================================================================
// Renderer
// ============================================================================

#[derive(Default)]
pub struct RendererState {
    pub pushing: AtomicBool,
    pub push_starts: AtomicUsize,
    pub buffered: AtomicUsize,
    pub fail_on_stop: AtomicBool,
}

struct MockSink {
    state: Arc<RendererState>,
}

#[async_trait]
impl ChunkSink for MockSink {
    async fn push_chunk(&self, _packet: Packet) -> Result<()> {
        self.state.buffered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct MockRenderer {
    content_type: ContentType,
    journal: Journal,
    pub state: Arc<RendererState>,
}

impl MockRenderer {
    pub fn new(content_type: ContentType, journal: Journal) -> Self {
        Self {
            content_type,
            journal,
            state: Arc::new(RendererState::default()),
        }
    }

    pub fn pushing(&self) -> bool {
        self.state.pushing.load(Ordering::SeqCst)
    }

    pub fn push_starts(&self) -> usize {
        self.state.push_starts.load(Ordering::SeqCst)
    }

    pub fn buffered(&self) -> usize {
        self.state.buffered.load(Ordering::SeqCst)
    }

    fn record(&self, what: &str) {
        self.journal.record(format!("{}:{}", self.content_type, what));
    }
}

#[async_trait]
impl StreamRenderer for MockRenderer {
    fn content_type(&self) -> ContentType {
        self.content_type
    }

    fn sink(&self) -> Arc<dyn ChunkSink> {
        Arc::new(MockSink {
            state: Arc::clone(&self.state),
        })
    }

    async fn push_packets(
        &self,
        _segment: Segment,
        _clock: Clock,
        platform: Arc<dyn PlatformPlayer>,
        token: CancellationToken,
    ) -> Result<()> {
        self.state.push_starts.fetch_add(1, Ordering::SeqCst);
        self.state.pushing.store(true, Ordering::SeqCst);
        self.record("push_start");

        let packet = Packet::new(self.content_type, Duration::ZERO, Bytes::new());
        platform.submit_packet(&packet)?;

        token.cancelled().await;
        self.state.pushing.store(false, Ordering::SeqCst);
        self.record("push_end");

        if self.state.fail_on_stop.load(Ordering::SeqCst) {
            return Err(PlaybackError::renderer(self.content_type, "surface lost"));
        }
        Err(PlaybackError::Cancelled)
    }

    fn stop(&self) {
        self.record("stop");
    }

    fn flush(&self) {
        self.record("flush");
        self.state.buffered.store(0, Ordering::SeqCst);
    }

    fn is_pushing(&self) -> bool {
        self.pushing()
    }
}

#[derive(Default)]
pub struct MockRendererFactory {
    journal: Journal,
    created: Mutex<Vec<Arc<MockRenderer>>>,
}

impl MockRendererFactory {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            created: Mutex::new(Vec::new()),
        }
    }

    /// Most recently created renderer for `content_type`.
    pub fn latest(&self, content_type: ContentType) -> Arc<MockRenderer> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.content_type == content_type)
            .cloned()
            .unwrap_or_else(|| panic!("no {} renderer created", content_type))
    }

    pub fn created(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

impl RendererFactory for MockRendererFactory {
    fn create_renderer(&self, content_type: ContentType) -> Arc<dyn StreamRenderer> {
        let renderer = Arc::new(MockRenderer::new(content_type, self.journal.clone()));
        self.created.lock().unwrap().push(Arc::clone(&renderer));
        renderer
    }
}

// ============================================================================
// Platform
// ============================================================================

#[derive(Default)]
pub struct PlatformSettings {
    pub withhold: Mutex<Option<ContentType>>,
    pub fail_seek: AtomicBool,
    pub fail_position: AtomicBool,
    pub position: Mutex<Duration>,
}

pub struct MockPlatform {
    pub id: usize,
    journal: Journal,
    settings: Arc<PlatformSettings>,
    state: Mutex<PlatformState>,
    opened: Mutex<Vec<ContentType>>,
    pub submitted: AtomicUsize,
}

impl MockPlatform {
    pub fn new(id: usize, journal: Journal, settings: Arc<PlatformSettings>) -> Self {
        Self {
            id,
            journal,
            settings,
            state: Mutex::new(PlatformState::None),
            opened: Mutex::new(Vec::new()),
            submitted: AtomicUsize::new(0),
        }
    }

    pub fn opened(&self) -> Vec<ContentType> {
        self.opened.lock().unwrap().clone()
    }

    fn record(&self, what: &str) {
        self.journal.record(format!("platform#{}:{}", self.id, what));
    }

    fn set_state(&self, state: PlatformState) {
        *self.state.lock().unwrap() = state;
    }

    fn notify_ready(&self, ready: &ReadyNotifier) {
        let withheld = *self.settings.withhold.lock().unwrap();
        for content_type in self.opened() {
            if Some(content_type) != withheld {
                ready.notify(content_type);
            }
        }
    }
}

#[async_trait]
impl PlatformPlayer for MockPlatform {
    fn open(&self, _window: WindowHandle, configs: Vec<StreamConfig>) -> bridge_traits::Result<()> {
        self.record("open");
        *self.opened.lock().unwrap() = configs.iter().map(StreamConfig::content_type).collect();
        self.set_state(PlatformState::Idle);
        Ok(())
    }

    async fn prepare(&self, ready: ReadyNotifier) -> bridge_traits::Result<()> {
        self.record("prepare");
        self.notify_ready(&ready);
        self.set_state(PlatformState::Ready);
        Ok(())
    }

    async fn seek(&self, position: Duration, ready: ReadyNotifier) -> bridge_traits::Result<()> {
        self.record(&format!("seek:{}", position.as_secs()));
        if self.settings.fail_seek.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed("decoder rejected seek".into()));
        }
        self.notify_ready(&ready);
        Ok(())
    }

    fn start(&self) -> bridge_traits::Result<()> {
        self.record("start");
        self.set_state(PlatformState::Playing);
        Ok(())
    }

    fn pause(&self) -> bridge_traits::Result<()> {
        self.record("pause");
        self.set_state(PlatformState::Paused);
        Ok(())
    }

    fn resume(&self) -> bridge_traits::Result<()> {
        self.record("resume");
        self.set_state(PlatformState::Playing);
        Ok(())
    }

    fn stop(&self) -> bridge_traits::Result<()> {
        self.record("stop");
        self.set_state(PlatformState::Idle);
        Ok(())
    }

    fn state(&self) -> PlatformState {
        *self.state.lock().unwrap()
    }

    fn position(&self) -> bridge_traits::Result<Duration> {
        if self.settings.fail_position.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed("decoder lost its clock".into()));
        }
        Ok(*self.settings.position.lock().unwrap())
    }

    fn submit_packet(&self, _packet: &Packet) -> bridge_traits::Result<SubmitStatus> {
        self.submitted.fetch_add(1, Ordering::SeqCst);
        Ok(SubmitStatus::Accepted)
    }

    fn dispose(&self) {
        self.record("dispose");
        self.set_state(PlatformState::None);
    }
}

pub struct MockPlatformFactory {
    journal: Journal,
    capabilities: PlatformCapabilities,
    pub settings: Arc<PlatformSettings>,
    /// Number of successful creates before every further create fails.
    pub fail_after: Mutex<Option<usize>>,
    created: Mutex<Vec<Arc<MockPlatform>>>,
}

impl MockPlatformFactory {
    pub fn new(journal: Journal, capabilities: PlatformCapabilities) -> Self {
        Self {
            journal,
            capabilities,
            settings: Arc::new(PlatformSettings::default()),
            fail_after: Mutex::new(None),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn created(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn latest(&self) -> Arc<MockPlatform> {
        self.created
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no platform created")
    }
}

impl PlatformPlayerFactory for MockPlatformFactory {
    fn create(&self) -> bridge_traits::Result<Arc<dyn PlatformPlayer>> {
        let mut created = self.created.lock().unwrap();
        if let Some(limit) = *self.fail_after.lock().unwrap() {
            if created.len() >= limit {
                self.journal.record("platform:create_failed");
                return Err(BridgeError::NotAvailable("decoder unavailable".into()));
            }
        }
        let platform = Arc::new(MockPlatform::new(
            created.len() + 1,
            self.journal.clone(),
            Arc::clone(&self.settings),
        ));
        created.push(Arc::clone(&platform));
        Ok(platform as Arc<dyn PlatformPlayer>)
    }

    fn capabilities(&self) -> PlatformCapabilities {
        self.capabilities
    }
}

// ============================================================================
// Provider
// ============================================================================

pub struct MockProvider {
    journal: Journal,
    period: Period,
    groups: Vec<StreamGroup>,
    pub fail_prepare: Mutex<Vec<ContentType>>,
    pub released: AtomicUsize,
}

impl MockProvider {
    pub fn new(journal: Journal, period: Period, groups: Vec<StreamGroup>) -> Self {
        Self {
            journal,
            period,
            groups,
            fail_prepare: Mutex::new(Vec::new()),
            released: AtomicUsize::new(0),
        }
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StreamProvider for MockProvider {
    async fn prepare(&self) -> Result<Timeline> {
        self.journal.record("provider:prepare");
        Ok(Timeline::new(vec![self.period.clone()]))
    }

    fn stream_groups(&self, _period: &Period) -> Vec<StreamGroup> {
        self.groups.clone()
    }

    fn create_stream(
        &self,
        _period: &Period,
        group: &StreamGroup,
        _selector: Option<&Selector>,
    ) -> Result<Arc<dyn Stream>> {
        self.journal.record(format!("provider:create:{}", group.id));
        let fail = self.fail_prepare.lock().unwrap().contains(&group.content_type);
        Ok(Arc::new(MockStream::new(
            group.content_type,
            self.journal.clone(),
            fail,
        )))
    }

    fn update_stream(&self, stream: &Arc<dyn Stream>, _selector: Option<&Selector>) -> Result<()> {
        self.journal
            .record(format!("provider:update:{}", stream.content_type()));
        Ok(())
    }

    fn release_stream(&self, stream: &Arc<dyn Stream>) {
        self.released.fetch_add(1, Ordering::SeqCst);
        self.journal
            .record(format!("provider:release:{}", stream.content_type()));
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn audio_group(id: &str, language: &str, default: bool) -> StreamGroup {
    let mut format = StreamFormat::new(format!("{id}-128k"), 128_000).with_language(language);
    if default {
        format = format.with_default();
    }
    StreamGroup::new(id, ContentType::Audio, vec![format])
}

pub fn video_group(id: &str) -> StreamGroup {
    StreamGroup::new(
        id,
        ContentType::Video,
        vec![
            StreamFormat::new(format!("{id}-360p"), 800_000),
            StreamFormat::new(format!("{id}-720p"), 3_000_000).with_role(StreamRole::Main),
            StreamFormat::new(format!("{id}-1080p"), 6_000_000),
        ],
    )
}

pub fn default_groups() -> Vec<StreamGroup> {
    vec![
        audio_group("audio-en", "en", true),
        audio_group("audio-de", "de", false),
        video_group("video-main"),
        video_group("video-alt"),
    ]
}

pub struct Harness {
    pub journal: Journal,
    pub provider: Arc<MockProvider>,
    pub platforms: Arc<MockPlatformFactory>,
    pub renderers: Arc<MockRendererFactory>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(
            Period::new("p0", Duration::ZERO, Some(Duration::from_secs(600))),
            default_groups(),
            PlatformCapabilities::default(),
        )
    }

    pub fn with(
        period: Period,
        groups: Vec<StreamGroup>,
        capabilities: PlatformCapabilities,
    ) -> Self {
        let journal = Journal::default();
        Self {
            provider: Arc::new(MockProvider::new(journal.clone(), period, groups)),
            platforms: Arc::new(MockPlatformFactory::new(journal.clone(), capabilities)),
            renderers: Arc::new(MockRendererFactory::new(journal.clone())),
            journal,
        }
    }

    pub fn player(&self, config: PlayerConfig) -> Player {
        Player::new(
            config,
            self.provider.clone(),
            self.platforms.clone(),
            self.renderers.clone(),
        )
        .expect("valid config")
    }

    pub fn renderer(&self, content_type: ContentType) -> Arc<MockRenderer> {
        self.renderers.latest(content_type)
    }

    /// Waits until every renderer of `content_types` reports pushing.
    pub async fn all_pushing(&self, content_types: &[ContentType]) -> bool {
        eventually(|| content_types.iter().all(|ct| self.renderer(*ct).pushing())).await
    }
}
