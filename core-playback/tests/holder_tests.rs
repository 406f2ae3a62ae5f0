//! Stream holder pipeline tests against recording collaborators.

mod common;

use bridge_traits::{ContentType, PlatformPlayer, PlatformPlayerFactory};
use common::*;
use core_async::sync::CancellationToken;
use core_playback::{Clock, PlaybackError, Segment, StreamHolder, TaskOutcome};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

struct Fixture {
    journal: Journal,
    renderer: Arc<MockRenderer>,
    platform: Arc<dyn PlatformPlayer>,
    holder: StreamHolder,
    clock: Clock,
    session: CancellationToken,
}

fn fixture(content_type: ContentType) -> Fixture {
    let journal = Journal::default();
    let renderer = Arc::new(MockRenderer::new(content_type, journal.clone()));
    let stream = Arc::new(MockStream::new(content_type, journal.clone(), false));
    let platform = MockPlatformFactory::new(journal.clone(), Default::default())
        .create()
        .unwrap();
    let group = match content_type {
        ContentType::Video => video_group("video-main"),
        _ => audio_group("audio-en", "en", true),
    };

    Fixture {
        holder: StreamHolder::new(group, None, stream, renderer.clone()),
        journal,
        renderer,
        platform,
        clock: Clock::new(),
        session: CancellationToken::new(),
    }
}

fn segment() -> Segment {
    Segment::new(Duration::ZERO, Duration::from_secs(8))
}

#[tokio::test]
async fn starting_twice_runs_one_push_task() {
    let mut f = fixture(ContentType::Video);

    assert!(f
        .holder
        .start_pushing_packets(segment(), &f.clock, &f.platform, &f.session));
    assert!(eventually(|| f.renderer.pushing()).await);
    assert!(!f
        .holder
        .start_pushing_packets(segment(), &f.clock, &f.platform, &f.session));

    assert!(f.holder.is_pushing());
    assert_eq!(f.renderer.push_starts(), 1);

    assert!(matches!(
        f.holder.stop_pushing_packets().await,
        TaskOutcome::Cancelled
    ));
}

#[tokio::test]
async fn stop_without_task_is_idle() {
    let mut f = fixture(ContentType::Audio);

    assert!(matches!(
        f.holder.stop_pushing_packets().await,
        TaskOutcome::Idle
    ));
    assert!(matches!(
        f.holder.finish_loading_chunks().await,
        TaskOutcome::Idle
    ));
    // The renderer is still told to stop.
    assert_eq!(f.journal.count("audio:stop"), 1);
}

#[tokio::test]
async fn stop_waits_for_the_push_task() {
    let mut f = fixture(ContentType::Video);
    f.holder
        .start_pushing_packets(segment(), &f.clock, &f.platform, &f.session);
    assert!(eventually(|| f.renderer.pushing()).await);

    let outcome = f.holder.stop_pushing_packets().await;

    assert!(matches!(outcome, TaskOutcome::Cancelled));
    assert!(!f.holder.is_pushing());
    let entries = f.journal.entries();
    assert!(position_of(&entries, "video:stop") < position_of(&entries, "video:push_end"));
    // Stopping one pipeline leaves the session alone.
    assert!(!f.session.is_cancelled());
}

#[tokio::test]
async fn renderer_failure_is_reported() {
    let mut f = fixture(ContentType::Video);
    f.renderer.state.fail_on_stop.store(true, Ordering::SeqCst);
    f.holder
        .start_pushing_packets(segment(), &f.clock, &f.platform, &f.session);
    assert!(eventually(|| f.renderer.pushing()).await);

    let outcome = f.holder.stop_pushing_packets().await;

    assert!(matches!(
        outcome.into_error(),
        Some(PlaybackError::Renderer {
            content_type: ContentType::Video,
            ..
        })
    ));
}

#[tokio::test]
async fn pushing_restarts_after_stop() {
    let mut f = fixture(ContentType::Audio);
    f.holder
        .start_pushing_packets(segment(), &f.clock, &f.platform, &f.session);
    assert!(eventually(|| f.renderer.pushing()).await);
    f.holder.stop_pushing_packets().await;

    assert!(f
        .holder
        .start_pushing_packets(segment(), &f.clock, &f.platform, &f.session));
    assert!(eventually(|| f.renderer.push_starts() == 2).await);
    f.holder.stop_pushing_packets().await;
}

#[tokio::test]
async fn flush_is_refused_while_pushing() {
    let mut f = fixture(ContentType::Video);
    f.holder
        .start_pushing_packets(segment(), &f.clock, &f.platform, &f.session);

    assert!(matches!(f.holder.flush(), Err(PlaybackError::Internal(_))));
    assert_eq!(f.journal.count("video:flush"), 0);

    f.holder.stop_pushing_packets().await;
    assert!(f.holder.flush().is_ok());
    assert_eq!(f.journal.count("video:flush"), 1);
}

#[tokio::test]
async fn loading_fills_the_renderer_sink() {
    let mut f = fixture(ContentType::Audio);

    assert!(f.holder.load_chunks(segment(), &f.session));
    assert!(!f.holder.load_chunks(segment(), &f.session));
    assert!(eventually(|| f.renderer.buffered() == CHUNKS_PER_SEGMENT).await);
    assert!(f.holder.is_loading());

    f.session.cancel();
    assert!(matches!(
        f.holder.finish_loading_chunks().await,
        TaskOutcome::Cancelled
    ));
    assert!(!f.holder.is_loading());
    assert_eq!(f.journal.count("audio:load_start"), 1);
    assert_eq!(f.journal.count("audio:load_end"), 1);

    f.holder.flush().unwrap();
    assert_eq!(f.renderer.buffered(), 0);
}

#[tokio::test]
async fn session_cancel_reaches_push_task() {
    let mut f = fixture(ContentType::Video);
    f.holder
        .start_pushing_packets(segment(), &f.clock, &f.platform, &f.session);
    assert!(eventually(|| f.renderer.pushing()).await);

    f.session.cancel();
    assert!(eventually(|| !f.renderer.pushing()).await);
    assert!(matches!(
        f.holder.stop_pushing_packets().await,
        TaskOutcome::Cancelled
    ));
}

#[tokio::test]
async fn dispose_releases_then_disposes_stream() {
    let f = fixture(ContentType::Audio);
    let journal = f.journal.clone();

    f.holder.dispose(|stream| {
        journal.record(format!("release:{}", stream.content_type()));
    });

    assert_eq!(
        f.journal.entries(),
        vec!["release:audio".to_string(), "audio:dispose".to_string()]
    );
}
