//! # Playback Engine
//!
//! Adaptive-bitrate playback orchestration.
//!
//! ## Overview
//!
//! A [`Player`] takes a [`StreamProvider`] (timeline and streams), a
//! `PlatformPlayerFactory` (native decoder) and a [`RendererFactory`], and
//! keeps one loading and one pushing pipeline per active content type in step
//! with a shared [`Clock`]:
//!
//! ```text
//! StreamProvider -> Stream --load_chunks--> renderer sink
//!                                      renderer --push_packets--> PlatformPlayer
//! ```
//!
//! - [`clock`]: pausable session clock
//! - [`segment`]: the active playback window
//! - [`model`]: timeline, periods, stream groups and formats
//! - [`selector`]: variant selection policies
//! - [`selection`]: default track choice
//! - [`validation`]: track switch pre-flight checks
//! - [`switching`]: reuse-or-rebuild planning for track switches
//! - [`holder`]: per-content-type pipeline ownership
//! - [`player`]: the lifecycle state machine
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_playback::{Player, PlayerConfig};
//!
//! let mut player = Player::new(
//!     PlayerConfig::default().with_preferred_audio_language("en"),
//!     provider,
//!     platform_factory,
//!     renderer_factory,
//! )?;
//!
//! player.prepare().await?;
//! player.play().await?;
//! player.seek(Duration::from_secs(30)).await?;
//! player.dispose().await;
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod holder;
pub mod model;
pub mod player;
pub mod segment;
pub mod selection;
pub mod selector;
pub mod switching;
pub mod traits;
pub mod validation;

pub use clock::Clock;
pub use config::{PlayerConfig, SelectorUpdatePolicy};
pub use error::{GroupViolation, PlaybackError, Result};
pub use holder::{StreamHolder, TaskOutcome};
pub use model::{Period, StreamFormat, StreamGroup, StreamRole, Timeline};
pub use player::Player;
pub use segment::Segment;
pub use selection::select_default_groups;
pub use selector::{
    FixedStreamSelector, Selector, SelectorKind, StreamSelector, ThroughputStreamSelector,
};
pub use switching::{plan_switch, ActiveTrack, PlannedSwitch, SwitchAction, SwitchPlan};
pub use traits::{ChunkSink, RendererFactory, Stream, StreamProvider, StreamRenderer};
pub use validation::verify_stream_groups;
