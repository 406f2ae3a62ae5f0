//! Adaptive-bitrate playback engine.
//!
//! Single entry point for hosts. Re-exports the player, the collaborator
//! traits a host implements, the event bus and the logging bootstrap, so an
//! application depends on `abr-player` alone instead of wiring each
//! workspace crate.
//!
//! ```rust,ignore
//! use abr_player::prelude::*;
//!
//! init_logging(LoggingConfig::default())?;
//!
//! let mut player = Player::new(PlayerConfig::default(), provider, platforms, renderers)?;
//! let mut events = player.subscribe();
//! player.prepare().await?;
//! player.play().await?;
//! ```

pub use bridge_traits as bridge;
pub use core_async as runtime;
pub use core_playback as playback;
pub use core_runtime::{events, logging};

pub use bridge_traits::{
    BridgeError, ContentType, LoggerSink, Packet, PlatformCapabilities, PlatformPlayer,
    PlatformPlayerFactory, PlatformState, PlaybackState, ReadyNotifier, StreamConfig,
};
pub use core_playback::{
    ChunkSink, Clock, PlaybackError, Player, PlayerConfig, RendererFactory, Segment, Selector,
    SelectorUpdatePolicy, Stream, StreamGroup, StreamProvider, StreamRenderer,
};
pub use core_runtime::events::{EventBus, PlayerEvent};
pub use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};

/// Everything a host needs to build and drive a player.
pub mod prelude {
    pub use crate::{
        init_logging, ChunkSink, ContentType, LoggingConfig, PlatformPlayer,
        PlatformPlayerFactory, PlaybackError, PlaybackState, Player, PlayerConfig, PlayerEvent,
        RendererFactory, Selector, Stream, StreamGroup, StreamProvider, StreamRenderer,
    };
}
