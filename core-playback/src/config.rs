//! # Player Configuration
//!
//! Configuration for a [`Player`](crate::Player) session.

use crate::error::{PlaybackError, Result};
use bridge_traits::{PlatformState, WindowHandle};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// When a reused stream receives its new selector during a track switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorUpdatePolicy {
    /// Update before loading restarts, so the first chunk of the new segment
    /// already uses the new selector.
    #[default]
    Immediate,
    /// Update after loading restarted; the loader picks the selector up at
    /// its next chunk.
    NextChunkBoundary,
}

/// Player configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Audio language to prefer when choosing default groups ("en", "de-DE").
    ///
    /// Default: none (manifest default).
    #[serde(default)]
    pub preferred_audio_language: Option<String>,

    /// Requested start position. Never moves playback before the period start.
    ///
    /// Default: none (period start).
    #[serde(default)]
    pub start_time: Option<Duration>,

    /// Surface handed to the platform player on open.
    #[serde(default)]
    pub window: WindowHandle,

    #[serde(default)]
    pub selector_update: SelectorUpdatePolicy,

    /// Platform states in which a track switch resumes from the segment start
    /// instead of asking the platform for its position.
    ///
    /// Default: `none`, `idle`, `ready`.
    #[serde(default = "default_segment_position_states")]
    pub segment_position_states: Vec<PlatformState>,

    /// Events buffered per slow subscriber.
    ///
    /// Default: 64.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            preferred_audio_language: None,
            start_time: None,
            window: WindowHandle::default(),
            selector_update: SelectorUpdatePolicy::default(),
            segment_position_states: default_segment_position_states(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl PlayerConfig {
    pub fn with_preferred_audio_language(mut self, language: impl Into<String>) -> Self {
        self.preferred_audio_language = Some(language.into());
        self
    }

    pub fn with_start_time(mut self, start_time: Duration) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn with_window(mut self, window: WindowHandle) -> Self {
        self.window = window;
        self
    }

    pub fn with_selector_update(mut self, policy: SelectorUpdatePolicy) -> Self {
        self.selector_update = policy;
        self
    }

    pub fn with_segment_position_states(mut self, states: Vec<PlatformState>) -> Self {
        self.segment_position_states = states;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Parses and validates a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PlaybackError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(PlaybackError::InvalidConfig(
                "event_capacity must be > 0".to_string(),
            ));
        }

        if let Some(language) = &self.preferred_audio_language {
            if language.trim().is_empty() {
                return Err(PlaybackError::InvalidConfig(
                    "preferred_audio_language cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Whether a switch in `state` resumes from the segment start.
    pub fn uses_segment_position(&self, state: PlatformState) -> bool {
        self.segment_position_states.contains(&state)
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_segment_position_states() -> Vec<PlatformState> {
    vec![PlatformState::None, PlatformState::Idle, PlatformState::Ready]
}

fn default_event_capacity() -> usize {
    64
}
