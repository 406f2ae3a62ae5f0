//! Media value types shared between the engine and platform adapters.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Category of a media track.
///
/// `Unknown` marks tracks a provider exposes but the engine does not handle
/// (subtitles, timed metadata). They are never activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Audio,
    Video,
    Unknown,
}

impl ContentType {
    /// Content types the engine can run a pipeline for.
    pub const PLAYABLE: [ContentType; 2] = [ContentType::Audio, ContentType::Video];

    /// Returns `true` for `Audio` and `Video`.
    pub fn is_playable(&self) -> bool {
        !matches!(self, ContentType::Unknown)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentType::Audio => "audio",
            ContentType::Video => "video",
            ContentType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Audio codec identifiers. Use [`AudioCodec::Other`] for anything unmapped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    Aac,
    Ac3,
    Eac3,
    Opus,
    Mp3,
    Other(String),
}

/// Video codec identifiers. Use [`VideoCodec::Other`] for anything unmapped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    H264,
    Hevc,
    Vp9,
    Av1,
    Other(String),
}

/// Decoder configuration for an audio stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    pub codec: AudioCodec,
    /// Sample rate in hertz.
    pub sample_rate: u32,
    pub channels: u16,
    /// Average bitrate in bits per second, when known.
    pub bitrate: Option<u64>,
    /// Codec private data (e.g. AudioSpecificConfig).
    #[serde(default)]
    pub codec_data: Vec<u8>,
}

/// Decoder configuration for a video stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoConfig {
    pub codec: VideoCodec,
    pub width: u32,
    pub height: u32,
    /// Frame rate as a `numerator / denominator` pair.
    pub frame_rate: (u32, u32),
    pub bitrate: Option<u64>,
    #[serde(default)]
    pub codec_data: Vec<u8>,
}

/// Configuration a platform decoder needs before it can accept packets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamConfig {
    Audio(AudioConfig),
    Video(VideoConfig),
}

impl StreamConfig {
    pub fn content_type(&self) -> ContentType {
        match self {
            StreamConfig::Audio(_) => ContentType::Audio,
            StreamConfig::Video(_) => ContentType::Video,
        }
    }
}

/// One demuxed (and, if needed, decrypted) access unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub content_type: ContentType,
    /// Presentation timestamp on the period timeline.
    pub pts: Duration,
    pub duration: Duration,
    pub is_keyframe: bool,
    pub data: Bytes,
}

impl Packet {
    pub fn new(content_type: ContentType, pts: Duration, data: Bytes) -> Self {
        Self {
            content_type,
            pts,
            duration: Duration::ZERO,
            is_keyframe: false,
            data,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn keyframe(mut self) -> Self {
        self.is_keyframe = true;
        self
    }

    /// Presentation end of the packet.
    pub fn end(&self) -> Duration {
        self.pts + self.duration
    }
}

/// Opaque handle to the surface the platform renders video into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WindowHandle(pub u64);
