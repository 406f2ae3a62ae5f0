//! # Playback Error Types
//!
//! Errors surfaced by the playback engine.

use bridge_traits::{BridgeError, ContentType, PlaybackState};
use std::fmt;
use thiserror::Error;

/// One reason a requested set of stream groups was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupViolation {
    /// No groups were requested.
    Empty,
    /// `groups` and `selectors` must be parallel arrays.
    LengthMismatch { groups: usize, selectors: usize },
    /// The group at `index` has a content type the engine cannot play.
    UnknownContentType { index: usize, group_id: String },
    /// More than one group was requested for `content_type`.
    DuplicateContentType {
        content_type: ContentType,
        count: usize,
    },
    /// Throughput-adaptive audio needs seamless audio switching.
    UnsupportedAudioSelector { index: usize },
}

impl fmt::Display for GroupViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupViolation::Empty => write!(f, "no stream groups requested"),
            GroupViolation::LengthMismatch { groups, selectors } => write!(
                f,
                "{} groups but {} selectors",
                groups, selectors
            ),
            GroupViolation::UnknownContentType { index, group_id } => write!(
                f,
                "group {} ('{}') has an unknown content type",
                index, group_id
            ),
            GroupViolation::DuplicateContentType {
                content_type,
                count,
            } => write!(f, "{} groups requested for {}", count, content_type),
            GroupViolation::UnsupportedAudioSelector { index } => write!(
                f,
                "selector {} is throughput-adaptive audio, which this platform cannot switch seamlessly",
                index
            ),
        }
    }
}

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Usage Errors
    // ========================================================================
    /// The operation is not valid in the current lifecycle state.
    #[error("Cannot {operation} while {state}")]
    InvalidOperation {
        operation: &'static str,
        state: PlaybackState,
    },

    /// `set_stream_groups` input was rejected before anything changed.
    #[error("Invalid stream groups: {}", format_violations(.0))]
    InvalidStreamGroups(Vec<GroupViolation>),

    /// Player configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Collaborator Errors
    // ========================================================================
    /// The timeline has no periods to play.
    #[error("Timeline has no periods")]
    EmptyTimeline,

    /// No playable stream group was found in the period.
    #[error("Period '{0}' has no playable stream groups")]
    NoPlayableGroups(String),

    /// A stream or provider call failed.
    #[error("Stream error ({content_type}): {message}")]
    Stream {
        content_type: ContentType,
        message: String,
    },

    /// A renderer failed while pushing packets.
    #[error("Renderer error ({content_type}): {message}")]
    Renderer {
        content_type: ContentType,
        message: String,
    },

    /// The platform player or its factory failed.
    #[error("Platform error: {0}")]
    Platform(#[from] BridgeError),

    /// Several concurrent operations failed.
    #[error("{} operations failed: {}", .0.len(), format_errors(.0))]
    Multiple(Vec<PlaybackError>),

    // ========================================================================
    // Task Errors
    // ========================================================================
    /// The operation observed its cancellation token.
    #[error("Operation cancelled")]
    Cancelled,

    /// A pipeline task panicked or was aborted by the runtime.
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    pub fn stream(content_type: ContentType, message: impl Into<String>) -> Self {
        PlaybackError::Stream {
            content_type,
            message: message.into(),
        }
    }

    pub fn renderer(content_type: ContentType, message: impl Into<String>) -> Self {
        PlaybackError::Renderer {
            content_type,
            message: message.into(),
        }
    }

    /// Returns `true` if this error only reports a cooperative cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            PlaybackError::Cancelled => true,
            PlaybackError::Platform(err) => err.is_cancelled(),
            PlaybackError::Multiple(errors) => errors.iter().all(PlaybackError::is_cancelled),
            _ => false,
        }
    }

    /// Returns `true` for errors caused by the caller rather than a collaborator.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::InvalidOperation { .. }
                | PlaybackError::InvalidStreamGroups(_)
                | PlaybackError::InvalidConfig(_)
        )
    }

    /// Collapses a list of failures into one error.
    ///
    /// Returns `None` for an empty list and the error itself for a single one.
    pub fn aggregate(mut errors: Vec<PlaybackError>) -> Option<PlaybackError> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(PlaybackError::Multiple(errors)),
        }
    }
}

fn format_violations(violations: &[GroupViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_errors(errors: &[PlaybackError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
