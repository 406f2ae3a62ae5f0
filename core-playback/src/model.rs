//! Timeline and track descriptors supplied by the stream provider.

use bridge_traits::ContentType;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Role flags a manifest attaches to a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamRole {
    Main,
    Alternate,
    Commentary,
    Dub,
    Description,
}

/// One candidate variant inside a [`StreamGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFormat {
    pub id: String,
    /// BCP 47 language tag, if the manifest declares one.
    #[serde(default)]
    pub language: Option<String>,
    /// Peak bitrate in bits per second.
    pub bitrate: u64,
    /// Marked as the default choice by the manifest.
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub roles: Vec<StreamRole>,
}

impl StreamFormat {
    pub fn new(id: impl Into<String>, bitrate: u64) -> Self {
        Self {
            id: id.into(),
            language: None,
            bitrate,
            default: false,
            roles: Vec::new(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_default(mut self) -> Self {
        self.default = true;
        self
    }

    pub fn with_role(mut self, role: StreamRole) -> Self {
        self.roles.push(role);
        self
    }

    /// Default-flagged or carrying the `main` role.
    pub fn is_default_or_main(&self) -> bool {
        self.default || self.roles.contains(&StreamRole::Main)
    }
}

/// Immutable family of interchangeable variants for one content type.
///
/// Two groups are the same group when their descriptors are equal; the engine
/// never mutates a group after the provider hands it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamGroup {
    pub id: String,
    pub content_type: ContentType,
    pub formats: Vec<StreamFormat>,
}

impl StreamGroup {
    pub fn new(
        id: impl Into<String>,
        content_type: ContentType,
        formats: Vec<StreamFormat>,
    ) -> Self {
        Self {
            id: id.into(),
            content_type,
            formats,
        }
    }

    pub fn has_formats(&self) -> bool {
        !self.formats.is_empty()
    }

    pub fn has_default_or_main(&self) -> bool {
        self.formats.iter().any(StreamFormat::is_default_or_main)
    }

    /// Language of the first format that declares one.
    pub fn language(&self) -> Option<&str> {
        self.formats.iter().find_map(|f| f.language.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: String,
    /// Declared start on the presentation timeline.
    pub start: Duration,
    /// `None` for live or open-ended periods.
    pub duration: Option<Duration>,
}

impl Period {
    pub fn new(id: impl Into<String>, start: Duration, duration: Option<Duration>) -> Self {
        Self {
            id: id.into(),
            start,
            duration,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub periods: Vec<Period>,
}

impl Timeline {
    pub fn new(periods: Vec<Period>) -> Self {
        Self { periods }
    }

    pub fn first_period(&self) -> Option<&Period> {
        self.periods.first()
    }
}
