//! Pre-flight checks for track switches.

use crate::error::{GroupViolation, PlaybackError, Result};
use crate::model::StreamGroup;
use crate::selector::{Selector, SelectorKind};
use bridge_traits::{ContentType, PlatformCapabilities};

/// Checks a `set_stream_groups` request without touching any player state.
///
/// Every violation is collected; the error lists them all.
pub fn verify_stream_groups(
    groups: &[StreamGroup],
    selectors: &[Option<Selector>],
    capabilities: PlatformCapabilities,
) -> Result<()> {
    let mut violations = Vec::new();

    if groups.is_empty() {
        violations.push(GroupViolation::Empty);
    }

    if groups.len() != selectors.len() {
        violations.push(GroupViolation::LengthMismatch {
            groups: groups.len(),
            selectors: selectors.len(),
        });
    }

    for (index, group) in groups.iter().enumerate() {
        if !group.content_type.is_playable() {
            violations.push(GroupViolation::UnknownContentType {
                index,
                group_id: group.id.clone(),
            });
        }
    }

    for content_type in ContentType::PLAYABLE {
        let count = groups
            .iter()
            .filter(|g| g.content_type == content_type)
            .count();
        if count > 1 {
            violations.push(GroupViolation::DuplicateContentType {
                content_type,
                count,
            });
        }
    }

    if !capabilities.supports_seamless_audio_change {
        for (index, (group, selector)) in groups.iter().zip(selectors).enumerate() {
            let adaptive = selector
                .as_ref()
                .is_some_and(|s| s.kind() == SelectorKind::ThroughputAdaptive);
            if group.content_type == ContentType::Audio && adaptive {
                violations.push(GroupViolation::UnsupportedAudioSelector { index });
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(PlaybackError::InvalidStreamGroups(violations))
    }
}
