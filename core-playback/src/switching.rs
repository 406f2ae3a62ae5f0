//! Track switch planning.
//!
//! Decides, per content type, whether a requested group can keep its running
//! holder or needs a new one, and whether the platform player must be rebuilt.
//! Pure: the player applies the plan afterwards.

use crate::model::StreamGroup;
use crate::selector::Selector;
use bridge_traits::{ContentType, PlatformCapabilities};
use std::collections::BTreeMap;

/// What happens to one requested content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchAction {
    /// Nothing was active for this content type.
    Add,
    /// A different group replaces the active one.
    Replace,
    /// Same audio group with a new selector on a platform that cannot switch
    /// audio seamlessly. Handled like `Replace`.
    Reconfigure,
    /// Same group; the live stream only receives the new selector.
    Reuse,
}

impl SwitchAction {
    /// Every action except `Reuse` needs a fresh holder and platform player.
    pub fn requires_rebuild(&self) -> bool {
        !matches!(self, SwitchAction::Reuse)
    }
}

/// The group and selector currently running for a content type.
#[derive(Debug, Clone, Copy)]
pub struct ActiveTrack<'a> {
    pub group: &'a StreamGroup,
    pub selector: Option<&'a Selector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSwitch {
    pub content_type: ContentType,
    /// Index into the request arrays.
    pub index: usize,
    pub action: SwitchAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchPlan {
    pub switches: Vec<PlannedSwitch>,
    /// Active content types missing from the request.
    pub dropped: Vec<ContentType>,
    pub recreate_platform: bool,
}

/// Plans a switch from `active` to the validated request.
///
/// `groups` and `selectors` are parallel and hold at most one group per
/// content type.
pub fn plan_switch(
    active: &BTreeMap<ContentType, ActiveTrack<'_>>,
    groups: &[StreamGroup],
    selectors: &[Option<Selector>],
    capabilities: PlatformCapabilities,
) -> SwitchPlan {
    let switches: Vec<PlannedSwitch> = groups
        .iter()
        .zip(selectors)
        .enumerate()
        .map(|(index, (group, selector))| PlannedSwitch {
            content_type: group.content_type,
            index,
            action: decide(active.get(&group.content_type), group, selector.as_ref(), capabilities),
        })
        .collect();

    let dropped: Vec<ContentType> = active
        .keys()
        .filter(|ct| !groups.iter().any(|g| g.content_type == **ct))
        .copied()
        .collect();

    let recreate_platform =
        !dropped.is_empty() || switches.iter().any(|s| s.action.requires_rebuild());

    SwitchPlan {
        switches,
        dropped,
        recreate_platform,
    }
}

fn decide(
    current: Option<&ActiveTrack<'_>>,
    group: &StreamGroup,
    selector: Option<&Selector>,
    capabilities: PlatformCapabilities,
) -> SwitchAction {
    let Some(current) = current else {
        return SwitchAction::Add;
    };

    if current.group != group {
        return SwitchAction::Replace;
    }

    let selector_changed = current.selector != selector;
    if group.content_type == ContentType::Audio
        && selector_changed
        && !capabilities.supports_seamless_audio_change
    {
        return SwitchAction::Reconfigure;
    }

    SwitchAction::Reuse
}
