//! Default track choice for a fresh session.

use crate::model::StreamGroup;
use bridge_traits::ContentType;

/// Picks at most one audio and one video group from `groups`.
///
/// Audio prefers, in order: a group in `preferred_language`, a group with a
/// default or main format, the first group. Video skips the language step.
/// Groups without formats are never chosen. The result lists audio before
/// video and omits a content type with no candidates.
pub fn select_default_groups(
    groups: &[StreamGroup],
    preferred_language: Option<&str>,
) -> Vec<StreamGroup> {
    let audio = pick(groups, ContentType::Audio, preferred_language);
    let video = pick(groups, ContentType::Video, None);
    audio.into_iter().chain(video).cloned().collect()
}

fn pick<'a>(
    groups: &'a [StreamGroup],
    content_type: ContentType,
    preferred_language: Option<&str>,
) -> Option<&'a StreamGroup> {
    let candidates: Vec<&StreamGroup> = groups
        .iter()
        .filter(|g| g.content_type == content_type && g.has_formats())
        .collect();

    preferred_language
        .and_then(|lang| {
            candidates
                .iter()
                .find(|g| g.language().is_some_and(|l| language_matches(l, lang)))
        })
        .or_else(|| candidates.iter().find(|g| g.has_default_or_main()))
        .or_else(|| candidates.first())
        .copied()
}

/// Case-insensitive match on the primary subtag, so "en" matches "en-US".
fn language_matches(tag: &str, preferred: &str) -> bool {
    let primary = |t: &str| t.split(['-', '_']).next().unwrap_or("").to_ascii_lowercase();
    !preferred.is_empty() && primary(tag) == primary(preferred)
}
