//! Variant selection policies.
//!
//! The engine treats a selector as an opaque value. It only compares selectors
//! by identity and asks for their [`SelectorKind`]; the streams that receive a
//! selector are the ones that call [`StreamSelector::select`].

use crate::model::StreamFormat;
use std::fmt;
use std::sync::Arc;

/// Broad category of a selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    /// Always the same variant.
    Fixed,
    /// Follows measured network throughput.
    ThroughputAdaptive,
    /// Host-defined policy.
    Custom,
}

/// Picks a variant among a group's formats.
pub trait StreamSelector: Send + Sync {
    fn kind(&self) -> SelectorKind;

    /// Returns the index of the format to load next.
    ///
    /// `throughput_bps` is the stream's current bandwidth estimate, if any.
    fn select(&self, formats: &[StreamFormat], throughput_bps: Option<u64>) -> Option<usize>;
}

/// Shared handle to a selection policy, compared by identity.
#[derive(Clone)]
pub struct Selector(Arc<dyn StreamSelector>);

impl Selector {
    pub fn new(policy: impl StreamSelector + 'static) -> Self {
        Self(Arc::new(policy))
    }

    pub fn from_arc(policy: Arc<dyn StreamSelector>) -> Self {
        Self(policy)
    }

    pub fn fixed(index: usize) -> Self {
        Self::new(FixedStreamSelector::new(index))
    }

    pub fn throughput() -> Self {
        Self::new(ThroughputStreamSelector::default())
    }

    pub fn kind(&self) -> SelectorKind {
        self.0.kind()
    }

    pub fn policy(&self) -> &Arc<dyn StreamSelector> {
        &self.0
    }

    pub fn select(&self, formats: &[StreamFormat], throughput_bps: Option<u64>) -> Option<usize> {
        self.0.select(formats, throughput_bps)
    }
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Selector {}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Selector").field(&self.kind()).finish()
    }
}

/// Always selects the same format index, clamped to the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedStreamSelector {
    index: usize,
}

impl FixedStreamSelector {
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl StreamSelector for FixedStreamSelector {
    fn kind(&self) -> SelectorKind {
        SelectorKind::Fixed
    }

    fn select(&self, formats: &[StreamFormat], _throughput_bps: Option<u64>) -> Option<usize> {
        if formats.is_empty() {
            None
        } else {
            Some(self.index.min(formats.len() - 1))
        }
    }
}

/// Picks the highest bitrate that fits the throughput estimate.
///
/// The estimate is divided by `safety_factor` before comparing. Without an
/// estimate the lowest bitrate is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThroughputStreamSelector {
    pub safety_factor: f64,
}

impl Default for ThroughputStreamSelector {
    fn default() -> Self {
        Self { safety_factor: 1.5 }
    }
}

impl StreamSelector for ThroughputStreamSelector {
    fn kind(&self) -> SelectorKind {
        SelectorKind::ThroughputAdaptive
    }

    fn select(&self, formats: &[StreamFormat], throughput_bps: Option<u64>) -> Option<usize> {
        let lowest = formats
            .iter()
            .enumerate()
            .min_by_key(|(_, f)| f.bitrate)
            .map(|(i, _)| i)?;

        let Some(throughput) = throughput_bps else {
            return Some(lowest);
        };
        let budget = (throughput as f64 / self.safety_factor.max(1.0)) as u64;

        formats
            .iter()
            .enumerate()
            .filter(|(_, f)| f.bitrate <= budget)
            .max_by_key(|(_, f)| f.bitrate)
            .map(|(i, _)| i)
            .or(Some(lowest))
    }
}

#[cfg(test)]
mockall::mock! {
    pub Policy {}

    impl StreamSelector for Policy {
        fn kind(&self) -> SelectorKind;
        fn select(&self, formats: &[StreamFormat], throughput_bps: Option<u64>) -> Option<usize>;
    }
}
