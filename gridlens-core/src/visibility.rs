//! Reconstruction of which reward sources the agent has seen.

use crate::record::Position;

/// Per-source seen flags, parallel to a trial's reward sources.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisibilityMask(Vec<bool>);

impl VisibilityMask {
    pub fn new(flags: Vec<bool>) -> Self {
        Self(flags)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether source `idx` has been seen. Out-of-range indices are unseen.
    pub fn is_seen(&self, idx: usize) -> bool {
        self.0.get(idx).copied().unwrap_or(false)
    }

    pub fn seen_count(&self) -> usize {
        self.0.iter().filter(|seen| **seen).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    /// Flags rendered as `0`/`1`.
    pub fn to_flags(&self) -> Vec<u8> {
        self.0.iter().map(|seen| u8::from(*seen)).collect()
    }
}

/// The mask after the agent walks `path`.
///
/// Every path cell that equals a source position reveals the first source at
/// that position. Seen sources stay seen and `visibility` is not modified.
pub fn update_visibility(
    visibility: &VisibilityMask,
    positions: &[Position],
    path: &[Position],
) -> VisibilityMask {
    let mut revealed = visibility.clone();
    for loc in path {
        if let Some(idx) = positions.iter().position(|p| p == loc)
            && let Some(seen) = revealed.0.get_mut(idx)
        {
            *seen = true;
        }
    }
    revealed
}
