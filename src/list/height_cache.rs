//! Measured row heights keyed by message identity.
//!
//! Keying by identity rather than index lets measurements survive insertions
//! and deletions without being applied to the wrong row.

use super::types::RowHeight;
use crate::model::MessageId;
use std::collections::HashMap;

/// Outcome of recording a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheUpdate {
    /// Within the jitter threshold of the cached value; nothing changed.
    Unchanged,
    /// First measurement for this id.
    Inserted,
    /// Replaced a measurement that differed by more than the threshold.
    Updated {
        /// Height that was cached before.
        previous: RowHeight,
    },
}

impl CacheUpdate {
    /// Whether the update must trigger a relayout.
    pub fn is_change(&self) -> bool {
        !matches!(self, CacheUpdate::Unchanged)
    }
}

/// Last observed real height per message.
///
/// # Invariants
/// - At most one entry per message id.
/// - An entry is only replaced when the new height differs by more than
///   `jitter_threshold`.
#[derive(Debug, Clone, Default)]
pub struct HeightCache {
    entries: HashMap<MessageId, RowHeight>,
    jitter_threshold: u32,
}

impl HeightCache {
    /// Create an empty cache with the given jitter threshold.
    pub fn new(jitter_threshold: u32) -> Self {
        Self {
            entries: HashMap::new(),
            jitter_threshold,
        }
    }

    /// Cached height for `id`, if it has been measured.
    pub fn get(&self, id: &MessageId) -> Option<RowHeight> {
        self.entries.get(id).copied()
    }

    /// Record a measurement.
    ///
    /// Returns [`CacheUpdate::Unchanged`] when `|height - cached| <= jitter_threshold`.
    pub fn set(&mut self, id: &MessageId, height: RowHeight) -> CacheUpdate {
        match self.entries.get_mut(id) {
            Some(cached) if cached.abs_diff(height) <= self.jitter_threshold => {
                CacheUpdate::Unchanged
            }
            Some(cached) => {
                let previous = *cached;
                *cached = height;
                CacheUpdate::Updated { previous }
            }
            None => {
                self.entries.insert(id.clone(), height);
                CacheUpdate::Inserted
            }
        }
    }

    /// Drop every cached height (e.g. after reflow at a new width).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether `id` has a cached height.
    pub fn contains(&self, id: &MessageId) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of cached entries, orphans included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured jitter threshold.
    pub fn jitter_threshold(&self) -> u32 {
        self.jitter_threshold
    }
}
