//! Visible window calculation result

use super::height_index::HeightIndex;
use super::types::{PixelOffset, RowIndex};

/// Range of rows mounted for the current viewport.
///
/// Computed by tree descent on the height index.
///
/// # Invariants
/// - `start_index <= visible_start <= visible_end <= end_index <= len`
/// - The mounted range is contiguous and extends the visible range by at most
///   `overscan` rows on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibleWindow {
    /// First mounted row (inclusive, overscan included).
    pub start_index: RowIndex,
    /// Last mounted row (exclusive, overscan included).
    pub end_index: RowIndex,
    /// First row intersecting the viewport.
    pub visible_start: RowIndex,
    /// One past the last row intersecting the viewport.
    pub visible_end: RowIndex,
    /// Scroll offset the window was computed for.
    pub scroll_offset: PixelOffset,
    /// Viewport height the window was computed for.
    pub viewport_height: u32,
}

impl VisibleWindow {
    /// Compute the window for a scroll offset and viewport height.
    pub fn compute(
        index: &HeightIndex,
        scroll_offset: PixelOffset,
        viewport_height: u32,
        overscan: usize,
    ) -> Self {
        let len = index.len();
        if len == 0 {
            return Self {
                scroll_offset,
                viewport_height,
                ..Self::default()
            };
        }

        let top = scroll_offset.get();
        let visible_start = index.lower_bound(top).unwrap_or(len - 1);

        let visible_end = if viewport_height == 0 {
            visible_start
        } else {
            let bottom = top.saturating_add(viewport_height as usize);
            match index.lower_bound(bottom) {
                Some(i) if index.offset_of(i) < bottom => i + 1,
                Some(i) => i,
                None => len,
            }
        }
        .max(visible_start);

        Self {
            start_index: RowIndex::new(visible_start.saturating_sub(overscan)),
            end_index: RowIndex::new(visible_end.saturating_add(overscan).min(len)),
            visible_start: RowIndex::new(visible_start),
            visible_end: RowIndex::new(visible_end),
            scroll_offset,
            viewport_height,
        }
    }

    /// Number of mounted rows.
    pub fn len(&self) -> usize {
        self.end_index.get() - self.start_index.get()
    }

    /// Check if no rows are mounted.
    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    /// Iterate over mounted row indices.
    pub fn indices(&self) -> impl Iterator<Item = RowIndex> {
        (self.start_index.get()..self.end_index.get()).map(RowIndex::new)
    }

    /// Check if a row is mounted.
    pub fn contains(&self, index: RowIndex) -> bool {
        self.start_index <= index && index < self.end_index
    }

    /// Last mounted row, if any.
    pub fn last_index(&self) -> Option<RowIndex> {
        (!self.is_empty()).then(|| self.end_index.prev())
    }
}
