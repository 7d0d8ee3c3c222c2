//! Scroll targets, commands and bottom pinning

use super::types::{PixelOffset, RowIndex};

/// Where a row should land in the viewport when scrolled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollAlign {
    /// Row top at viewport top.
    Start,
    /// Row centered in the viewport.
    Center,
    /// Row bottom at viewport bottom.
    End,
    /// Minimal movement that makes the row fully visible.
    #[default]
    Auto,
}

/// How the binding should perform a programmatic scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    /// Jump. Used for every layout correction.
    #[default]
    Instant,
    /// Animate if the binding can.
    Smooth,
}

/// Semantic scroll target.
///
/// Resolves to a [`PixelOffset`] against the current layout, so the intent
/// survives relayout between issuing and applying it.
///
/// # Clamping Behavior
/// Every target resolves into `[0, max(0, total_height - viewport_height)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    /// Offset 0.
    Top,
    /// `total_height - viewport_height`, clamped to 0.
    Bottom,
    /// Absolute offset.
    Offset(PixelOffset),
    /// A row placed according to `align`.
    Row {
        /// Row to reveal.
        index: RowIndex,
        /// Placement within the viewport.
        align: ScrollAlign,
    },
}

/// Geometry of a row as needed by target resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpan {
    /// Top offset of the row.
    pub top: usize,
    /// Height of the row.
    pub height: usize,
}

impl ScrollTarget {
    /// Resolve to an absolute offset.
    ///
    /// # Arguments
    /// - `total_height`: Total content height
    /// - `viewport_height`: Visible height
    /// - `current`: Current offset (used by [`ScrollAlign::Auto`])
    /// - `row_lookup`: Row geometry by index; `None` for out-of-range rows
    pub fn resolve<F>(
        &self,
        total_height: usize,
        viewport_height: usize,
        current: PixelOffset,
        row_lookup: F,
    ) -> PixelOffset
    where
        F: Fn(RowIndex) -> Option<RowSpan>,
    {
        let max_offset = total_height.saturating_sub(viewport_height);
        let raw = match *self {
            ScrollTarget::Top => 0,
            ScrollTarget::Bottom => max_offset,
            ScrollTarget::Offset(offset) => offset.get(),
            ScrollTarget::Row { index, align } => match row_lookup(index) {
                None => current.get(),
                Some(span) => {
                    let bottom = span.top.saturating_add(span.height);
                    match align {
                        ScrollAlign::Start => span.top,
                        ScrollAlign::End => bottom.saturating_sub(viewport_height),
                        ScrollAlign::Center => (span.top + span.height / 2)
                            .saturating_sub(viewport_height / 2),
                        ScrollAlign::Auto => {
                            let view_bottom = current.get().saturating_add(viewport_height);
                            if span.top < current.get() {
                                span.top
                            } else if bottom > view_bottom {
                                bottom.saturating_sub(viewport_height)
                            } else {
                                current.get()
                            }
                        }
                    }
                }
            },
        };
        PixelOffset::new(raw.min(max_offset))
    }
}

/// A programmatic scroll issued by the engine for the binding to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollCommand {
    /// `scrollToIndex(index, align)`.
    ToIndex {
        /// Target row.
        index: RowIndex,
        /// Placement.
        align: ScrollAlign,
        /// Animation hint.
        behavior: ScrollBehavior,
    },
    /// Scroll to an absolute offset (top, anchoring corrections).
    ToOffset {
        /// Target offset.
        offset: PixelOffset,
        /// Animation hint.
        behavior: ScrollBehavior,
    },
}

/// Scroll container geometry at the time of a scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    /// Current scroll offset.
    pub scroll_top: usize,
    /// Total content height.
    pub scroll_height: usize,
    /// Visible height.
    pub client_height: usize,
}

/// `scroll_height - scroll_top - client_height <= threshold`, saturating at 0.
///
/// # Examples
///
/// ```
/// # use chatlist::list::scroll::{is_at_bottom, ScrollMetrics};
/// let metrics = ScrollMetrics { scroll_top: 560, scroll_height: 1000, client_height: 400 };
/// assert!(is_at_bottom(&metrics, 40));
/// assert!(!is_at_bottom(&metrics, 39));
/// ```
pub fn is_at_bottom(metrics: &ScrollMetrics, threshold: u32) -> bool {
    let remaining = metrics
        .scroll_height
        .saturating_sub(metrics.scroll_top)
        .saturating_sub(metrics.client_height);
    remaining <= threshold as usize
}

/// Tracks whether the viewport is pinned to the newest content.
///
/// The flag is the sole input to the auto-scroll decision on append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollTracker {
    threshold: u32,
    pinned: bool,
}

impl ScrollTracker {
    /// A tracker starts pinned: an empty list is at its bottom.
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            pinned: true,
        }
    }

    /// Observe a scroll event and recompute the pinned flag.
    pub fn observe(&mut self, metrics: &ScrollMetrics) -> bool {
        self.pinned = is_at_bottom(metrics, self.threshold);
        self.pinned
    }

    /// Whether the viewport is at the bottom.
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }
}
