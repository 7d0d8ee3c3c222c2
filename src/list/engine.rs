//! MessageList - the virtualized list engine
//!
//! Owns the estimator, the measurement cache, the height index, the scroll
//! tracker and the resize observer bridge for one chat view. The binding layer
//! drives it with explicit operations:
//!
//! - `sync` when the message array changes
//! - `mount` / `unmount` as rows enter and leave the visible window
//! - `measure` / `observe_resize` / `tick` as real heights arrive
//! - `resize` / `on_scroll` for viewport events
//! - `flush` once per frame, before paint
//!
//! # Layout Guarantees
//! A changed measurement at row `i` moves every row after `i` by exactly the
//! height delta and never moves rows before `i`. Measurements committed
//! between two flushes produce one [`Relayout`] from the lowest changed index.
//!
//! # Scroll Anchoring
//! When a row wholly above the viewport changes height while the viewport is
//! not pinned, the scroll offset moves by the same delta so the visible
//! content stays still. When pinned, `flush` re-anchors to the bottom.

use super::estimator::{ContentProfile, HeightEstimator};
use super::height_cache::HeightCache;
use super::height_index::HeightIndex;
use super::observer::{ResizeObserverBridge, RowPhase};
use super::scroll::{
    RowSpan, ScrollAlign, ScrollBehavior, ScrollCommand, ScrollMetrics, ScrollTarget,
    ScrollTracker,
};
use super::tuning::ListTuning;
use super::types::{PixelOffset, RowHeight, RowIndex, Viewport};
use super::visible_window::VisibleWindow;
use crate::model::{Message, MessageId};
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, warn};

/// A row admitted by `sync`.
#[derive(Debug, Clone)]
struct Row {
    id: MessageId,
    /// Position of the message in the array last passed to `sync`.
    source: usize,
    profile: ContentProfile,
    estimate: RowHeight,
}

/// Position of a row in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowStyle {
    /// Prefix-sum offset of the row top.
    pub top: PixelOffset,
    /// Effective height.
    pub height: RowHeight,
    /// Whether the height comes from a real measurement.
    pub measured: bool,
}

/// A mounted row together with its style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowPlacement {
    /// Row index.
    pub index: RowIndex,
    /// Message the row renders.
    pub id: MessageId,
    /// Placement.
    pub style: RowStyle,
}

/// Layout correction reported by [`MessageList::flush`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relayout {
    /// Lowest row whose position or height changed.
    pub from: RowIndex,
    /// Total content height after the correction.
    pub total_height: usize,
}

/// How `sync` reconciled the rows with the message array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncChange {
    /// Same identities in the same order.
    Unchanged,
    /// New messages after the existing ones.
    Appended {
        /// Number of rows added.
        count: usize,
    },
    /// Rows from `from` onward were replaced or removed.
    Replaced {
        /// First row laid out again.
        from: RowIndex,
    },
}

/// Result of a viewport resize.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResizeOutcome {
    /// Whether the width changed, clearing every cached height.
    pub width_changed: bool,
    /// Mounted rows the binding must measure again.
    pub remeasure: Vec<RowIndex>,
}

/// Imperative handle exposed to the surrounding chat flow.
pub trait ListHandle {
    /// Scroll to offset 0.
    fn scroll_to_top(&mut self);
    /// Scroll so the newest row ends at the viewport bottom.
    fn scroll_to_bottom(&mut self);
    /// Clear every cached height and lay out again from row 0.
    fn force_update(&mut self);
}

/// Virtualized message list for one chat view.
///
/// All state is owned by the instance, so independent views never share
/// caches.
#[derive(Debug, Clone)]
pub struct MessageList {
    tuning: ListTuning,
    estimator: HeightEstimator,
    cache: HeightCache,
    index: HeightIndex,
    rows: Vec<Row>,
    /// Row index by identity.
    positions: HashMap<MessageId, usize>,
    viewport: Viewport,
    scroll_offset: PixelOffset,
    tracker: ScrollTracker,
    observer: ResizeObserverBridge,
    /// Lowest row changed since the last flush.
    dirty_from: Option<usize>,
    /// Scroll offset moved by anchoring since the last flush.
    anchored: bool,
    commands: Vec<ScrollCommand>,
}

impl Default for MessageList {
    fn default() -> Self {
        Self::new(ListTuning::default())
    }
}

impl MessageList {
    /// Create an empty list. An empty list is pinned to its bottom.
    pub fn new(tuning: ListTuning) -> Self {
        Self {
            estimator: HeightEstimator::new(&tuning),
            cache: HeightCache::new(tuning.jitter_threshold),
            index: HeightIndex::new(0),
            rows: Vec::new(),
            positions: HashMap::new(),
            viewport: Viewport::default(),
            scroll_offset: PixelOffset::default(),
            tracker: ScrollTracker::new(tuning.bottom_threshold),
            observer: ResizeObserverBridge::new(tuning.debounce),
            dirty_from: None,
            anchored: false,
            commands: Vec::new(),
            tuning,
        }
    }

    /// Tuning the list was built with.
    pub fn tuning(&self) -> &ListTuning {
        &self.tuning
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the list has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Current viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Current scroll offset.
    pub fn scroll_offset(&self) -> PixelOffset {
        self.scroll_offset
    }

    /// Whether new rows auto-scroll into view.
    pub fn is_pinned(&self) -> bool {
        self.tracker.is_pinned()
    }

    /// Sum of every row's effective height.
    pub fn total_height(&self) -> usize {
        self.index.total()
    }

    /// Scroll container geometry as the tracker sees it.
    pub fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: self.scroll_offset.get(),
            scroll_height: self.total_height(),
            client_height: self.viewport.height as usize,
        }
    }

    /// Message id rendered by a row.
    pub fn row_id(&self, index: RowIndex) -> Option<&MessageId> {
        self.rows.get(index.get()).map(|row| &row.id)
    }

    /// Position in the synced message array of the message a row renders.
    pub fn message_index(&self, index: RowIndex) -> Option<usize> {
        self.rows.get(index.get()).map(|row| row.source)
    }

    /// Current row of a message.
    pub fn index_of(&self, id: &MessageId) -> Option<RowIndex> {
        self.positions.get(id).copied().map(RowIndex::new)
    }

    /// Real height cached for a message, if measured at the current width.
    pub fn cached_height(&self, id: &MessageId) -> Option<RowHeight> {
        self.cache.get(id)
    }

    /// Estimate of a row's height.
    pub fn estimated_height(&self, index: RowIndex) -> Option<RowHeight> {
        self.rows.get(index.get()).map(|row| row.estimate)
    }

    /// Top offset of a row: the sum of effective heights before it.
    pub fn row_top(&self, index: RowIndex) -> Option<PixelOffset> {
        (index.get() < self.rows.len()).then(|| PixelOffset::new(self.index.offset_of(index.get())))
    }

    /// Style placing a row at its prefix-sum offset.
    pub fn row_style(&self, index: RowIndex) -> Option<RowStyle> {
        let row = self.rows.get(index.get())?;
        let height = self.index.height(index.get())?;
        Some(RowStyle {
            top: PixelOffset::new(self.index.offset_of(index.get())),
            height: RowHeight::clamped(height),
            measured: self.cache.contains(&row.id),
        })
    }

    /// Measurement phase of a row.
    pub fn row_phase(&self, index: RowIndex) -> Option<RowPhase> {
        let row = self.rows.get(index.get())?;
        Some(match self.observer.phase(&row.id) {
            Some(phase) => phase,
            None if self.cache.contains(&row.id) => RowPhase::Detached,
            None => RowPhase::Estimated,
        })
    }

    /// Whether a row has an attached observer.
    pub fn is_mounted(&self, index: RowIndex) -> bool {
        self.rows
            .get(index.get())
            .is_some_and(|row| self.observer.is_attached(&row.id))
    }

    /// Mounted rows in index order.
    pub fn mounted_rows(&self) -> Vec<RowIndex> {
        let mut mounted: Vec<RowIndex> = self
            .observer
            .attached_ids()
            .filter_map(|id| self.positions.get(id).copied())
            .map(RowIndex::new)
            .collect();
        mounted.sort_unstable();
        mounted
    }

    /// Earliest pending debounce deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.observer.next_deadline()
    }

    /// Rows to mount for the current scroll offset and viewport.
    pub fn visible_window(&self) -> VisibleWindow {
        VisibleWindow::compute(
            &self.index,
            self.scroll_offset,
            self.viewport.height,
            self.tuning.overscan,
        )
    }

    /// Styles of every row in the visible window.
    pub fn placements(&self) -> Vec<RowPlacement> {
        self.visible_window()
            .indices()
            .filter_map(|index| {
                Some(RowPlacement {
                    index,
                    id: self.row_id(index)?.clone(),
                    style: self.row_style(index)?,
                })
            })
            .collect()
    }

    /// Drain the scroll commands issued since the last call.
    pub fn take_scroll_commands(&mut self) -> Vec<ScrollCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Reconcile rows with the message array by identity.
    ///
    /// Appends keep every existing row untouched. A shrink lays out again
    /// from row 0; a replacement from the first differing identity.
    /// The pinned flag is left to the tracker; it is re-observed only when
    /// the scroll offset had to be clamped to the shorter content.
    ///
    /// A message whose id already appeared earlier in the array gets no row;
    /// [`MessageList::message_index`] maps rows back to array positions.
    pub fn sync(&mut self, messages: &[Message]) -> SyncChange {
        let unique = unique_messages(messages);
        if unique.len() < messages.len() {
            warn!(
                "Skipping {} messages with duplicate ids",
                messages.len() - unique.len()
            );
        }

        let common = self
            .rows
            .iter()
            .zip(&unique)
            .take_while(|(row, (_, message))| &row.id == message.id())
            .count();
        for (row, (source, _)) in self.rows.iter_mut().zip(&unique).take(common) {
            row.source = *source;
        }
        let old_len = self.rows.len();
        if common == old_len && common == unique.len() {
            return SyncChange::Unchanged;
        }

        let was_pinned = self.tracker.is_pinned();
        let change = if common == old_len {
            for &(source, message) in &unique[common..] {
                let height = self.admit(message, source);
                self.index.push(height.get());
            }
            self.mark_dirty(common);
            SyncChange::Appended {
                count: unique.len() - common,
            }
        } else {
            for row in self.rows.drain(common..) {
                self.positions.remove(&row.id);
            }
            self.index.truncate(common);
            for &(source, message) in &unique[common..] {
                let height = self.admit(message, source);
                self.index.push(height.get());
            }
            self.detach_removed();

            let from = if unique.len() < old_len { 0 } else { common };
            self.mark_dirty(from);
            debug!(
                "Rows replaced from {} ({} -> {} rows)",
                common,
                old_len,
                unique.len()
            );
            SyncChange::Replaced {
                from: RowIndex::new(from),
            }
        };

        if unique.len() > old_len && was_pinned {
            let last = RowIndex::new(self.rows.len() - 1);
            self.scroll_to_index(last, ScrollAlign::End, ScrollBehavior::Smooth);
        } else if self.clamp_offset() {
            self.observe_current();
        }
        change
    }

    /// Attach the observer for a row and commit its first measurement immediately.
    ///
    /// Returns false if the row is out of range or already mounted.
    pub fn mount(&mut self, index: RowIndex, measured: u32) -> bool {
        let Some(row) = self.rows.get(index.get()) else {
            debug!("Ignoring mount of row {} (out of range)", index.get());
            return false;
        };
        let id = row.id.clone();
        if !self.observer.attach(&id) {
            debug!("Ignoring mount of row {} (already mounted)", index.get());
            return false;
        }
        self.commit(index.get(), RowHeight::clamped(measured));
        self.observer.mark_measured(&id);
        true
    }

    /// Disconnect a row's observer and discard any pending measurement.
    pub fn unmount(&mut self, index: RowIndex) -> bool {
        let Some(row) = self.rows.get(index.get()) else {
            debug!("Ignoring unmount of row {} (out of range)", index.get());
            return false;
        };
        if !self.observer.is_attached(&row.id) {
            debug!("Ignoring unmount of row {} (not mounted)", index.get());
            return false;
        }
        if self.observer.detach(&row.id) {
            debug!("Discarded pending measurement for {}", row.id);
        }
        true
    }

    /// Commit a measurement synchronously, bypassing the debounce.
    ///
    /// Returns true if the cached height changed.
    pub fn measure(&mut self, index: RowIndex, height: u32) -> bool {
        let Some(row) = self.rows.get(index.get()) else {
            debug!("Ignoring measurement of row {} (out of range)", index.get());
            return false;
        };
        let id = row.id.clone();
        let changed = self.commit(index.get(), RowHeight::clamped(height));
        self.observer.cancel_pending(&id);
        self.observer.mark_measured(&id);
        changed
    }

    /// Report an observed size; committed by [`MessageList::tick`] after the debounce.
    ///
    /// Observations for rows that are not mounted are ignored. Returns true
    /// if a measurement is now pending.
    pub fn observe_resize(&mut self, index: RowIndex, height: u32, now: Instant) -> bool {
        let Some(row) = self.rows.get(index.get()) else {
            debug!("Ignoring resize of row {} (out of range)", index.get());
            return false;
        };
        if !self.observer.is_attached(&row.id) {
            debug!("Ignoring resize of detached row {}", row.id);
            return false;
        }
        let height = RowHeight::clamped(height);
        let settled = self
            .cache
            .get(&row.id)
            .is_some_and(|cached| cached.abs_diff(height) <= self.cache.jitter_threshold());
        if settled {
            self.observer.cancel_pending(&row.id);
            false
        } else {
            self.observer.schedule(&row.id, height, now)
        }
    }

    /// Commit every measurement whose debounce elapsed, in commit order.
    ///
    /// Returns the number of cached heights that changed.
    pub fn tick(&mut self, now: Instant) -> usize {
        let mut changed = 0;
        for due in self.observer.take_due(now) {
            match self.positions.get(&due.id).copied() {
                Some(index) => {
                    if self.commit(index, due.height) {
                        changed += 1;
                    }
                }
                None => debug!("Dropping measurement for removed row {}", due.id),
            }
        }
        changed
    }

    /// Apply a new viewport.
    ///
    /// A width change clears every cached height at once, since reflow
    /// invalidates all of them; mounted rows are returned for remeasurement.
    pub fn resize(&mut self, viewport: Viewport) -> ResizeOutcome {
        let width_changed = viewport.width != self.viewport.width;
        let height_changed = viewport.height != self.viewport.height;
        self.viewport = viewport;

        let mut outcome = ResizeOutcome {
            width_changed,
            remeasure: Vec::new(),
        };
        if width_changed {
            debug!(
                "Handling width change to {}, clearing {} cached heights",
                viewport.width,
                self.cache.len()
            );
            self.reset_measurements();
            outcome.remeasure = self.mounted_rows();
        }
        if height_changed {
            if self.tracker.is_pinned() {
                self.jump_to(self.resolve(ScrollTarget::Bottom));
            } else if self.clamp_offset() {
                self.observe_current();
            }
        }
        outcome
    }

    /// Record a user scroll and recompute the pinned flag.
    pub fn on_scroll(&mut self, offset: PixelOffset) -> bool {
        self.scroll_offset = self.resolve(ScrollTarget::Offset(offset));
        self.observe_current()
    }

    /// Apply pending layout corrections before paint.
    ///
    /// Returns `None` when nothing changed since the last flush. Corrections
    /// are issued as instant scrolls.
    pub fn flush(&mut self) -> Option<Relayout> {
        let from = self.dirty_from.take()?;
        let anchored = std::mem::take(&mut self.anchored);

        if self.tracker.is_pinned() {
            self.jump_to(self.resolve(ScrollTarget::Bottom));
        } else {
            let clamped = self.clamp_offset();
            if clamped {
                // Shrunk content may have brought the bottom into view.
                self.observe_current();
            }
            if clamped || anchored {
                self.commands.push(ScrollCommand::ToOffset {
                    offset: self.scroll_offset,
                    behavior: ScrollBehavior::Instant,
                });
            }
        }

        Some(Relayout {
            from: RowIndex::new(from.min(self.rows.len())),
            total_height: self.total_height(),
        })
    }

    /// Scroll a row into view.
    pub fn scroll_to_index(
        &mut self,
        index: RowIndex,
        align: ScrollAlign,
        behavior: ScrollBehavior,
    ) {
        if index.get() >= self.rows.len() {
            debug!("Ignoring scroll to row {} (out of range)", index.get());
            return;
        }
        self.scroll_offset = self.resolve(ScrollTarget::Row { index, align });
        self.observe_current();
        self.commands.push(ScrollCommand::ToIndex {
            index,
            align,
            behavior,
        });
    }

    /// Scroll to offset 0.
    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = self.resolve(ScrollTarget::Top);
        self.observe_current();
        self.commands.push(ScrollCommand::ToOffset {
            offset: self.scroll_offset,
            behavior: ScrollBehavior::Instant,
        });
    }

    /// Scroll so the last row ends at the viewport bottom.
    pub fn scroll_to_bottom(&mut self) {
        match self.rows.len().checked_sub(1) {
            Some(last) => {
                self.scroll_to_index(RowIndex::new(last), ScrollAlign::End, ScrollBehavior::Instant)
            }
            None => {
                self.scroll_offset = PixelOffset::default();
                self.observe_current();
            }
        }
    }

    /// Clear every cached height and pending measurement, then lay out from row 0.
    pub fn force_update(&mut self) {
        debug!("Forced update, clearing {} cached heights", self.cache.len());
        self.reset_measurements();
    }

    /// Reconfigure the estimator's line width, recomputing every estimate.
    ///
    /// Returns true if the width changed.
    pub fn set_chars_per_line(&mut self, chars_per_line: u32) -> bool {
        if self.estimator.chars_per_line() == chars_per_line.max(1) {
            return false;
        }
        self.estimator.set_chars_per_line(chars_per_line);
        for row in &mut self.rows {
            row.estimate = self.estimator.estimate_profile(&row.profile);
        }
        self.rebuild_index();
        self.mark_dirty(0);
        true
    }

    /// Push a row for `message`, returning its effective height.
    fn admit(&mut self, message: &Message, source: usize) -> RowHeight {
        let profile = ContentProfile::of(message.content());
        let estimate = self.estimator.estimate_profile(&profile);
        let id = message.id().clone();
        let height = self.cache.get(&id).unwrap_or(estimate);
        self.positions.insert(id.clone(), self.rows.len());
        self.rows.push(Row {
            id,
            source,
            profile,
            estimate,
        });
        height
    }

    /// Detach observers whose message is no longer in the list.
    fn detach_removed(&mut self) {
        let removed: Vec<MessageId> = self
            .observer
            .attached_ids()
            .filter(|id| !self.positions.contains_key(*id))
            .cloned()
            .collect();
        for id in removed {
            self.observer.detach(&id);
        }
    }

    /// Record a real height for row `index`. Returns true if the cache changed.
    fn commit(&mut self, index: usize, height: RowHeight) -> bool {
        let Some(row) = self.rows.get(index) else {
            return false;
        };
        let previous = self.cache.get(&row.id).unwrap_or(row.estimate);
        if !self.cache.set(&row.id, height).is_change() {
            return false;
        }

        let top = self.index.offset_of(index);
        let delta = self.index.set(index, height.get()).unwrap_or(0);
        self.mark_dirty(index);

        let above_viewport = top + previous.get() as usize <= self.scroll_offset.get();
        if delta != 0 && above_viewport && !self.tracker.is_pinned() {
            let anchored = self.scroll_offset.get().saturating_add_signed(delta);
            self.scroll_offset = PixelOffset::new(anchored);
            self.anchored = true;
        }
        true
    }

    fn reset_measurements(&mut self) {
        self.cache.clear();
        self.observer.reset_measurements();
        self.rebuild_index();
        self.mark_dirty(0);
    }

    fn rebuild_index(&mut self) {
        self.index = HeightIndex::from_heights(
            self.rows
                .iter()
                .map(|row| self.cache.get(&row.id).unwrap_or(row.estimate).get()),
        );
    }

    fn mark_dirty(&mut self, from: usize) {
        self.dirty_from = Some(self.dirty_from.map_or(from, |dirty| dirty.min(from)));
    }

    fn max_offset(&self) -> usize {
        self.total_height()
            .saturating_sub(self.viewport.height as usize)
    }

    /// Clamp the offset into range. Returns true if it moved.
    fn clamp_offset(&mut self) -> bool {
        let max = self.max_offset();
        if self.scroll_offset.get() > max {
            self.scroll_offset = PixelOffset::new(max);
            true
        } else {
            false
        }
    }

    /// Instant jump issued as a layout correction.
    fn jump_to(&mut self, offset: PixelOffset) {
        if offset != self.scroll_offset {
            self.scroll_offset = offset;
            self.commands.push(ScrollCommand::ToOffset {
                offset,
                behavior: ScrollBehavior::Instant,
            });
        }
    }

    fn observe_current(&mut self) -> bool {
        let metrics = self.metrics();
        self.tracker.observe(&metrics)
    }

    fn resolve(&self, target: ScrollTarget) -> PixelOffset {
        target.resolve(
            self.total_height(),
            self.viewport.height as usize,
            self.scroll_offset,
            |index| {
                let height = self.index.height(index.get())?;
                Some(RowSpan {
                    top: self.index.offset_of(index.get()),
                    height: height as usize,
                })
            },
        )
    }
}

/// First occurrence of every id, with its array position.
fn unique_messages(messages: &[Message]) -> Vec<(usize, &Message)> {
    let mut seen = HashSet::with_capacity(messages.len());
    messages
        .iter()
        .enumerate()
        .filter(|(_, message)| seen.insert(message.id()))
        .collect()
}

impl ListHandle for MessageList {
    fn scroll_to_top(&mut self) {
        MessageList::scroll_to_top(self);
    }

    fn scroll_to_bottom(&mut self) {
        MessageList::scroll_to_bottom(self);
    }

    fn force_update(&mut self) {
        MessageList::force_update(self);
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
