//! Virtualized message list
//!
//! A headless engine that lays out a growing conversation with estimated row
//! heights, corrects them incrementally as real measurements arrive, and keeps
//! the viewport pinned to the newest message unless the user scrolled away.
//! Any binding layer can drive it; `crate::view` is the terminal one.
//!
//! # Module Structure
//!
//! - `types`: Core newtypes (RowHeight, PixelOffset, RowIndex, Viewport)
//! - `tuning`: ListTuning - estimation, debounce and scroll constants
//! - `estimator`: HeightEstimator - content to estimated height
//! - `height_cache`: HeightCache - measured heights keyed by message id
//! - `height_index`: HeightIndex - O(log n) row tops via Fenwick tree
//! - `visible_window`: VisibleWindow - mounted range with overscan
//! - `scroll`: ScrollTracker, ScrollTarget and the scroll command vocabulary
//! - `observer`: ResizeObserverBridge - per-row debounced measurement
//! - `engine`: MessageList - the engine, and the ListHandle trait

pub mod engine;
pub mod estimator;
pub mod height_cache;
pub mod height_index;
pub mod observer;
pub mod scroll;
pub mod tuning;
pub mod types;
pub mod visible_window;

pub use engine::{
    ListHandle, MessageList, Relayout, ResizeOutcome, RowPlacement, RowStyle, SyncChange,
};
pub use estimator::{ContentProfile, HeightEstimator, CODE_FENCE};
pub use height_cache::{CacheUpdate, HeightCache};
pub use observer::RowPhase;
pub use scroll::{ScrollAlign, ScrollBehavior, ScrollCommand, ScrollMetrics, ScrollTracker};
pub use tuning::{ListTuning, TuningError};
pub use types::{PixelOffset, RowHeight, RowIndex, Viewport};
pub use visible_window::VisibleWindow;
