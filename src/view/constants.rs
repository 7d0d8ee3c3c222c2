//! Layout dimension constants for TUI rendering.

use std::time::Duration;

/// Height of the input box in lines (border + content).
pub const INPUT_HEIGHT: u16 = 3;

/// Height of the status bar in lines.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Lines scrolled per arrow key.
pub const LINE_SCROLL: usize = 1;

/// Lines scrolled per mouse wheel notch.
pub const WHEEL_SCROLL: usize = 3;

/// Upper bound on how long the loop sleeps waiting for input.
///
/// Replies from the worker thread are picked up at this granularity.
pub const IDLE_POLL: Duration = Duration::from_millis(100);

/// Measurement passes per frame before drawing with what is known.
///
/// Mounting rows changes heights, which can move the window; a few passes
/// settle it in practice.
pub const MAX_MEASURE_PASSES: usize = 4;

/// Text of the loading overlay.
pub const LOADING_TEXT: &str = " Waiting for reply… ";
