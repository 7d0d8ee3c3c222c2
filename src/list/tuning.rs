//! Tuning constants for estimation, measurement and scrolling.
//!
//! The values are empirically tuned for a rendering environment, so they are
//! configuration rather than literals. [`ListTuning::default`] is the pixel
//! profile for a proportional-font chat panel; [`ListTuning::terminal`] is the
//! profile where one unit is one terminal row.

use std::time::Duration;
use thiserror::Error;

/// Tuning parameters consumed by the message list engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListTuning {
    /// Header plus padding of a row.
    pub base_height: u32,
    /// Height of one wrapped line of content.
    pub line_height: u32,
    /// Average characters that fit on one line.
    pub chars_per_line: u32,
    /// Extra height for content with a fenced code block (monospace and code header bar).
    pub code_block_bonus: u32,
    /// Floor applied to every estimate.
    pub min_height: u32,
    /// Measurement deltas at or below this are treated as sub-pixel jitter.
    pub jitter_threshold: u32,
    /// Quiet period before an observed resize is committed.
    pub debounce: Duration,
    /// Distance from the bottom still considered "at bottom".
    pub bottom_threshold: u32,
    /// Rows mounted on each side of the visible rows.
    pub overscan: usize,
}

/// Tuning values that would break estimation or layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TuningError {
    /// `line_height` was zero.
    #[error("line_height must be >= 1")]
    ZeroLineHeight,
    /// `chars_per_line` was zero.
    #[error("chars_per_line must be >= 1")]
    ZeroCharsPerLine,
    /// `min_height` was zero.
    #[error("min_height must be >= 1")]
    ZeroMinHeight,
}

impl Default for ListTuning {
    fn default() -> Self {
        Self {
            base_height: 48,
            line_height: 22,
            chars_per_line: 80,
            code_block_bonus: 60,
            min_height: 64,
            jitter_threshold: 2,
            debounce: Duration::from_millis(100),
            bottom_threshold: 40,
            overscan: 5,
        }
    }
}

impl ListTuning {
    /// Profile for a terminal binding: heights are in rows.
    ///
    /// Base height covers the role header and the blank separator line.
    pub fn terminal() -> Self {
        Self {
            base_height: 2,
            line_height: 1,
            chars_per_line: 80,
            code_block_bonus: 2,
            min_height: 3,
            jitter_threshold: 0,
            debounce: Duration::from_millis(100),
            bottom_threshold: 0,
            overscan: 3,
        }
    }

    /// Check the values the estimator divides or multiplies by.
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.line_height == 0 {
            return Err(TuningError::ZeroLineHeight);
        }
        if self.chars_per_line == 0 {
            return Err(TuningError::ZeroCharsPerLine);
        }
        if self.min_height == 0 {
            return Err(TuningError::ZeroMinHeight);
        }
        Ok(())
    }
}
