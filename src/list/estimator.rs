//! Height estimation for rows that have not been measured yet.
//!
//! The estimate only needs to be close enough that the initial scroll position
//! and overscan do not visibly jump once a real measurement arrives.

use super::tuning::ListTuning;
use super::types::RowHeight;

/// Marker that opens or closes a fenced code block.
pub const CODE_FENCE: &str = "```";

/// Summary of message content sufficient to estimate its height.
///
/// Kept per row by the engine so estimates can be recomputed without the
/// message bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentProfile {
    /// Content length in characters.
    pub chars: usize,
    /// Number of explicit line breaks.
    pub newlines: usize,
    /// Whether the content contains a fenced code block marker.
    pub has_code_block: bool,
}

impl ContentProfile {
    /// Profile a content string.
    pub fn of(content: &str) -> Self {
        Self {
            chars: content.chars().count(),
            newlines: content.matches('\n').count(),
            has_code_block: content.contains(CODE_FENCE),
        }
    }
}

/// Maps content to an estimated row height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightEstimator {
    base_height: u32,
    line_height: u32,
    chars_per_line: u32,
    code_block_bonus: u32,
    min_height: u32,
}

impl HeightEstimator {
    /// Build from the estimation fields of the tuning.
    pub fn new(tuning: &ListTuning) -> Self {
        Self {
            base_height: tuning.base_height,
            line_height: tuning.line_height,
            chars_per_line: tuning.chars_per_line,
            code_block_bonus: tuning.code_block_bonus,
            min_height: tuning.min_height,
        }
    }

    /// Floor every estimate is clamped to.
    pub fn min_height(&self) -> RowHeight {
        RowHeight::clamped(self.min_height)
    }

    /// Characters assumed per line.
    pub fn chars_per_line(&self) -> u32 {
        self.chars_per_line
    }

    /// Change the characters assumed per line (e.g. when content width changes).
    ///
    /// Zero is treated as one.
    pub fn set_chars_per_line(&mut self, chars_per_line: u32) {
        self.chars_per_line = chars_per_line.max(1);
    }

    /// Estimate the height of raw content.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chatlist::list::estimator::HeightEstimator;
    /// # use chatlist::list::tuning::ListTuning;
    /// let estimator = HeightEstimator::new(&ListTuning::default());
    /// assert!(estimator.estimate("") >= estimator.min_height());
    /// assert!(estimator.estimate(&"word ".repeat(200)) > estimator.estimate("hi"));
    /// ```
    pub fn estimate(&self, content: &str) -> RowHeight {
        self.estimate_profile(&ContentProfile::of(content))
    }

    /// Estimate from a precomputed profile. Total: never panics, never below the floor.
    pub fn estimate_profile(&self, profile: &ContentProfile) -> RowHeight {
        let per_line = self.chars_per_line.max(1) as usize;
        let wrapped = profile.chars.div_ceil(per_line);
        let lines = wrapped
            .saturating_add(profile.newlines)
            .saturating_sub(1)
            .max(1);
        let lines = u32::try_from(lines).unwrap_or(u32::MAX);

        let mut height = self
            .base_height
            .saturating_add(self.line_height.saturating_mul(lines));
        if profile.has_code_block {
            height = height.saturating_add(self.code_block_bonus);
        }

        RowHeight::clamped(height.max(self.min_height))
    }
}

impl Default for HeightEstimator {
    fn default() -> Self {
        Self::new(&ListTuning::default())
    }
}
