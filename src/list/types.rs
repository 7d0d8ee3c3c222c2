//! Core list newtypes

/// Height of a row in pixels. Always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowHeight(u32);

/// Error returned when attempting to create a RowHeight of zero via the smart constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("RowHeight must be >= 1 (got {0})")]
pub struct InvalidRowHeight(pub u32);

impl RowHeight {
    /// Smallest height a row can occupy.
    pub const MIN: Self = Self(1);

    /// Smart constructor that validates height is >= 1.
    pub fn new(height: u32) -> Result<Self, InvalidRowHeight> {
        if height == 0 {
            Err(InvalidRowHeight(height))
        } else {
            Ok(Self(height))
        }
    }

    /// Total constructor for observed sizes: zero becomes [`RowHeight::MIN`].
    pub fn clamped(height: u32) -> Self {
        Self(height.max(1))
    }

    /// Get the raw pixel value.
    pub fn get(&self) -> u32 {
        self.0
    }

    /// Absolute difference between two heights.
    pub fn abs_diff(&self, other: RowHeight) -> u32 {
        self.0.abs_diff(other.0)
    }
}

impl Default for RowHeight {
    fn default() -> Self {
        Self::MIN
    }
}

/// Absolute vertical offset from the top of the list content, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct PixelOffset(usize);

impl PixelOffset {
    /// Create a new PixelOffset from a raw value.
    pub fn new(offset: usize) -> Self {
        Self(offset)
    }

    /// Get the raw usize value.
    pub fn get(&self) -> usize {
        self.0
    }

    /// Add an amount to this offset, saturating at usize::MAX.
    pub fn saturating_add(&self, amount: usize) -> Self {
        Self(self.0.saturating_add(amount))
    }

    /// Subtract an amount from this offset, saturating at 0.
    pub fn saturating_sub(&self, amount: usize) -> Self {
        Self(self.0.saturating_sub(amount))
    }
}

/// Row index within the list. 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RowIndex(usize);

impl RowIndex {
    /// Create a new RowIndex from a raw 0-based value.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw 0-based index value.
    pub fn get(&self) -> usize {
        self.0
    }

    /// Get the next row index.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Get the previous row index, saturating at 0.
    pub fn prev(&self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl From<usize> for RowIndex {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Size of the scroll container in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Content width. Changes invalidate every measured height.
    pub width: u32,
    /// Visible height.
    pub height: u32,
}

impl Viewport {
    /// Create new viewport dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod row_height {
        use super::*;

        #[test]
        fn new_rejects_zero() {
            assert_eq!(RowHeight::new(0), Err(InvalidRowHeight(0)));
        }

        #[test]
        fn new_accepts_positive() {
            assert_eq!(RowHeight::new(42).unwrap().get(), 42);
        }

        #[test]
        fn clamped_lifts_zero_to_min() {
            assert_eq!(RowHeight::clamped(0), RowHeight::MIN);
            assert_eq!(RowHeight::clamped(7).get(), 7);
        }

        #[test]
        fn abs_diff_is_symmetric() {
            let a = RowHeight::clamped(10);
            let b = RowHeight::clamped(13);
            assert_eq!(a.abs_diff(b), 3);
            assert_eq!(b.abs_diff(a), 3);
        }
    }

    mod pixel_offset {
        use super::*;

        #[test]
        fn saturating_add_at_max() {
            let offset = PixelOffset::new(usize::MAX - 1);
            assert_eq!(offset.saturating_add(5).get(), usize::MAX);
        }

        #[test]
        fn saturating_sub_near_zero() {
            let offset = PixelOffset::new(2);
            assert_eq!(offset.saturating_sub(5).get(), 0);
        }
    }

    mod row_index {
        use super::*;

        #[test]
        fn next_and_prev() {
            let index = RowIndex::new(5);
            assert_eq!(index.next().get(), 6);
            assert_eq!(index.prev().get(), 4);
            assert_eq!(RowIndex::new(0).prev().get(), 0);
        }

        #[test]
        fn from_usize() {
            assert_eq!(RowIndex::from(3), RowIndex::new(3));
        }
    }
}
