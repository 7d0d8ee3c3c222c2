//! HeightIndex - row tops and offset lookup via a Fenwick tree
//!
//! Stores the effective height of every row and answers "where does row `i`
//! start" and "which row covers offset `y`" without walking the list.
//!
//! # Complexity
//!
//! - `set`: O(log n)
//! - `offset_of` / `prefix_sum`: O(log n)
//! - `lower_bound`: O(log n) (tree descent)
//! - `push`: O(log n) amortized
//! - `truncate`: O(k log n) for k removed rows
//! - `from_heights`: O(n)
//! - `height`, `len`: O(1)

/// Prefix-sum index of row heights.
///
/// # Invariants
/// - `tree` is a Fenwick tree over `heights` zero-padded to `tree.len()`.
/// - `offset_of(i) == heights[..i].iter().sum()`.
#[derive(Debug, Clone, Default)]
pub struct HeightIndex {
    /// Fenwick tree backing storage (capacity may exceed `heights.len()`).
    tree: Vec<isize>,
    /// Plain per-row heights, mirrored for O(1) reads and rebuilds.
    heights: Vec<u32>,
}

impl HeightIndex {
    /// Creates an empty index with the given initial capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chatlist::list::height_index::HeightIndex;
    /// let index = HeightIndex::new(100);
    /// assert_eq!(index.len(), 0);
    /// assert_eq!(index.total(), 0);
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self {
            tree: vec![0; capacity],
            heights: Vec::with_capacity(capacity),
        }
    }

    /// Builds an index from a sequence of heights in linear time.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chatlist::list::height_index::HeightIndex;
    /// let index = HeightIndex::from_heights([10, 20, 30]);
    /// assert_eq!(index.offset_of(2), 30);
    /// assert_eq!(index.total(), 60);
    /// ```
    pub fn from_heights(heights: impl IntoIterator<Item = u32>) -> Self {
        let heights: Vec<u32> = heights.into_iter().collect();
        let capacity = heights.len().next_power_of_two();
        let mut index = Self {
            tree: Vec::new(),
            heights,
        };
        index.rebuild(capacity);
        index
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Returns true if the index contains no rows.
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Height of row `index`, or `None` if out of bounds.
    pub fn height(&self, index: usize) -> Option<u32> {
        self.heights.get(index).copied()
    }

    /// Sets the height of row `index`.
    ///
    /// Returns the signed delta applied, or `None` if `index` is out of bounds.
    /// Every later row's offset shifts by exactly that delta; earlier rows are untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chatlist::list::height_index::HeightIndex;
    /// let mut index = HeightIndex::from_heights([5, 5, 5]);
    /// assert_eq!(index.set(1, 10), Some(5));
    /// assert_eq!(index.offset_of(2), 15);
    /// assert_eq!(index.set(7, 1), None);
    /// ```
    pub fn set(&mut self, index: usize, height: u32) -> Option<isize> {
        let current = self.heights.get_mut(index)?;
        let delta = height as isize - *current as isize;
        *current = height;
        if delta != 0 {
            fenwick::array::update(&mut self.tree, index, delta);
        }
        Some(delta)
    }

    /// Appends a row, growing the backing tree when full.
    pub fn push(&mut self, height: u32) {
        let idx = self.heights.len();
        self.heights.push(height);

        if idx >= self.tree.len() {
            // Padding positions of the old tree do not cover the new range; rebuild.
            let capacity = (self.tree.len().max(1) * 2).max(self.heights.len());
            self.rebuild(capacity);
        } else {
            fenwick::array::update(&mut self.tree, idx, height as isize);
        }
    }

    /// Shortens the index to `len` rows. No-op if already shorter.
    pub fn truncate(&mut self, len: usize) {
        while self.heights.len() > len {
            let idx = self.heights.len() - 1;
            let height = self.heights.pop().unwrap_or(0);
            if height != 0 {
                fenwick::array::update(&mut self.tree, idx, -(height as isize));
            }
        }
    }

    /// Cumulative height up to and including row `index`, or `None` if out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chatlist::list::height_index::HeightIndex;
    /// let index = HeightIndex::from_heights([3, 4, 5]);
    /// assert_eq!(index.prefix_sum(0), Some(3));
    /// assert_eq!(index.prefix_sum(2), Some(12));
    /// assert_eq!(index.prefix_sum(3), None);
    /// ```
    pub fn prefix_sum(&self, index: usize) -> Option<usize> {
        if index >= self.heights.len() {
            return None;
        }
        let sum = fenwick::array::prefix_sum(&self.tree, index);
        Some(sum.max(0) as usize)
    }

    /// Top offset of row `index`: the sum of all heights before it.
    ///
    /// `offset_of(len())` is the total height; larger indices clamp to it.
    pub fn offset_of(&self, index: usize) -> usize {
        if index == 0 || self.heights.is_empty() {
            return 0;
        }
        let last = index.min(self.heights.len()) - 1;
        self.prefix_sum(last).unwrap_or(0)
    }

    /// Total height of all rows.
    pub fn total(&self) -> usize {
        self.offset_of(self.heights.len())
    }

    /// First row whose bottom lies strictly below `value`, i.e. the row covering offset `value`.
    ///
    /// Returns `None` when `value >= total()` or the index is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chatlist::list::height_index::HeightIndex;
    /// let index = HeightIndex::from_heights([10, 20, 15]);
    /// assert_eq!(index.lower_bound(0), Some(0));
    /// assert_eq!(index.lower_bound(10), Some(1));
    /// assert_eq!(index.lower_bound(29), Some(1));
    /// assert_eq!(index.lower_bound(30), Some(2));
    /// assert_eq!(index.lower_bound(45), None);
    /// ```
    pub fn lower_bound(&self, value: usize) -> Option<usize> {
        let len = self.heights.len();
        if len == 0 {
            return None;
        }

        // Descend from the highest power of two: `pos` rows have prefix sum <= value.
        let mut pos = 0usize;
        let mut remaining = value;
        let mut step = highest_power_of_two(self.tree.len());
        while step > 0 {
            let next = pos + step;
            if next <= len {
                let node = self.tree[next - 1].max(0) as usize;
                if node <= remaining {
                    pos = next;
                    remaining -= node;
                }
            }
            step >>= 1;
        }

        (pos < len).then_some(pos)
    }

    /// Recreate the tree from `heights` with the given capacity.
    fn rebuild(&mut self, capacity: usize) {
        let capacity = capacity.max(self.heights.len());
        self.tree.clear();
        self.tree.resize(capacity, 0);
        for (i, &h) in self.heights.iter().enumerate() {
            self.tree[i] += h as isize;
        }
        for i in 0..capacity {
            let parent = i | (i + 1);
            if parent < capacity {
                let value = self.tree[i];
                self.tree[parent] += value;
            }
        }
    }
}

fn highest_power_of_two(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        1 << (usize::BITS - 1 - n.leading_zeros())
    }
}
