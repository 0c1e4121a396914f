//! Run-length encoded attribute tracks.
//!
//! A [`ValueRuns`] assigns exactly one value to every byte index in
//! `0..len()`. Fonts, smallcaps and sub/superscript overlays handed to the
//! layout builder are all expressed this way.

use core::ops::Range;

use crate::error::{LayoutError, Result};

/// Ordered `(value, length)` runs with cumulative limits.
///
/// Adjacent runs never share a value and no run is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRuns<V> {
    values: Vec<V>,
    /// Exclusive end of each run, strictly increasing.
    limits: Vec<usize>,
}

impl<V> Default for ValueRuns<V> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            limits: Vec::new(),
        }
    }
}

impl<V: PartialEq> ValueRuns<V> {
    /// One uniform run covering `len` bytes.
    pub fn new(value: V, len: usize) -> Self {
        let mut runs = Self::default();
        runs.push(value, len);
        runs
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            limits: Vec::with_capacity(capacity),
        }
    }

    /// Append `len` bytes of `value`, extending the last run when the
    /// values compare equal. Zero-length runs are ignored.
    pub fn push(&mut self, value: V, len: usize) {
        if len == 0 {
            return;
        }
        let end = self.len() + len;
        if let (Some(last), Some(limit)) = (self.values.last(), self.limits.last_mut()) {
            if *last == value {
                *limit = end;
                return;
            }
        }
        self.values.push(value);
        self.limits.push(end);
    }
}

impl<V> ValueRuns<V> {
    /// Total covered length.
    pub fn len(&self) -> usize {
        self.limits.last().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    pub fn run_count(&self) -> usize {
        self.values.len()
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.limits.clear();
    }

    /// Index of the run covering `index`, if any.
    pub fn run_index_at(&self, index: usize) -> Option<usize> {
        let run = self.limits.partition_point(|&limit| limit <= index);
        (run < self.limits.len()).then_some(run)
    }

    /// Value covering `index`.
    pub fn value_at(&self, index: usize) -> Result<&V> {
        self.run_index_at(index)
            .map(|run| &self.values[run])
            .ok_or_else(|| LayoutError::out_of_range(index, self.len()))
    }

    /// Byte range covered by run `run`.
    pub fn run_range(&self, run: usize) -> Option<Range<usize>> {
        let end = *self.limits.get(run)?;
        let start = if run == 0 { 0 } else { self.limits[run - 1] };
        Some(start..end)
    }

    /// All runs in order. The iterator can be cloned to restart from the
    /// current position.
    pub fn iter(&self) -> Runs<'_, V> {
        Runs {
            runs: self,
            next: 0,
        }
    }

    /// A forward cursor for repeated lookups at non-decreasing indices.
    pub fn cursor(&self) -> RunCursor<'_, V> {
        RunCursor {
            runs: self,
            run: 0,
        }
    }
}

impl<V: PartialEq> FromIterator<(V, usize)> for ValueRuns<V> {
    fn from_iter<I: IntoIterator<Item = (V, usize)>>(iter: I) -> Self {
        let mut runs = Self::default();
        for (value, len) in iter {
            runs.push(value, len);
        }
        runs
    }
}

impl<'a, V> IntoIterator for &'a ValueRuns<V> {
    type Item = Run<'a, V>;
    type IntoIter = Runs<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One run yielded by [`Runs`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Run<'a, V> {
    pub value: &'a V,
    pub start: usize,
    pub end: usize,
}

impl<V> Run<'_, V> {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Iterator over the runs of a [`ValueRuns`].
#[derive(Debug)]
pub struct Runs<'a, V> {
    runs: &'a ValueRuns<V>,
    next: usize,
}

impl<V> Clone for Runs<'_, V> {
    fn clone(&self) -> Self {
        Self {
            runs: self.runs,
            next: self.next,
        }
    }
}

impl<'a, V> Iterator for Runs<'a, V> {
    type Item = Run<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.runs.values.get(self.next)?;
        let range = self.runs.run_range(self.next)?;
        self.next += 1;
        Some(Run {
            value,
            start: range.start,
            end: range.end,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.runs.run_count() - self.next;
        (remaining, Some(remaining))
    }
}

impl<V> ExactSizeIterator for Runs<'_, V> {}

/// Amortized O(1) lookups while walking text forwards.
#[derive(Debug)]
pub struct RunCursor<'a, V> {
    runs: &'a ValueRuns<V>,
    run: usize,
}

impl<'a, V> RunCursor<'a, V> {
    /// Value covering `index`. Indices lower than a previous query fall
    /// back to a binary search.
    pub fn value_at(&mut self, index: usize) -> Result<&'a V> {
        let limits = &self.runs.limits;
        let start = if self.run == 0 { 0 } else { limits[self.run - 1] };
        if index < start {
            self.run = self.runs.run_index_at(index).unwrap_or(0);
        }
        while self.run < limits.len() && limits[self.run] <= index {
            self.run += 1;
        }
        self.runs
            .values
            .get(self.run)
            .ok_or_else(|| LayoutError::out_of_range(index, self.runs.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_run_covers_length() {
        let runs = ValueRuns::new('a', 5);
        assert_eq!(runs.len(), 5);
        assert_eq!(runs.run_count(), 1);
        assert_eq!(*runs.value_at(4).unwrap(), 'a');
    }

    #[test]
    fn zero_length_uniform_run_is_empty() {
        let runs = ValueRuns::new(1u8, 0);
        assert!(runs.is_empty());
        assert_eq!(runs.iter().count(), 0);
    }

    #[test]
    fn push_merges_equal_neighbours() {
        let mut runs = ValueRuns::new(1, 3);
        runs.push(1, 2);
        runs.push(2, 4);
        runs.push(2, 1);
        runs.push(3, 0);
        assert_eq!(runs.run_count(), 2);
        assert_eq!(runs.len(), 10);
        assert_eq!(runs.run_range(0), Some(0..5));
        assert_eq!(runs.run_range(1), Some(5..10));
    }

    #[test]
    fn iteration_is_contiguous_and_total() {
        let lengths = [3usize, 1, 7, 2, 2];
        let runs: ValueRuns<usize> = lengths.iter().enumerate().map(|(i, &l)| (i, l)).collect();
        let total: usize = lengths.iter().sum();

        let mut expected_start = 0;
        for run in runs.iter() {
            assert_eq!(run.start, expected_start);
            assert!(run.end > run.start);
            expected_start = run.end;
        }
        assert_eq!(expected_start, total);

        for index in 0..total {
            let hits = runs.iter().filter(|r| r.range().contains(&index)).count();
            assert_eq!(hits, 1, "index {index} resolved to {hits} runs");
        }
    }

    #[test]
    fn iterator_restarts_from_clone() {
        let runs: ValueRuns<char> = [('a', 1), ('b', 2), ('c', 3)].into_iter().collect();
        let mut iter = runs.iter();
        iter.next();
        let saved = iter.clone();
        let rest: Vec<char> = iter.map(|r| *r.value).collect();
        let again: Vec<char> = saved.map(|r| *r.value).collect();
        assert_eq!(rest, vec!['b', 'c']);
        assert_eq!(rest, again);
        assert_eq!(runs.iter().len(), 3);
    }

    #[test]
    fn value_at_past_end_is_out_of_range() {
        let runs = ValueRuns::new(true, 4);
        match runs.value_at(4) {
            Err(LayoutError::OutOfRange { index, len }) => {
                assert_eq!(index, 4);
                assert_eq!(len, 4);
            }
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn cursor_matches_binary_search() {
        let runs: ValueRuns<u8> = [(1, 2), (2, 3), (3, 1), (4, 4)].into_iter().collect();
        let mut cursor = runs.cursor();
        for index in 0..runs.len() {
            assert_eq!(cursor.value_at(index).unwrap(), runs.value_at(index).unwrap());
        }
        // Going backwards still resolves correctly.
        assert_eq!(*cursor.value_at(0).unwrap(), 1);
        assert!(cursor.value_at(runs.len()).is_err());
        assert_eq!(*cursor.value_at(6).unwrap(), 4);
        assert_eq!(*cursor.value_at(3).unwrap(), 2);
        assert_eq!(cursor.run, 1);
        assert_eq!(*cursor.value_at(5).unwrap(), 3);
    }
}
