//! Append-only bar series addressed by stable zero-based indices.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

/// Ordered, append-only sequence of bars.
///
/// Index `i` always refers to the same bar once appended, which is what
/// makes per-index memoization sound: appending new bars never invalidates
/// previously computed indicator values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bars(bars: Vec<Bar>) -> Self {
        Self { bars }
    }

    /// Appends a bar at the next index.
    pub fn push(&mut self, bar: Bar) {
        self.bars.push(bar);
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// First valid index. Always 0; kept explicit so callers never hardcode
    /// the series origin.
    pub fn begin_index(&self) -> usize {
        0
    }

    /// Last valid index, or `None` for an empty series.
    pub fn end_index(&self) -> Option<usize> {
        self.bars.len().checked_sub(1)
    }

    /// Bar at `index`.
    ///
    /// # Panics
    /// Panics if `index` is past the series end; querying an index that was
    /// never appended is a caller bug, not a recoverable condition.
    pub fn bar(&self, index: usize) -> &Bar {
        assert!(
            index < self.bars.len(),
            "bar index {index} out of bounds (bar count {})",
            self.bars.len()
        );
        &self.bars[index]
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn last_bar(&self) -> Option<&Bar> {
        self.bars.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32, close: f64) -> Bar {
        Bar::new(
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            close,
            close + 1.0,
            close - 1.0,
            close,
            1_000.0,
        )
    }

    #[test]
    fn empty_series_has_no_end_index() {
        let series = BarSeries::new();
        assert!(series.is_empty());
        assert_eq!(series.end_index(), None);
        assert_eq!(series.last_bar(), None);
    }

    #[test]
    fn indices_are_stable_across_appends() {
        let mut series = BarSeries::new();
        series.push(bar(2, 100.0));
        assert_eq!(series.end_index(), Some(0));
        let first_close = series.bar(0).close;

        series.push(bar(3, 101.0));
        series.push(bar(4, 102.0));
        assert_eq!(series.bar(0).close, first_close);
        assert_eq!(series.end_index(), Some(2));
        assert_eq!(series.begin_index(), 0);
        assert_eq!(series.bar_count(), 3);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn out_of_bounds_index_panics() {
        let mut series = BarSeries::new();
        series.push(bar(2, 100.0));
        series.bar(1);
    }
}
