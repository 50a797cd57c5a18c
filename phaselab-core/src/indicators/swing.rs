//! Fractal swing point detection.
//!
//! A swing high at candidate index `c` is confirmed once the bars flanking
//! its equal-value plateau are strictly lower: `preceding_bars` bars before
//! the plateau and `following_bars` bars after it. Plateau length on each
//! side is capped by `allowed_equal_bars`; a plateau that keeps running
//! past the cap disqualifies the candidate. Swing lows are symmetric with
//! strictly higher flanks.
//!
//! Confirmation is retrospective: a swing at `c` only becomes visible at
//! indices `>= c + following_bars`. The tracker scans forward once per new
//! index and keeps an ordered list of confirmed swing indices, so repeated
//! queries are O(1) amortized.

use std::cell::RefCell;

use crate::domain::{Bar, BarSeries};
use crate::error::ConfigError;
use crate::indicators::Indicator;

/// Which extreme a swing tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingDirection {
    High,
    Low,
}

impl SwingDirection {
    fn price(self, bar: &Bar) -> f64 {
        match self {
            SwingDirection::High => bar.high,
            SwingDirection::Low => bar.low,
        }
    }

    /// True if `candidate` dominates `other` for this direction.
    fn dominates(self, candidate: f64, other: f64) -> bool {
        match self {
            SwingDirection::High => candidate > other,
            SwingDirection::Low => candidate < other,
        }
    }
}

#[derive(Debug, Default)]
struct ScanState {
    /// Confirmed swing indices in ascending order.
    swing_indexes: Vec<usize>,
    /// Next series index the forward scan has not yet visited.
    next_scan: usize,
}

/// Most recent confirmed fractal swing at or before a given index.
#[derive(Debug)]
pub struct RecentSwing<'a> {
    series: &'a BarSeries,
    direction: SwingDirection,
    preceding_bars: usize,
    following_bars: usize,
    allowed_equal_bars: usize,
    state: RefCell<ScanState>,
}

impl<'a> RecentSwing<'a> {
    pub fn new(
        series: &'a BarSeries,
        direction: SwingDirection,
        preceding_bars: usize,
        following_bars: usize,
        allowed_equal_bars: usize,
    ) -> Result<Self, ConfigError> {
        ConfigError::check_min("preceding swing bars", preceding_bars, 1)?;
        Ok(Self {
            series,
            direction,
            preceding_bars,
            following_bars,
            allowed_equal_bars,
            state: RefCell::new(ScanState::default()),
        })
    }

    pub fn swing_high(
        series: &'a BarSeries,
        preceding_bars: usize,
        following_bars: usize,
        allowed_equal_bars: usize,
    ) -> Result<Self, ConfigError> {
        Self::new(
            series,
            SwingDirection::High,
            preceding_bars,
            following_bars,
            allowed_equal_bars,
        )
    }

    pub fn swing_low(
        series: &'a BarSeries,
        preceding_bars: usize,
        following_bars: usize,
        allowed_equal_bars: usize,
    ) -> Result<Self, ConfigError> {
        Self::new(
            series,
            SwingDirection::Low,
            preceding_bars,
            following_bars,
            allowed_equal_bars,
        )
    }

    /// Index of the most recent swing confirmed at or before `index`, or
    /// `None` when no swing has been confirmed yet.
    pub fn latest_swing_index(&self, index: usize) -> Option<usize> {
        self.ensure_scanned(index);
        let state = self.state.borrow();
        state
            .swing_indexes
            .iter()
            .rev()
            .copied()
            .find(|&swing| swing <= index)
    }

    fn price(&self, index: usize) -> f64 {
        self.direction.price(self.series.bar(index))
    }

    /// Advances the forward scan through `index` (clamped to the series
    /// end), recording newly confirmed swings.
    fn ensure_scanned(&self, index: usize) {
        let Some(end) = self.series.end_index() else {
            return;
        };
        let target = index.min(end);
        let mut state = self.state.borrow_mut();
        while state.next_scan <= target {
            let current = state.next_scan;
            state.next_scan += 1;
            let Some(found) = self.latest_confirmed_at(current) else {
                continue;
            };
            // A later scan can surface an earlier candidate than one
            // recorded from a shorter window; drop superseded entries so
            // the list stays ascending.
            while state
                .swing_indexes
                .last()
                .is_some_and(|&last| last > found)
            {
                state.swing_indexes.pop();
            }
            if state.swing_indexes.last() != Some(&found) {
                state.swing_indexes.push(found);
            }
        }
    }

    /// Latest candidate confirmable using bars up to `max_available`.
    fn latest_confirmed_at(&self, max_available: usize) -> Option<usize> {
        let latest_candidate = max_available.checked_sub(self.following_bars)?;
        let earliest_candidate = self.preceding_bars;
        if latest_candidate < earliest_candidate {
            return None;
        }
        (earliest_candidate..=latest_candidate)
            .rev()
            .find(|&candidate| self.is_confirmed(candidate, max_available))
    }

    fn is_confirmed(&self, candidate: usize, max_available: usize) -> bool {
        let candidate_value = self.price(candidate);
        if candidate_value.is_nan() {
            return false;
        }
        let Some(plateau_start) = self.plateau_start(candidate, candidate_value) else {
            return false;
        };
        let Some(plateau_end) = self.plateau_end(candidate, max_available, candidate_value) else {
            return false;
        };
        self.dominates_preceding(plateau_start, candidate_value)
            && self.dominates_following(plateau_end, max_available, candidate_value)
    }

    /// Walks the equal-value plateau backward from the candidate. `None`
    /// when a NaN interrupts it or the plateau exceeds the equality cap.
    fn plateau_start(&self, candidate: usize, candidate_value: f64) -> Option<usize> {
        let mut equals_used = 0;
        let mut index = candidate;
        while index > 0 && equals_used < self.allowed_equal_bars {
            let previous = self.price(index - 1);
            if previous.is_nan() {
                return None;
            }
            if previous != candidate_value {
                break;
            }
            equals_used += 1;
            index -= 1;
        }
        if index > 0 && self.price(index - 1) == candidate_value {
            return None;
        }
        Some(index)
    }

    fn plateau_end(
        &self,
        candidate: usize,
        max_available: usize,
        candidate_value: f64,
    ) -> Option<usize> {
        let mut equals_used = 0;
        let mut index = candidate;
        while index < max_available && equals_used < self.allowed_equal_bars {
            let next = self.price(index + 1);
            if next.is_nan() {
                return None;
            }
            if next != candidate_value {
                break;
            }
            equals_used += 1;
            index += 1;
        }
        if index < max_available && self.price(index + 1) == candidate_value {
            return None;
        }
        Some(index)
    }

    fn dominates_preceding(&self, plateau_start: usize, candidate_value: f64) -> bool {
        let Some(first) = plateau_start.checked_sub(self.preceding_bars) else {
            return false;
        };
        (first..plateau_start).all(|i| {
            let value = self.price(i);
            !value.is_nan() && self.direction.dominates(candidate_value, value)
        })
    }

    fn dominates_following(
        &self,
        plateau_end: usize,
        max_available: usize,
        candidate_value: f64,
    ) -> bool {
        if self.following_bars == 0 {
            return true;
        }
        if max_available - plateau_end < self.following_bars {
            return false;
        }
        (plateau_end + 1..=plateau_end + self.following_bars).all(|i| {
            let value = self.price(i);
            !value.is_nan() && self.direction.dominates(candidate_value, value)
        })
    }
}

impl Indicator for RecentSwing<'_> {
    type Output = f64;

    fn series(&self) -> &BarSeries {
        self.series
    }

    /// Price of the most recent confirmed swing, NaN when none exists yet.
    fn value(&self, index: usize) -> f64 {
        match self.latest_swing_index(index) {
            Some(swing) => self.price(swing),
            None => f64::NAN,
        }
    }

    fn unstable_bars(&self) -> usize {
        self.preceding_bars + self.following_bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::testutil::make_ohlcv;

    fn series_from_highs(highs: &[f64]) -> BarSeries {
        let rows: Vec<_> = highs
            .iter()
            .map(|&h| (h - 2.0, h, h - 4.0, h - 1.0, 1_000.0))
            .collect();
        make_ohlcv(&rows)
    }

    fn series_from_lows(lows: &[f64]) -> BarSeries {
        let rows: Vec<_> = lows
            .iter()
            .map(|&l| (l + 2.0, l + 4.0, l, l + 1.0, 1_000.0))
            .collect();
        make_ohlcv(&rows)
    }

    #[test]
    fn rejects_zero_preceding_bars() {
        let series = series_from_highs(&[1.0, 2.0, 1.0]);
        assert!(RecentSwing::swing_high(&series, 0, 1, 0).is_err());
    }

    #[test]
    fn swing_high_confirms_after_following_bars() {
        let series = series_from_highs(&[10.0, 12.0, 11.0, 10.5]);
        let swing = RecentSwing::swing_high(&series, 1, 1, 0).unwrap();

        assert_eq!(swing.latest_swing_index(0), None);
        assert_eq!(swing.latest_swing_index(1), None); // not yet confirmed
        assert_eq!(swing.latest_swing_index(2), Some(1));
        assert_eq!(swing.latest_swing_index(3), Some(1));
        assert_eq!(swing.value(2), 12.0);
        assert!(swing.value(1).is_nan());
    }

    #[test]
    fn swing_low_requires_strictly_higher_flanks() {
        // equal neighbor on the right blocks confirmation with no plateau
        // allowance
        let series = series_from_lows(&[10.0, 8.0, 8.0, 9.0]);
        let strict = RecentSwing::swing_low(&series, 1, 1, 0).unwrap();
        assert_eq!(strict.latest_swing_index(3), None);

        // one equal bar allowed: the plateau 1..=2 confirms, reported at
        // its latest member
        let with_plateau = RecentSwing::swing_low(&series, 1, 1, 1).unwrap();
        assert_eq!(with_plateau.latest_swing_index(3), Some(2));
        assert_eq!(with_plateau.value(3), 8.0);
    }

    #[test]
    fn equal_bar_allowance_applies_per_side() {
        // three-bar plateau: only the middle candidate fits one equal bar
        // on each side
        let series = series_from_lows(&[10.0, 8.0, 8.0, 8.0, 9.0]);
        let swing = RecentSwing::swing_low(&series, 1, 1, 1).unwrap();
        assert_eq!(swing.latest_swing_index(4), Some(2));

        // with two allowed, the rightmost plateau member wins
        let wide = RecentSwing::swing_low(&series, 1, 1, 2).unwrap();
        assert_eq!(wide.latest_swing_index(4), Some(3));
    }

    #[test]
    fn later_swing_supersedes_earlier_one() {
        let series = series_from_highs(&[10.0, 14.0, 11.0, 12.0, 9.0, 8.0]);
        let swing = RecentSwing::swing_high(&series, 1, 1, 0).unwrap();

        assert_eq!(swing.latest_swing_index(2), Some(1));
        assert_eq!(swing.latest_swing_index(4), Some(3));
        assert_eq!(swing.value(4), 12.0);
        // earlier indices still answer from their own vantage point
        assert_eq!(swing.latest_swing_index(2), Some(1));
    }

    #[test]
    fn monotonic_downtrend_confirms_no_swing_low() {
        let series = series_from_lows(&[10.0, 9.0, 8.0, 7.0, 6.0]);
        let swing = RecentSwing::swing_low(&series, 1, 1, 0).unwrap();
        assert_eq!(swing.latest_swing_index(4), None);
    }

    #[test]
    fn queries_past_series_end_are_clamped() {
        let series = series_from_highs(&[10.0, 12.0, 11.0]);
        let swing = RecentSwing::swing_high(&series, 1, 1, 0).unwrap();
        assert_eq!(swing.latest_swing_index(100), Some(1));
    }
}
