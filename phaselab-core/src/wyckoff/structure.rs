//! Trading range construction from confirmed swing points.

use crate::domain::BarSeries;
use crate::error::ConfigError;
use crate::indicators::{RecentSwing, SlotCache};

/// Structural view of the market at one bar.
///
/// Range bounds are NaN until a swing on that side has been confirmed; all
/// range-dependent flags stay false until both bounds exist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructureSnapshot {
    pub range_low: f64,
    pub range_high: f64,
    /// Bar index the effective low was taken from.
    pub range_low_index: Option<usize>,
    /// Bar index the effective high was taken from.
    pub range_high_index: Option<usize>,
    pub close: f64,
    /// Close within `[range_low, range_high]`, bounds inclusive.
    pub in_range: bool,
    /// Close strictly above the tolerance-widened upper bound.
    pub broke_above_range: bool,
    /// Close strictly below the tolerance-widened lower bound.
    pub broke_below_range: bool,
}

impl StructureSnapshot {
    pub fn empty() -> Self {
        Self {
            range_low: f64::NAN,
            range_high: f64::NAN,
            range_low_index: None,
            range_high_index: None,
            close: f64::NAN,
            in_range: false,
            broke_above_range: false,
            broke_below_range: false,
        }
    }

    /// Both bounds established.
    pub fn has_range(&self) -> bool {
        !self.range_low.is_nan() && !self.range_high.is_nan()
    }
}

/// Tracks the widest trading range seen so far.
///
/// Candidate bounds come from the latest confirmed swing high/low; the
/// effective bound at each bar is the wider of the candidate and the
/// previous bar's bound, so an established range only ever widens. Breakout
/// flags use a band scaled by the range width: a close must clear
/// `bound ± (high - low) * breakout_tolerance` strictly.
#[derive(Debug)]
pub struct StructureTracker<'a> {
    series: &'a BarSeries,
    swing_high: RecentSwing<'a>,
    swing_low: RecentSwing<'a>,
    breakout_tolerance: f64,
    snapshots: SlotCache<StructureSnapshot>,
}

impl<'a> StructureTracker<'a> {
    pub fn new(
        series: &'a BarSeries,
        preceding_swing_bars: usize,
        following_swing_bars: usize,
        allowed_equal_bars: usize,
        breakout_tolerance: f64,
    ) -> Result<Self, ConfigError> {
        ConfigError::check_threshold("breakout tolerance", breakout_tolerance)?;
        Ok(Self {
            series,
            swing_high: RecentSwing::swing_high(
                series,
                preceding_swing_bars,
                following_swing_bars,
                allowed_equal_bars,
            )?,
            swing_low: RecentSwing::swing_low(
                series,
                preceding_swing_bars,
                following_swing_bars,
                allowed_equal_bars,
            )?,
            breakout_tolerance,
            snapshots: SlotCache::new(),
        })
    }

    /// Snapshot at `index`. An index past the series end yields the empty
    /// snapshot rather than a panic: the tracker is also consulted for
    /// not-yet-appended bars by callers probing range state.
    pub fn snapshot(&self, index: usize) -> StructureSnapshot {
        if self.series.end_index().map_or(true, |end| index > end) {
            return StructureSnapshot::empty();
        }
        self.snapshots.get_or_compute(index, |i| self.compute(i))
    }

    fn compute(&self, index: usize) -> StructureSnapshot {
        let previous = if index == 0 {
            StructureSnapshot::empty()
        } else {
            self.snapshot(index - 1)
        };
        let close = self.series.bar(index).close;
        if close.is_nan() {
            return StructureSnapshot::empty();
        }

        let latest_high = self.swing_high.latest_swing_index(index);
        let latest_low = self.swing_low.latest_swing_index(index);
        let mut range_high = latest_high.map_or(f64::NAN, |i| self.series.bar(i).high);
        let mut range_low = latest_low.map_or(f64::NAN, |i| self.series.bar(i).low);
        let mut range_high_index = latest_high;
        let mut range_low_index = latest_low;

        // Monotonic widening: never let a newer, tighter swing shrink an
        // established bound.
        if !previous.range_high.is_nan() && (range_high.is_nan() || previous.range_high > range_high)
        {
            range_high = previous.range_high;
            range_high_index = previous.range_high_index;
        }
        if !previous.range_low.is_nan() && (range_low.is_nan() || previous.range_low < range_low) {
            range_low = previous.range_low;
            range_low_index = previous.range_low_index;
        }

        let has_range = !range_high.is_nan() && !range_low.is_nan();
        let in_range = has_range && close <= range_high && close >= range_low;
        let (broke_above_range, broke_below_range) = if has_range {
            let band = (range_high - range_low) * self.breakout_tolerance;
            (close > range_high + band, close < range_low - band)
        } else {
            (false, false)
        };

        StructureSnapshot {
            range_low,
            range_high,
            range_low_index,
            range_high_index,
            close,
            in_range,
            broke_above_range,
            broke_below_range,
        }
    }
}
