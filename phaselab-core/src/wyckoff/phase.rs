//! Wyckoff phase state machine.

use crate::domain::BarSeries;
use crate::error::ConfigError;
use crate::indicators::{Indicator, SlotCache};
use crate::wyckoff::{
    CycleType, EventDetector, EventSet, PhaseType, StructureTracker, VolumeProfile, WyckoffEvent,
    WyckoffPhase,
};

/// Confidence decay applied every bar before events are considered.
const CONFIDENCE_DECAY: f64 = 0.95;
/// Below this, the judgment collapses back to unknown.
const CONFIDENCE_COLLAPSE: f64 = 0.15;

const CONFIDENCE_STOPPING_ACTION: f64 = 0.4;
const CONFIDENCE_PHASE_B: f64 = 0.55;
const CONFIDENCE_PHASE_C: f64 = 0.7;
const CONFIDENCE_PHASE_D: f64 = 0.85;
const CONFIDENCE_PHASE_E: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq)]
struct PhaseEntry {
    phase: WyckoffPhase,
    /// Most recent index where cycle or phase changed.
    transition_index: Option<usize>,
}

const UNKNOWN_ENTRY: PhaseEntry = PhaseEntry {
    phase: WyckoffPhase::UNKNOWN,
    transition_index: None,
};

/// Per-bar Wyckoff phase judgment.
///
/// Each bar's value derives from the previous bar's judgment: confidence
/// decays by 5%, the bar's events are detected against the current
/// structure and volume snapshots, and the transition table applies each
/// matching rule in order. Every rule only raises confidence (to its
/// floor); the collapse rule at the end is the only way back to unknown.
pub struct WyckoffPhaseIndicator<'a> {
    series: &'a BarSeries,
    structure: StructureTracker<'a>,
    volume: VolumeProfile<'a>,
    detector: EventDetector<'a>,
    unstable_bars: usize,
    entries: SlotCache<PhaseEntry>,
}

impl<'a> WyckoffPhaseIndicator<'a> {
    /// Starts a builder with the stock parameters: swing fractals 3/3 with
    /// one equal bar, volume windows 5/20, tolerances 0.02/0.05, volume
    /// thresholds 1.6/0.7.
    pub fn builder(series: &'a BarSeries) -> WyckoffPhaseBuilder<'a> {
        WyckoffPhaseBuilder {
            series,
            preceding_swing_bars: 3,
            following_swing_bars: 3,
            allowed_equal_bars: 1,
            volume_short_window: 5,
            volume_long_window: 20,
            breakout_tolerance: 0.02,
            retest_tolerance: 0.05,
            climax_threshold: 1.6,
            dry_up_threshold: 0.7,
        }
    }

    pub fn with_defaults(series: &'a BarSeries) -> Result<Self, ConfigError> {
        Self::builder(series).build()
    }

    /// Effective upper bound of the trading range at `index` (NaN while
    /// unestablished).
    pub fn trading_range_high(&self, index: usize) -> f64 {
        self.structure.snapshot(index).range_high
    }

    /// Effective lower bound of the trading range at `index`.
    pub fn trading_range_low(&self, index: usize) -> f64 {
        self.structure.snapshot(index).range_low
    }

    /// Index of the most recent cycle/phase change at or before `index`,
    /// or `None` when the judgment has never left unknown.
    pub fn last_phase_transition_index(&self, index: usize) -> Option<usize> {
        self.assert_in_bounds(index);
        self.entry(index).transition_index
    }

    fn assert_in_bounds(&self, index: usize) {
        assert!(
            self.series.end_index().map_or(false, |end| index <= end),
            "index {index} is past the series end (bar count {})",
            self.series.bar_count()
        );
    }

    fn entry(&self, index: usize) -> PhaseEntry {
        self.entries.get_or_compute(index, |i| self.compute(i))
    }

    fn compute(&self, index: usize) -> PhaseEntry {
        if index < self.unstable_bars {
            return UNKNOWN_ENTRY;
        }
        let previous = if index == 0 {
            UNKNOWN_ENTRY
        } else {
            self.entry(index - 1)
        };

        let structure = self.structure.snapshot(index);
        let volume = self.volume.snapshot(index);
        let events = self
            .detector
            .detect(index, &structure, &volume, &previous.phase);

        let next = transition(previous.phase, events);
        let changed =
            next.cycle != previous.phase.cycle || next.phase != previous.phase.phase;
        let transition_index = if changed {
            Some(index)
        } else {
            previous.transition_index
        };
        let latest_event_index = if events.is_empty() {
            previous.phase.latest_event_index
        } else {
            Some(index)
        };

        PhaseEntry {
            phase: WyckoffPhase {
                latest_event_index,
                ..next
            },
            transition_index,
        }
    }
}

impl Indicator for WyckoffPhaseIndicator<'_> {
    type Output = WyckoffPhase;

    fn series(&self) -> &BarSeries {
        self.series
    }

    fn value(&self, index: usize) -> WyckoffPhase {
        self.assert_in_bounds(index);
        self.entry(index).phase
    }

    /// Indices below this are always [`WyckoffPhase::UNKNOWN`]: the swing
    /// fractals and the long volume window both need history before the
    /// pipeline means anything.
    fn unstable_bars(&self) -> usize {
        self.unstable_bars
    }
}

/// Applies the decay and the ordered transition rules for one bar.
fn transition(previous: WyckoffPhase, events: EventSet) -> WyckoffPhase {
    let mut cycle = previous.cycle;
    let mut phase = previous.phase;
    let mut confidence = (previous.confidence * CONFIDENCE_DECAY).max(0.0);

    if events.contains(WyckoffEvent::SellingClimax) {
        cycle = CycleType::Accumulation;
        phase = PhaseType::A;
        confidence = confidence.max(CONFIDENCE_STOPPING_ACTION);
    }
    if events.contains_any(&[WyckoffEvent::AutomaticRally, WyckoffEvent::SecondaryTest])
        && cycle == CycleType::Accumulation
        && phase <= PhaseType::B
    {
        phase = PhaseType::B;
        confidence = confidence.max(CONFIDENCE_PHASE_B);
    }
    if events.contains_any(&[WyckoffEvent::Spring, WyckoffEvent::LastPointOfSupport])
        && cycle == CycleType::Accumulation
        && phase <= PhaseType::C
    {
        phase = PhaseType::C;
        confidence = confidence.max(CONFIDENCE_PHASE_C);
    }
    if events.contains(WyckoffEvent::SignOfStrength)
        && cycle == CycleType::Accumulation
        && phase <= PhaseType::D
    {
        phase = PhaseType::D;
        confidence = confidence.max(CONFIDENCE_PHASE_D);
    }
    if events.contains(WyckoffEvent::RangeBreakout)
        && cycle == CycleType::Accumulation
        && phase <= PhaseType::E
    {
        phase = PhaseType::E;
        confidence = confidence.max(CONFIDENCE_PHASE_E);
    }

    if events.contains(WyckoffEvent::BuyingClimax) {
        cycle = CycleType::Distribution;
        phase = PhaseType::A;
        confidence = confidence.max(CONFIDENCE_STOPPING_ACTION);
    }
    if events.contains_any(&[WyckoffEvent::Upthrust, WyckoffEvent::SecondaryTest])
        && cycle == CycleType::Distribution
        && phase <= PhaseType::B
    {
        phase = PhaseType::B;
        confidence = confidence.max(CONFIDENCE_PHASE_B);
    }
    // A bar that only just advanced into phase C must not ride the same
    // supply event straight through to phase D below.
    let mut entered_phase_c = false;
    if events.contains_any(&[
        WyckoffEvent::UpthrustAfterDistribution,
        WyckoffEvent::LastPointOfSupply,
    ]) && cycle == CycleType::Distribution
        && phase <= PhaseType::C
    {
        entered_phase_c = phase < PhaseType::C;
        phase = PhaseType::C;
        confidence = confidence.max(CONFIDENCE_PHASE_C);
    }
    if events.contains(WyckoffEvent::RangeBreakdown)
        && cycle == CycleType::Distribution
        && phase <= PhaseType::E
    {
        phase = PhaseType::E;
        confidence = confidence.max(CONFIDENCE_PHASE_E);
    }
    if events.contains(WyckoffEvent::LastPointOfSupply)
        && cycle == CycleType::Distribution
        && !entered_phase_c
        && phase <= PhaseType::D
    {
        phase = PhaseType::D;
        confidence = confidence.max(CONFIDENCE_PHASE_D);
    }

    if confidence < CONFIDENCE_COLLAPSE {
        cycle = CycleType::Unknown;
        phase = PhaseType::A;
    }

    WyckoffPhase {
        cycle,
        phase,
        confidence: confidence.min(1.0),
        latest_event_index: previous.latest_event_index,
    }
}

/// Fluent configuration for [`WyckoffPhaseIndicator`]. All parameters are
/// validated in [`build`](WyckoffPhaseBuilder::build).
#[derive(Debug, Clone, Copy)]
pub struct WyckoffPhaseBuilder<'a> {
    series: &'a BarSeries,
    preceding_swing_bars: usize,
    following_swing_bars: usize,
    allowed_equal_bars: usize,
    volume_short_window: usize,
    volume_long_window: usize,
    breakout_tolerance: f64,
    retest_tolerance: f64,
    climax_threshold: f64,
    dry_up_threshold: f64,
}

impl<'a> WyckoffPhaseBuilder<'a> {
    /// Fractal shape: bars required before/after a swing plateau and the
    /// plateau's equal-bar allowance.
    pub fn swing_bars(mut self, preceding: usize, following: usize, allowed_equal: usize) -> Self {
        self.preceding_swing_bars = preceding;
        self.following_swing_bars = following;
        self.allowed_equal_bars = allowed_equal;
        self
    }

    pub fn volume_windows(mut self, short: usize, long: usize) -> Self {
        self.volume_short_window = short;
        self.volume_long_window = long;
        self
    }

    pub fn tolerances(mut self, breakout: f64, retest: f64) -> Self {
        self.breakout_tolerance = breakout;
        self.retest_tolerance = retest;
        self
    }

    pub fn volume_thresholds(mut self, climax: f64, dry_up: f64) -> Self {
        self.climax_threshold = climax;
        self.dry_up_threshold = dry_up;
        self
    }

    pub fn build(self) -> Result<WyckoffPhaseIndicator<'a>, ConfigError> {
        let structure = StructureTracker::new(
            self.series,
            self.preceding_swing_bars,
            self.following_swing_bars,
            self.allowed_equal_bars,
            self.breakout_tolerance,
        )?;
        let volume = VolumeProfile::new(
            self.series,
            self.volume_short_window,
            self.volume_long_window,
            self.climax_threshold,
            self.dry_up_threshold,
        )?;
        let detector = EventDetector::new(self.series, self.retest_tolerance)?;
        let unstable_bars = (self.preceding_swing_bars + self.following_swing_bars)
            .max(volume.unstable_bars());
        Ok(WyckoffPhaseIndicator {
            series: self.series,
            structure,
            volume,
            detector,
            unstable_bars,
            entries: SlotCache::new(),
        })
    }
}
