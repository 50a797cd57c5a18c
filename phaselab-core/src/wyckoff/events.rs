//! Per-bar Wyckoff event detection.

use serde::{Deserialize, Serialize};

use crate::domain::BarSeries;
use crate::error::ConfigError;
use crate::indicators::SlotCache;
use crate::wyckoff::{CycleType, StructureSnapshot, VolumeSnapshot, WyckoffPhase};

/// Events a single bar can raise. Several can coincide on one bar (a
/// breakout on climactic volume is both a breakout and a sign of
/// strength).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WyckoffEvent {
    SellingClimax,
    BuyingClimax,
    AutomaticRally,
    PreliminarySupport,
    PreliminarySupply,
    SecondaryTest,
    Spring,
    SignOfStrength,
    LastPointOfSupport,
    LastPointOfSupply,
    Upthrust,
    UpthrustAfterDistribution,
    RangeBreakout,
    RangeBreakdown,
}

impl WyckoffEvent {
    pub const ALL: [WyckoffEvent; 14] = [
        WyckoffEvent::SellingClimax,
        WyckoffEvent::BuyingClimax,
        WyckoffEvent::AutomaticRally,
        WyckoffEvent::PreliminarySupport,
        WyckoffEvent::PreliminarySupply,
        WyckoffEvent::SecondaryTest,
        WyckoffEvent::Spring,
        WyckoffEvent::SignOfStrength,
        WyckoffEvent::LastPointOfSupport,
        WyckoffEvent::LastPointOfSupply,
        WyckoffEvent::Upthrust,
        WyckoffEvent::UpthrustAfterDistribution,
        WyckoffEvent::RangeBreakout,
        WyckoffEvent::RangeBreakdown,
    ];

    fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// Set of events raised on one bar, packed into a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventSet(u16);

impl EventSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, event: WyckoffEvent) {
        self.0 |= event.bit();
    }

    pub fn contains(&self, event: WyckoffEvent) -> bool {
        self.0 & event.bit() != 0
    }

    pub fn contains_any(&self, events: &[WyckoffEvent]) -> bool {
        events.iter().any(|&event| self.contains(event))
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = WyckoffEvent> + '_ {
        WyckoffEvent::ALL
            .into_iter()
            .filter(move |&event| self.contains(event))
    }
}

impl FromIterator<WyckoffEvent> for EventSet {
    fn from_iter<T: IntoIterator<Item = WyckoffEvent>>(iter: T) -> Self {
        let mut set = EventSet::new();
        for event in iter {
            set.insert(event);
        }
        set
    }
}

/// Maps one bar's structure and volume snapshots (plus the prior phase
/// judgment) to the events it raises.
///
/// Two anchor bands are in play and deliberately scale differently:
/// retests of a bound use an absolute-price band
/// (`|anchor - close| < anchor * retest_tolerance`), while preliminary
/// support/supply near a bound use a range-width band. Breakout flags come
/// pre-computed on the structure snapshot.
#[derive(Debug)]
pub struct EventDetector<'a> {
    series: &'a BarSeries,
    retest_tolerance: f64,
    lowest_low: SlotCache<f64>,
    highest_high: SlotCache<f64>,
}

impl<'a> EventDetector<'a> {
    pub fn new(series: &'a BarSeries, retest_tolerance: f64) -> Result<Self, ConfigError> {
        ConfigError::check_threshold("retest tolerance", retest_tolerance)?;
        Ok(Self {
            series,
            retest_tolerance,
            lowest_low: SlotCache::new(),
            highest_high: SlotCache::new(),
        })
    }

    /// Events raised at `index` given the bar's structure and volume view
    /// and the previous bar's phase judgment.
    pub fn detect(
        &self,
        index: usize,
        structure: &StructureSnapshot,
        volume: &VolumeSnapshot,
        previous: &WyckoffPhase,
    ) -> EventSet {
        let mut events = EventSet::new();
        let close = self.series.bar(index).close;
        if close.is_nan() {
            return events;
        }
        let prior_cycle = previous.cycle;

        // Before any range exists, a volume climax on a fresh extreme is
        // the stopping action that seeds a campaign.
        if !structure.has_range() && volume.climax {
            if self.is_new_extreme_low(index) {
                events.insert(WyckoffEvent::SellingClimax);
            }
            if self.is_new_extreme_high(index) {
                events.insert(WyckoffEvent::BuyingClimax);
            }
            return events;
        }
        if !structure.has_range() {
            return events;
        }

        if volume.climax
            && self.is_near(structure.range_low, close)
            && prior_cycle != CycleType::Distribution
        {
            events.insert(WyckoffEvent::SellingClimax);
        }
        if volume.climax
            && self.is_near(structure.range_high, close)
            && prior_cycle != CycleType::Accumulation
        {
            events.insert(WyckoffEvent::BuyingClimax);
        }

        if structure.in_range && volume.climax {
            let band = (structure.range_high - structure.range_low) * self.retest_tolerance;
            if close < structure.range_low + band {
                events.insert(WyckoffEvent::PreliminarySupport);
            }
            if close > structure.range_high - band {
                events.insert(WyckoffEvent::PreliminarySupply);
            }
        }

        if structure.broke_above_range {
            events.insert(WyckoffEvent::RangeBreakout);
            if volume.climax {
                if prior_cycle == CycleType::Accumulation {
                    events.insert(WyckoffEvent::SignOfStrength);
                } else {
                    events.insert(WyckoffEvent::BuyingClimax);
                }
            }
        }
        if structure.broke_below_range {
            events.insert(WyckoffEvent::RangeBreakdown);
            if volume.climax
                && matches!(prior_cycle, CycleType::Accumulation | CycleType::Unknown)
            {
                events.insert(WyckoffEvent::Spring);
            }
        }

        if self.is_near(structure.range_low, close) && volume.dry_up {
            events.insert(WyckoffEvent::LastPointOfSupport);
        }
        if self.is_near(structure.range_high, close) && volume.dry_up {
            events.insert(WyckoffEvent::LastPointOfSupply);
        }

        if structure.in_range && !volume.climax && !volume.dry_up {
            events.insert(WyckoffEvent::SecondaryTest);
        }
        if structure.broke_above_range && !volume.climax {
            events.insert(WyckoffEvent::Upthrust);
        }
        if structure.broke_above_range && volume.dry_up {
            events.insert(WyckoffEvent::UpthrustAfterDistribution);
        }

        events
    }

    /// Anchor-scaled proximity: the band width follows the anchor's
    /// absolute price level, not the range width.
    fn is_near(&self, anchor: f64, value: f64) -> bool {
        if anchor.is_nan() || value.is_nan() {
            return false;
        }
        (anchor - value).abs() < anchor * self.retest_tolerance
    }

    fn lowest_low_up_to(&self, index: usize) -> f64 {
        self.lowest_low.get_or_compute(index, |i| {
            let candidate = self.series.bar(i).low;
            if i == 0 {
                return candidate;
            }
            let running = self.lowest_low_up_to(i - 1);
            if running.is_nan() || (!candidate.is_nan() && candidate < running) {
                candidate
            } else {
                running
            }
        })
    }

    fn highest_high_up_to(&self, index: usize) -> f64 {
        self.highest_high.get_or_compute(index, |i| {
            let candidate = self.series.bar(i).high;
            if i == 0 {
                return candidate;
            }
            let running = self.highest_high_up_to(i - 1);
            if running.is_nan() || (!candidate.is_nan() && candidate > running) {
                candidate
            } else {
                running
            }
        })
    }

    fn is_new_extreme_low(&self, index: usize) -> bool {
        let current = self.series.bar(index).low;
        if current.is_nan() {
            return false;
        }
        if index == 0 {
            return true;
        }
        let running = self.lowest_low_up_to(index - 1);
        running.is_nan() || current < running
    }

    fn is_new_extreme_high(&self, index: usize) -> bool {
        let current = self.series.bar(index).high;
        if current.is_nan() {
            return false;
        }
        if index == 0 {
            return true;
        }
        let running = self.highest_high_up_to(index - 1);
        running.is_nan() || current > running
    }
}
