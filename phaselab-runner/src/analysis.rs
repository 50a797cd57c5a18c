//! Multi-degree analysis orchestration.

use phaselab_core::domain::BarSeries;
use phaselab_core::indicators::Indicator;
use phaselab_core::wyckoff::{CycleType, WyckoffPhaseIndicator};
use phaselab_core::ConfigError;
use thiserror::Error;

use crate::config::DegreeConfig;
use crate::result::{CycleAnalysisResult, CycleSnapshot, DegreeAnalysis, PhaseTransition};

/// Picks the series a given degree analyzes (resampling, truncation, or
/// identity). Returning `None` skips the degree.
pub type SeriesSelector = Box<dyn Fn(&BarSeries, i32) -> Option<BarSeries>>;

/// Derives a degree's configuration from the base one. Returning `None`
/// skips the degree.
pub type ConfigProvider = Box<dyn Fn(&BarSeries, i32, &DegreeConfig) -> Option<DegreeConfig>>;

/// Runs one degree's pipeline. Returning `None` skips the degree.
pub type AnalysisRunner = Box<dyn Fn(&BarSeries, &DegreeConfig) -> Option<CycleSnapshot>>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("series cannot be empty")]
    EmptySeries,
    #[error("analysis for base degree offset {0} was not produced")]
    MissingBaseAnalysis(i32),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Orchestrates the phase pipeline across structural degrees.
///
/// Degrees run highest offset first, then the base (offset 0), then the
/// lower offsets. A degree whose selector, config provider, or runner
/// declines is skipped with a note; a missing base analysis fails the
/// whole run.
pub struct CycleAnalysis {
    base_degree_offset: i32,
    higher_degrees: u32,
    lower_degrees: u32,
    base_config: DegreeConfig,
    series_selector: SeriesSelector,
    config_provider: ConfigProvider,
    analysis_runner: AnalysisRunner,
}

impl CycleAnalysis {
    pub fn builder() -> CycleAnalysisBuilder {
        CycleAnalysisBuilder::default()
    }

    pub fn analyze(&self, series: &BarSeries) -> Result<CycleAnalysisResult, AnalysisError> {
        if series.is_empty() {
            return Err(AnalysisError::EmptySeries);
        }

        let mut analyses = Vec::new();
        let mut notes = Vec::new();
        for offset in self.degree_offsets() {
            let selected = (self.series_selector)(series, offset);
            let Some(selected) = selected.filter(|series| !series.is_empty()) else {
                notes.push(format!(
                    "skipped degree offset {offset}: selected series was empty"
                ));
                continue;
            };
            let Some(config) = (self.config_provider)(&selected, offset, &self.base_config)
            else {
                notes.push(format!(
                    "skipped degree offset {offset}: no configuration provided"
                ));
                continue;
            };
            let Some(snapshot) = (self.analysis_runner)(&selected, &config) else {
                notes.push(format!(
                    "skipped degree offset {offset}: analysis produced no snapshot"
                ));
                continue;
            };
            analyses.push(DegreeAnalysis {
                degree_offset: offset,
                bar_count: selected.bar_count(),
                config,
                snapshot,
            });
        }

        if !analyses
            .iter()
            .any(|analysis| analysis.degree_offset == self.base_degree_offset)
        {
            return Err(AnalysisError::MissingBaseAnalysis(self.base_degree_offset));
        }

        Ok(CycleAnalysisResult {
            base_degree_offset: self.base_degree_offset,
            analyses,
            notes,
        })
    }

    /// Highest first, base in the middle, lowest last.
    fn degree_offsets(&self) -> Vec<i32> {
        let mut offsets = Vec::with_capacity((self.higher_degrees + 1 + self.lower_degrees) as usize);
        for offset in (1..=self.higher_degrees as i32).rev() {
            offsets.push(offset);
        }
        offsets.push(self.base_degree_offset);
        for offset in 1..=self.lower_degrees as i32 {
            offsets.push(-offset);
        }
        offsets
    }
}

/// Built-in runner: evaluates the full phase pipeline over the series and
/// condenses it into a [`CycleSnapshot`]. Returns `None` when the
/// configuration is rejected or the series is empty.
pub fn run_degree_analysis(series: &BarSeries, config: &DegreeConfig) -> Option<CycleSnapshot> {
    let end_index = series.end_index()?;
    let indicator = WyckoffPhaseIndicator::builder(series)
        .swing_bars(
            config.preceding_swing_bars,
            config.following_swing_bars,
            config.allowed_equal_bars,
        )
        .volume_windows(config.volume_short_window, config.volume_long_window)
        .tolerances(config.breakout_tolerance, config.retest_tolerance)
        .volume_thresholds(config.climax_threshold, config.dry_up_threshold)
        .build()
        .ok()?;

    let unstable_bars = indicator.unstable_bars();
    let start_index = series.begin_index() + unstable_bars;
    let mut transitions = Vec::new();
    if start_index <= end_index {
        for index in start_index..=end_index {
            let phase = indicator.value(index);
            if phase.cycle == CycleType::Unknown {
                continue;
            }
            if indicator.last_phase_transition_index(index) != Some(index) {
                continue;
            }
            transitions.push(PhaseTransition {
                index,
                phase,
                range_low: indicator.trading_range_low(index),
                range_high: indicator.trading_range_high(index),
            });
        }
    }

    Some(CycleSnapshot {
        start_index,
        end_index,
        unstable_bars,
        final_phase: indicator.value(end_index),
        range_low: indicator.trading_range_low(end_index),
        range_high: indicator.trading_range_high(end_index),
        last_transition_index: indicator.last_phase_transition_index(end_index),
        transitions,
    })
}

/// Builder for [`CycleAnalysis`]. Defaults: one degree on each side of
/// the base, identity series selection, linear config scaling, and the
/// built-in pipeline runner.
pub struct CycleAnalysisBuilder {
    higher_degrees: u32,
    lower_degrees: u32,
    base_config: DegreeConfig,
    series_selector: Option<SeriesSelector>,
    config_provider: Option<ConfigProvider>,
    analysis_runner: Option<AnalysisRunner>,
}

impl Default for CycleAnalysisBuilder {
    fn default() -> Self {
        Self {
            higher_degrees: 1,
            lower_degrees: 1,
            base_config: DegreeConfig::default(),
            series_selector: None,
            config_provider: None,
            analysis_runner: None,
        }
    }
}

impl CycleAnalysisBuilder {
    pub fn higher_degrees(mut self, degrees: u32) -> Self {
        self.higher_degrees = degrees;
        self
    }

    pub fn lower_degrees(mut self, degrees: u32) -> Self {
        self.lower_degrees = degrees;
        self
    }

    pub fn base_config(mut self, config: DegreeConfig) -> Self {
        self.base_config = config;
        self
    }

    pub fn series_selector<F>(mut self, selector: F) -> Self
    where
        F: Fn(&BarSeries, i32) -> Option<BarSeries> + 'static,
    {
        self.series_selector = Some(Box::new(selector));
        self
    }

    pub fn config_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn(&BarSeries, i32, &DegreeConfig) -> Option<DegreeConfig> + 'static,
    {
        self.config_provider = Some(Box::new(provider));
        self
    }

    pub fn analysis_runner<F>(mut self, runner: F) -> Self
    where
        F: Fn(&BarSeries, &DegreeConfig) -> Option<CycleSnapshot> + 'static,
    {
        self.analysis_runner = Some(Box::new(runner));
        self
    }

    pub fn build(self) -> Result<CycleAnalysis, AnalysisError> {
        self.base_config.validate()?;
        Ok(CycleAnalysis {
            base_degree_offset: 0,
            higher_degrees: self.higher_degrees,
            lower_degrees: self.lower_degrees,
            base_config: self.base_config,
            series_selector: self
                .series_selector
                .unwrap_or_else(|| Box::new(|series, _| Some(series.clone()))),
            config_provider: self
                .config_provider
                .unwrap_or_else(|| Box::new(|_, offset, base| Some(base.scaled(offset)))),
            analysis_runner: self
                .analysis_runner
                .unwrap_or_else(|| Box::new(|series, config| run_degree_analysis(series, config))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_run_highest_to_lowest() {
        let analysis = CycleAnalysis::builder()
            .higher_degrees(2)
            .lower_degrees(2)
            .build()
            .unwrap();
        assert_eq!(analysis.degree_offsets(), vec![2, 1, 0, -1, -2]);

        let base_only = CycleAnalysis::builder()
            .higher_degrees(0)
            .lower_degrees(0)
            .build()
            .unwrap();
        assert_eq!(base_only.degree_offsets(), vec![0]);
    }

    #[test]
    fn invalid_base_config_fails_at_build() {
        let config = DegreeConfig {
            volume_short_window: 0,
            ..DegreeConfig::default()
        };
        assert!(CycleAnalysis::builder().base_config(config).build().is_err());
    }
}
