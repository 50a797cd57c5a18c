//! Volume regime classification.

use crate::domain::BarSeries;
use crate::error::ConfigError;
use crate::indicators::{Indicator, Sma, Volume};

/// Volume view of the market at one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeSnapshot {
    pub volume: f64,
    /// Short volume average over long volume average; NaN until both
    /// windows are warm (or when the long average is zero).
    pub relative_volume: f64,
    /// Relative volume strictly above the climax threshold.
    pub climax: bool,
    /// Relative volume strictly below the dry-up threshold.
    pub dry_up: bool,
}

/// Classifies each bar's volume as climactic, drying up, or neutral by
/// comparing a short volume SMA against a long one. Both flags are false
/// while the ratio is undefined.
#[derive(Debug)]
pub struct VolumeProfile<'a> {
    series: &'a BarSeries,
    short_average: Sma<Volume<'a>>,
    long_average: Sma<Volume<'a>>,
    climax_threshold: f64,
    dry_up_threshold: f64,
}

impl<'a> VolumeProfile<'a> {
    pub fn new(
        series: &'a BarSeries,
        short_window: usize,
        long_window: usize,
        climax_threshold: f64,
        dry_up_threshold: f64,
    ) -> Result<Self, ConfigError> {
        ConfigError::check_min("volume short window", short_window, 1)?;
        if long_window < short_window {
            return Err(ConfigError::VolumeWindowOrder);
        }
        ConfigError::check_threshold("climax threshold", climax_threshold)?;
        ConfigError::check_threshold("dry-up threshold", dry_up_threshold)?;
        Ok(Self {
            series,
            short_average: Sma::new(Volume::new(series), short_window)?,
            long_average: Sma::new(Volume::new(series), long_window)?,
            climax_threshold,
            dry_up_threshold,
        })
    }

    pub fn snapshot(&self, index: usize) -> VolumeSnapshot {
        let volume = self.series.bar(index).volume;
        let short = self.short_average.value(index);
        let long = self.long_average.value(index);
        let relative_volume = if short.is_nan() || long.is_nan() || long == 0.0 {
            f64::NAN
        } else {
            short / long
        };
        VolumeSnapshot {
            volume,
            relative_volume,
            climax: !relative_volume.is_nan() && relative_volume > self.climax_threshold,
            dry_up: !relative_volume.is_nan() && relative_volume < self.dry_up_threshold,
        }
    }

    /// Bars needed before the long average (and thus the ratio) is warm.
    pub fn unstable_bars(&self) -> usize {
        self.long_average.unstable_bars()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::testutil::{assert_approx, make_ohlcv};

    fn series_with_volumes(volumes: &[f64]) -> BarSeries {
        let rows: Vec<_> = volumes.iter().map(|&v| (10.0, 11.0, 9.0, 10.0, v)).collect();
        make_ohlcv(&rows)
    }

    #[test]
    fn rejects_inverted_windows() {
        let series = series_with_volumes(&[1.0, 2.0]);
        let result = VolumeProfile::new(&series, 5, 3, 1.6, 0.7);
        assert_eq!(result.err(), Some(ConfigError::VolumeWindowOrder));
    }

    #[test]
    fn undefined_ratio_sets_neither_flag() {
        let series = series_with_volumes(&[1_000.0, 1_000.0, 1_000.0]);
        let profile = VolumeProfile::new(&series, 1, 3, 1.6, 0.7).unwrap();

        let warming = profile.snapshot(1);
        assert!(warming.relative_volume.is_nan());
        assert!(!warming.climax);
        assert!(!warming.dry_up);
        assert_eq!(profile.unstable_bars(), 2);
    }

    #[test]
    fn classifies_climax_and_dry_up() {
        let series = series_with_volumes(&[1_000.0, 1_000.0, 1_000.0, 5_000.0, 200.0]);
        let profile = VolumeProfile::new(&series, 1, 4, 1.6, 0.7).unwrap();

        let burst = profile.snapshot(3);
        assert_approx(burst.relative_volume, 5_000.0 / 2_000.0);
        assert!(burst.climax);
        assert!(!burst.dry_up);

        let quiet = profile.snapshot(4);
        assert!(quiet.dry_up);
        assert!(!quiet.climax);
    }

    #[test]
    fn zero_long_average_is_undefined() {
        let series = series_with_volumes(&[0.0, 0.0]);
        let profile = VolumeProfile::new(&series, 1, 2, 1.6, 0.7).unwrap();
        assert!(profile.snapshot(1).relative_volume.is_nan());
    }
}
