//! Per-degree pipeline configuration.

use phaselab_core::ConfigError;
use serde::{Deserialize, Serialize};

/// Full parameter set for one degree of analysis.
///
/// `validate` applies the same rules the core indicator enforces at
/// construction, so an invalid config fails before any series is touched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DegreeConfig {
    pub preceding_swing_bars: usize,
    pub following_swing_bars: usize,
    pub allowed_equal_bars: usize,
    pub volume_short_window: usize,
    pub volume_long_window: usize,
    pub breakout_tolerance: f64,
    pub retest_tolerance: f64,
    pub climax_threshold: f64,
    pub dry_up_threshold: f64,
}

impl Default for DegreeConfig {
    fn default() -> Self {
        Self {
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
}

impl DegreeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preceding_swing_bars < 1 {
            return Err(ConfigError::ParameterTooSmall {
                name: "preceding swing bars",
                min: 1,
            });
        }
        if self.volume_short_window < 1 {
            return Err(ConfigError::ParameterTooSmall {
                name: "volume short window",
                min: 1,
            });
        }
        if self.volume_long_window < self.volume_short_window {
            return Err(ConfigError::VolumeWindowOrder);
        }
        for (name, value) in [
            ("breakout tolerance", self.breakout_tolerance),
            ("retest tolerance", self.retest_tolerance),
            ("climax threshold", self.climax_threshold),
            ("dry-up threshold", self.dry_up_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { name });
            }
        }
        Ok(())
    }

    /// Linear parameter scaling for a degree offset: positive offsets look
    /// for wider structure (more swing bars, longer volume windows),
    /// negative ones for tighter structure, each dimension clamped to its
    /// minimum. Tolerances and thresholds carry over unchanged.
    pub fn scaled(&self, degree_offset: i32) -> DegreeConfig {
        if degree_offset == 0 {
            return *self;
        }
        let offset = degree_offset as i64;
        let preceding = (self.preceding_swing_bars as i64 + offset).max(1) as usize;
        let following = (self.following_swing_bars as i64 + offset).max(0) as usize;
        let short = (self.volume_short_window as i64 + offset).max(1) as usize;
        let long = (self.volume_long_window as i64 + 2 * offset).max(short as i64) as usize;
        DegreeConfig {
            preceding_swing_bars: preceding,
            following_swing_bars: following,
            volume_short_window: short,
            volume_long_window: long,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(DegreeConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_volume_windows() {
        let config = DegreeConfig {
            volume_short_window: 10,
            volume_long_window: 5,
            ..DegreeConfig::default()
        };
        assert_eq!(config.validate().err(), Some(ConfigError::VolumeWindowOrder));
    }

    #[test]
    fn validate_rejects_non_finite_thresholds() {
        let config = DegreeConfig {
            climax_threshold: f64::INFINITY,
            ..DegreeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn scaling_up_widens_every_dimension() {
        let scaled = DegreeConfig::default().scaled(1);
        assert_eq!(scaled.preceding_swing_bars, 4);
        assert_eq!(scaled.following_swing_bars, 4);
        assert_eq!(scaled.volume_short_window, 6);
        assert_eq!(scaled.volume_long_window, 22);
        assert_eq!(scaled.breakout_tolerance, 0.02);
    }

    #[test]
    fn scaling_down_tightens_with_clamps() {
        let scaled = DegreeConfig::default().scaled(-1);
        assert_eq!(scaled.preceding_swing_bars, 2);
        assert_eq!(scaled.following_swing_bars, 2);
        assert_eq!(scaled.volume_short_window, 4);
        assert_eq!(scaled.volume_long_window, 18);

        let floor = DegreeConfig::default().scaled(-5);
        assert_eq!(floor.preceding_swing_bars, 1);
        assert_eq!(floor.following_swing_bars, 0);
        assert_eq!(floor.volume_short_window, 1);
        assert_eq!(floor.volume_long_window, 10);
        assert!(floor.validate().is_ok());
    }

    #[test]
    fn zero_offset_is_identity() {
        let base = DegreeConfig::default();
        assert_eq!(base.scaled(0), base);
    }

    #[test]
    fn scaled_configs_stay_valid() {
        let base = DegreeConfig::default();
        for offset in -10..=10 {
            assert!(base.scaled(offset).validate().is_ok(), "offset {offset}");
        }
    }
}
