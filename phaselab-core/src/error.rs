//! Construction-time validation errors.

use thiserror::Error;

/// Rejects invalid analysis parameters at construction, before any bar is
/// evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be >= {min}")]
    ParameterTooSmall { name: &'static str, min: usize },
    #[error("volume long window must be >= volume short window")]
    VolumeWindowOrder,
    #[error("{name} must be finite and >= 0")]
    InvalidThreshold { name: &'static str },
}

impl ConfigError {
    /// Checks a window or bar-count parameter against its minimum.
    pub(crate) fn check_min(
        name: &'static str,
        value: usize,
        min: usize,
    ) -> Result<(), ConfigError> {
        if value < min {
            return Err(ConfigError::ParameterTooSmall { name, min });
        }
        Ok(())
    }

    /// Checks a tolerance or ratio threshold: finite and non-negative.
    pub(crate) fn check_threshold(name: &'static str, value: f64) -> Result<(), ConfigError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidThreshold { name });
        }
        Ok(())
    }
}
