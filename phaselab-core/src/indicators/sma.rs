//! Simple Moving Average (SMA).
//!
//! Rolling mean of any f64 indicator over a fixed window. NaN before
//! warm-up (fewer than `window` bars available) and whenever any input in
//! the window is NaN.

use crate::domain::BarSeries;
use crate::error::ConfigError;
use crate::indicators::{Indicator, SlotCache};

#[derive(Debug)]
pub struct Sma<I> {
    inner: I,
    window: usize,
    cache: SlotCache<f64>,
}

impl<I: Indicator<Output = f64>> Sma<I> {
    pub fn new(inner: I, window: usize) -> Result<Self, ConfigError> {
        ConfigError::check_min("sma window", window, 1)?;
        Ok(Self {
            inner,
            window,
            cache: SlotCache::new(),
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl<I: Indicator<Output = f64>> Indicator for Sma<I> {
    type Output = f64;

    fn series(&self) -> &BarSeries {
        self.inner.series()
    }

    fn value(&self, index: usize) -> f64 {
        self.cache.get_or_compute(index, |i| {
            if i + 1 < self.window {
                return f64::NAN;
            }
            let mut sum = 0.0;
            for j in (i + 1 - self.window)..=i {
                let input = self.inner.value(j);
                if input.is_nan() {
                    return f64::NAN;
                }
                sum += input;
            }
            sum / self.window as f64
        })
    }

    fn unstable_bars(&self) -> usize {
        self.window - 1
    }
}
