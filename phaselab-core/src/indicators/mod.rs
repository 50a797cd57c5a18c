//! Indicator contract, memoization, and the built-in indicators.

pub mod cache;
pub mod helpers;
pub mod sma;
pub mod swing;

pub use cache::SlotCache;
pub use helpers::{ClosePrice, HighPrice, LowPrice, Volume};
pub use sma::Sma;
pub use swing::{RecentSwing, SwingDirection};

use crate::domain::BarSeries;

/// Per-index derived value over a [`BarSeries`].
///
/// Implementations are deterministic in `index`: `value(i)` may depend on
/// bars `0..=i` and on other indicators at `<= i`, never on later bars.
/// Querying an index past the series end is a contract violation and
/// panics; a NaN output at a valid index is an ordinary value (warm-up or
/// void input), not an error.
pub trait Indicator {
    type Output: Clone;

    /// Series this indicator draws from.
    fn series(&self) -> &BarSeries;

    /// Value at `index`.
    fn value(&self, index: usize) -> Self::Output;

    /// Number of leading indices whose values are not yet meaningful.
    fn unstable_bars(&self) -> usize {
        0
    }
}
