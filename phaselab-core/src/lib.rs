//! phaselab-core: incremental indicator evaluation over OHLCV bar series
//! plus Wyckoff market-phase inference.
//!
//! The crate is organized in three layers:
//! - `domain`: the [`Bar`](domain::Bar) and append-only
//!   [`BarSeries`](domain::BarSeries) every indicator reads from.
//! - `indicators`: the [`Indicator`](indicators::Indicator) contract, the
//!   memoizing [`SlotCache`](indicators::SlotCache), price/volume
//!   extractors, the SMA, and fractal swing detection.
//! - `wyckoff`: structural range tracking, volume regime classification,
//!   event detection, and the phase state machine that ties them together.

pub mod domain;
pub mod error;
pub mod indicators;
pub mod wyckoff;

pub use error::ConfigError;
