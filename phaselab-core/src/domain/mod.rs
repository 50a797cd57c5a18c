//! Market data domain types.

pub mod bar;
pub mod series;

pub use bar::Bar;
pub use series::BarSeries;
