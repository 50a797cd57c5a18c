//! Trivial per-bar field extractors.
//!
//! These satisfy the [`Indicator`] contract without caching: reading a bar
//! field is already O(1).

use crate::domain::BarSeries;
use crate::indicators::Indicator;

macro_rules! field_indicator {
    ($(#[$doc:meta])* $name:ident, $field:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name<'a> {
            series: &'a BarSeries,
        }

        impl<'a> $name<'a> {
            pub fn new(series: &'a BarSeries) -> Self {
                Self { series }
            }
        }

        impl Indicator for $name<'_> {
            type Output = f64;

            fn series(&self) -> &BarSeries {
                self.series
            }

            fn value(&self, index: usize) -> f64 {
                self.series.bar(index).$field
            }
        }
    };
}

field_indicator!(
    /// Close price at each index.
    ClosePrice,
    close
);
field_indicator!(
    /// High price at each index.
    HighPrice,
    high
);
field_indicator!(
    /// Low price at each index.
    LowPrice,
    low
);
field_indicator!(
    /// Traded volume at each index.
    Volume,
    volume
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::testutil::make_ohlcv;

    #[test]
    fn extractors_read_their_field() {
        let series = make_ohlcv(&[(10.0, 12.0, 9.0, 11.0, 500.0)]);
        assert_eq!(ClosePrice::new(&series).value(0), 11.0);
        assert_eq!(HighPrice::new(&series).value(0), 12.0);
        assert_eq!(LowPrice::new(&series).value(0), 9.0);
        assert_eq!(Volume::new(&series).value(0), 500.0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn extractor_panics_past_series_end() {
        let series = make_ohlcv(&[(10.0, 12.0, 9.0, 11.0, 500.0)]);
        ClosePrice::new(&series).value(1);
    }
}
