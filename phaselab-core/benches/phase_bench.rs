//! Criterion benchmarks for phaselab hot paths.
//!
//! Benchmarks:
//! 1. Cache backfill — one cold query at the series end (worst-case gap)
//! 2. Warm repeat access after the backfill
//! 3. Full phase pipeline over the whole series

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use phaselab_core::domain::{Bar, BarSeries};
use phaselab_core::indicators::{ClosePrice, Indicator, Sma};
use phaselab_core::wyckoff::WyckoffPhaseIndicator;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(n: usize) -> BarSeries {
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let bars = (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            let volume = 1_000.0 + if i % 37 == 0 { 4_000.0 } else { 0.0 };
            Bar::new(
                base_date + chrono::Duration::days(i as i64),
                close - 0.3,
                close + 1.5,
                close - 1.5,
                close,
                volume,
            )
        })
        .collect();
    BarSeries::from_bars(bars)
}

fn make_indicator(series: &BarSeries) -> WyckoffPhaseIndicator<'_> {
    WyckoffPhaseIndicator::builder(series)
        .swing_bars(3, 3, 1)
        .volume_windows(5, 20)
        .build()
        .unwrap()
}

// ── 1 & 2. Cache backfill and warm access ────────────────────────────

fn bench_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("sma_cache");
    for &n in &[1_000usize, 10_000] {
        let series = make_series(n);
        let end = series.end_index().unwrap();

        group.bench_with_input(BenchmarkId::new("cold_backfill", n), &series, |b, series| {
            b.iter(|| {
                let sma = Sma::new(ClosePrice::new(series), 20).unwrap();
                black_box(sma.value(end))
            });
        });

        let warm = Sma::new(ClosePrice::new(&series), 20).unwrap();
        warm.value(end);
        group.bench_with_input(BenchmarkId::new("warm_access", n), &warm, |b, warm| {
            b.iter(|| black_box(warm.value(end)));
        });
    }
    group.finish();
}

// ── 3. Full phase pipeline ───────────────────────────────────────────

fn bench_phase_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("wyckoff_phase");
    for &n in &[500usize, 2_000] {
        let series = make_series(n);
        let end = series.end_index().unwrap();

        group.bench_with_input(BenchmarkId::new("full_series", n), &series, |b, series| {
            b.iter(|| {
                let wyckoff = make_indicator(series);
                black_box(wyckoff.value(end))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cache, bench_phase_pipeline);
criterion_main!(benches);
