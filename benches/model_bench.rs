//! Model Benchmarks - Fit and Multi Pricing Performance
//!
//! Benchmarks the domain functions run once per bookmaker ladder
//! (the fit) and once per candidate pair (the multi interval).
//!
//! Run with: cargo bench --bench model_bench

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use sgm_scanner::domain::distribution::{DistributionFitter, normal_cdf, transform};
use sgm_scanner::domain::line::{LegId, LineLadder, LineRecord, MarketKind, Side};
use sgm_scanner::domain::margin::combine;
use sgm_scanner::usecases::multi_sweep::candidate_pairs;

/// A ten-level ladder with a 2.5% margin either side of normal(2, 12).
fn ladder() -> LineLadder {
    let handicaps = [-20.5, -15.5, -10.5, -6.5, -2.5, 0.0, 2.5, 6.5, 10.5, 15.5];
    LineLadder::from_records(handicaps.iter().flat_map(|&h| {
        let p = normal_cdf((transform(h) - 2.0) / 12.0);
        [
            LineRecord::new(h, Side::Home, 1.0 / (p + 0.025), MarketKind::Custom, Some(LegId::new(format!("H{h}"))))
                .unwrap(),
            LineRecord::new(h, Side::Away, 1.0 / (1.025 - p), MarketKind::Custom, Some(LegId::new(format!("A{h}"))))
                .unwrap(),
        ]
    }))
}

/// Benchmark the full distribution fit on one ladder.
fn bench_fit(c: &mut Criterion) {
    let ladder = ladder();
    let fitter = DistributionFitter::default();

    c.bench_function("fit_ten_levels", |b| {
        b.iter(|| {
            let _model = fitter.fit(black_box(&ladder));
        });
    });
}

/// Benchmark the theoretical interval for one pair.
fn bench_combine(c: &mut Criterion) {
    c.bench_function("combine_two_legs", |b| {
        b.iter(|| {
            let _quote = combine(
                black_box(1.25),
                black_box(3.6),
                black_box(1.4),
                black_box(2.75),
            );
        });
    });
}

/// Benchmark candidate pair enumeration.
fn bench_candidate_pairs(c: &mut Criterion) {
    let ladder = ladder();

    c.bench_function("candidate_pairs_ten_levels", |b| {
        b.iter(|| {
            let _pairs = candidate_pairs(black_box(&ladder), black_box(1.0));
        });
    });
}

criterion_group!(benches, bench_fit, bench_combine, bench_candidate_pairs);
criterion_main!(benches);
