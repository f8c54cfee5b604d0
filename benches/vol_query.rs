use std::hint::black_box;

use chrono::NaiveDate;
use criterion::{Criterion, criterion_group, criterion_main};
use fxvolsurf::{
    MarketObservationSet, RrBfPillar, SmileQuote, Tenor, VolSurface, VolSurfaceEngine,
};

fn benchmark_surface() -> VolSurface {
    let quotes = [
        (Tenor::Weeks(1), 0.38, -0.09, 0.015, -0.17, 0.05),
        (Tenor::Months(1), 0.22, -0.055, 0.009, -0.105, 0.03),
        (Tenor::Months(3), 0.16, -0.04, 0.006, -0.075, 0.02),
    ];
    let mut builder = MarketObservationSet::builder(
        "GBPUSD".parse().expect("valid pair"),
        NaiveDate::from_ymd_opt(2016, 6, 20).expect("valid date"),
        1.4684,
    );
    for (tenor, atm, rr25, bf25, rr10, bf10) in quotes {
        builder = builder
            .domestic_rate(tenor, 0.0045)
            .foreign_rate(tenor, 0.0050)
            .smile(
                tenor,
                SmileQuote::Strategies {
                    atm,
                    pillars: vec![
                        RrBfPillar::new(0.25, rr25, bf25),
                        RrBfPillar::new(0.10, rr10, bf10),
                    ],
                },
            );
    }
    let obs = builder.build().expect("benchmark quotes should be valid");
    VolSurfaceEngine::with_defaults()
        .build_surface(&obs)
        .expect("benchmark surface should build")
}

fn vol_query_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("vol_query");
    let engine = VolSurfaceEngine::with_defaults();
    let surface = benchmark_surface();
    let (w1, w2) = (Tenor::Weeks(1), Tenor::Weeks(2));

    group.bench_function("strike_quoted_tenor", |b| {
        b.iter(|| {
            engine
                .query_vol(&surface, black_box(1.40), &w1)
                .expect("query should succeed")
        });
    });

    group.bench_function("strike_interpolated_tenor", |b| {
        b.iter(|| {
            engine
                .query_vol(&surface, black_box(1.40), &w2)
                .expect("query should succeed")
        });
    });

    group.bench_function("delta_interpolated_tenor", |b| {
        b.iter(|| {
            engine
                .query_vol_at_delta(&surface, black_box(0.25), &w2)
                .expect("query should succeed")
        });
    });

    group.bench_function("strike_sweep_41", |b| {
        b.iter(|| {
            (0..41)
                .map(|i| 1.38 + 0.0045 * f64::from(i))
                .filter_map(|k| surface.vol_at_strike(black_box(k), &w2).ok())
                .count()
        });
    });

    group.bench_function("diagnostics", |b| {
        b.iter(|| {
            surface
                .diagnostics()
                .expect("diagnostics should succeed")
        });
    });

    group.finish();
}

criterion_group!(benches, vol_query_benchmarks);
criterion_main!(benches);
