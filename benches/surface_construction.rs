use std::collections::BTreeMap;
use std::hint::black_box;

use chrono::{Days, NaiveDate};
use criterion::{Criterion, criterion_group, criterion_main};
use fxvolsurf::{
    MarketObservationSet, RrBfPillar, SmileQuote, SurfaceView, Tenor, VolSurfaceEngine,
};

/// Standard market tenors with a downward-sloping ATM term structure.
fn tenor_quotes() -> Vec<(Tenor, f64)> {
    vec![
        (Tenor::Weeks(1), 0.38),
        (Tenor::Weeks(2), 0.30),
        (Tenor::Months(1), 0.22),
        (Tenor::Months(2), 0.19),
        (Tenor::Months(3), 0.16),
        (Tenor::Months(6), 0.14),
        (Tenor::Years(1), 0.13),
    ]
}

/// Generate a GBPUSD-like observation set with `n_tenors` quoted tenors.
fn generate_observation_set(date: NaiveDate, spot: f64, n_tenors: usize) -> MarketObservationSet {
    let pair = "GBPUSD".parse().expect("valid pair");
    let mut builder = MarketObservationSet::builder(pair, date, spot);
    for (i, (tenor, atm)) in tenor_quotes().into_iter().take(n_tenors).enumerate() {
        let skew = atm / 4.0;
        builder = builder
            .domestic_rate(tenor, 0.0040 + 0.0004 * i as f64)
            .foreign_rate(tenor, 0.0045 + 0.0002 * i as f64)
            .smile(
                tenor,
                SmileQuote::Strategies {
                    atm,
                    pillars: vec![
                        RrBfPillar::new(0.25, -skew, atm / 25.0),
                        RrBfPillar::new(0.10, -1.9 * skew, atm / 8.0),
                    ],
                },
            );
    }
    builder.build().expect("benchmark quotes should be valid")
}

fn construction_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");
    let engine = VolSurfaceEngine::with_defaults();
    let date = NaiveDate::from_ymd_opt(2016, 6, 20).expect("valid date");

    let single = generate_observation_set(date, 1.4684, 1);
    group.bench_function("surface_1_tenor", |b| {
        b.iter(|| {
            engine
                .build_surface(black_box(&single))
                .expect("build should succeed")
        });
    });

    let full = generate_observation_set(date, 1.4684, 7);
    group.bench_function("surface_7_tenors", |b| {
        b.iter(|| {
            engine
                .build_surface(black_box(&full))
                .expect("build should succeed")
        });
    });

    group.finish();
}

fn series_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("series");
    group.sample_size(20);
    let engine = VolSurfaceEngine::with_defaults();
    let start = NaiveDate::from_ymd_opt(2016, 6, 1).expect("valid date");
    let sets: BTreeMap<NaiveDate, MarketObservationSet> = (0..30u64)
        .map(|i| {
            let date = start + Days::new(i);
            let spot = 1.42 + 0.002 * i as f64;
            (date, generate_observation_set(date, spot, 7))
        })
        .collect();
    let pair = "GBPUSD".parse().expect("valid pair");

    group.bench_function("series_30_dates", |b| {
        b.iter(|| {
            engine
                .build_series(black_box(&sets), &pair, SurfaceView::StrikeSpace)
                .expect("series should succeed")
        });
    });

    group.finish();
}

criterion_group!(benches, construction_benchmarks, series_benchmarks);
criterion_main!(benches);
