//! GBPUSD around the June 2016 referendum.
//!
//! Demonstrates the core workflow:
//!   1. Describe one day's ATM / risk reversal / butterfly quotes
//!   2. Calibrate the surface and query a downside strike
//!   3. Print the delta→strike table and the strike-space grid
//!   4. Build a surface series over the referendum week
//!
//! Run with: `RUST_LOG=fxvolsurf=debug cargo run --example gbpusd_brexit`

use std::collections::BTreeMap;
use std::io;

use chrono::NaiveDate;
use fxvolsurf::{
    MarketObservationSet, RrBfPillar, SmileQuote, SurfaceView, Tenor, VolSurfaceEngine,
};
use tracing_subscriber::EnvFilter;

/// `(date, spot, [1W ATM, 1M ATM, 3M ATM])`. The one-week vol spikes as the
/// vote falls inside its expiry.
const WEEK: [(u32, f64, [f64; 3]); 4] = [
    (20, 1.4684, [0.380, 0.220, 0.160]),
    (21, 1.4701, [0.410, 0.225, 0.162]),
    (22, 1.4776, [0.455, 0.231, 0.165]),
    (23, 1.4877, [0.520, 0.240, 0.170]),
];

fn observation_set(
    date: NaiveDate,
    spot: f64,
    atm: [f64; 3],
) -> fxvolsurf::Result<MarketObservationSet> {
    let tenors = [Tenor::Weeks(1), Tenor::Months(1), Tenor::Months(3)];
    let domestic = [0.0040, 0.0045, 0.0065];
    let foreign = [0.0045, 0.0050, 0.0055];

    let mut builder = MarketObservationSet::builder("GBPUSD".parse()?, date, spot);
    for i in 0..3 {
        // Skew and wings scale with the ATM level.
        let rr25 = -0.24 * atm[i];
        let bf25 = 0.04 * atm[i];
        builder = builder
            .domestic_rate(tenors[i], domestic[i])
            .foreign_rate(tenors[i], foreign[i])
            .smile(
                tenors[i],
                SmileQuote::Strategies {
                    atm: atm[i],
                    pillars: vec![
                        RrBfPillar::new(0.25, rr25, bf25),
                        RrBfPillar::new(0.10, 1.9 * rr25, 3.3 * bf25),
                    ],
                },
            );
    }
    builder.build()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let engine = VolSurfaceEngine::with_defaults();

    // ---------------------------------------------------------------
    // 1–2. One day: calibrate and query
    // ---------------------------------------------------------------

    let (d, spot, atm) = WEEK[0];
    let date = NaiveDate::from_ymd_opt(2016, 6, d).ok_or("invalid date")?;
    let obs = observation_set(date, spot, atm)?;
    let surface = engine.build_surface(&obs)?;

    println!("GBPUSD {date}, spot {spot}");
    for smile in surface.smiles() {
        println!(
            "  {:>3}  forward {:.5}",
            smile.tenor(),
            smile.market().forward
        );
        for anchor in smile.anchors() {
            println!(
                "       {:>5}  x={:.4}  K={:.5}  vol={:.4}",
                anchor.label, anchor.call_delta, anchor.strike, anchor.vol
            );
        }
    }

    for tenor in [Tenor::Weeks(1), Tenor::Weeks(2), Tenor::Months(1)] {
        let vol = engine.query_vol(&surface, 1.4000, &tenor)?;
        println!("  vol(K=1.4000, {tenor}) = {:.4}", vol.0);
    }

    // ---------------------------------------------------------------
    // 3. Views
    // ---------------------------------------------------------------

    let views = engine.extract_surface(&surface);
    println!("\nDelta → strike");
    let table = &views.deltas_vs_strikes;
    for (label, row) in table.labels.iter().zip(&table.strikes) {
        let cells: Vec<String> = row.iter().map(|k| format!("{k:.5}")).collect();
        println!("  {label:>5}  {}", cells.join("  "));
    }

    println!("\nStrike-space grid");
    views.strike_space.write_csv(io::stdout().lock())?;

    let diagnostics = surface.diagnostics()?;
    println!("\nArbitrage-free: {}", diagnostics.is_free);

    // ---------------------------------------------------------------
    // 4. Series over the week
    // ---------------------------------------------------------------

    let mut sets = BTreeMap::new();
    for (d, spot, atm) in WEEK {
        let date = NaiveDate::from_ymd_opt(2016, 6, d).ok_or("invalid date")?;
        sets.insert(date, observation_set(date, spot, atm)?);
    }
    let series = engine.build_series(&sets, obs.pair(), SurfaceView::DeltaSpace)?;

    println!("\nDelta-space vol range per date");
    for (date, range) in &series.extremes().per_date {
        println!(
            "  {}  {:.4} – {:.4}",
            fxvolsurf::series::date_label(*date),
            range.min,
            range.max
        );
    }
    if let Some(overall) = series.extremes().overall {
        println!("  overall     {:.4} – {:.4}", overall.min, overall.max);
    }
    for (date, err) in series.failed() {
        println!("  {date}: {err}");
    }

    Ok(())
}
