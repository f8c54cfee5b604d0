//! # fxvolsurf
//!
//! FX implied-volatility surface construction from market quotes.
//!
//! Takes a per-date snapshot of spot, forwards, deposit rates and vol quotes
//! (ATM, risk reversals and butterflies, or raw delta/strike quotes) for a
//! currency pair, calibrates one smile per quoted tenor, and answers point
//! queries at any strike and tenor plus dense strike-space and delta-space
//! views. Batches of dates calibrate in parallel.
//!
//! ## Architecture
//!
//! - **`market`** — Currency pairs, tenors, quotes, deposit curves, observation sets, CSV frames
//! - **`smile`** — Per-tenor smile: natural cubic spline of vol in forward call delta
//! - **`surface`** — Multi-tenor surface, total-variance interpolation, views, diagnostics
//! - **`series`** — Surfaces over a date range with per-date failure isolation
//! - **`engine`** — [`VolSurfaceEngine`] facade tying the above to an [`EngineConfig`]
//!
//! ## Design
//!
//! - **Newtypes for outputs, bare `f64` for inputs.** [`Vol`], [`Variance`],
//!   [`Strike`] and [`Delta`] wrap return values to prevent accidental mixing.
//! - **No panics.** Every fallible operation returns [`Result`]. Library code
//!   never calls `unwrap()` or `expect()`.
//! - **Immutable surfaces.** A [`VolSurface`] is built once from one
//!   [`MarketObservationSet`] and never modified.
//! - **No singletons.** Configuration is owned by the engine and passed
//!   explicitly; the library never installs a tracing subscriber.
//!
//! ## Features
//!
//! - `parallel` (default) — calibrate series dates on a rayon pool
//! - `logging` (default) — `tracing` events for surface and series builds

pub mod config;
pub mod conventions;
pub mod engine;
pub mod error;
pub mod market;
mod math;
pub mod series;
pub mod smile;
pub mod surface;
pub mod types;
mod validate;

#[doc(inline)]
pub use config::{EngineConfig, FailurePolicy};
#[doc(inline)]
pub use engine::VolSurfaceEngine;
#[doc(inline)]
pub use error::{Result, VolSurfError};
#[doc(inline)]
pub use market::{
    CurrencyPair, DeltaVol, ForwardQuote, MarketFrame, MarketObservationSet, RrBfPillar,
    SmileQuote, StrikeVol, Tenor, TickerSchema,
};
#[doc(inline)]
pub use series::{DateOutcome, SeriesExtremes, SurfaceSeries, VolRange};
#[doc(inline)]
pub use smile::{FxSmile, SmileSection};
#[doc(inline)]
pub use surface::{SurfaceView, SurfaceViews, VolGrid, VolSurface};
#[doc(inline)]
pub use types::{Delta, OptionType, Strike, Variance, Vol};
