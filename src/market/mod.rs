//! Market inputs: currency pairs, tenors, quotes, deposit curves and the
//! per-date observation set a surface is calibrated from.

pub mod frame;
pub mod observation;
pub mod pair;
pub mod quote;
pub mod rates;
pub mod tenor;

pub use frame::{MarketFrame, TickerSchema};
pub use observation::{MarketObservationSet, MarketObservationSetBuilder, TenorMarket};
pub use pair::CurrencyPair;
pub use quote::{DeltaVol, ForwardQuote, RrBfPillar, SmileQuote, StrikeVol};
pub use rates::RateCurve;
pub use tenor::Tenor;
