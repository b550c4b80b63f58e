// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free transforms over a close-price series.  Every function
// returns a vector aligned index-for-index with its input; positions without a
// value are `None` rather than a numeric sentinel.  `engine` composes them into
// the per-bar `IndicatorSet` consumed by the report layer.

pub mod bollinger;
pub mod ema;
pub mod engine;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use engine::{IndicatorEngine, IndicatorRecord, IndicatorSet};
pub use rsi::{RsiReading, RsiZone};
