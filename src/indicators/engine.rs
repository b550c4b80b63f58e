// =============================================================================
// Indicator Engine — derives the full indicator set from one bar series
// =============================================================================
//
// Each indicator is computed by its own pure transform over the close prices
// and returns a column aligned with the input.  The columns are only zipped
// into per-bar records at the end, so no indicator depends on the order in
// which the others were computed.
//
// Input contract: non-empty, dates strictly ascending.  The engine validates
// but never repairs the series (no sorting, no deduplication).
// =============================================================================

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::bollinger::calculate_bollinger;
use super::macd::calculate_macd;
use super::rsi::{calculate_rsi, RsiReading};
use super::sma::rolling_mean;
use crate::error::{EngineError, Result};
use crate::types::{closes, Bar};

pub const MA_SHORT_WINDOW: usize = 20;
pub const MA_LONG_WINDOW: usize = 50;
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST_SPAN: usize = 12;
pub const MACD_SLOW_SPAN: usize = 26;
pub const MACD_SIGNAL_SPAN: usize = 9;
pub const BB_PERIOD: usize = 20;
pub const BB_NUM_STD: f64 = 2.0;

/// Derived values for a single bar.  `None` means "no value yet".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorRecord {
    pub date: NaiveDate,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub rsi: Option<RsiReading>,
    pub macd: f64,
    pub macd_signal: f64,
    pub bb_middle: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
}

/// Immutable result of [`IndicatorEngine::derive`]: one record per input bar,
/// in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IndicatorSet {
    records: Vec<IndicatorRecord>,
}

impl IndicatorSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[IndicatorRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&IndicatorRecord> {
        self.records.get(index)
    }

    pub fn last(&self) -> Option<&IndicatorRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndicatorRecord> {
        self.records.iter()
    }

    /// Extract one column, e.g. `set.column(|r| r.ma20)`.
    pub fn column<T>(&self, f: impl Fn(&IndicatorRecord) -> T) -> Vec<T> {
        self.records.iter().map(f).collect()
    }
}

impl<'a> IntoIterator for &'a IndicatorSet {
    type Item = &'a IndicatorRecord;
    type IntoIter = std::slice::Iter<'a, IndicatorRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Stateless indicator pipeline with fixed windows.
///
/// Every call recomputes over the whole series; separate calls share nothing
/// and may run on different threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorEngine;

impl IndicatorEngine {
    pub fn new() -> Self {
        Self
    }

    /// Derive every indicator for `series`.
    ///
    /// # Errors
    /// [`EngineError::InvalidInput`] when the series is empty or its dates are
    /// not strictly ascending.  Short series are not an error; the affected
    /// columns are simply absent.
    pub fn derive(&self, series: &[Bar]) -> Result<IndicatorSet> {
        validate_series(series)?;

        let close = closes(series);

        let ma20 = rolling_mean(&close, MA_SHORT_WINDOW);
        let ma50 = rolling_mean(&close, MA_LONG_WINDOW);
        let rsi = calculate_rsi(&close, RSI_PERIOD);
        let macd = calculate_macd(&close, MACD_FAST_SPAN, MACD_SLOW_SPAN, MACD_SIGNAL_SPAN);
        let bands = calculate_bollinger(&close, BB_PERIOD, BB_NUM_STD);

        let records: Vec<IndicatorRecord> = series
            .iter()
            .enumerate()
            .map(|(i, bar)| IndicatorRecord {
                date: bar.date,
                ma20: ma20[i],
                ma50: ma50[i],
                rsi: rsi[i],
                macd: macd.macd[i],
                macd_signal: macd.signal[i],
                bb_middle: bands.middle[i],
                bb_upper: bands.upper[i],
                bb_lower: bands.lower[i],
            })
            .collect();

        debug!(
            bars = records.len(),
            ma20_defined = ma20.iter().flatten().count(),
            ma50_defined = ma50.iter().flatten().count(),
            rsi_defined = rsi.iter().flatten().count(),
            "indicator set derived"
        );

        Ok(IndicatorSet { records })
    }
}

/// Check the engine's input contract: at least one bar, dates strictly
/// increasing.
pub fn validate_series(series: &[Bar]) -> Result<()> {
    if series.is_empty() {
        return Err(EngineError::empty_series());
    }

    for (i, pair) in series.windows(2).enumerate() {
        let (prev, cur) = (pair[0].date, pair[1].date);
        if cur == prev {
            return Err(EngineError::duplicate_timestamp(i + 1, cur));
        }
        if cur < prev {
            return Err(EngineError::out_of_order(i + 1, prev, cur));
        }
    }

    Ok(())
}
