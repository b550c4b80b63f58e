// =============================================================================
// Analysis Report — presentation payloads for the dashboard
// =============================================================================
//
// Everything here is read-only consumption of a bar series and its
// `IndicatorSet`.  Chart panels carry full-precision values; only the
// recent-data table is rounded, and only after every indicator has been
// computed.
// =============================================================================

use chrono::NaiveDate;
use serde::Serialize;

use crate::indicators::rsi::{OVERBOUGHT_LEVEL, OVERSOLD_LEVEL};
use crate::indicators::{IndicatorSet, RsiReading, RsiZone};
use crate::market_data::SymbolInfoDisplay;
use crate::types::{Bar, Period};

/// Largest decimal count `round_to` honours; f64 carries ~15-17 significant
/// digits and `10^decimals` overflows to infinity past ~308.
pub const MAX_DISPLAY_DECIMALS: u32 = 15;

/// Round `value` to `decimals` places (capped at [`MAX_DISPLAY_DECIMALS`]).
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(MAX_DISPLAY_DECIMALS) as i32);
    (value * factor).round() / factor
}

// =============================================================================
// Summary metrics
// =============================================================================

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSummary {
    pub current_price: f64,
    /// Last close minus the previous close; absent with a single bar.
    pub daily_change: Option<f64>,
    pub daily_change_pct: Option<f64>,
    pub as_of: NaiveDate,
}

impl PriceSummary {
    /// `None` for an empty series.
    pub fn from_bars(bars: &[Bar]) -> Option<Self> {
        let last = bars.last()?;
        let prev = bars.len().checked_sub(2).map(|i| &bars[i]);

        let daily_change = prev.map(|p| last.close - p.close);
        let daily_change_pct = prev
            .filter(|p| p.close != 0.0)
            .map(|p| (last.close - p.close) / p.close * 100.0);

        Some(Self {
            current_price: last.close,
            daily_change,
            daily_change_pct,
            as_of: last.date,
        })
    }
}

// =============================================================================
// Chart panels
// =============================================================================

/// Candles with MA20 / MA50 and Bollinger envelope overlays.
#[derive(Debug, Clone, Serialize)]
pub struct PriceChart {
    pub dates: Vec<NaiveDate>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub ma20: Vec<Option<f64>>,
    pub ma50: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
}

/// RSI line with its reference levels.
#[derive(Debug, Clone, Serialize)]
pub struct RsiPanel {
    pub dates: Vec<NaiveDate>,
    pub rsi: Vec<Option<RsiReading>>,
    pub overbought: f64,
    pub oversold: f64,
    /// Zone of the latest numeric reading.
    pub current_zone: Option<RsiZone>,
}

/// MACD, signal and histogram bars.
#[derive(Debug, Clone, Serialize)]
pub struct MacdPanel {
    pub dates: Vec<NaiveDate>,
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
    /// `histogram >= 0` per bar (drawn green, otherwise red).
    pub histogram_positive: Vec<bool>,
}

// =============================================================================
// Recent-data table
// =============================================================================

/// One display row of the recent-data table, already rounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub rsi: Option<RsiReading>,
}

/// The last `rows` bars joined with their indicators, rounded to `decimals`.
///
/// Bars and records are aligned from the end; a shorter `set` only shortens
/// the table.
pub fn recent_rows(bars: &[Bar], set: &IndicatorSet, rows: usize, decimals: u32) -> Vec<TableRow> {
    let n = rows.min(bars.len()).min(set.len());
    let round = |v: f64| round_to(v, decimals);

    bars[bars.len() - n..]
        .iter()
        .zip(&set.records()[set.len() - n..])
        .map(|(bar, rec)| TableRow {
            date: bar.date,
            open: round(bar.open),
            high: round(bar.high),
            low: round(bar.low),
            close: round(bar.close),
            volume: bar.volume,
            ma20: rec.ma20.map(round),
            ma50: rec.ma50.map(round),
            rsi: rec.rsi.map(|r| r.map_value(round)),
        })
        .collect()
}

// =============================================================================
// Full report
// =============================================================================

/// Everything the dashboard renders for one symbol and period.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub period: Period,
    pub bar_count: usize,
    pub summary: Option<PriceSummary>,
    pub info: Option<SymbolInfoDisplay>,
    pub price_chart: PriceChart,
    pub rsi_panel: RsiPanel,
    pub macd_panel: MacdPanel,
    pub recent: Vec<TableRow>,
}

/// Display options for [`AnalysisReport::build`].
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub recent_rows: usize,
    pub display_decimals: u32,
}

impl AnalysisReport {
    /// Assemble the report.  `set` must have been derived from `bars`.
    pub fn build(
        symbol: &str,
        period: Period,
        bars: &[Bar],
        set: &IndicatorSet,
        info: Option<SymbolInfoDisplay>,
        options: ReportOptions,
    ) -> Self {
        let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();

        let price_chart = PriceChart {
            dates: dates.clone(),
            open: bars.iter().map(|b| b.open).collect(),
            high: bars.iter().map(|b| b.high).collect(),
            low: bars.iter().map(|b| b.low).collect(),
            close: bars.iter().map(|b| b.close).collect(),
            ma20: set.column(|r| r.ma20),
            ma50: set.column(|r| r.ma50),
            bb_upper: set.column(|r| r.bb_upper),
            bb_lower: set.column(|r| r.bb_lower),
        };

        let rsi = set.column(|r| r.rsi);
        let current_zone = rsi
            .last()
            .copied()
            .flatten()
            .and_then(|r| r.value())
            .map(RsiZone::classify);
        let rsi_panel = RsiPanel {
            dates: dates.clone(),
            rsi,
            overbought: OVERBOUGHT_LEVEL,
            oversold: OVERSOLD_LEVEL,
            current_zone,
        };

        let macd = set.column(|r| r.macd);
        let signal = set.column(|r| r.macd_signal);
        let histogram: Vec<f64> = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();
        let macd_panel = MacdPanel {
            dates,
            histogram_positive: histogram.iter().map(|h| *h >= 0.0).collect(),
            macd,
            signal,
            histogram,
        };

        Self {
            symbol: symbol.to_string(),
            period,
            bar_count: bars.len(),
            summary: PriceSummary::from_bars(bars),
            info,
            price_chart,
            rsi_panel,
            macd_panel,
            recent: recent_rows(bars, set, options.recent_rows, options.display_decimals),
        }
    }
}
