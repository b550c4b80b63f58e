// =============================================================================
// Relative Strength Index (RSI) — simple-average form
// =============================================================================
//
// Step 1 — delta_i = close_i - close_{i-1}          (no delta at index 0)
// Step 2 — gain_i = max(delta_i, 0), loss_i = max(-delta_i, 0)
// Step 3 — avg_gain / avg_loss = simple moving average of gain / loss over
//          `period` deltas.  The first complete window ends at index `period`.
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Zero denominators:
//   avg_loss == 0, avg_gain > 0  => 100 (only gains)
//   avg_loss == 0, avg_gain == 0 => UndefinedRatio (flat window, 0/0)
//
// Thresholds:  RSI >= 70 => OVERBOUGHT,  RSI <= 30 => OVERSOLD.
// =============================================================================

use serde::{Serialize, Serializer};

use super::sma::rolling_mean_sparse;

/// Upper reference level drawn on the RSI panel.
pub const OVERBOUGHT_LEVEL: f64 = 70.0;
/// Lower reference level drawn on the RSI panel.
pub const OVERSOLD_LEVEL: f64 = 30.0;

/// One defined RSI output.
///
/// `UndefinedRatio` marks a window with neither gains nor losses.  It is kept
/// distinct from a numeric value so it can never be mistaken for 0, 50 or 100
/// in comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RsiReading {
    Value(f64),
    UndefinedRatio,
}

impl RsiReading {
    /// The numeric value, or `None` for [`RsiReading::UndefinedRatio`].
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::UndefinedRatio => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::UndefinedRatio)
    }

    /// Apply `f` to a numeric reading.  Undefined stays undefined.
    pub fn map_value(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Self::Value(v) => Self::Value(f(v)),
            Self::UndefinedRatio => Self::UndefinedRatio,
        }
    }
}

/// Numbers serialise as JSON numbers; the undefined marker as the string
/// `"undefined"` so that it stays distinguishable from an absent `null`.
impl Serialize for RsiReading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => serializer.serialize_f64(*v),
            Self::UndefinedRatio => serializer.serialize_str("undefined"),
        }
    }
}

/// Qualitative band a numeric RSI reading falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiZone {
    pub fn classify(value: f64) -> Self {
        if value >= OVERBOUGHT_LEVEL {
            Self::Overbought
        } else if value <= OVERSOLD_LEVEL {
            Self::Oversold
        } else {
            Self::Neutral
        }
    }
}

impl std::fmt::Display for RsiZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overbought => write!(f, "OVERBOUGHT"),
            Self::Oversold => write!(f, "OVERSOLD"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Compute the RSI series for `closes` over `period` deltas.
///
/// The output is aligned with `closes`: index `i` is `None` until a full
/// window of `period` deltas ends at `i`, i.e. for every `i < period`.
///
/// # Edge cases
/// - `period == 0` => every element `None`
/// - `closes.len() <= period` => every element `None`
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<RsiReading>> {
    let deltas: Vec<Option<f64>> = std::iter::once(None)
        .chain(closes.windows(2).map(|w| Some(w[1] - w[0])))
        .take(closes.len())
        .collect();

    let gains: Vec<Option<f64>> = deltas.iter().map(|d| d.map(|d| d.max(0.0))).collect();
    let losses: Vec<Option<f64>> = deltas.iter().map(|d| d.map(|d| (-d).max(0.0))).collect();

    let avg_gain = rolling_mean_sparse(&gains, period);
    let avg_loss = rolling_mean_sparse(&losses, period);

    avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(g, l)| Some(rsi_from_averages(g?, l?)))
        .collect()
}

/// Convenience: the most recent defined RSI reading with its zone.
///
/// Returns `None` when no window is complete or the latest reading is
/// [`RsiReading::UndefinedRatio`].
pub fn current_rsi(closes: &[f64], period: usize) -> Option<(f64, RsiZone)> {
    let latest = calculate_rsi(closes, period).last().copied().flatten()?;
    let value = latest.value()?;
    Some((value, RsiZone::classify(value)))
}

// =============================================================================
// Internal helpers
// =============================================================================

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> RsiReading {
    if avg_loss == 0.0 {
        if avg_gain > 0.0 {
            RsiReading::Value(100.0)
        } else {
            RsiReading::UndefinedRatio
        }
    } else {
        let rs = avg_gain / avg_loss;
        RsiReading::Value(100.0 - 100.0 / (1.0 + rs))
    }
}
