// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   macd      = EWM(close, fast) - EWM(close, slow)
//   signal    = EWM(macd, signal_span)
//   histogram = macd - signal
//
// All three use the adjusted EWM, so every index carries a value.  The signal
// line smooths the MACD line itself, not the closes.
// =============================================================================

use super::ema::calculate_ewm;

/// MACD line and signal line, aligned with the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

impl MacdSeries {
    /// `macd - signal` per index (the histogram bars of the MACD panel).
    pub fn histogram(&self) -> Vec<f64> {
        self.macd
            .iter()
            .zip(&self.signal)
            .map(|(m, s)| m - s)
            .collect()
    }
}

/// Compute MACD for `closes`.
///
/// # Edge cases
/// - any span of zero => empty series
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> MacdSeries {
    if fast == 0 || slow == 0 || signal_span == 0 {
        return MacdSeries {
            macd: Vec::new(),
            signal: Vec::new(),
        };
    }

    let fast_ewm = calculate_ewm(closes, fast);
    let slow_ewm = calculate_ewm(closes, slow);

    let macd: Vec<f64> = fast_ewm.iter().zip(&slow_ewm).map(|(f, s)| f - s).collect();
    let signal = calculate_ewm(&macd, signal_span);

    MacdSeries { macd, signal }
}
