// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the *sample* standard deviation of
// the same trailing window.  All three share the SMA warm-up: nothing is
// produced before index `period - 1`.

use super::sma::{rolling_mean, rolling_sample_std};

/// Band series aligned with the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub middle: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Calculate Bollinger Bands for the given closing prices.
///
/// - `middle` = SMA(`period`)
/// - `upper`  = middle + `num_std` * σ
/// - `lower`  = middle - `num_std` * σ
///
/// Every band is `None` where the window is incomplete, and entirely `None`
/// when `closes.len() < period`.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> BollingerSeries {
    let middle = rolling_mean(closes, period);
    let std_dev = rolling_sample_std(closes, period);

    let band = |sign: f64| -> Vec<Option<f64>> {
        middle
            .iter()
            .zip(&std_dev)
            .map(|(m, s)| Some((*m)? + sign * num_std * (*s)?))
            .collect()
    };
    let upper = band(1.0);
    let lower = band(-1.0);

    BollingerSeries {
        middle,
        upper,
        lower,
    }
}
