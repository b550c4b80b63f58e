// =============================================================================
// Exponentially Weighted Mean (adjusted form)
// =============================================================================
//
// Smoothing factor:
//   alpha = 2 / (span + 1)
//
// The adjusted mean divides by the sum of the weights actually applied, so
// the earliest points are not biased toward an implicit zero seed:
//
//   ewm_i = sum_{k=0..i} (1 - alpha)^k * x_{i-k}
//           ---------------------------------------
//             sum_{k=0..i} (1 - alpha)^k
//
// Both sums obey the same recurrence, S_i = x_i + (1 - alpha) * S_{i-1}, so
// the series is produced in a single pass.  ewm_0 == x_0 and every index has a
// value: there is no warm-up gap.
// =============================================================================

/// Compute the adjusted EWM of `values` for the given `span`.
///
/// The output has the same length as the input.
///
/// # Edge cases
/// - `span == 0` => empty vec (alpha would exceed 1)
/// - empty input => empty vec
pub fn calculate_ewm(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;

    let mut weighted_sum = 0.0_f64;
    let mut weight_total = 0.0_f64;

    values
        .iter()
        .map(|&x| {
            weighted_sum = x + decay * weighted_sum;
            weight_total = 1.0 + decay * weight_total;
            weighted_sum / weight_total
        })
        .collect()
}
