// =============================================================================
// Rolling-window statistics (Simple Moving Average, sample standard deviation)
// =============================================================================
//
// Both functions return one element per input element.  Index `i` holds the
// statistic over `values[i + 1 - window ..= i]` when every value in that window
// is present; otherwise it is `None`.  A window is never evaluated over fewer
// than `window` values, so the first `window - 1` outputs are always `None`.
//
// Each window is summed directly rather than maintained as a running sum, so
// a value computed at index `i` does not depend on the floating-point history
// of earlier windows.
// =============================================================================

/// Simple moving average of `values` over a trailing `window`.
///
/// # Edge cases
/// - `window == 0` => every element `None`
/// - `values.len() < window` => every element `None`
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let present: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
    rolling_mean_sparse(&present, window)
}

/// Simple moving average over a series that may contain gaps.
///
/// A window touching a `None` produces `None`.
pub fn rolling_mean_sparse(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling_apply(values, window, |w| w.iter().sum::<f64>() / window as f64)
}

/// Sample standard deviation (denominator `window - 1`) over a trailing
/// `window`.
///
/// # Edge cases
/// - `window < 2` => every element `None` (sample variance is undefined)
pub fn rolling_sample_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; values.len()];
    }
    let present: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
    rolling_apply(&present, window, |w| {
        let mean = w.iter().sum::<f64>() / window as f64;
        let ss: f64 = w.iter().map(|x| (x - mean).powi(2)).sum();
        (ss / (window - 1) as f64).sqrt()
    })
}

fn rolling_apply<F>(values: &[Option<f64>], window: usize, stat: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let mut result = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return result;
    }

    let mut buf = Vec::with_capacity(window);
    for end in (window - 1)..values.len() {
        buf.clear();
        buf.extend(values[end + 1 - window..=end].iter().map_while(|v| *v));
        if buf.len() == window {
            result[end] = Some(stat(&buf));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ---- rolling_mean ----------------------------------------------------

    #[test]
    fn mean_warm_up_is_absent() {
        let v: Vec<f64> = (1..=5).map(|x| x as f64).collect();
        let m = rolling_mean(&v, 3);
        assert_eq!(m.len(), 5);
        assert!(m[0].is_none());
        assert!(m[1].is_none());
        assert!(approx(m[2].unwrap(), 2.0));
        assert!(approx(m[3].unwrap(), 3.0));
        assert!(approx(m[4].unwrap(), 4.0));
    }

    #[test]
    fn mean_short_input_is_all_absent() {
        let m = rolling_mean(&[1.0, 2.0], 3);
        assert_eq!(m, vec![None, None]);
    }

    #[test]
    fn mean_window_zero_is_all_absent() {
        assert_eq!(rolling_mean(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn mean_empty_input() {
        assert!(rolling_mean(&[], 3).is_empty());
    }

    #[test]
    fn sparse_mean_skips_windows_touching_gaps() {
        let v = vec![None, Some(1.0), Some(2.0), Some(3.0), None, Some(5.0)];
        let m = rolling_mean_sparse(&v, 2);
        assert_eq!(m[0], None);
        assert_eq!(m[1], None); // window includes index 0
        assert!(approx(m[2].unwrap(), 1.5));
        assert!(approx(m[3].unwrap(), 2.5));
        assert_eq!(m[4], None);
        assert_eq!(m[5], None);
    }

    // ---- rolling_sample_std ----------------------------------------------

    #[test]
    fn std_uses_sample_denominator() {
        // [2, 4, 4, 4, 5, 5, 7, 9]: population sd = 2, sample sd = sqrt(32/7)
        let v = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let s = rolling_sample_std(&v, 8);
        assert!(s[..7].iter().all(Option::is_none));
        assert!(approx(s[7].unwrap(), (32.0_f64 / 7.0).sqrt()));
    }

    #[test]
    fn std_of_flat_window_is_zero() {
        let s = rolling_sample_std(&[7.5; 5], 3);
        for v in &s[2..] {
            assert_eq!(v.unwrap(), 0.0);
        }
    }

    #[test]
    fn std_window_below_two_is_absent() {
        assert_eq!(rolling_sample_std(&[1.0, 2.0], 1), vec![None, None]);
    }
}
