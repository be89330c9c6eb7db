// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   alpha = 2 / (window + 1)
//   EMA_0 = close_0                      (seeded with the first close)
//   EMA_t = close_t * alpha + EMA_{t-1} * (1 - alpha)
//
// The output is aligned one-to-one with the input: every close has an EMA
// value, including the warm-up region. Downstream charting relies on this.
// =============================================================================

/// Default EMA window used by the analysis pipeline.
pub const DEFAULT_EMA_WINDOW: usize = 50;

/// Compute the EMA series for the given `closes` slice and look-back `window`.
///
/// Returns a vector the same length as `closes`.
///
/// # Edge cases
/// - `window == 0` => empty vec (division by zero guard)
/// - empty input => empty vec
/// - Any non-finite intermediate value => empty vec; downstream consumers
///   should not trust a broken series.
pub fn calculate_ema(closes: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || closes.is_empty() {
        return Vec::new();
    }

    let alpha = 2.0 / (window + 1) as f64;

    let mut result = Vec::with_capacity(closes.len());
    let mut prev = closes[0];
    if !prev.is_finite() {
        return Vec::new();
    }
    result.push(prev);

    for &close in &closes[1..] {
        let ema = close * alpha + prev * (1.0 - alpha);
        if !ema.is_finite() {
            return Vec::new();
        }
        result.push(ema);
        prev = ema;
    }

    result
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_empty_input() {
        assert!(calculate_ema(&[], 50).is_empty());
    }

    #[test]
    fn ema_window_zero() {
        assert!(calculate_ema(&[1.0, 2.0, 3.0], 0).is_empty());
    }

    #[test]
    fn ema_aligned_one_to_one() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let ema = calculate_ema(&closes, 50);
        assert_eq!(ema.len(), closes.len());
    }

    #[test]
    fn ema_constant_series_stays_constant() {
        // EMA of a constant-price series equals that constant at every index.
        let closes = vec![42.5; 60];
        let ema = calculate_ema(&closes, 14);
        assert_eq!(ema.len(), 60);
        for (i, v) in ema.iter().enumerate() {
            assert!((v - 42.5).abs() < 1e-12, "index {i}: got {v}");
        }
    }

    #[test]
    fn ema_known_recurrence() {
        // window=3 => alpha=0.5; seed = first close.
        let closes = vec![2.0, 4.0, 8.0];
        let ema = calculate_ema(&closes, 3);
        assert!((ema[0] - 2.0).abs() < 1e-12);
        assert!((ema[1] - 3.0).abs() < 1e-12); // 4*0.5 + 2*0.5
        assert!((ema[2] - 5.5).abs() < 1e-12); // 8*0.5 + 3*0.5
    }

    #[test]
    fn ema_tracks_below_price_in_uptrend() {
        let closes: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
        let ema = calculate_ema(&closes, 50);
        // In a steady uptrend the smoothed value lags the latest close.
        assert!(ema.last().unwrap() < closes.last().unwrap());
    }

    #[test]
    fn ema_nan_input_yields_empty() {
        let closes = vec![1.0, 2.0, f64::NAN, 4.0];
        assert!(calculate_ema(&closes, 3).is_empty());
    }
}
