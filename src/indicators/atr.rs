// =============================================================================
// Average True Range (ATR) — trailing simple average
// =============================================================================
//
// ATR measures volatility by decomposing the entire range of a bar.
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR here is the simple trailing mean of the last `window` TR values; only
// the most recent value is consumed downstream (risk sizing).
//
// Default window: 14
// =============================================================================

use crate::market_data::Bar;

/// Default ATR window used by the analysis pipeline.
pub const DEFAULT_ATR_WINDOW: usize = 14;

/// Compute the most recent ATR value from a slice of OHLCV bars
/// (oldest first).
///
/// # Returns
/// `None` when:
/// - `window` is zero.
/// - There are fewer than `window + 1` bars (each TR needs a previous close).
/// - Any intermediate value is non-finite.
pub fn calculate_atr(bars: &[Bar], window: usize) -> Option<f64> {
    if window == 0 || bars.len() < window + 1 {
        return None;
    }

    // True Range for each consecutive pair; only the trailing `window`
    // values feed the average.
    let start = bars.len() - window;
    let mut sum = 0.0;
    for i in start..bars.len() {
        let high = bars[i].high;
        let low = bars[i].low;
        let prev_close = bars[i - 1].close;

        let hl = high - low;
        let hc = (high - prev_close).abs();
        let lc = (low - prev_close).abs();

        let tr = hl.max(hc).max(lc);
        if !tr.is_finite() {
            return None;
        }
        sum += tr;
    }

    let atr = sum / window as f64;
    atr.is_finite().then_some(atr)
}
