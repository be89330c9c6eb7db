// =============================================================================
// Level Detector — swing-high / swing-low support & resistance
// =============================================================================
//
// Resistance levels are swing highs: local maxima of the High series that are
// at least `min_separation` bars away from any taller surviving peak and whose
// prominence (height above the higher of the two flanking bases) reaches
// `min_prominence`. Support levels are the same detection run on the negated
// Low series.
//
// Detection is restricted to a trailing look-back window; each side returns
// its three most recent qualifying levels, ascending by price. Fewer —
// including none — is a normal outcome, not an error.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::market_data::Series;

/// Tunable swing-detection parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LevelParams {
    /// Trailing window of bars the detector sees.
    pub lookback: usize,
    /// Minimum index distance between two surviving peaks.
    pub min_separation: usize,
    /// Minimum prominence for a peak to qualify.
    pub min_prominence: f64,
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            lookback: 50,
            min_separation: 5,
            min_prominence: 1.0,
        }
    }
}

/// Maximum number of levels kept per side.
const MAX_LEVELS_PER_SIDE: usize = 3;

/// Detected support/resistance price levels, each side ascending by price.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelSet {
    pub support: Vec<f64>,
    pub resistance: Vec<f64>,
}

impl LevelSet {
    /// The lowest resistance strictly above `price`, if any.
    pub fn nearest_resistance_above(&self, price: f64) -> Option<f64> {
        self.resistance.iter().copied().find(|&r| r > price)
    }
}

/// Detect support and resistance levels over the trailing window of `series`.
pub fn detect(series: &Series, params: &LevelParams) -> LevelSet {
    let window = series.tail(params.lookback);

    let highs: Vec<f64> = window.iter().map(|b| b.high).collect();
    let neg_lows: Vec<f64> = window.iter().map(|b| -b.low).collect();

    let resistance_idx = find_peaks(&highs, params.min_separation, params.min_prominence);
    let support_idx = find_peaks(&neg_lows, params.min_separation, params.min_prominence);

    let mut resistance = most_recent_prices(&resistance_idx, |i| highs[i]);
    let mut support = most_recent_prices(&support_idx, |i| window[i].low);

    resistance.sort_by(|a, b| a.total_cmp(b));
    support.sort_by(|a, b| a.total_cmp(b));

    debug!(
        resistance = resistance.len(),
        support = support.len(),
        window = window.len(),
        "levels detected"
    );

    LevelSet {
        support,
        resistance,
    }
}

/// Keep the most recent `MAX_LEVELS_PER_SIDE` peak indices (they arrive
/// ascending) and map them to prices.
fn most_recent_prices(indices: &[usize], price_at: impl Fn(usize) -> f64) -> Vec<f64> {
    let start = indices.len().saturating_sub(MAX_LEVELS_PER_SIDE);
    indices[start..].iter().map(|&i| price_at(i)).collect()
}

/// Find indices of local maxima in `values`, filtered by prominence and then
/// by minimum peak-to-peak distance (taller peaks win ties).
///
/// A peak is a sample strictly greater than both neighbours; flat plateaus
/// and edges never qualify. Prominence is the peak height above the higher of
/// the two flanking bases, where each base is the minimum between the peak
/// and the nearest higher sample (or the edge) on that side.
///
/// Returned indices are ascending.
pub fn find_peaks(values: &[f64], min_separation: usize, min_prominence: f64) -> Vec<usize> {
    if values.len() < 3 {
        return Vec::new();
    }

    // --- Step 1: strict local maxima --------------------------------------
    let mut candidates: Vec<usize> = Vec::new();
    for i in 1..values.len() - 1 {
        if values[i] > values[i - 1] && values[i] > values[i + 1] {
            candidates.push(i);
        }
    }

    // --- Step 2: prominence filter ----------------------------------------
    candidates.retain(|&i| prominence(values, i) >= min_prominence);

    // --- Step 3: distance filter, taller peaks first -----------------------
    let mut by_height = candidates.clone();
    by_height.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let mut kept: Vec<usize> = Vec::with_capacity(by_height.len());
    for idx in by_height {
        if kept.iter().all(|&k| idx.abs_diff(k) >= min_separation) {
            kept.push(idx);
        }
    }

    kept.sort_unstable();
    kept
}

/// Prominence of the peak at `idx`: height above the higher of the two bases
/// found by walking outward to the first strictly higher sample or the edge.
fn prominence(values: &[f64], idx: usize) -> f64 {
    let peak = values[idx];

    let mut left_base = peak;
    for &v in values[..idx].iter().rev() {
        if v > peak {
            break;
        }
        left_base = left_base.min(v);
    }

    let mut right_base = peak;
    for &v in &values[idx + 1..] {
        if v > peak {
            break;
        }
        right_base = right_base.min(v);
    }

    peak - left_base.max(right_base)
}
