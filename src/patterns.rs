// =============================================================================
// Pattern Evaluator — boolean trade-setup checks
// =============================================================================
//
// Evaluates the momentum and structure booleans that feed the checklist:
//
//   uptrend         last close above the latest EMA
//   hh_hl           higher highs AND higher lows over the last 3 bars
//   near_resistance last close within 2 % below the nearest resistance above
//   volume_spike    latest volume > 1.5x the mean of the preceding 9 bars
//   clear_levels    placeholder, true whenever level detection ran
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::levels::LevelSet;
use crate::market_data::Series;

/// Bars examined by the higher-high / higher-low check.
const HH_HL_BARS: usize = 3;

/// Trailing bars (latest included) examined by the volume-spike check.
const VOLUME_WINDOW: usize = 10;

/// Latest volume must exceed this multiple of the trailing mean.
const VOLUME_SPIKE_FACTOR: f64 = 1.5;

/// Proximity band below a resistance level, as a fraction of the level.
const RESISTANCE_PROXIMITY: f64 = 0.98;

/// Snapshot of every pattern boolean for one series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PatternSnapshot {
    pub uptrend: bool,
    pub hh_hl: bool,
    pub near_resistance: bool,
    pub volume_spike: bool,
    pub clear_levels: bool,
}

/// Evaluate all pattern booleans for `series`.
///
/// `ema_last` is the latest EMA value; `levels` the detected level set.
pub fn evaluate(series: &Series, ema_last: f64, levels: &LevelSet) -> PatternSnapshot {
    let last_close = series.last().map(|b| b.close).unwrap_or(f64::NAN);

    let snapshot = PatternSnapshot {
        uptrend: last_close > ema_last,
        hh_hl: higher_highs_higher_lows(series),
        near_resistance: near_resistance(last_close, levels),
        volume_spike: volume_spike(series),
        // Placeholder: satisfied whenever detection ran without error.
        clear_levels: true,
    };

    debug!(
        uptrend = snapshot.uptrend,
        hh_hl = snapshot.hh_hl,
        near_resistance = snapshot.near_resistance,
        volume_spike = snapshot.volume_spike,
        "patterns evaluated"
    );

    snapshot
}

/// True iff High and Low are both strictly increasing over the last 3 bars.
fn higher_highs_higher_lows(series: &Series) -> bool {
    let tail = series.tail(HH_HL_BARS);
    if tail.len() < HH_HL_BARS {
        return false;
    }
    let hh = tail.windows(2).all(|w| w[1].high > w[0].high);
    let hl = tail.windows(2).all(|w| w[1].low > w[0].low);
    hh && hl
}

/// True iff the lowest resistance strictly above `last_close` exists and
/// `last_close` is within the 2 % proximity band below it.
fn near_resistance(last_close: f64, levels: &LevelSet) -> bool {
    match levels.nearest_resistance_above(last_close) {
        Some(level) => last_close >= level * RESISTANCE_PROXIMITY,
        None => false,
    }
}

/// True iff the latest bar's volume exceeds 1.5x the mean volume of the
/// preceding 9 bars (the latest bar excluded from the mean).
fn volume_spike(series: &Series) -> bool {
    let tail = series.tail(VOLUME_WINDOW);
    if tail.len() < 2 {
        return false;
    }
    let Some((latest, prior)) = tail.split_last() else {
        return false;
    };
    let mean: f64 = prior.iter().map(|b| b.volume).sum::<f64>() / prior.len() as f64;
    latest.volume > mean * VOLUME_SPIKE_FACTOR
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::Bar;

    fn bar(ts: i64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
        Bar {
            timestamp: ts,
            open: close,
            high,
            low,
            close,
            volume,
        }
    }

    fn flat_series(n: usize) -> Series {
        Series::from_bars((0..n as i64).map(|i| bar(i, 101.0, 99.0, 100.0, 1000.0)).collect())
    }

    // ---- hh_hl ------------------------------------------------------------

    #[test]
    fn hh_hl_true_for_three_rising_bars() {
        let mut bars: Vec<Bar> = (0..20).map(|i| bar(i, 101.0, 99.0, 100.0, 1000.0)).collect();
        bars.push(bar(20, 102.0, 100.0, 101.0, 1000.0));
        bars.push(bar(21, 103.0, 101.0, 102.0, 1000.0));
        bars.push(bar(22, 104.0, 102.0, 103.0, 1000.0));
        let series = Series::from_bars(bars);
        assert!(higher_highs_higher_lows(&series));
    }

    #[test]
    fn hh_hl_falsified_by_single_non_increasing_pair() {
        // Highs rise but the last low equals the previous low.
        let bars = vec![
            bar(0, 102.0, 100.0, 101.0, 1000.0),
            bar(1, 103.0, 101.0, 102.0, 1000.0),
            bar(2, 104.0, 101.0, 103.0, 1000.0),
        ];
        assert!(!higher_highs_higher_lows(&Series::from_bars(bars)));
    }

    #[test]
    fn hh_hl_false_on_flat_series() {
        assert!(!higher_highs_higher_lows(&flat_series(20)));
    }

    #[test]
    fn hh_hl_false_with_fewer_than_three_bars() {
        assert!(!higher_highs_higher_lows(&flat_series(2)));
    }

    // ---- near_resistance --------------------------------------------------

    #[test]
    fn near_resistance_within_two_percent() {
        let levels = LevelSet {
            support: vec![],
            resistance: vec![102.0],
        };
        // 102 * 0.98 = 99.96
        assert!(near_resistance(100.0, &levels));
        assert!(near_resistance(99.96, &levels));
        assert!(!near_resistance(99.0, &levels));
    }

    #[test]
    fn near_resistance_uses_lowest_level_above() {
        let levels = LevelSet {
            support: vec![],
            resistance: vec![101.0, 150.0],
        };
        // 100 is within 2 % of 101, the lowest level above it.
        assert!(near_resistance(100.0, &levels));
    }

    #[test]
    fn near_resistance_ignores_levels_at_or_below_close() {
        let levels = LevelSet {
            support: vec![],
            resistance: vec![100.0],
        };
        // Level must be strictly above the close.
        assert!(!near_resistance(100.0, &levels));
        assert!(!near_resistance(105.0, &levels));
    }

    #[test]
    fn near_resistance_false_with_no_levels() {
        assert!(!near_resistance(100.0, &LevelSet::default()));
    }

    // ---- volume_spike -----------------------------------------------------

    #[test]
    fn volume_spike_on_triple_volume() {
        let mut bars: Vec<Bar> = (0..24).map(|i| bar(i, 101.0, 99.0, 100.0, 1000.0)).collect();
        bars.push(bar(24, 101.0, 99.0, 100.0, 3000.0));
        assert!(volume_spike(&Series::from_bars(bars)));
    }

    #[test]
    fn no_spike_on_flat_volume() {
        assert!(!volume_spike(&flat_series(25)));
    }

    #[test]
    fn spike_threshold_is_strict() {
        // Exactly 1.5x the trailing mean does not qualify.
        let mut bars: Vec<Bar> = (0..9).map(|i| bar(i, 101.0, 99.0, 100.0, 1000.0)).collect();
        bars.push(bar(9, 101.0, 99.0, 100.0, 1500.0));
        assert!(!volume_spike(&Series::from_bars(bars)));
    }

    // ---- evaluate ---------------------------------------------------------

    #[test]
    fn flat_series_momentum_signals_all_false() {
        let series = flat_series(25);
        let snapshot = evaluate(&series, 100.0, &LevelSet::default());
        assert!(!snapshot.uptrend); // close == EMA, not above
        assert!(!snapshot.hh_hl);
        assert!(!snapshot.volume_spike);
        assert!(!snapshot.near_resistance);
        assert!(snapshot.clear_levels);
    }

    #[test]
    fn uptrend_requires_close_above_ema() {
        let series = flat_series(25);
        assert!(evaluate(&series, 99.0, &LevelSet::default()).uptrend);
        assert!(!evaluate(&series, 101.0, &LevelSet::default()).uptrend);
    }
}
