// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators used by the
// analysis engine. EMA returns an empty vec and ATR returns `None` on
// insufficient data or numerical edge cases, so callers are forced to handle
// both scenarios.

pub mod atr;
pub mod ema;

pub use atr::{calculate_atr, DEFAULT_ATR_WINDOW};
pub use ema::{calculate_ema, DEFAULT_EMA_WINDOW};

/// Indicator outputs consumed by the pattern and risk stages.
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    /// EMA aligned one-to-one with the source series.
    pub ema: Vec<f64>,
    /// Latest ATR value (trailing window average).
    pub atr: f64,
}
