// =============================================================================
// Risk Calculator — ATR-based stop-loss and target levels
// =============================================================================
//
//   stop_loss = close - stop_atr_mult   * ATR
//   target    = close + target_atr_mult * ATR
//   rr_ratio  = (target - close) / (close - stop_loss)
//
// With the default multipliers (2 and 4) the ratio reduces algebraically to
// exactly 2.0, so the downstream good-R/R check can never fail. The
// multipliers are therefore configurable; the defaults deliberately preserve
// the documented behaviour rather than silently changing it.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

fn default_stop_atr_mult() -> f64 {
    2.0
}

fn default_target_atr_mult() -> f64 {
    4.0
}

/// ATR multipliers for stop-loss and target distance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskParams {
    /// ATR multiplier for stop-loss distance below entry.
    #[serde(default = "default_stop_atr_mult")]
    pub stop_atr_mult: f64,

    /// ATR multiplier for target distance above entry.
    #[serde(default = "default_target_atr_mult")]
    pub target_atr_mult: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            stop_atr_mult: default_stop_atr_mult(),
            target_atr_mult: default_target_atr_mult(),
        }
    }
}

/// Risk-management levels derived from volatility.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskLevels {
    pub stop_loss: f64,
    pub target: f64,
    pub rr_ratio: f64,
}

impl RiskLevels {
    /// A risk/reward ratio of at least 2 is considered good.
    pub fn good_rr(&self) -> bool {
        self.rr_ratio >= 2.0
    }
}

/// Derive stop-loss, target and risk/reward ratio from the latest close and
/// ATR.
///
/// A non-positive risk denominator (stop at or above the close, e.g. zero
/// ATR) is numeric degeneracy, reported as `ComputationError`.
pub fn calculate(last_close: f64, atr: f64, params: &RiskParams) -> Result<RiskLevels, AnalysisError> {
    let stop_loss = last_close - params.stop_atr_mult * atr;
    let target = last_close + params.target_atr_mult * atr;

    let risk = last_close - stop_loss;
    if risk <= 0.0 || !risk.is_finite() {
        return Err(AnalysisError::ComputationError(format!(
            "non-positive risk denominator (close={last_close}, stop={stop_loss})"
        )));
    }

    let rr_ratio = (target - last_close) / risk;
    if !rr_ratio.is_finite() {
        return Err(AnalysisError::ComputationError(format!(
            "non-finite risk/reward ratio (close={last_close}, atr={atr})"
        )));
    }

    Ok(RiskLevels {
        stop_loss,
        target,
        rr_ratio,
    })
}
