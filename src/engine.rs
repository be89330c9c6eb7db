// =============================================================================
// Analysis Engine — the per-request pipeline
// =============================================================================
//
// One request runs strictly linearly:
//
//   fetch -> (indicators | levels) -> (patterns | risk) -> aggregate
//
// Everything after the fetch is pure and non-blocking; distinct requests share
// no mutable state. The result is a plain value with no reference back to the
// series it was computed from.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{AnalysisError, MIN_BARS};
use crate::indicators::{calculate_atr, calculate_ema, IndicatorSet};
use crate::levels::{self, LevelParams, LevelSet};
use crate::market_data::{ChartClient, Series};
use crate::patterns;
use crate::risk::{self, RiskParams};
use crate::signals::{self, SignalCheck, Verdict};
use crate::timeframe::Timeframe;

/// All tunables consumed by the pure pipeline stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisParams {
    pub ema_window: usize,
    pub atr_window: usize,
    pub levels: LevelParams,
    pub risk: RiskParams,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            ema_window: crate::indicators::DEFAULT_EMA_WINDOW,
            atr_window: crate::indicators::DEFAULT_ATR_WINDOW,
            levels: LevelParams::default(),
            risk: RiskParams::default(),
        }
    }
}

/// The aggregated outcome of one analysis. A pure value: constructed once,
/// immutable, no back-reference to the series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Ordered checklist; insertion order is the display order.
    pub signals: Vec<SignalCheck>,
    pub passing_count: usize,
    pub verdict: Verdict,
    pub stop_loss: f64,
    pub target: f64,
    pub rr_ratio: f64,
    pub levels: LevelSet,
    pub last_close: f64,
    pub ema_last: f64,
}

/// Response handed to the presentation layer: the result plus the raw series
/// and EMA sequence needed for charting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub result: AnalysisResult,
    pub series: Series,
    pub ema: Vec<f64>,
}

/// Run the pure pipeline stages over an already-fetched series.
pub fn analyze_series(
    series: &Series,
    params: &AnalysisParams,
) -> Result<(AnalysisResult, Vec<f64>), AnalysisError> {
    if series.len() < MIN_BARS {
        return Err(AnalysisError::InsufficientData {
            got: series.len(),
            min: MIN_BARS,
        });
    }

    // --- Indicators & levels (depend only on the series) -------------------
    let closes = series.closes();
    let ema = calculate_ema(&closes, params.ema_window);
    let ema_last = *ema.last().ok_or_else(|| {
        AnalysisError::ComputationError("EMA produced no output".into())
    })?;

    let atr = calculate_atr(series.bars(), params.atr_window).ok_or_else(|| {
        AnalysisError::ComputationError(format!(
            "ATR undefined for {} bars with window {}",
            series.len(),
            params.atr_window
        ))
    })?;

    let indicators = IndicatorSet { ema, atr };
    let level_set = levels::detect(series, &params.levels);

    // --- Patterns & risk (depend on indicators/levels) ----------------------
    let last_close = series
        .last()
        .map(|b| b.close)
        .ok_or_else(|| AnalysisError::ComputationError("empty series".into()))?;

    let snapshot = patterns::evaluate(series, ema_last, &level_set);
    let risk_levels = risk::calculate(last_close, indicators.atr, &params.risk)?;

    // --- Aggregate ----------------------------------------------------------
    let checklist = signals::aggregate(&snapshot, risk_levels.good_rr());

    debug!(
        passing = checklist.passing_count,
        verdict = %checklist.verdict,
        last_close,
        atr = indicators.atr,
        "analysis complete"
    );

    let result = AnalysisResult {
        signals: checklist.signals,
        passing_count: checklist.passing_count,
        verdict: checklist.verdict,
        stop_loss: risk_levels.stop_loss,
        target: risk_levels.target,
        rr_ratio: risk_levels.rr_ratio,
        levels: level_set,
        last_close,
        ema_last,
    };

    Ok((result, indicators.ema))
}

/// Full analysis for one symbol/timeframe pair: fetch, then the pure stages.
///
/// The ticker is normalised (trimmed, upper-cased) so `tcs.ns` and `TCS.NS`
/// are the same request.
#[instrument(skip(client, params), name = "engine::analyze")]
pub async fn analyze(
    client: &ChartClient,
    params: &AnalysisParams,
    symbol: &str,
    timeframe: Timeframe,
) -> Result<AnalysisReport, AnalysisError> {
    let symbol = symbol.trim().to_uppercase();

    let series = client.fetch(&symbol, timeframe).await?;
    let (result, ema) = analyze_series(&series, params)?;

    Ok(AnalysisReport {
        symbol,
        timeframe,
        result,
        series,
        ema,
    })
}
