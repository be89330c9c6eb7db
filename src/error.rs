// =============================================================================
// Analysis failure taxonomy
// =============================================================================
//
// Every stage-local failure is typed and propagated to the request boundary,
// where it is logged and collapsed into a uniform "no result" response. The
// presentation layer never distinguishes causes.
// =============================================================================

use thiserror::Error;

/// Minimum number of cleaned bars required before any derived computation.
pub const MIN_BARS: usize = 20;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Network failure, timeout, or an empty/malformed series after cleaning.
    #[error("market data unavailable: {0}")]
    DataUnavailable(String),

    /// Fewer than [`MIN_BARS`] bars survived cleaning.
    #[error("insufficient data: {got} bars after cleaning, need at least {min}")]
    InsufficientData { got: usize, min: usize },

    /// Numeric degeneracy, e.g. a zero risk denominator or a non-finite ATR.
    #[error("computation error: {0}")]
    ComputationError(String),
}
