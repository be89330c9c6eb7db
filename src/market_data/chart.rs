// =============================================================================
// Chart API Client — bar retrieval over REST
// =============================================================================
//
// Fetches OHLCV history from a Yahoo-style chart endpoint:
//
//   GET {base}/v8/finance/chart/{SYMBOL}?range={range}&interval={interval}
//
// The response nests parallel arrays under chart.result[0]:
//   timestamp[] plus indicators.quote[0].{open,high,low,close,volume}[].
// Entries with any null field are discarded during parsing.
//
// One attempt per request, bounded by the client-level timeout. Every failure
// mode (transport, non-2xx, malformed payload, empty series) collapses into
// `AnalysisError::DataUnavailable` — nothing rawer crosses this boundary.
// =============================================================================

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::AnalysisError;
use crate::market_data::{Bar, Series};
use crate::timeframe::Timeframe;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// REST client for the chart endpoint.
#[derive(Debug, Clone)]
pub struct ChartClient {
    base_url: String,
    client: reqwest::Client,
}

impl ChartClient {
    /// Create a client with the given endpoint base and request timeout.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build reqwest client");

        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Fetch and clean the bar series for `symbol` at `timeframe`.
    ///
    /// Intraday timeframes are restricted to the exchange session window.
    /// No retries: a single failed attempt is `DataUnavailable`.
    #[instrument(skip(self), name = "chart::fetch")]
    pub async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Series, AnalysisError> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval={}",
            self.base_url,
            symbol,
            timeframe.range(),
            timeframe.interval()
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AnalysisError::DataUnavailable(format!("chart request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AnalysisError::DataUnavailable(format!(
                "chart endpoint returned {status} for {symbol}"
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| AnalysisError::DataUnavailable(format!("chart response not JSON: {e}")))?;

        let bars = parse_chart_payload(&body)?;
        let mut series = Series::from_bars(bars);
        if timeframe.is_intraday() {
            series = series.session_filtered();
        }

        if series.is_empty() {
            return Err(AnalysisError::DataUnavailable(format!(
                "empty series for {symbol} after cleaning"
            )));
        }

        debug!(symbol, %timeframe, bars = series.len(), "series fetched");
        Ok(series)
    }
}

/// Parse the chart payload into raw bars.
///
/// Parallel-array entries with any missing or null field are skipped — that
/// is the cleaning step, not an error. A payload without the expected shape
/// is `DataUnavailable`.
pub fn parse_chart_payload(body: &Value) -> Result<Vec<Bar>, AnalysisError> {
    let result = body["chart"]["result"]
        .as_array()
        .and_then(|arr| arr.first())
        .ok_or_else(|| {
            AnalysisError::DataUnavailable("chart payload missing result[0]".into())
        })?;

    let timestamps = result["timestamp"].as_array().ok_or_else(|| {
        AnalysisError::DataUnavailable("chart payload missing timestamp array".into())
    })?;

    let quote = result["indicators"]["quote"]
        .as_array()
        .and_then(|arr| arr.first())
        .ok_or_else(|| {
            AnalysisError::DataUnavailable("chart payload missing quote[0]".into())
        })?;

    let field = |name: &str| -> Result<&Vec<Value>, AnalysisError> {
        quote[name].as_array().ok_or_else(|| {
            AnalysisError::DataUnavailable(format!("chart payload missing {name} array"))
        })
    };

    let opens = field("open")?;
    let highs = field("high")?;
    let lows = field("low")?;
    let closes = field("close")?;
    let volumes = field("volume")?;

    let mut bars = Vec::with_capacity(timestamps.len());
    let mut skipped = 0usize;

    for (i, ts) in timestamps.iter().enumerate() {
        let complete = (|| {
            Some(Bar {
                timestamp: ts.as_i64()?,
                open: opens.get(i)?.as_f64()?,
                high: highs.get(i)?.as_f64()?,
                low: lows.get(i)?.as_f64()?,
                close: closes.get(i)?.as_f64()?,
                volume: volumes.get(i)?.as_f64()?,
            })
        })();

        match complete {
            Some(bar) => bars.push(bar),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(skipped, "dropped bars with missing fields");
    }

    Ok(bars)
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn payload(timestamps: &[i64], closes: &[Value]) -> Value {
        let n = timestamps.len();
        let filled: Vec<Value> = (0..n).map(|i| serde_json::json!(100.0 + i as f64)).collect();
        serde_json::json!({
            "chart": {
                "result": [{
                    "timestamp": timestamps,
                    "indicators": { "quote": [{
                        "open": filled.clone(),
                        "high": filled.clone(),
                        "low": filled.clone(),
                        "close": closes,
                        "volume": filled,
                    }]}
                }],
                "error": null
            }
        })
    }

    #[test]
    fn parses_parallel_arrays() {
        let body = payload(
            &[100, 200, 300],
            &[
                serde_json::json!(10.0),
                serde_json::json!(11.0),
                serde_json::json!(12.0),
            ],
        );
        let bars = parse_chart_payload(&body).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[1].timestamp, 200);
        assert_eq!(bars[1].close, 11.0);
    }

    #[test]
    fn null_fields_are_skipped_not_fatal() {
        let body = payload(
            &[100, 200, 300],
            &[
                serde_json::json!(10.0),
                Value::Null,
                serde_json::json!(12.0),
            ],
        );
        let bars = parse_chart_payload(&body).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].timestamp, 300);
    }

    #[test]
    fn missing_result_is_data_unavailable() {
        let body = serde_json::json!({ "chart": { "result": null, "error": "Not Found" } });
        let err = parse_chart_payload(&body).unwrap_err();
        assert!(matches!(err, AnalysisError::DataUnavailable(_)));
    }

    #[test]
    fn missing_quote_array_is_data_unavailable() {
        let body = serde_json::json!({
            "chart": { "result": [{ "timestamp": [1, 2], "indicators": { "quote": [] } }] }
        });
        let err = parse_chart_payload(&body).unwrap_err();
        assert!(matches!(err, AnalysisError::DataUnavailable(_)));
    }
}
