// =============================================================================
// Bar & Series — cleaned OHLCV price history
// =============================================================================
//
// A `Series` is the unit of analysis: oldest-first bars with strictly
// increasing timestamps. Construction sorts and de-duplicates so the
// invariant holds no matter what the chart endpoint returned.
//
// Intraday bars are additionally restricted to the exchange session window
// (09:15–15:30 at UTC+05:30); bars outside it are discarded.
// =============================================================================

use chrono::{DateTime, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

/// Exchange-local offset for session filtering (UTC+05:30, no DST).
const EXCHANGE_UTC_OFFSET_SECS: i32 = 5 * 3600 + 1800;

/// Session open, minutes after midnight exchange-local (09:15).
const SESSION_OPEN_MIN: u32 = 9 * 60 + 15;

/// Session close, minutes after midnight exchange-local (15:30).
const SESSION_CLOSE_MIN: u32 = 15 * 60 + 30;

/// A single OHLCV bar. Immutable once retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open time, UNIX epoch seconds.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// A bar is usable only when every field is a finite number.
    pub fn is_complete(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }

    /// Whether the bar's open time falls inside the exchange session window.
    pub fn in_session(&self) -> bool {
        let offset = FixedOffset::east_opt(EXCHANGE_UTC_OFFSET_SECS)
            .expect("valid fixed offset");
        match DateTime::from_timestamp(self.timestamp, 0) {
            Some(utc) => {
                let local = utc.with_timezone(&offset);
                let minutes = local.hour() * 60 + local.minute();
                (SESSION_OPEN_MIN..=SESSION_CLOSE_MIN).contains(&minutes)
            }
            None => false,
        }
    }
}

/// Ordered bar history, oldest first, strictly increasing timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    /// Build a series from raw bars: incomplete bars are dropped, the rest
    /// are sorted by timestamp and de-duplicated (first occurrence wins).
    pub fn from_bars(mut bars: Vec<Bar>) -> Self {
        bars.retain(Bar::is_complete);
        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        Self { bars }
    }

    /// Drop bars outside the exchange session window. Applied only to
    /// intraday timeframes by the data source.
    pub fn session_filtered(mut self) -> Self {
        self.bars.retain(Bar::in_session);
        self
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Close prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// The trailing `count` bars (fewer when the series is shorter).
    pub fn tail(&self, count: usize) -> &[Bar] {
        let start = self.bars.len().saturating_sub(count);
        &self.bars[start..]
    }
}
