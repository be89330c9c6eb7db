// =============================================================================
// Analysis Cache — explicit, externally owned memoization
// =============================================================================
//
// Avoids refetching the same symbol/timeframe pair on every request. The
// cache is owned by `AppState` and consulted only at the HTTP boundary; the
// engine's pure stages never see it. Invalidation is TTL-based with a manual
// clear endpoint on top.
// =============================================================================

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::debug;

use crate::engine::AnalysisReport;
use crate::timeframe::Timeframe;

/// Composite key identifying one cached analysis.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct CacheKey {
    pub symbol: String,
    pub timeframe: Timeframe,
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.symbol, self.timeframe)
    }
}

struct CacheEntry {
    report: AnalysisReport,
    inserted_at: Instant,
}

/// Thread-safe TTL cache of analysis reports keyed by (symbol, timeframe).
pub struct AnalysisCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl AnalysisCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Return a fresh cached report, or `None` when absent or expired.
    pub fn get(&self, key: &CacheKey) -> Option<AnalysisReport> {
        let map = self.entries.read();
        let entry = map.get(key)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            debug!(%key, "cache entry expired");
            return None;
        }
        debug!(%key, "cache hit");
        Some(entry.report.clone())
    }

    /// Store a report, replacing any previous entry and pruning expired ones.
    pub fn insert(&self, key: CacheKey, report: AnalysisReport) {
        let mut map = self.entries.write();
        map.retain(|_, e| e.inserted_at.elapsed() < self.ttl);
        map.insert(
            key,
            CacheEntry {
                report,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop one entry.
    pub fn invalidate(&self, key: &CacheKey) {
        self.entries.write().remove(key);
    }

    /// Drop everything; returns the number of entries removed.
    pub fn clear(&self) -> usize {
        let mut map = self.entries.write();
        let n = map.len();
        map.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{analyze_series, AnalysisParams, AnalysisReport};
    use crate::market_data::{Bar, Series};

    fn report(symbol: &str) -> AnalysisReport {
        let series = Series::from_bars(
            (0..25)
                .map(|i| Bar {
                    timestamp: i,
                    open: 100.0,
                    high: 101.0,
                    low: 99.0,
                    close: 100.0,
                    volume: 1000.0,
                })
                .collect(),
        );
        let (result, ema) = analyze_series(&series, &AnalysisParams::default()).unwrap();
        AnalysisReport {
            symbol: symbol.to_string(),
            timeframe: Timeframe::D1,
            result,
            series,
            ema,
        }
    }

    fn key(symbol: &str, timeframe: Timeframe) -> CacheKey {
        CacheKey {
            symbol: symbol.to_string(),
            timeframe,
        }
    }

    #[test]
    fn hit_within_ttl() {
        let cache = AnalysisCache::new(Duration::from_secs(60));
        cache.insert(key("TCS.NS", Timeframe::D1), report("TCS.NS"));
        let hit = cache.get(&key("TCS.NS", Timeframe::D1));
        assert!(hit.is_some());
        assert_eq!(hit.unwrap().symbol, "TCS.NS");
    }

    #[test]
    fn keyed_by_symbol_and_timeframe() {
        let cache = AnalysisCache::new(Duration::from_secs(60));
        cache.insert(key("TCS.NS", Timeframe::D1), report("TCS.NS"));
        assert!(cache.get(&key("TCS.NS", Timeframe::W1)).is_none());
        assert!(cache.get(&key("INFY.NS", Timeframe::D1)).is_none());
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let cache = AnalysisCache::new(Duration::ZERO);
        cache.insert(key("TCS.NS", Timeframe::D1), report("TCS.NS"));
        assert!(cache.get(&key("TCS.NS", Timeframe::D1)).is_none());
    }

    #[test]
    fn invalidate_removes_only_that_key() {
        let cache = AnalysisCache::new(Duration::from_secs(60));
        cache.insert(key("TCS.NS", Timeframe::D1), report("TCS.NS"));
        cache.insert(key("INFY.NS", Timeframe::D1), report("INFY.NS"));
        cache.invalidate(&key("TCS.NS", Timeframe::D1));
        assert!(cache.get(&key("TCS.NS", Timeframe::D1)).is_none());
        assert!(cache.get(&key("INFY.NS", Timeframe::D1)).is_some());
    }

    #[test]
    fn clear_reports_removed_count() {
        let cache = AnalysisCache::new(Duration::from_secs(60));
        cache.insert(key("TCS.NS", Timeframe::D1), report("TCS.NS"));
        cache.insert(key("INFY.NS", Timeframe::D1), report("INFY.NS"));
        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn display_key_joins_symbol_and_timeframe() {
        assert_eq!(key("TCS.NS", Timeframe::M15).to_string(), "TCS.NS@15m");
    }
}
