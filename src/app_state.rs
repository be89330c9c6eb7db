// =============================================================================
// Shared application state
// =============================================================================
//
// One `Arc<AppState>` is shared with every request handler. The runtime
// config sits behind a `parking_lot::RwLock` so the risk multipliers can be
// adjusted at runtime; the chart client and cache are constructed once from
// the startup config.
// =============================================================================

use std::time::Duration;

use parking_lot::RwLock;

use crate::cache::AnalysisCache;
use crate::config::RuntimeConfig;
use crate::market_data::ChartClient;

pub struct AppState {
    pub runtime_config: RwLock<RuntimeConfig>,
    pub chart_client: ChartClient,
    pub cache: AnalysisCache,
    /// Where config changes made over the API are persisted.
    pub config_path: String,
}

impl AppState {
    pub fn new(config: RuntimeConfig, config_path: impl Into<String>) -> Self {
        let chart_client = ChartClient::new(&config.chart_base_url, config.fetch_timeout_secs);
        let cache = AnalysisCache::new(Duration::from_secs(config.cache_ttl_secs));

        Self {
            runtime_config: RwLock::new(config),
            chart_client,
            cache,
            config_path: config_path.into(),
        }
    }
}
