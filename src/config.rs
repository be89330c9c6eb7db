// =============================================================================
// Runtime Configuration — hot-reloadable service settings with atomic save
// =============================================================================
//
// Every tunable lives here so the service can be reconfigured without a
// rebuild. Persistence uses an atomic tmp + rename pattern to prevent
// corruption on crash. All fields carry `#[serde(default)]` so adding new
// fields never breaks loading an older config file.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::levels::LevelParams;
use crate::risk::RiskParams;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_chart_base_url() -> String {
    crate::market_data::chart::DEFAULT_BASE_URL.to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_ema_window() -> usize {
    crate::indicators::DEFAULT_EMA_WINDOW
}

fn default_atr_window() -> usize {
    crate::indicators::DEFAULT_ATR_WINDOW
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration for the analysis service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base URL of the chart data endpoint.
    #[serde(default = "default_chart_base_url")]
    pub chart_base_url: String,

    /// Per-request fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// How long a cached analysis stays fresh, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// EMA look-back window.
    #[serde(default = "default_ema_window")]
    pub ema_window: usize,

    /// ATR look-back window.
    #[serde(default = "default_atr_window")]
    pub atr_window: usize,

    /// Swing-level detection parameters.
    #[serde(default)]
    pub levels: LevelParams,

    /// Stop-loss / target ATR multipliers.
    #[serde(default)]
    pub risk: RiskParams,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            chart_base_url: default_chart_base_url(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            ema_window: default_ema_window(),
            atr_window: default_atr_window(),
            levels: LevelParams::default(),
            risk: RiskParams::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            cache_ttl_secs = config.cache_ttl_secs,
            "config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "config saved (atomic)");
        Ok(())
    }

    /// Bundle the analysis tunables for the engine.
    pub fn analysis_params(&self) -> crate::engine::AnalysisParams {
        crate::engine::AnalysisParams {
            ema_window: self.ema_window,
            atr_window: self.atr_window,
            levels: self.levels,
            risk: self.risk,
        }
    }
}
