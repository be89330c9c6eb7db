// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. The analyze endpoint is the sole
// contract with the presentation layer: it returns either a full report or a
// uniform `no_result` body. Typed failure reasons are logged server-side and
// never exposed.
//
// CORS is configured permissively for development; tighten `allowed_origins`
// in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::cache::CacheKey;
use crate::engine;
use crate::risk::RiskParams;
use crate::timeframe::Timeframe;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/analyze", get(analyze))
        .route("/api/v1/risk-params", get(get_risk_params))
        .route("/api/v1/risk-params", post(set_risk_params))
        .route("/api/v1/cache/clear", post(cache_clear))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Analyze
// =============================================================================

#[derive(Deserialize)]
struct AnalyzeQuery {
    symbol: String,
    timeframe: String,
}

/// The uniform failure body: the presentation layer renders this one state
/// for every internal cause.
fn no_result() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "status": "no_result" })),
    )
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let timeframe: Timeframe = query.timeframe.parse().map_err(|e: String| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e })),
        )
    })?;

    let symbol = query.symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "symbol must not be empty" })),
        ));
    }

    let key = CacheKey {
        symbol: symbol.clone(),
        timeframe,
    };

    // Memoization happens here at the boundary, never inside the engine.
    if let Some(report) = state.cache.get(&key) {
        return Ok(Json(report));
    }

    // Clone the tunables and release the lock before awaiting the fetch.
    let params = state.runtime_config.read().analysis_params();

    match engine::analyze(&state.chart_client, &params, &symbol, timeframe).await {
        Ok(report) => {
            state.cache.insert(key, report.clone());
            Ok(Json(report))
        }
        Err(e) => {
            // Typed reason stays in the logs; the client sees one shape.
            warn!(%symbol, %timeframe, error = %e, "analysis failed");
            Err(no_result())
        }
    }
}

// =============================================================================
// Risk parameters
// =============================================================================

async fn get_risk_params(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let risk = state.runtime_config.read().risk;
    Json(risk)
}

#[derive(Deserialize)]
struct RiskParamsUpdate {
    #[serde(default)]
    stop_atr_mult: Option<f64>,
    #[serde(default)]
    target_atr_mult: Option<f64>,
}

async fn set_risk_params(
    State(state): State<Arc<AppState>>,
    Json(update): Json<RiskParamsUpdate>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    for (name, value) in [
        ("stop_atr_mult", update.stop_atr_mult),
        ("target_atr_mult", update.target_atr_mult),
    ] {
        if let Some(v) = value {
            if !v.is_finite() || v <= 0.0 {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "error": format!("{name} must be a positive finite number")
                    })),
                ));
            }
        }
    }

    let (risk, config_snapshot): (RiskParams, _) = {
        let mut config = state.runtime_config.write();
        if let Some(v) = update.stop_atr_mult {
            config.risk.stop_atr_mult = v;
        }
        if let Some(v) = update.target_atr_mult {
            config.risk.target_atr_mult = v;
        }
        (config.risk, config.clone())
    };

    // Cached reports were computed under the old multipliers.
    let dropped = state.cache.clear();
    info!(
        stop_atr_mult = risk.stop_atr_mult,
        target_atr_mult = risk.target_atr_mult,
        dropped,
        "risk params updated"
    );

    // Persist best-effort; the in-memory update already took effect.
    if let Err(e) = config_snapshot.save(&state.config_path) {
        warn!(error = %e, "failed to save config to disk");
    }

    Ok(Json(risk))
}

// =============================================================================
// Cache control
// =============================================================================

#[derive(Deserialize)]
struct CacheClearQuery {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    timeframe: Option<String>,
}

/// Clear the whole cache, or just one entry when both `symbol` and
/// `timeframe` are given.
async fn cache_clear(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CacheClearQuery>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    if let (Some(symbol), Some(timeframe)) = (&query.symbol, &query.timeframe) {
        let timeframe: Timeframe = timeframe.parse().map_err(|e: String| {
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": e })),
            )
        })?;
        let key = CacheKey {
            symbol: symbol.trim().to_uppercase(),
            timeframe,
        };
        state.cache.invalidate(&key);
        info!(%key, "analysis cache entry invalidated via API");
        return Ok(Json(serde_json::json!({ "cleared": 1 })));
    }

    let cleared = state.cache.clear();
    info!(cleared, "analysis cache cleared via API");
    Ok(Json(serde_json::json!({ "cleared": cleared })))
}
