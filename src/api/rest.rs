// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`.  Analysis and lookup endpoints are
// public; editing the watchlist requires a Bearer token checked via the
// `AuthBearer` extractor.
//
// CORS is permissive so a locally served dashboard can reach the API.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::api::auth::AuthBearer;
use crate::app_state::AppState;
use crate::report::{AnalysisReport, ReportOptions};
use crate::runtime_config::normalise_symbols;
use crate::types::Period;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with tracing, CORS and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Public ──────────────────────────────────────────────────
        .route("/api/v1/health", get(health))
        .route("/api/v1/watchlist", get(get_watchlist).put(set_watchlist))
        .route("/api/v1/analysis/:symbol", get(analysis))
        .route("/api/v1/info/:symbol", get(symbol_info))
        .route("/api/v1/notices", get(notices))
        // ── Middleware & State ───────────────────────────────────────
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// `{ "error": message }` with the given status.
fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, Json(body)).into_response()
}

fn normalise_symbol(raw: &str) -> Option<String> {
    let s = raw.trim().to_uppercase();
    (!s.is_empty()).then_some(s)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    analyses_served: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.uptime_secs(),
        analyses_served: state.analyses_served(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Watchlist
// =============================================================================

#[derive(Serialize)]
struct WatchlistResponse {
    symbols: Vec<String>,
    periods: Vec<&'static str>,
    default_symbol: String,
    default_period: Period,
}

async fn get_watchlist(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.config.read();
    Json(WatchlistResponse {
        symbols: config.popular_symbols.clone(),
        periods: Period::ALL.iter().map(|p| p.as_str()).collect(),
        default_symbol: config.default_symbol.clone(),
        default_period: config.default_period,
    })
}

#[derive(Deserialize)]
struct WatchlistUpdate {
    symbols: Vec<String>,
}

async fn set_watchlist(
    _auth: AuthBearer,
    State(state): State<Arc<AppState>>,
    Json(update): Json<WatchlistUpdate>,
) -> Response {
    let symbols = normalise_symbols(update.symbols.iter().map(String::as_str));
    if symbols.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Watchlist must contain at least one symbol");
    }

    info!(symbols = ?symbols, "Watchlist updated");
    let persisted = match state.replace_watchlist(symbols.clone()) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Failed to persist watchlist, keeping in-memory update");
            false
        }
    };

    Json(serde_json::json!({ "symbols": symbols, "persisted": persisted })).into_response()
}

// =============================================================================
// Analysis
// =============================================================================

#[derive(Deserialize)]
struct AnalysisQuery {
    period: Option<String>,
}

async fn analysis(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Response {
    let Some(symbol) = normalise_symbol(&symbol) else {
        return error_response(StatusCode::BAD_REQUEST, "Symbol must not be empty");
    };

    let (default_period, options) = {
        let config = state.config.read();
        (
            config.default_period,
            ReportOptions {
                recent_rows: config.recent_rows,
                display_decimals: config.display_decimals,
            },
        )
    };

    let period = match query.period.as_deref() {
        None => default_period,
        Some(raw) => match raw.parse::<Period>() {
            Ok(p) => p,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
        },
    };

    let bars = match state.market_data.fetch_bars(&symbol, period).await {
        Ok(bars) => bars,
        Err(e) => {
            let notice = format!("Error fetching data for {symbol}: {e:#}");
            warn!(symbol = %symbol, error = %e, "Market data fetch failed");
            state.push_notice(&symbol, notice.clone());
            return error_response(StatusCode::BAD_GATEWAY, notice);
        }
    };

    if bars.is_empty() {
        let notice = format!("No data found for symbol {symbol}");
        state.push_notice(&symbol, notice.clone());
        return error_response(StatusCode::NOT_FOUND, notice);
    }

    let set = match state.engine.derive(&bars) {
        Ok(set) => set,
        Err(e) => {
            error!(symbol = %symbol, error = %e, "Indicator derivation rejected provider series");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    // Metadata is optional; a failed lookup only hides the company header.
    let info = match state.market_data.fetch_symbol_info(&symbol).await {
        Ok(info) => Some(info.display()),
        Err(e) => {
            warn!(symbol = %symbol, error = %e, "Symbol info unavailable");
            None
        }
    };

    let report = AnalysisReport::build(&symbol, period, &bars, &set, info, options);
    let served = state.record_analysis();
    info!(symbol = %symbol, period = %period, bars = bars.len(), served, "Analysis served");

    Json(report).into_response()
}

// =============================================================================
// Symbol info
// =============================================================================

async fn symbol_info(State(state): State<Arc<AppState>>, Path(symbol): Path<String>) -> Response {
    let Some(symbol) = normalise_symbol(&symbol) else {
        return error_response(StatusCode::BAD_REQUEST, "Symbol must not be empty");
    };

    match state.market_data.fetch_symbol_info(&symbol).await {
        Ok(info) => Json(info.display()).into_response(),
        Err(e) => {
            let notice = format!("Error fetching info for {symbol}: {e:#}");
            warn!(symbol = %symbol, error = %e, "Symbol info fetch failed");
            state.push_notice(&symbol, notice.clone());
            error_response(StatusCode::BAD_GATEWAY, notice)
        }
    }
}

// =============================================================================
// Notices
// =============================================================================

async fn notices(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.recent_notices.read().clone())
}

// =============================================================================
// Tests
// =============================================================================
