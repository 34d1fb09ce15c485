//! HTTP handlers.
//!
//! Balancing and pan measurement are timed here and reported to the
//! metrics collector; the core itself does no instrumentation.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use tracing::{debug, warn};

use balancer_core::{Pans, Recipe, geometry};
use balancer_metrics::{BalanceOutcome, UNKNOWN_RECIPE_TYPE};

use crate::ApiState;
use crate::wire::{PanMessage, PansMessage};

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

// ── Balance ────────────────────────────────────────────────────

/// Balance request body.
#[derive(Debug, Deserialize)]
pub struct BalanceRequest {
    pub recipe: Recipe,
    pub pans: PansMessage,
}

/// POST /api/v1/balance
pub async fn balance(
    State(state): State<ApiState>,
    Json(req): Json<BalanceRequest>,
) -> impl IntoResponse {
    let pans = Pans::from(req.pans);

    let start = Instant::now();
    let result = state.balancer.balance(&req.recipe, &pans);
    let elapsed = start.elapsed();

    match result {
        Ok(aggregate) => {
            state
                .metrics
                .record_balance(
                    UNKNOWN_RECIPE_TYPE,
                    elapsed,
                    BalanceOutcome::Success {
                        pans: pans.pans.len(),
                    },
                )
                .await;
            debug!(
                recipe = %aggregate.recipe.name,
                pans = pans.pans.len(),
                total_area = pans.total_area,
                "recipe balanced"
            );
            ApiResponse::ok(aggregate).into_response()
        }
        Err(e) => {
            state
                .metrics
                .record_balance(
                    UNKNOWN_RECIPE_TYPE,
                    elapsed,
                    BalanceOutcome::Failure {
                        error_type: e.category(),
                    },
                )
                .await;
            warn!(error = %e, total_area = pans.total_area, "balance rejected");
            error_response(&e.to_string(), StatusCode::BAD_REQUEST).into_response()
        }
    }
}

// ── Pans ───────────────────────────────────────────────────────

/// Pan measurement request body.
#[derive(Debug, Deserialize)]
pub struct MeasurePansRequest {
    #[serde(default)]
    pub pans: Vec<PanMessage>,
}

/// POST /api/v1/pans/area
pub async fn measure_pans(Json(req): Json<MeasurePansRequest>) -> impl IntoResponse {
    let measures: Vec<_> = req.pans.iter().map(PanMessage::to_measures).collect();
    match geometry::measure_pans(&measures) {
        Ok(pans) => {
            debug!(pans = pans.pans.len(), total_area = pans.total_area, "pans measured");
            ApiResponse::ok(PansMessage::from(&pans)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "pan measurement rejected");
            error_response(&e.to_string(), StatusCode::BAD_REQUEST).into_response()
        }
    }
}

// ── Health ─────────────────────────────────────────────────────

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": crate::SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ── Prometheus ─────────────────────────────────────────────────

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let snapshot = state.metrics.snapshot().await;
    let body = balancer_metrics::render_prometheus(&snapshot);
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}
