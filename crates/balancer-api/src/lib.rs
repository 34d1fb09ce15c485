//! balancer-api — HTTP API for the ingredients balancer.
//!
//! Provides axum route handlers for balancing recipes and measuring pans,
//! plus health and Prometheus endpoints. Every request passes through the
//! request-tracking middleware.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/api/v1/balance` | Balance a recipe against a pan set |
//! | POST | `/api/v1/pans/area` | Compute pan areas from shape dimensions |
//! | GET | `/health` | Liveness |
//! | GET | `/metrics` | Prometheus exposition |

pub mod handlers;
pub mod middleware;
pub mod wire;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use balancer_core::Balancer;
use balancer_metrics::MetricsCollector;

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "ingredients-balancer";

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub balancer: Balancer,
    pub metrics: Arc<MetricsCollector>,
}

impl ApiState {
    pub fn new(metrics: Arc<MetricsCollector>) -> Self {
        Self {
            balancer: Balancer::new(),
            metrics,
        }
    }
}

/// Build the complete API router (REST + health + metrics).
pub fn build_router(metrics: Arc<MetricsCollector>) -> Router {
    let state = ApiState::new(metrics);

    let api_routes = Router::new()
        .route("/balance", post(handlers::balance))
        .route("/pans/area", post(handlers::measure_pans));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::prometheus_metrics))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::track_requests,
        ))
        .with_state(state)
}
